//! # Avalon
//!
//! Declarative data binding between view-models and UI controls.
//!
//! A [`Binding`] maps a dotted source path on a view-model to a property of a
//! destination. A [`BindingContextController`] attaches a set of bindings to a
//! root object and keeps every destination property in step with its source
//! for as long as it stays attached.
//!
//! ```
//! use avalon::{Binding, BindingContextController, ObjectAdapter, converter::ToText};
//! use avalon::reactive::{Model, Value};
//! use std::rc::Rc;
//!
//! let address = Model::new().with("city", "Newcastle").into_value();
//! let person = Rc::new(Model::new().with("age", 22).with("address", address));
//! let label = Rc::new(Model::new());
//!
//! let controller = BindingContextController::new();
//! controller.attach(
//!     &(Rc::new(ObjectAdapter::new(label.clone())) as Rc<dyn avalon::Adapter>),
//!     &[
//!         Binding::new("address.city", "text"),
//!         Binding::new("age", "detail").converter(ToText),
//!     ],
//!     &Value::object(person.clone()),
//! );
//! assert_eq!(label.get("text"), Some(Value::from("Newcastle")));
//! assert_eq!(label.get("detail"), Some(Value::from("22")));
//!
//! person.set("age", 23);
//! assert_eq!(label.get("detail"), Some(Value::from("23")));
//! ```
//!
//! ## Views
//!
//! Controls are usually arranged in a hierarchy. Wrapping each control's
//! [`Adapter`] in a [`BoundView`] lets a single [`set_binding_context`] call
//! bind a whole subtree: children inherit their parent's context unless they
//! were given one explicitly, and a binding whose destination is
//! [`BINDING_CONTEXT`] narrows the context for a view and its descendants.
//!
//! ## Collections
//!
//! An [`ItemsController`] keeps a list-like control in step with an
//! [`ObservableVec`](reactive::ObservableVec), forwarding single insertions
//! and removals instead of reloading everything.
//!
//! ## Errors
//!
//! Binding failures never unwind through a change notification. They are
//! reported as [`BindingError`]s through `tracing` and an optional per-thread
//! hook, see [`set_error_hook`].

pub use avalon_reactive as reactive;

mod adapter;
mod binding;
mod controller;
pub mod converter;
mod decl;
mod error;
mod items;
mod path;
mod view;

pub use adapter::{Adapter, ObjectAdapter};
pub use binding::{Binding, BindingMode, InvalidMode, BINDING_CONTEXT};
pub use controller::{bind_objects, BindingContextController};
#[cfg(feature = "serde")]
pub use decl::parse_bindings;
pub use decl::{resolve_all, BindingDecl, ConverterRegistry, DeclError};
pub use error::{report, set_error_hook, BindingError};
pub use items::{ItemRejected, ItemsAdapter, ItemsController};
pub use path::{PropertyPath, PropertyPathResolver};
pub use view::{set_binding_context, BoundView};

pub use avalon_reactive::{Disposable, Value};
