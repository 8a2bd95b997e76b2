//! # Avalon reactive
//!
//! The observation runtime underneath the Avalon binding engine.
//!
//! Objects expose named properties through [`Observable`] and announce
//! mutations on their [`Notifier`]. Subscribers get a [`Subscription`] handle
//! that is owned by the [`Scope`] it was created in; disposing the scope
//! disposes every subscription under it. Everything runs synchronously on the
//! thread that mutates: there is no queue and no batching, each mutation is
//! delivered as it happens.

mod collection;
mod disposable;
mod error;
mod id;
mod model;
mod notifier;
mod observable;
mod observer;
mod runtime;
mod scope;
mod value;

pub use chrono;
pub use collection::{ObservableVec, VecChange};
pub use disposable::Disposable;
pub use error::PropertyError;
pub use model::Model;
pub use notifier::{Notifier, Subscription};
pub use observable::{Getter, Observable, PropertyTable, Setter};
pub use observer::PropertyObserver;
pub use runtime::live_listener_count;
pub use scope::{with_scope, Scope};
pub use value::{ObjectRef, Value};
