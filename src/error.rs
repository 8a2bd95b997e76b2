//! Errors recovered inside the binding engine, and the side channel they are
//! reported through.
//!
//! None of these errors ever unwinds out of a change notification. The engine
//! recovers locally (the path resolves absent, the destination keeps its value,
//! the item is skipped) and hands the error to [`report`].

use std::{cell::RefCell, rc::Rc};

use avalon_reactive::PropertyError;
use thiserror::Error;

use crate::converter::ConversionError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// A path segment does not exist on the object it was applied to.
    #[error("cannot resolve `{segment}` of path `{path}` on {target}")]
    MissingProperty {
        path: String,
        segment: String,
        target: &'static str,
    },

    /// A converter rejected the value it was given.
    #[error("converter `{converter}` failed for `{path}`: {source}")]
    Conversion {
        converter: String,
        path: String,
        #[source]
        source: ConversionError,
    },

    /// A collection item does not have the shape the adapter displays.
    #[error("item {index} is {found}, the adapter expects {expected}")]
    AdapterTypeMismatch {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    /// A two-way write targeted a path that does not currently resolve.
    #[error("cannot write through unresolved path `{path}`")]
    Unresolved { path: String },

    /// Reading or writing a destination or source property failed.
    #[error(transparent)]
    Property(#[from] PropertyError),
}

type ErrorHook = Rc<dyn Fn(&BindingError)>;

thread_local! {
    static ERROR_HOOK: RefCell<Option<ErrorHook>> = const { RefCell::new(None) };
}

/// Install a hook receiving every error reported on this thread, returning
/// the previous one. Pass `None` to remove it.
pub fn set_error_hook(hook: Option<Rc<dyn Fn(&BindingError)>>) -> Option<Rc<dyn Fn(&BindingError)>> {
    ERROR_HOOK.with(|slot| slot.replace(hook))
}

/// Report an error recovered by the engine.
///
/// Emits a `tracing` warning, then calls the hook installed with
/// [`set_error_hook`], if any.
pub fn report(error: BindingError) {
    tracing::warn!(target: "avalon::binding", %error, "binding error");
    let hook = ERROR_HOOK.with(|slot| slot.borrow().clone());
    if let Some(hook) = hook {
        hook(&error);
    }
}
