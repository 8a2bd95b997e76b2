use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use avalon_reactive::{Disposable, ObjectRef, Scope, Subscription, Value};

use crate::{
    adapter::{Adapter, ObjectAdapter},
    binding::{Binding, BindingMode},
    error::{report, BindingError},
    path::{PropertyPath, PropertyPathResolver},
};

/// Suppresses the echo of a two-way binding's own writes.
///
/// While a value is being pushed into the destination, edits the destination
/// reports are not written back. While an edit is being written back, source
/// changes are not pushed into the destination. Re-entrant changes in the
/// same direction are always delivered.
#[derive(Default)]
struct EchoGuard {
    to_destination: Cell<bool>,
    to_source: Cell<bool>,
}

struct BindingEntry {
    resolver: PropertyPathResolver,
    edits: Option<Subscription>,
}

impl BindingEntry {
    fn dispose(&self) {
        self.resolver.dispose();
        if let Some(edits) = self.edits {
            edits.dispose();
        }
    }
}

#[derive(Default)]
struct ControllerState {
    scope: Cell<Option<Scope>>,
    entries: RefCell<Vec<BindingEntry>>,
    root: RefCell<Value>,
    generation: Cell<u64>,
}

impl ControllerState {
    fn release(&self) {
        let entries = std::mem::take(&mut *self.entries.borrow_mut());
        for entry in &entries {
            entry.dispose();
        }
        if let Some(scope) = self.scope.take() {
            scope.dispose();
        }
        self.root.replace(Value::Null);
    }
}

impl Drop for ControllerState {
    fn drop(&mut self) {
        self.release();
    }
}

/// Drives the bindings of one destination from a root view-model.
///
/// Each attached [`Binding`] gets its own [`PropertyPathResolver`]; resolvers
/// never affect each other. The controller owns every subscription it makes
/// and releases all of them on [`dispose`](Disposable::dispose), on the next
/// [`attach`](Self::attach), or when the last handle is dropped.
#[derive(Clone, Default)]
pub struct BindingContextController {
    state: Rc<ControllerState>,
}

impl fmt::Debug for BindingContextController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContextController")
            .field("root", &self.state.root.borrow())
            .field("bindings", &self.state.entries.borrow().len())
            .finish()
    }
}

impl BindingContextController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `destination` to `root` through `bindings`, in declaration order.
    ///
    /// Any previous attachment is released first. Every destination property
    /// holds its converted initial value by the time this returns.
    pub fn attach(&self, destination: &Rc<dyn Adapter>, bindings: &[Binding], root: &Value) {
        self.state.release();

        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);

        let scope = Scope::new();
        self.state.scope.set(Some(scope));
        self.state.root.replace(root.clone());

        tracing::debug!(
            destination = destination.type_name(),
            bindings = bindings.len(),
            "attaching binding context"
        );

        let mut entries = Vec::with_capacity(bindings.len());
        for binding in bindings {
            entries.push(scope.enter(|| bind(destination, binding, root)));
            if self.state.generation.get() != generation {
                break;
            }
        }

        if self.state.generation.get() == generation {
            *self.state.entries.borrow_mut() = entries;
        } else {
            // A destination write re-attached this controller while the
            // initial values were applied; the newer attachment wins.
            for entry in &entries {
                entry.dispose();
            }
        }
    }

    /// The root this controller is attached to, `Null` when detached.
    pub fn root(&self) -> Value {
        self.state.root.borrow().clone()
    }

    pub fn is_attached(&self) -> bool {
        self.state.scope.get().is_some()
    }

    /// The number of active bindings.
    pub fn len(&self) -> usize {
        self.state.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Disposable for BindingContextController {
    fn dispose(&self) {
        if self.is_attached() {
            tracing::debug!("disposing binding context");
        }
        self.state.release();
    }
}

/// Expects to run inside the controller's scope. Every push re-enters that
/// scope, so subscriptions a destination makes while being written are
/// released together with the binding.
fn bind(destination: &Rc<dyn Adapter>, binding: &Binding, root: &Value) -> BindingEntry {
    let guard = Rc::new(EchoGuard::default());
    let scope = Scope::current();

    let resolver = PropertyPathResolver::resolve(root, binding.source(), {
        let destination = destination.clone();
        let binding = binding.clone();
        let guard = guard.clone();
        move |value: &Value| {
            if guard.to_source.get() {
                tracing::trace!(path = %binding.source(), "skipping echo of a write-back");
                return;
            }
            scope.enter(|| push(&*destination, &binding, value, &guard));
        }
    });

    if !resolver.has_missing_segment() {
        push(&**destination, binding, &resolver.value(), &guard);
    }

    let edits = match (binding.binding_mode(), destination.edits()) {
        (BindingMode::TwoWay, Some(edits)) => {
            let resolver = resolver.clone();
            let target = destination.clone();
            let back = binding.clone();
            let guard = guard.clone();
            Some(edits.subscribe(binding.destination(), move |edited| {
                if guard.to_destination.get() {
                    return;
                }
                scope.enter(|| write_back(&resolver, &*target, &back, edited, &guard));
            }))
        }
        (BindingMode::TwoWay, None) => {
            tracing::debug!(
                destination = destination.type_name(),
                property = binding.destination(),
                "destination reports no edits, binding behaves one-way"
            );
            None
        }
        (BindingMode::OneWay, _) => None,
    };

    BindingEntry { resolver, edits }
}

/// Convert `value` and write it into the destination property. On a
/// conversion failure the destination keeps its current value.
fn push(destination: &dyn Adapter, binding: &Binding, value: &Value, guard: &EchoGuard) {
    let converted = match binding.convert(value) {
        Ok(converted) => converted,
        Err(source) => {
            report(BindingError::Conversion {
                converter: binding.converter_name().to_string(),
                path: binding.source().to_string(),
                source,
            });
            return;
        }
    };

    tracing::trace!(
        path = %binding.source(),
        destination = binding.destination(),
        value = ?converted,
        "propagating"
    );

    guard.to_destination.set(true);
    let result = destination.set_property(binding.destination(), converted);
    guard.to_destination.set(false);

    if let Err(err) = result {
        report(err.into());
    }
}

/// Convert a destination edit back and write it into the source. If the
/// source settles on a different value, that value is pushed to the
/// destination once the write is done.
fn write_back(
    resolver: &PropertyPathResolver,
    destination: &dyn Adapter,
    binding: &Binding,
    edited: &Value,
    guard: &EchoGuard,
) {
    let value = match binding.convert_back(edited) {
        Ok(value) => value,
        Err(source) => {
            report(BindingError::Conversion {
                converter: binding.converter_name().to_string(),
                path: binding.source().to_string(),
                source,
            });
            return;
        }
    };

    guard.to_source.set(true);
    let result = resolver.write(value.clone());
    guard.to_source.set(false);

    if let Err(err) = result {
        report(err);
        return;
    }

    let settled = resolver.value();
    if settled != value {
        push(destination, binding, &settled, guard);
    }
}

/// Bind a property path of one object to a property of another.
///
/// The destination receives the current value immediately. With
/// [`BindingMode::TwoWay`], changes of the destination property flow back.
/// The returned controller owns the subscriptions.
pub fn bind_objects(
    source: &Value,
    path: impl Into<PropertyPath>,
    destination: ObjectRef,
    property: &str,
    mode: BindingMode,
) -> BindingContextController {
    let controller = BindingContextController::new();
    let adapter: Rc<dyn Adapter> = Rc::new(ObjectAdapter::new(destination));
    controller.attach(&adapter, &[Binding::new(path, property).mode(mode)], source);
    controller
}
