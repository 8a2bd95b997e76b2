//! Dotted property paths and their live resolution against an object graph.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use avalon_reactive::{Disposable, PropertyObserver, Scope, Value};
use smallvec::SmallVec;

use crate::error::{report, BindingError};

/// A dotted source path such as `address.city`.
///
/// Empty segments are dropped, so `"."` and `""` are the *self path*: it
/// resolves to the root object itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: SmallVec<[Rc<str>; 4]>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .map(Rc::from)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[Rc<str>] {
        &self.segments
    }

    pub fn is_self(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for PropertyPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for PropertyPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_self() {
            return f.write_str(".");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyPath({self})")
    }
}

type ChangeFn = Rc<dyn Fn(&Value)>;

struct ResolverState {
    path: PropertyPath,
    root: Value,
    scope: Scope,
    /// One observer per resolved segment. Segment `i`'s value is the target
    /// of observer `i + 1`.
    links: RefCell<Vec<PropertyObserver>>,
    value: RefCell<Value>,
    on_change: RefCell<Option<ChangeFn>>,
    /// Set while some segment names a property its target does not have.
    missing: Cell<bool>,
    disposed: Cell<bool>,
}

/// A live chain of [`PropertyObserver`]s realizing a [`PropertyPath`]
/// against a root object.
///
/// When an intermediate segment changes, every observer below it is disposed
/// before the chain is rebuilt against the new object, then the terminal value
/// is emitted again. A null segment ends resolution silently: the terminal
/// value is [`Value::Null`].
///
/// Cloning yields another handle to the same chain.
#[derive(Clone)]
pub struct PropertyPathResolver {
    state: Rc<ResolverState>,
}

impl fmt::Debug for PropertyPathResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyPathResolver")
            .field("path", &self.state.path)
            .field("links", &self.state.links.borrow().len())
            .field("value", &self.state.value.borrow())
            .finish()
    }
}

impl PropertyPathResolver {
    /// Resolve `path` against `root` and keep it resolved.
    ///
    /// The initial terminal value is available from [`value`](Self::value);
    /// `on_change` only receives later changes. The resolver's subscriptions
    /// live in a child of the current [`Scope`].
    pub fn resolve(root: &Value, path: &PropertyPath, on_change: impl Fn(&Value) + 'static) -> Self {
        let state = Rc::new(ResolverState {
            path: path.clone(),
            root: root.clone(),
            scope: Scope::current().create_child(),
            links: RefCell::new(Vec::with_capacity(path.segments().len())),
            value: RefCell::new(Value::Null),
            on_change: RefCell::new(Some(Rc::new(on_change))),
            missing: Cell::new(false),
            disposed: Cell::new(false),
        });
        let value = state.build_from(0, root.clone());
        *state.value.borrow_mut() = value;
        Self { state }
    }

    /// The current terminal value, `Null` when the path does not resolve.
    pub fn value(&self) -> Value {
        self.state.value.borrow().clone()
    }

    pub fn path(&self) -> &PropertyPath {
        &self.state.path
    }

    /// The object the path is resolved against.
    pub fn root(&self) -> &Value {
        &self.state.root
    }

    /// The number of live segment observers.
    pub fn depth(&self) -> usize {
        self.state.links.borrow().len()
    }

    /// Whether every segment currently resolves to an observed property.
    pub fn is_resolved(&self) -> bool {
        self.depth() == self.state.path.segments().len()
    }

    /// Whether resolution stopped at a property that does not exist.
    pub fn has_missing_segment(&self) -> bool {
        self.state.missing.get()
    }

    /// Write `value` into the terminal property of the path.
    pub fn write(&self, value: Value) -> Result<(), BindingError> {
        let terminal = if self.is_resolved() {
            self.state.links.borrow().last().and_then(PropertyObserver::target)
        } else {
            None
        };
        let Some(target) = terminal else {
            return Err(BindingError::Unresolved {
                path: self.state.path.to_string(),
            });
        };
        let segments = self.state.path.segments();
        let property = &segments[segments.len() - 1];
        target.set_property(property, value)?;
        Ok(())
    }
}

impl Disposable for PropertyPathResolver {
    fn dispose(&self) {
        self.state.dispose();
    }
}

impl ResolverState {
    /// Observe segments `start..` beginning at `target`, returning the
    /// terminal value. Expects the links to be truncated to `start`.
    fn build_from(self: &Rc<Self>, start: usize, mut target: Value) -> Value {
        self.missing.set(false);
        let segments = self.path.segments();
        for (index, segment) in segments.iter().enumerate().skip(start) {
            let object = match target {
                Value::Object(object) => object,
                Value::Null => return Value::Null,
                other => {
                    self.missing.set(true);
                    report(BindingError::MissingProperty {
                        path: self.path.to_string(),
                        segment: segment.to_string(),
                        target: other.kind(),
                    });
                    return Value::Null;
                }
            };

            let state: Weak<ResolverState> = Rc::downgrade(self);
            let observer = self.scope.enter(|| {
                PropertyObserver::observe(&object, segment, move |value| {
                    if let Some(state) = state.upgrade() {
                        state.segment_changed(index, value.clone());
                    }
                })
            });

            match observer {
                Ok(observer) => {
                    target = observer.current_value().unwrap_or_default();
                    self.links.borrow_mut().push(observer);
                }
                Err(_) => {
                    self.missing.set(true);
                    report(BindingError::MissingProperty {
                        path: self.path.to_string(),
                        segment: segment.to_string(),
                        target: object.type_name(),
                    });
                    return Value::Null;
                }
            }
        }
        target
    }

    fn segment_changed(self: &Rc<Self>, index: usize, value: Value) {
        if self.disposed.get() {
            return;
        }

        let terminal = if index + 1 == self.path.segments().len() {
            value
        } else {
            // Tear down everything below the changed segment before rebuilding.
            let stale = {
                let mut links = self.links.borrow_mut();
                let keep = (index + 1).min(links.len());
                links.split_off(keep)
            };
            for observer in &stale {
                observer.dispose();
            }
            tracing::debug!(
                path = %self.path,
                segment = index,
                released = stale.len(),
                "re-resolving path"
            );
            self.build_from(index + 1, value)
        };

        *self.value.borrow_mut() = terminal.clone();
        if self.missing.get() {
            return;
        }
        let on_change = self.on_change.borrow().clone();
        if let Some(on_change) = on_change {
            on_change(&terminal);
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        let links = std::mem::take(&mut *self.links.borrow_mut());
        for observer in &links {
            observer.dispose();
        }
        self.scope.dispose();
        self.on_change.borrow_mut().take();
    }
}

impl Drop for ResolverState {
    fn drop(&mut self) {
        self.dispose();
    }
}
