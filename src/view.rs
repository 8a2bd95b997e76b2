//! Destinations organized as a hierarchy, with inherited binding contexts.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::{Rc, Weak},
};

use avalon_reactive::{Disposable, PropertyError, Value};

use crate::{
    adapter::Adapter,
    binding::{Binding, BINDING_CONTEXT},
    controller::BindingContextController,
};

struct ViewNode {
    adapter: Rc<dyn Adapter>,
    bindings: RefCell<Vec<Binding>>,
    parent: RefCell<Weak<ViewNode>>,
    children: RefCell<Vec<BoundView>>,
    /// Assigned with `set_binding_context`; wins over everything else.
    explicit: RefCell<Option<Value>>,
    /// Produced by this view's own `binding_context` bindings. `Some(Null)`
    /// while they resolve to nothing.
    bound: RefCell<Option<Value>>,
    /// The parent's effective context.
    inherited: RefCell<Option<Value>>,
    effective: RefCell<Option<Value>>,
    controller: BindingContextController,
    context_controller: BindingContextController,
    applying_context: Cell<bool>,
}

/// A destination adapter paired with its bindings and its place in a view
/// hierarchy.
///
/// Assigning a binding context to a view binds it and every descendant that
/// has no explicit context of its own. A view's effective context is, in
/// order of precedence: the context assigned explicitly, the context produced
/// by its own [`BINDING_CONTEXT`] bindings (resolved against the parent's
/// context), or the parent's context.
///
/// Cloning yields another handle to the same view.
#[derive(Clone)]
pub struct BoundView {
    node: Rc<ViewNode>,
}

impl fmt::Debug for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundView")
            .field("adapter", &self.node.adapter.type_name())
            .field("bindings", &self.node.bindings.borrow())
            .field("children", &self.node.children.borrow().len())
            .field("context", &self.node.effective.borrow())
            .finish()
    }
}

impl PartialEq for BoundView {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

/// Receives the values of `binding_context` bindings.
struct ContextSink {
    node: Weak<ViewNode>,
}

impl Adapter for ContextSink {
    fn property(&self, name: &str) -> Option<Value> {
        let node = self.node.upgrade()?;
        if name != BINDING_CONTEXT {
            return None;
        }
        let bound = node.bound.borrow().clone();
        Some(bound.unwrap_or_default())
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), PropertyError> {
        if name != BINDING_CONTEXT {
            return Err(PropertyError::missing(name, "binding context"));
        }
        if let Some(node) = self.node.upgrade() {
            BoundView { node }.set_bound_context(value);
        }
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "binding context"
    }
}

fn non_null(value: Option<Value>) -> Option<Value> {
    value.filter(|value| !value.is_null())
}

impl BoundView {
    pub fn new(adapter: impl Adapter + 'static) -> Self {
        Self::from_adapter(Rc::new(adapter))
    }

    pub fn from_adapter(adapter: Rc<dyn Adapter>) -> Self {
        Self {
            node: Rc::new(ViewNode {
                adapter,
                bindings: RefCell::new(Vec::new()),
                parent: RefCell::new(Weak::new()),
                children: RefCell::new(Vec::new()),
                explicit: RefCell::new(None),
                bound: RefCell::new(None),
                inherited: RefCell::new(None),
                effective: RefCell::new(None),
                controller: BindingContextController::new(),
                context_controller: BindingContextController::new(),
                applying_context: Cell::new(false),
            }),
        }
    }

    /// Builder-style [`set_bindings`](Self::set_bindings).
    pub fn with_bindings(self, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.set_bindings(bindings);
        self
    }

    /// Replace the declared bindings. They are applied in order; if the view
    /// already has a context they are applied right away.
    pub fn set_bindings(&self, bindings: impl IntoIterator<Item = Binding>) {
        *self.node.bindings.borrow_mut() = bindings.into_iter().collect();
        if self.node.explicit.borrow().is_some() {
            self.refresh();
        } else {
            self.rebind_context();
        }
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.node.bindings.borrow().clone()
    }

    pub fn adapter(&self) -> &Rc<dyn Adapter> {
        &self.node.adapter
    }

    /// Add `child` as the last child of this view. The child inherits this
    /// view's context unless it has one of its own.
    pub fn add_child(&self, child: &BoundView) {
        let previous = child.node.parent.borrow().upgrade();
        if let Some(previous) = previous {
            BoundView { node: previous }.detach_child(child);
        }
        *child.node.parent.borrow_mut() = Rc::downgrade(&self.node);
        self.node.children.borrow_mut().push(child.clone());
        child.inherit(self.binding_context());
    }

    /// Builder-style [`add_child`](Self::add_child).
    pub fn with_child(self, child: &BoundView) -> Self {
        self.add_child(child);
        self
    }

    /// Remove `child` from this view. It stops inheriting this view's context.
    pub fn remove_child(&self, child: &BoundView) {
        if self.detach_child(child) {
            *child.node.parent.borrow_mut() = Weak::new();
            child.inherit(None);
        }
    }

    pub fn children(&self) -> Vec<BoundView> {
        self.node.children.borrow().clone()
    }

    pub fn parent(&self) -> Option<BoundView> {
        self.node
            .parent
            .borrow()
            .upgrade()
            .map(|node| BoundView { node })
    }

    /// Assign `root` as this view's binding context, overriding inheritance
    /// for this view and everything below it.
    pub fn set_binding_context(&self, root: impl Into<Value>) {
        *self.node.explicit.borrow_mut() = Some(root.into());
        self.node.context_controller.dispose();
        *self.node.bound.borrow_mut() = None;
        self.refresh();
    }

    /// Drop the explicitly assigned context and go back to inheriting.
    pub fn clear_binding_context(&self) {
        self.node.explicit.borrow_mut().take();
        self.rebind_context();
    }

    /// The context this view's bindings currently resolve against.
    pub fn binding_context(&self) -> Option<Value> {
        self.node.effective.borrow().clone()
    }

    pub fn has_explicit_context(&self) -> bool {
        self.node.explicit.borrow().is_some()
    }

    /// Whether the view's bindings are attached to a context.
    pub fn is_bound(&self) -> bool {
        self.node.controller.is_attached()
    }

    fn detach_child(&self, child: &BoundView) -> bool {
        let mut children = self.node.children.borrow_mut();
        let before = children.len();
        children.retain(|c| c != child);
        children.len() != before
    }

    fn inherit(&self, context: Option<Value>) {
        *self.node.inherited.borrow_mut() = non_null(context);
        if self.has_explicit_context() {
            return;
        }
        self.rebind_context();
    }

    /// Re-resolve the `binding_context` bindings against the inherited
    /// context, then refresh.
    fn rebind_context(&self) {
        let context_bindings: Vec<Binding> = self
            .node
            .bindings
            .borrow()
            .iter()
            .filter(|binding| binding.targets_context())
            .cloned()
            .collect();

        let inherited = self.node.inherited.borrow().clone();

        match inherited {
            Some(parent_context) if !context_bindings.is_empty() => {
                // Until a context binding delivers, the view has no context.
                // It does not fall back to the inherited one.
                *self.node.bound.borrow_mut() = Some(Value::Null);
                let sink: Rc<dyn Adapter> = Rc::new(ContextSink {
                    node: Rc::downgrade(&self.node),
                });
                self.node.applying_context.set(true);
                self.node
                    .context_controller
                    .attach(&sink, &context_bindings, &parent_context);
                self.node.applying_context.set(false);
            }
            _ => {
                *self.node.bound.borrow_mut() = None;
                self.node.context_controller.dispose();
            }
        }

        self.refresh();
    }

    fn set_bound_context(&self, context: Value) {
        *self.node.bound.borrow_mut() = Some(context);
        if !self.node.applying_context.get() && !self.has_explicit_context() {
            self.refresh();
        }
    }

    /// Re-attach the value bindings to the effective context and pass it down.
    fn refresh(&self) {
        let effective = non_null(
            self.node
                .explicit
                .borrow()
                .clone()
                .or_else(|| self.node.bound.borrow().clone())
                .or_else(|| self.node.inherited.borrow().clone()),
        );
        *self.node.effective.borrow_mut() = effective.clone();

        let bindings: Vec<Binding> = self
            .node
            .bindings
            .borrow()
            .iter()
            .filter(|binding| !binding.targets_context())
            .cloned()
            .collect();

        match &effective {
            Some(root) => self.node.controller.attach(&self.node.adapter, &bindings, root),
            None => self.node.controller.dispose(),
        }

        for child in self.children() {
            child.inherit(effective.clone());
        }
    }
}

impl Disposable for BoundView {
    /// Release the bindings of this view and all of its descendants.
    fn dispose(&self) {
        self.node.context_controller.dispose();
        self.node.controller.dispose();
        self.node.effective.borrow_mut().take();
        for child in self.children() {
            child.dispose();
        }
    }
}

/// Assign `root` as the binding context of `destination`. This is the entry
/// point that binds a whole view hierarchy.
pub fn set_binding_context(destination: &BoundView, root: impl Into<Value>) {
    destination.set_binding_context(root);
}
