//! Tests for tearing bindings down.
//!
//! These tests verify that:
//! - Disposal is synchronous, idempotent and final
//! - Re-attaching replaces every previous subscription
//! - Dropping the last handle releases subscriptions too

use std::{cell::RefCell, rc::Rc};

use avalon::reactive::{live_listener_count, Model, Notifier, PropertyError};
use avalon::Adapter;
use avalon_test::prelude::*;

fn attach(label: &MockControl, bindings: &[Binding], root: &Value) -> BindingContextController {
    let controller = BindingContextController::new();
    let destination: Rc<dyn Adapter> = Rc::new(label.clone());
    controller.attach(&destination, bindings, root);
    controller
}

#[test]
fn disposed_controller_makes_no_writes() {
    let person = PersonViewModel::new();
    let label = MockControl::label();
    let controller = attach(
        &label,
        &[Binding::new("name", "text"), Binding::new("address.city", "hidden")],
        &person.to_value(),
    );
    let writes = label.write_count();

    controller.dispose();
    person.set_name("Frank");
    person.set_address(Some(&AddressViewModel::new("Leeds")));

    assert_eq!(label.write_count(), writes);
    assert!(!controller.is_attached());
    assert_eq!(controller.root(), Value::Null);
}

#[test]
fn dispose_is_idempotent() {
    let person = PersonViewModel::new();
    let label = MockControl::label();
    let baseline = live_listener_count();
    let controller = attach(&label, &[Binding::new("address.city", "text")], &person.to_value());
    assert_eq!(live_listener_count(), baseline + 2);

    controller.dispose();
    controller.dispose();

    assert_eq!(live_listener_count(), baseline);
    assert!(controller.is_empty());
}

#[test]
fn re_attach_replaces_subscriptions() {
    let first = PersonViewModel::new();
    let second = PersonViewModel::new();
    let label = MockControl::label();
    let controller = attach(&label, &[Binding::new("name", "text")], &first.to_value());
    let baseline = live_listener_count();

    controller.attach(
        &(Rc::new(label.clone()) as Rc<dyn Adapter>),
        &[Binding::new("name", "text")],
        &second.to_value(),
    );
    second.set_name("Frank");
    first.set_name("Stale");

    assert_eq!(live_listener_count(), baseline);
    assert_eq!(label.text(), "Frank");
    // one initial write per attach, one for the change
    assert_eq!(label.write_count(), 3);
}

#[test]
fn dropping_the_controller_releases_subscriptions() {
    let person = PersonViewModel::new();
    let baseline = live_listener_count();
    {
        let _controller = attach(&MockControl::label(), &[Binding::new("name", "text")], &person.to_value());
        assert_eq!(person.notifier().total_subscribers(), 1);
    }
    assert_eq!(person.notifier().total_subscribers(), 0);
    assert_eq!(live_listener_count(), baseline);
}

#[test]
fn bindings_are_independent() {
    let person = PersonViewModel::new();
    let label = MockControl::label();
    let _controller = attach(
        &label,
        &[Binding::new("name", "text"), Binding::new("address.city", "text")],
        &person.to_value(),
    );
    // declaration order: the city is written last
    assert_eq!(label.text(), "Newcastle");

    person.set_address(Some(&AddressViewModel::new("Leeds")));
    assert_eq!(label.text(), "Leeds");

    person.set_name("Frank");
    assert_eq!(label.text(), "Frank");
    assert_eq!(label.write_count(), 4);
}

#[test]
fn controller_outlives_the_scope_it_was_attached_in() {
    let person = PersonViewModel::new();
    let label = MockControl::label();
    let scope = Scope::new();
    let controller = scope.enter(|| attach(&label, &[Binding::new("name", "text")], &person.to_value()));

    // the controller keeps its own scope
    scope.dispose();
    person.set_name("Frank");
    assert_eq!(label.text(), "Frank");

    controller.dispose();
    person.set_name("Mary");
    assert_eq!(label.text(), "Frank");
}

/// A destination that detaches its own controller when written.
struct SelfDetaching {
    controller: RefCell<Option<BindingContextController>>,
    values: RefCell<Vec<Value>>,
    edits: Notifier,
}

impl Adapter for SelfDetaching {
    fn property(&self, name: &str) -> Option<Value> {
        (name == "value").then(|| self.values.borrow().last().cloned().unwrap_or_default())
    }

    fn set_property(&self, _name: &str, value: Value) -> Result<(), PropertyError> {
        let stop = value.as_str() == Some("stop");
        self.values.borrow_mut().push(value);
        if stop {
            let controller = self.controller.borrow().clone();
            if let Some(controller) = controller {
                controller.dispose();
            }
        }
        Ok(())
    }

    fn edits(&self) -> Option<&Notifier> {
        Some(&self.edits)
    }
}

#[test]
fn destination_can_dispose_from_inside_a_write() {
    let model = Rc::new(Model::new().with("value", "go"));
    let destination = Rc::new(SelfDetaching {
        controller: RefCell::new(None),
        values: RefCell::new(Vec::new()),
        edits: Notifier::default(),
    });
    let controller = BindingContextController::new();
    *destination.controller.borrow_mut() = Some(controller.clone());
    let baseline = live_listener_count();

    controller.attach(
        &(destination.clone() as Rc<dyn Adapter>),
        &[Binding::new("value", "value").two_way()],
        &Value::object(model.clone()),
    );
    assert_eq!(live_listener_count(), baseline + 2);

    model.set("value", "stop");
    model.set("value", "after");

    assert_eq!(
        *destination.values.borrow(),
        vec![Value::from("go"), Value::from("stop")]
    );
    assert_eq!(live_listener_count(), baseline);
    // break the cycle between the destination and its controller
    destination.controller.borrow_mut().take();
}
