//! Tests for binding contexts applied to single views and view hierarchies.
//!
//! These tests verify that:
//! - A context assigned to a view binds it before the call returns
//! - Contexts are inherited down the hierarchy unless overridden
//! - A `binding_context` binding narrows the context for a subtree
//! - Replacing a context fully replaces the previous subscriptions

use avalon::converter::FnConverter;
use avalon::reactive::live_listener_count;
use avalon_test::prelude::*;

fn name_label() -> (MockControl, BoundView) {
    init_tracing();
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([Binding::new("name", "text")]);
    (label, view)
}

// ============================================================================
// Single views
// ============================================================================

#[test]
fn context_is_applied_to_view() {
    let (label, view) = name_label();

    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.text(), "Bob");
    assert!(view.is_bound());
}

#[test]
fn constant_properties() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([Binding::new("surname", "text")]);

    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.text(), "Eggbert");
}

#[test]
fn destination_follows_source() {
    let (label, view) = name_label();
    let person = PersonViewModel::new();
    set_binding_context(&view, person.to_value());
    assert_eq!(label.text(), "Bob");

    person.set_name("Frank");

    assert_eq!(label.text(), "Frank");
}

#[test]
fn every_mutation_is_delivered() {
    let (label, view) = name_label();
    let person = PersonViewModel::new();
    set_binding_context(&view, person.to_value());

    person.set_name("Frank");
    person.set_name("Frank");
    person.set_name("Mary");

    let texts: Vec<Value> = label.writes().into_iter().map(|(_, value)| value).collect();
    assert_eq!(
        texts,
        vec![
            Value::from("Bob"),
            Value::from("Frank"),
            Value::from("Frank"),
            Value::from("Mary"),
        ]
    );
}

#[test]
fn multiple_properties() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([
        Binding::new("name", "text"),
        Binding::new("is_female", "hidden"),
    ]);

    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.text(), "Bob");
    assert_eq!(label.get("hidden"), Value::Bool(true));
    // applied in declaration order
    let order: Vec<String> = label.writes().into_iter().map(|(name, _)| name).collect();
    assert_eq!(order, ["text", "hidden"]);
}

#[test]
fn value_conversion() {
    let label = MockControl::label();
    let age_to_string = FnConverter::new("age_to_string", |value| {
        Ok(Value::from(value.as_int().unwrap_or_default().to_string()))
    });
    let view = BoundView::new(label.clone())
        .with_bindings([Binding::new("age", "text").converter(age_to_string)]);

    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.text(), "22");
}

#[test]
fn context_can_be_changed() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([Binding::new("surname", "text")]);

    let first = PersonViewModel::new();
    set_binding_context(&view, first.to_value());
    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.text(), "Eggbert");
    assert_eq!(first.notifier().total_subscribers(), 0);
}

#[test]
fn replaced_context_no_longer_delivers() {
    let (label, view) = name_label();
    let first = PersonViewModel::new();
    let second = PersonViewModel::new();

    set_binding_context(&view, first.to_value());
    set_binding_context(&view, second.to_value());
    let writes = label.write_count();

    first.set_name("Stale");
    assert_eq!(label.write_count(), writes);

    second.set_name("Fresh");
    assert_eq!(label.write_count(), writes + 1);
    assert_eq!(label.text(), "Fresh");
}

#[test]
fn bindings_set_after_the_context_apply_immediately() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone());
    set_binding_context(&view, PersonViewModel::new().to_value());
    assert_eq!(label.write_count(), 0);

    view.set_bindings([Binding::new("surname", "text")]);

    assert_eq!(label.text(), "Eggbert");
}

#[test]
fn null_context_detaches() {
    let (label, view) = name_label();
    let person = PersonViewModel::new();
    set_binding_context(&view, person.to_value());

    set_binding_context(&view, Value::Null);

    assert!(!view.is_bound());
    assert_eq!(view.binding_context(), None);
    person.set_name("Frank");
    assert_eq!(label.text(), "Bob");
}

// ============================================================================
// Hierarchies
// ============================================================================

#[test]
fn context_is_applied_to_view_hierarchy() {
    let container = BoundView::new(MockControl::new("container", &[]));
    let (label, child) = name_label();
    container.add_child(&child);

    set_binding_context(&container, PersonViewModel::new().to_value());

    assert_eq!(label.text(), "Bob");
    assert!(!child.has_explicit_context());
}

#[test]
fn child_added_later_inherits() {
    let container = BoundView::new(MockControl::new("container", &[]));
    set_binding_context(&container, PersonViewModel::new().to_value());

    let (label, child) = name_label();
    container.add_child(&child);

    assert_eq!(label.text(), "Bob");
}

#[test]
fn bindings_across_the_hierarchy() {
    let (outer_label, outer) = name_label();
    let (inner_label, inner) = name_label();
    outer.add_child(&inner);

    let one = PersonViewModel::new();
    let two = PersonViewModel::new();
    two.set_name("Frank");

    set_binding_context(&outer, one.to_value());
    assert_eq!(inner_label.text(), "Bob");
    assert_eq!(outer_label.text(), "Bob");

    set_binding_context(&inner, two.to_value());
    assert_eq!(outer_label.text(), "Bob");
    assert_eq!(inner_label.text(), "Frank");
}

#[test]
fn explicit_context_short_circuits_inheritance() {
    let container = BoundView::new(MockControl::new("container", &[]));
    let (middle_label, middle) = name_label();
    let (leaf_label, leaf) = name_label();
    container.add_child(&middle.clone().with_child(&leaf));

    let frank = PersonViewModel::new();
    frank.set_name("Frank");
    set_binding_context(&middle, frank.to_value());
    set_binding_context(&container, PersonViewModel::new().to_value());

    assert_eq!(middle_label.text(), "Frank");
    assert_eq!(leaf_label.text(), "Frank");

    middle.clear_binding_context();
    assert_eq!(middle_label.text(), "Bob");
    assert_eq!(leaf_label.text(), "Bob");
}

#[test]
fn removed_child_stops_inheriting() {
    let container = BoundView::new(MockControl::new("container", &[]));
    let (label, child) = name_label();
    container.add_child(&child);
    let person = PersonViewModel::new();
    set_binding_context(&container, person.to_value());

    container.remove_child(&child);

    assert!(child.parent().is_none());
    assert!(!child.is_bound());
    person.set_name("Frank");
    assert_eq!(label.text(), "Bob");
}

#[test]
fn context_can_be_bound() {
    let (container_label, container) = name_label();
    let label = MockControl::label();
    let child = BoundView::new(label.clone()).with_bindings([
        Binding::new("address", BINDING_CONTEXT),
        Binding::new("city", "text"),
    ]);
    container.add_child(&child);

    set_binding_context(&container, PersonViewModel::new().to_value());
    assert_eq!(container_label.text(), "Bob");
    assert_eq!(label.text(), "Newcastle");

    let frank = PersonViewModel::new();
    frank.set_name("Frank");
    frank.set_address(Some(&AddressViewModel::new("Jamaica")));

    set_binding_context(&container, frank.to_value());
    assert_eq!(container_label.text(), "Frank");
    assert_eq!(label.text(), "Jamaica");
}

#[test]
fn bound_context_follows_its_source() {
    let label = MockControl::label();
    let child = BoundView::new(label.clone()).with_bindings([
        Binding::new("address", BINDING_CONTEXT),
        Binding::new("city", "text"),
    ]);
    let container = BoundView::new(MockControl::new("container", &[])).with_child(&child);
    let person = PersonViewModel::new();
    set_binding_context(&container, person.to_value());

    let leeds = AddressViewModel::new("Leeds");
    person.set_address(Some(&leeds));
    assert_eq!(label.text(), "Leeds");

    leeds.set_city("York");
    assert_eq!(label.text(), "York");

    person.set_address(None);
    assert!(!child.is_bound());
    leeds.set_city("Hull");
    assert_eq!(label.text(), "York");
}

#[test]
fn disposing_the_root_view_releases_everything() {
    let baseline = live_listener_count();
    let person = PersonViewModel::new();
    {
        let (_, container) = name_label();
        let child = BoundView::new(MockControl::label()).with_bindings([
            Binding::new("address", BINDING_CONTEXT),
            Binding::new("city", "text"),
        ]);
        container.add_child(&child);
        set_binding_context(&container, person.to_value());
        assert!(live_listener_count() > baseline);

        container.dispose();
        assert!(!child.is_bound());
    }
    assert_eq!(live_listener_count(), baseline);
    assert_eq!(person.notifier().total_subscribers(), 0);
}
