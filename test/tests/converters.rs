//! Tests for converters applied during propagation.

use std::{cell::Cell, rc::Rc};

use avalon::converter::{
    Constant, ConversionError, DateFormat, DateStyle, FnConverter, IntText, Not, ToText,
};
use avalon::reactive::chrono::{DateTime, Utc};
use avalon::reactive::{Model, PropertyError};
use avalon_test::prelude::*;

fn date(seconds: i64) -> Value {
    Value::Date(DateTime::<Utc>::from_timestamp(seconds, 0).unwrap())
}

#[test]
fn age_as_text() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([Binding::new("age", "text").converter(ToText)]);

    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.get("text"), Value::from("22"));
}

#[test]
fn converter_runs_on_every_change() {
    let calls = Rc::new(Cell::new(0));
    let shout = FnConverter::new("shout", {
        let calls = calls.clone();
        move |value| {
            calls.set(calls.get() + 1);
            Ok(Value::from(value.as_str().unwrap_or_default().to_uppercase()))
        }
    });
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([Binding::new("name", "text").converter(shout)]);
    let person = PersonViewModel::new();

    set_binding_context(&view, person.to_value());
    assert_eq!(label.text(), "BOB");
    assert_eq!(calls.get(), 1);

    person.set_name("Frank");
    assert_eq!(label.text(), "FRANK");
    assert_eq!(calls.get(), 2);
}

#[test]
fn date_styles_on_the_self_path() {
    // Thursday, 1 January 1970 plus 45 days
    let root = date(45 * 24 * 60 * 60);
    let cases = [
        (DateStyle::Short, "2/15/70"),
        (DateStyle::Medium, "Feb 15, 1970"),
        (DateStyle::Long, "February 15, 1970"),
        (DateStyle::Full, "Sunday, February 15, 1970"),
    ];

    for (style, expected) in cases {
        let label = MockControl::label();
        let view = BoundView::new(label.clone())
            .with_bindings([Binding::new(".", "text").converter(DateFormat::new(style))]);

        set_binding_context(&view, root.clone());

        assert_eq!(label.text(), expected, "{style:?}");
    }
}

#[test]
fn null_source_uses_the_converter_fallback() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone())
        .with_bindings([Binding::new("address.city", "text").converter(ToText)]);
    let person = PersonViewModel::new();
    set_binding_context(&view, person.to_value());

    person.set_address(None);

    assert_eq!(label.get("text"), Value::from(""));
}

#[test]
fn not_hides_the_opposite() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone())
        .with_bindings([Binding::new("is_female", "hidden").converter(Not)]);
    let person = PersonViewModel::new();
    set_binding_context(&view, person.to_value());
    assert_eq!(label.get("hidden"), Value::Bool(false));

    person.set_is_female(false);
    assert_eq!(label.get("hidden"), Value::Bool(true));
}

#[test]
fn constant_ignores_the_source() {
    let label = MockControl::label();
    let view = BoundView::new(label.clone())
        .with_bindings([Binding::new("name", "text").converter(Constant(Value::from("n/a")))]);
    let person = PersonViewModel::new();
    set_binding_context(&view, person.to_value());

    person.set_name("Frank");

    assert_eq!(label.text(), "n/a");
    assert_eq!(label.write_count(), 2);
}

#[test]
fn conversion_error_leaves_destination_unchanged() {
    let errors = ErrorCapture::install();
    let model = Rc::new(Model::new().with("count", 1));
    let label = MockControl::label();
    let view = BoundView::new(label.clone())
        .with_bindings([Binding::new("count", "text").converter(IntText)]);
    set_binding_context(&view, Value::object(model.clone()));
    assert_eq!(label.text(), "1");

    model.set("count", "many");

    assert_eq!(label.text(), "1");
    assert_eq!(label.write_count(), 1);
    assert_eq!(
        errors.errors(),
        vec![BindingError::Conversion {
            converter: "int_text".to_string(),
            path: "count".to_string(),
            source: ConversionError::UnexpectedValue {
                expected: "int",
                found: "text",
            },
        }]
    );

    // later good values still get through
    model.set("count", 2);
    assert_eq!(label.text(), "2");
}

#[test]
fn rejected_destination_write_is_reported() {
    let errors = ErrorCapture::install();
    let label = MockControl::label();
    let view = BoundView::new(label.clone()).with_bindings([Binding::new("name", "title")]);

    set_binding_context(&view, PersonViewModel::new().to_value());

    assert_eq!(label.write_count(), 0);
    assert!(matches!(
        errors.errors().as_slice(),
        [BindingError::Property(PropertyError::Missing { target: "label", .. })]
    ));
}

#[test]
fn converters_are_shared_between_destinations() {
    let first = MockControl::label();
    let second = MockControl::label();
    let binding = Binding::new("age", "text").converter(ToText);
    let person = PersonViewModel::new();

    let views: Vec<BoundView> = [&first, &second]
        .into_iter()
        .map(|control| BoundView::new(control.clone()).with_bindings([binding.clone()]))
        .collect();
    for view in &views {
        set_binding_context(view, person.to_value());
    }

    assert_eq!(first.text(), "22");
    assert_eq!(second.text(), "22");
}
