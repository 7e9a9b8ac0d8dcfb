//! Integration tests for delite.
//!
//! These tests exercise the public API from outside the crate: templates,
//! registration and upgrade, event dispatch and the activation tracker,
//! driven through the testing harness.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

use delite::activation::{TrackerEvent, Trigger};
use delite::dom::Mutation;
use delite::template::expr::{parse_expression, EmptyScope};
use delite::template::{compile_text, TemplateError};
use delite::testing::Harness;
use delite::{Capability, Error, RegisterError, Value};

fn button() -> Capability {
    Capability::new("Button")
        .property("label", "")
        .property("iconClass", "")
        .property("other", 0)
        .template(r#"<button class="d-reset {{iconClass}}">{{label}}</button>"#)
}

fn pane() -> Capability {
    Capability::new("Pane").property("disabled", false)
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

#[test]
fn test_repeated_placeholders_share_a_dependency() {
    let mut h = Harness::new();
    assert_ok!(h.register(
        "d-pair",
        &[Capability::html_element()],
        Capability::new("Pair")
            .property("a", "x")
            .property("b", "y")
            .template("<d-pair>{{a}}-{{a}}-{{b}}</d-pair>"),
    ));
    let node = h.create("d-pair").unwrap();
    assert_eq!(h.doc.text_content(node), "x-x-y");

    let definition = h.registry.definition("d-pair").unwrap();
    let compiled = h.registry.template(&definition).unwrap().unwrap();
    assert_eq!(compiled.dependencies, vec!["a", "b"]);
}

#[test]
fn test_literal_escapes_survive_source_round_trip() {
    let original = "quote ' backslash \\ newline \n tab \t";
    let binding = compile_text(original, false).unwrap();
    let reparsed = parse_expression(&binding.expression.to_string()).unwrap();
    assert_eq!(reparsed.evaluate(&EmptyScope), Value::from(original));
}

#[test]
fn test_undefined_renders_empty_in_text() {
    let mut h = Harness::new();
    assert_ok!(h.register(
        "d-maybe",
        &[Capability::html_element()],
        Capability::new("Maybe").template("<d-maybe>[{{missing}}]</d-maybe>"),
    ));
    let node = h.create("d-maybe").unwrap();
    assert_eq!(h.doc.text_content(node), "[]");
}

// ---------------------------------------------------------------------------
// Refresh
// ---------------------------------------------------------------------------

#[test]
fn test_unrelated_change_touches_nothing() {
    let mut h = Harness::new();
    h.register("d-button", &[Capability::html_element()], button())
        .unwrap();
    let node = h.create("d-button").unwrap();
    h.set(node, "other", 1);

    h.record();
    assert_eq!(h.tick().unwrap(), 1);
    assert_eq!(h.mutations(), Vec::<Mutation>::new());
}

#[test]
fn test_button_template_end_to_end() {
    let mut h = Harness::new();
    let factory = h
        .register("d-button", &[Capability::html_element()], button())
        .unwrap();
    let body = h.body();
    let node = {
        let mut ctx = h.ctx();
        let node = factory
            .create(&mut ctx, &[("label", Value::from("OK"))], None)
            .unwrap();
        ctx.insert(body, node).unwrap();
        node
    };
    h.tick().unwrap();
    insta::assert_snapshot!(h.html(node), @r#"<d-button class="d-reset">OK</d-button>"#);

    h.set(node, "iconClass", "icon-save");
    h.set(node, "label", "Save");
    h.tick().unwrap();
    insta::assert_snapshot!(h.html(node), @r#"<d-button class="d-reset icon-save">Save</d-button>"#);

    h.set(node, "iconClass", "");
    h.tick().unwrap();
    insta::assert_snapshot!(h.html(node), @r#"<d-button class="d-reset">Save</d-button>"#);

    // A label change rewrites text only; the class list is left alone.
    h.set(node, "label", "Stop");
    h.record();
    h.tick().unwrap();
    let mutations = h.mutations();
    assert!(!mutations.is_empty());
    assert!(mutations.iter().all(|m| matches!(m, Mutation::Text { .. })));
}

// ---------------------------------------------------------------------------
// Registration and upgrade
// ---------------------------------------------------------------------------

#[test]
fn test_duplicate_registration_fails() {
    let h = Harness::new();
    h.register("d-button", &[Capability::html_element()], button())
        .unwrap();
    let err = assert_err!(h.register(
        "d-button",
        &[Capability::html_element()],
        Capability::new("Other").property("extra", 1),
    ));
    assert_eq!(
        err,
        RegisterError::DuplicateRegistration {
            tag: "d-button".into()
        }
    );
    let definition = h.registry.definition("d-button").unwrap();
    assert!(definition.observes("label"));
    assert!(!definition.observes("extra"));
}

#[test]
fn test_declarative_attributes_and_method_handlers() {
    let mut h = Harness::new();
    h.register(
        "d-counter",
        &[Capability::html_element()],
        Capability::new("Counter")
            .property("count", 0)
            .method("bump", |ctx, node, _event| {
                let next = ctx.get(node, "count").to_number() + 1.0;
                ctx.set(node, "count", next);
                Ok(())
            })
            .template("<d-counter>{{count}}</d-counter>"),
    )
    .unwrap();
    let root = h
        .mount(r#"<div><d-counter count="5" on-click="bump"></d-counter></div>"#)
        .unwrap();
    let counter = h.doc.children(root)[0];
    assert_eq!(h.get(counter, "count"), Value::from(5));
    assert_eq!(h.doc.attribute(counter, "count"), None);

    h.click(counter);
    h.tick().unwrap();
    assert_eq!(h.doc.text_content(counter), "6");
}

#[test]
fn test_bad_attribute_value_is_reported() {
    let mut h = Harness::new();
    h.register(
        "d-config",
        &[Capability::html_element()],
        Capability::new("Config").typed_property("options", delite::ValueKind::Object, Value::Null),
    )
    .unwrap();
    let err = h
        .mount(r#"<d-config options="a: ("></d-config>"#)
        .unwrap_err();
    assert!(matches!(err, Error::Widget(_)), "{err}");
}

#[test]
fn test_template_errors_surface_on_creation() {
    let mut h = Harness::new();
    h.register(
        "d-broken",
        &[Capability::html_element()],
        Capability::new("Broken").template("<d-broken>{{ }}</d-broken>"),
    )
    .unwrap();
    let err = h.create("d-broken").unwrap_err();
    assert!(matches!(
        err,
        Error::Template(TemplateError::InvalidPlaceholder { .. })
    ));
}

// ---------------------------------------------------------------------------
// Activation
// ---------------------------------------------------------------------------

/// `<div><a><b><c><input></c></b></a><d><input></d></div>`, every letter a pane.
fn nested_panes(h: &mut Harness) -> [delite::NodeId; 6] {
    h.register("d-pane", &[Capability::html_element()], pane())
        .unwrap();
    h.mount(
        r#"<div><d-pane id="a"><d-pane id="b"><d-pane id="c"><input id="ci"></d-pane></d-pane></d-pane><d-pane id="d"><input id="di"></d-pane></div>"#,
    )
    .unwrap();
    let find = |id: &str| h.doc.get_element_by_id(id).unwrap();
    [find("a"), find("b"), find("c"), find("d"), find("ci"), find("di")]
}

#[test]
fn test_focusing_same_target_twice_changes_once() {
    let mut h = Harness::new();
    let [_, _, _, _, ci, _] = nested_panes(&mut h);
    let mut rx = h.tracker.subscribe();

    h.focus(ci);
    h.focus(ci);

    let mut changes = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, TrackerEvent::StackChanged { .. }) {
            changes += 1;
        }
    }
    assert_eq!(changes, 1);
}

#[test]
fn test_focus_moving_to_sibling_tree() {
    let mut h = Harness::new();
    let [a, b, c, d, ci, di] = nested_panes(&mut h);
    h.focus(ci);
    assert_eq!(h.tracker.active_stack(), &[a, b, c]);

    let mut rx = h.tracker.subscribe();
    h.focus(di);
    let focus = Some(Trigger::Focus);
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(
        events,
        vec![
            TrackerEvent::Deactivated { widget: c, trigger: focus },
            TrackerEvent::Deactivated { widget: b, trigger: focus },
            TrackerEvent::Deactivated { widget: a, trigger: focus },
            TrackerEvent::Activated { widget: d, trigger: focus },
            TrackerEvent::StackChanged { stack: vec![d] },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_blur_debounce_window() {
    let mut h = Harness::new();
    let [a, b, c, _, ci, _] = nested_panes(&mut h);

    h.focus(ci);
    tokio::time::advance(Duration::from_millis(40)).await;
    h.blur(ci);
    h.settle().await.unwrap();
    assert_eq!(h.tracker.active_stack(), &[a, b, c]);

    tokio::time::advance(Duration::from_millis(200)).await;
    h.blur(ci);
    assert_eq!(h.tracker.active_stack(), &[a, b, c]);
    h.settle().await.unwrap();
    assert!(h.tracker.active_stack().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_pointer_down_after_blur_keeps_stack() {
    let mut h = Harness::new();
    let [_, _, _, d, ci, di] = nested_panes(&mut h);

    h.focus(ci);
    tokio::time::advance(Duration::from_millis(500)).await;
    h.blur(ci);
    assert!(h.tracker.has_pending_clear());
    h.click(di);
    assert!(!h.tracker.has_pending_clear());
    h.settle().await.unwrap();
    assert_eq!(h.tracker.active_stack(), &[d]);
}

#[test]
fn test_activation_events_reach_widgets() {
    let mut h = Harness::new();
    let [a, _, _, d, ci, di] = nested_panes(&mut h);
    let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    for (node, kind) in [(a, "delite-activated"), (a, "delite-deactivated"), (d, "delite-activated")] {
        let log = std::rc::Rc::clone(&log);
        h.ctx().on(node, kind, move |ctx, event| {
            let id = ctx.doc.attribute(event.current_target.unwrap(), "id").unwrap_or("?").to_owned();
            log.borrow_mut().push(format!("{} {} by={}", event.event_type, id, event.detail.member("by")));
            Ok(())
        });
    }

    h.focus(ci);
    h.click(di);
    assert_eq!(
        *log.borrow(),
        vec![
            "delite-activated a by=undefined",
            "delite-deactivated a by=mouse",
            "delite-activated d by=mouse",
        ]
    );
}

#[test]
fn test_handler_errors_become_error_events() {
    let mut h = Harness::new();
    let [a, _, c, _, _, _] = nested_panes(&mut h);
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    h.ctx().on(c, "poke", |_, _| Err(Error::msg("poke failed")));
    {
        let seen = std::rc::Rc::clone(&seen);
        h.ctx().on(a, "error", move |_, event| {
            seen.borrow_mut().push(event.detail.member("message"));
            Ok(())
        });
    }
    h.ctx().emit(c, "poke", Value::Undefined);
    assert_eq!(*seen.borrow(), vec![Value::from("poke failed")]);
}

#[test]
fn test_destroy_detaches_and_reports_lifecycle() {
    let mut h = Harness::new();
    let [a, b, c, _, _, _] = nested_panes(&mut h);
    h.doc.lifecycle.pending_events();
    h.ctx().destroy(a).unwrap();
    assert_eq!(h.doc.parent(a), None);
    for node in [a, b, c] {
        assert!(h.doc.widget(node).unwrap().destroyed);
        assert!(!h.doc.lifecycle.is_live(node));
    }
}
