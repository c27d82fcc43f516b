//! Suspense rewrite
//!
//! Shallow rendering cannot resolve lazy components. A `Suspense` element is
//! swapped for a stand-in function that renders the same `Suspense` element
//! again, optionally with every lazy child replaced by the fallback.

use render_tree::{Element, ElementType, FunctionComponent, Props, Value};
use std::rc::Rc;

/// Replace every lazy element under `node` with `fallback`
pub fn replace_lazy_with_fallback(node: &Value, fallback: &Value) -> Value {
    match node {
        Value::Null => Value::Null,
        Value::List(items) => Value::from(
            items
                .iter()
                .map(|item| replace_lazy_with_fallback(item, fallback))
                .collect::<Vec<_>>(),
        ),
        Value::Element(element) => match element.ty {
            ElementType::Lazy(_) => fallback.clone(),
            _ => match element.children() {
                Some(children) => {
                    let children = replace_lazy_with_fallback(children, fallback);
                    let mut element = Element::clone(element);
                    element.props.insert("children", children);
                    Value::from(element)
                }
                None => node.clone(),
            },
        },
        other => other.clone(),
    }
}

/// `el` unchanged unless it is a `Suspense` element; then a stand-in
/// element whose render output is that `Suspense` element with its
/// (possibly rewritten) children
pub fn check_is_suspense_and_clone_element(el: &Element, suspense_fallback: bool) -> Element {
    if el.ty != ElementType::Suspense {
        return el.clone();
    }

    let mut children = el.children().cloned().unwrap_or_default();
    if suspense_fallback {
        let fallback = el.props.get("fallback").cloned().unwrap_or_default();
        children = replace_lazy_with_fallback(&children, &fallback);
    }

    let suspense_props = el.props.clone();
    let wrapper_children = children.clone();
    let wrapper = FunctionComponent::new("FakeSuspenseWrapper", move |props, _| {
        let mut merged = suspense_props.merge(props);
        merged.insert("children", wrapper_children.clone());
        Value::from(Element::new(ElementType::Suspense, merged))
    });

    Element::new(
        ElementType::Function(Rc::new(wrapper)),
        Props::new().with("children", children),
    )
}
