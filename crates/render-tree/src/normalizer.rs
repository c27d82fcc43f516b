//! Render tree normalizer
//!
//! Turns either the engine's internal tree (live path) or a declarative
//! element (static path) into `RenderNode` snapshots.
//!
//! The live walk is iterative: a work stack of `Step`s and a result stack of
//! `Rendered` values. Every `Visit` leaves exactly one result behind, which
//! is what lets `Collect(n)` and `Finish` pop a fixed number of results.

use crate::arena::{Fiber, FiberArena, FiberId, StateNode};
use crate::element::{Element, ElementType};
use crate::error::{Result, TreeError};
use crate::tags::{FiberKind, FiberTagTable};
use crate::types::{Instance, NodeType, RenderNode, Rendered};
use crate::value::{flatten_values, Props, Value};

/// Node whose children are still being normalized
struct Pending {
    node_type: NodeType,
    ty: ElementType,
    props: Props,
    key: Option<String>,
    fiber: FiberId,
    instance: Option<Instance>,
    /// Children prop to fall back on when no child produced output
    fallback: Option<Value>,
}

enum Step {
    Visit(FiberId),
    /// Sibling chain: empty for none, the single tree for one, a flat list for many
    Children(Option<FiberId>),
    /// Sibling chain, always as a flat list
    List(Option<FiberId>),
    /// Pop `n` results and splice them into one list
    Collect(usize),
    /// Pop the rendered result and wrap it into a node
    Finish(Box<Pending>),
}

/// Normalizer bound to one tag table
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    tags: FiberTagTable,
}

impl Normalizer {
    /// Normalizer reading fiber kinds through `tags`
    pub fn new(tags: FiberTagTable) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &FiberTagTable {
        &self.tags
    }

    /// Normalize the live tree starting at `root`
    ///
    /// Transparent roots (host root, fragments, providers, ...) splice their
    /// children, so the result is not always a single node.
    pub fn normalize_live(&self, arena: &FiberArena, root: FiberId) -> Result<Rendered> {
        let mut work = vec![Step::Visit(root)];
        let mut results: Vec<Rendered> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Visit(fiber_id) => self.visit(arena, fiber_id, &mut work, &mut results)?,
                Step::Children(first) => {
                    let ids = arena.sibling_ids(first)?;
                    match ids.len() {
                        0 => results.push(Rendered::Empty),
                        1 => work.push(Step::Visit(ids[0])),
                        n => {
                            work.push(Step::Collect(n));
                            work.extend(ids.iter().rev().map(|&id| Step::Visit(id)));
                        }
                    }
                }
                Step::List(first) => {
                    let ids = arena.sibling_ids(first)?;
                    if ids.is_empty() {
                        results.push(Rendered::List(Vec::new()));
                    } else {
                        work.push(Step::Collect(ids.len()));
                        work.extend(ids.iter().rev().map(|&id| Step::Visit(id)));
                    }
                }
                Step::Collect(n) => {
                    let items = results.split_off(results.len().saturating_sub(n));
                    results.push(Rendered::List(Rendered::flatten(items)));
                }
                Step::Finish(pending) => {
                    let rendered = results.pop().unwrap_or_default();
                    results.push(Rendered::Node(Box::new(finish(arena, *pending, rendered)?)));
                }
            }
        }

        tracing::trace!("[Normalizer] Live walk from fiber {} done", root);
        Ok(results.pop().unwrap_or_default())
    }

    fn visit(
        &self,
        arena: &FiberArena,
        fiber_id: FiberId,
        work: &mut Vec<Step>,
        results: &mut Vec<Rendered>,
    ) -> Result<()> {
        let fiber = arena.get(fiber_id)?;
        let kind = self
            .tags
            .kind_of(fiber.tag)
            .ok_or(TreeError::UnknownTag(fiber.tag))?;

        let pending = |node_type: NodeType, ty: ElementType, props: Props| Pending {
            node_type,
            ty,
            props,
            key: fiber.key.clone(),
            fiber: fiber_id,
            instance: None,
            fallback: None,
        };

        match kind {
            FiberKind::HostRoot
            | FiberKind::Fragment
            | FiberKind::Mode
            | FiberKind::ContextConsumer
            | FiberKind::ContextProvider
            | FiberKind::Lazy => work.push(Step::Children(fiber.child)),
            FiberKind::Offscreen => match fiber.child {
                Some(child) => work.push(Step::Visit(child)),
                None => results.push(Rendered::Empty),
            },
            FiberKind::HostText => results.push(Rendered::from_value(Some(&fiber.memoized_props))),
            FiberKind::HostPortal => {
                let mut props = Props::new();
                if let Some(StateNode::Portal { container }) = &fiber.state_node {
                    props.insert("containerInfo", container.clone());
                }
                props.insert("children", fiber.memoized_props.clone());
                let node = pending(NodeType::Portal, ElementType::Portal, props);
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::Children(fiber.child));
            }
            FiberKind::ClassComponent => {
                let ty = resolved_type(fiber, fiber_id)?;
                let mut node = pending(NodeType::Class, ty, fiber.props());
                node.instance = instance_of(fiber);
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::Children(fiber.child));
            }
            FiberKind::FunctionComponent => {
                let ty = resolved_type(fiber, fiber_id)?;
                let node = pending(NodeType::Function, ty, fiber.props());
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::Children(fiber.child));
            }
            FiberKind::MemoClass => {
                let inner = match &fiber.element_type {
                    Some(ElementType::Memo(memo)) => memo.inner.clone(),
                    _ => return Err(TreeError::MissingType(fiber_id)),
                };
                let mut node = pending(NodeType::Class, inner, fiber.props());
                node.instance = instance_of(fiber);
                // skip the intermediate fiber the engine inserts under memo classes
                let grandchild = match fiber.child {
                    Some(child) => arena.get(child)?.child,
                    None => None,
                };
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::Children(grandchild));
            }
            FiberKind::MemoSfc => {
                let ty = fiber
                    .element_type
                    .clone()
                    .ok_or(TreeError::MissingType(fiber_id))?;
                let props = fiber.props();
                let mut node = pending(NodeType::Function, ty, props.clone());
                node.fallback = Some(props.children().cloned().unwrap_or_default());
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::List(fiber.child));
            }
            FiberKind::HostComponent => {
                let props = fiber.props();
                let ty = resolved_type(fiber, fiber_id)?;
                let mut node = pending(NodeType::Host, ty, props.clone());
                node.instance = instance_of(fiber);
                node.fallback = Some(props.children().cloned().unwrap_or_default());
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::List(fiber.child));
            }
            FiberKind::ForwardRef | FiberKind::Profiler => {
                let ty = resolved_type(fiber, fiber_id)?;
                let node = pending(NodeType::Function, ty, fiber.pending());
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::Children(fiber.child));
            }
            FiberKind::Suspense => {
                // current children, whichever of primary/fallback is showing
                let node = pending(NodeType::Function, ElementType::Suspense, fiber.props());
                work.push(Step::Finish(Box::new(node)));
                work.push(Step::Children(fiber.child));
            }
        }

        Ok(())
    }

    /// Normalize a declarative element
    pub fn normalize_static(&self, element: &Element) -> Result<RenderNode> {
        element_to_tree(element)
    }

    /// Normalize an arbitrary child payload (element, list, primitive, null)
    pub fn normalize_value(&self, value: &Value) -> Result<Rendered> {
        value_to_tree(value)
    }
}

fn resolved_type(fiber: &Fiber, fiber_id: FiberId) -> Result<ElementType> {
    fiber.ty.clone().ok_or(TreeError::MissingType(fiber_id))
}

fn instance_of(fiber: &Fiber) -> Option<Instance> {
    match &fiber.state_node {
        Some(StateNode::Instance(handle)) => Some(Instance::Component(handle.clone())),
        Some(StateNode::Host(handle)) => Some(Instance::Native(handle.clone())),
        Some(StateNode::Portal { .. }) | None => None,
    }
}

fn finish(arena: &FiberArena, pending: Pending, rendered: Rendered) -> Result<RenderNode> {
    let rendered = match (pending.fallback, rendered) {
        (Some(children), Rendered::List(items)) if items.is_empty() => {
            Rendered::List(vec![Rendered::from_value(Some(&children))])
        }
        (_, rendered) => rendered,
    };

    Ok(RenderNode {
        node_type: pending.node_type,
        ty: pending.ty,
        props: pending.props,
        key: pending.key,
        ref_handle: arena.get(pending.fiber)?.ref_handle.clone(),
        instance: pending.instance,
        rendered,
    })
}

/// Static normalization of one element
pub fn element_to_tree(element: &Element) -> Result<RenderNode> {
    if let ElementType::Portal = element.ty {
        let mut props = Props::new();
        props.insert("children", element.children().cloned().unwrap_or_default());
        if let Some(container) = element.props.get("containerInfo") {
            props.insert("containerInfo", container.clone());
        }
        return Ok(RenderNode {
            node_type: NodeType::Portal,
            ty: ElementType::Portal,
            props,
            key: element.key.clone(),
            ref_handle: element.ref_handle.clone(),
            instance: None,
            rendered: children_to_tree(element.children())?,
        });
    }

    let node_type = element.node_type();
    let children = element.children();

    if node_type == NodeType::Host
        && element.props.contains("dangerouslySetInnerHTML")
        && children.is_some_and(|children| !children.is_null())
    {
        return Err(TreeError::ConflictingChildren);
    }

    Ok(RenderNode {
        node_type,
        ty: element.ty.clone(),
        props: element.props.clone(),
        key: element.key.clone(),
        ref_handle: element.ref_handle.clone(),
        instance: None,
        rendered: children_to_tree(children)?,
    })
}

/// Static normalization of any child payload
pub fn value_to_tree(value: &Value) -> Result<Rendered> {
    match value {
        Value::Null => Ok(Rendered::Empty),
        Value::Element(element) => Ok(Rendered::Node(Box::new(element_to_tree(element)?))),
        Value::List(items) => flatten_values(items)
            .iter()
            .map(value_to_tree)
            .collect::<Result<Vec<_>>>()
            .map(Rendered::List),
        other => Ok(Rendered::Value(other.clone())),
    }
}

fn children_to_tree(children: Option<&Value>) -> Result<Rendered> {
    match children {
        None => Ok(Rendered::Empty),
        Some(children) => value_to_tree(children),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{
        ClassInstance, ComponentClass, ComponentView, FunctionComponent, MountOptions,
    };
    use crate::element::MemoType;
    use crate::types::NativeHandle;
    use std::rc::Rc;

    struct Plain;

    impl crate::component::Component for Plain {
        fn render(&self, _view: &ComponentView<'_>) -> Value {
            Value::Null
        }
    }

    struct Fixture {
        tags: FiberTagTable,
        arena: FiberArena,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                tags: FiberTagTable::default(),
                arena: FiberArena::new(),
            }
        }

        fn fiber(&self, kind: FiberKind) -> Fiber {
            Fiber::new(self.tags.tag_of(kind))
        }

        fn host(&self, tag: &str, props: Props) -> Fiber {
            self.fiber(FiberKind::HostComponent)
                .with_type(ElementType::host(tag))
                .with_props(props)
                .with_state_node(StateNode::Host(NativeHandle::new(tag)))
        }

        fn text(&self, text: &str) -> Fiber {
            Fiber::text(self.tags.tag_of(FiberKind::HostText), text)
        }

        fn normalize(&self, root: FiberId) -> Rendered {
            Normalizer::new(self.tags.clone())
                .normalize_live(&self.arena, root)
                .unwrap()
        }
    }

    #[test]
    fn test_host_text_is_raw_primitive() {
        let mut fx = Fixture::new();
        let span = fx.arena.add(fx.host("span", Props::new()));
        fx.arena.add_child(span, fx.text("hello")).unwrap();

        let rendered = fx.normalize(span);
        let node = rendered.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Host);
        assert_eq!(
            node.rendered,
            Rendered::List(vec![Rendered::Value(Value::from("hello"))])
        );
        assert!(node.instance.as_ref().and_then(Instance::as_native).is_some());
    }

    #[test]
    fn test_transparent_wrappers_splice_children() {
        let mut fx = Fixture::new();
        let root = fx.arena.add(fx.fiber(FiberKind::HostRoot));
        let fragment = fx.arena.add_child(root, fx.fiber(FiberKind::Fragment)).unwrap();
        let provider = fx.arena.add_child(fragment, fx.fiber(FiberKind::ContextProvider)).unwrap();
        fx.arena.add_child(provider, fx.host("a", Props::new())).unwrap();
        fx.arena.add_child(provider, fx.host("b", Props::new())).unwrap();

        let rendered = fx.normalize(root);
        let items = rendered.as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_node().unwrap().display_name(), "a");
        assert_eq!(items[1].as_node().unwrap().display_name(), "b");
    }

    #[test]
    fn test_host_without_child_fibers_falls_back_to_children_prop() {
        let mut fx = Fixture::new();
        let div = fx.arena.add(fx.host("div", Props::new().with("children", "text")));
        let empty = fx.arena.add(fx.host("br", Props::new()));

        let node = fx.normalize(div);
        assert_eq!(
            node.as_node().unwrap().rendered,
            Rendered::List(vec![Rendered::Value(Value::from("text"))])
        );
        let node = fx.normalize(empty);
        assert_eq!(node.as_node().unwrap().rendered, Rendered::List(vec![Rendered::Empty]));
    }

    #[test]
    fn test_class_and_memo_class() {
        let mut fx = Fixture::new();
        let class = Rc::new(ComponentClass::new("Panel", |_| Box::new(Plain)));
        let handle = ClassInstance::mount(
            class.clone(),
            Props::new(),
            Props::new(),
            MountOptions::default(),
        );

        let memo = MemoType::new(ElementType::Class(class.clone())).into_type();
        let memo_fiber = fx.arena.add(
            fx.fiber(FiberKind::MemoClass)
                .with_element_type(memo)
                .with_props(Props::new().with("id", 1))
                .with_state_node(StateNode::Instance(handle.clone())),
        );
        let intermediate = fx
            .arena
            .add_child(
                memo_fiber,
                fx.fiber(FiberKind::ClassComponent).with_type(ElementType::Class(class.clone())),
            )
            .unwrap();
        fx.arena.add_child(intermediate, fx.host("section", Props::new())).unwrap();

        let rendered = fx.normalize(memo_fiber);
        let node = rendered.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Class);
        assert_eq!(node.ty, ElementType::Class(class));
        assert!(Rc::ptr_eq(node.component_instance().unwrap(), &handle));
        // the intermediate fiber does not appear
        assert_eq!(node.rendered.as_node().unwrap().display_name(), "section");
    }

    #[test]
    fn test_memo_sfc_always_renders_a_list() {
        let mut fx = Fixture::new();
        let func =
            ElementType::Function(Rc::new(FunctionComponent::new("Row", |_, _| Value::Null)));
        let memo = MemoType::new(func).into_type();
        let fiber = fx.arena.add(fx.fiber(FiberKind::MemoSfc).with_element_type(memo.clone()));
        fx.arena.add_child(fiber, fx.host("td", Props::new())).unwrap();

        let rendered = fx.normalize(fiber);
        let node = rendered.as_node().unwrap();
        assert_eq!(node.ty, memo);
        assert_eq!(node.display_name(), "Memo(Row)");
        assert_eq!(node.rendered.as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_portal_and_offscreen() {
        let mut fx = Fixture::new();
        let container = NativeHandle::new("body");
        let portal = fx.arena.add(
            fx.fiber(FiberKind::HostPortal)
                .with_memoized_props("inside")
                .with_state_node(StateNode::Portal { container: container.clone() }),
        );
        let offscreen = fx.arena.add_child(portal, fx.fiber(FiberKind::Offscreen)).unwrap();
        fx.arena.add_child(offscreen, fx.text("inside")).unwrap();

        let rendered = fx.normalize(portal);
        let node = rendered.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Portal);
        assert_eq!(node.ty, ElementType::Portal);
        assert_eq!(node.props.get("containerInfo"), Some(&Value::Native(container)));
        assert_eq!(node.props.get("children"), Some(&Value::from("inside")));
        assert_eq!(node.rendered, Rendered::Value(Value::from("inside")));
    }

    #[test]
    fn test_forward_ref_uses_pending_props() {
        let mut fx = Fixture::new();
        let func = Rc::new(FunctionComponent::new("Input", |_, _| Value::Null));
        let fiber = fx.arena.add(
            fx.fiber(FiberKind::ForwardRef)
                .with_type(ElementType::ForwardRef(func))
                .with_memoized_props(Props::new().with("stale", true))
                .with_pending_props(Props::new().with("fresh", true)),
        );

        let rendered = fx.normalize(fiber);
        let node = rendered.as_node().unwrap();
        assert!(node.props.contains("fresh"));
        assert!(!node.props.contains("stale"));
        assert_eq!(node.rendered, Rendered::Empty);
    }

    #[test]
    fn test_unknown_tag_is_fatal() {
        let mut fx = Fixture::new();
        let fiber = fx.arena.add(Fiber::new(99));
        let err = Normalizer::default().normalize_live(&fx.arena, fiber).unwrap_err();
        assert!(matches!(err, TreeError::UnknownTag(99)));
    }

    #[test]
    fn test_renormalizing_is_deterministic() {
        let mut fx = Fixture::new();
        let root = fx.arena.add(fx.host("ul", Props::new()));
        for label in ["a", "b", "c"] {
            let li = fx
                .arena
                .add_child(root, fx.host("li", Props::new().with("children", label)))
                .unwrap();
            fx.arena.add_child(li, fx.text(label)).unwrap();
        }
        assert_eq!(fx.normalize(root), fx.normalize(root));
    }

    #[test]
    fn test_committed_version_is_read() {
        let mut fx = Fixture::new();
        let div = fx.arena.add(fx.host("div", Props::new().with("id", "old")));
        fx.arena.stage(div, fx.host("div", Props::new().with("id", "new"))).unwrap();

        let before = fx.normalize(div);
        assert_eq!(before.as_node().unwrap().props.get("id"), Some(&Value::from("old")));
        fx.arena.commit(div).unwrap();
        let after = fx.normalize(div);
        assert_eq!(after.as_node().unwrap().props.get("id"), Some(&Value::from("new")));
    }

    #[test]
    fn test_suspense_wraps_current_children() {
        let mut fx = Fixture::new();
        let props = Props::new().with("fallback", "loading");
        let suspense = fx.arena.add(fx.fiber(FiberKind::Suspense).with_props(props));
        fx.arena.add_child(suspense, fx.host("p", Props::new())).unwrap();
        let fallback = fx.arena.add(fx.host("span", Props::new()));

        let primary = fx.normalize(suspense);
        let node = primary.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Function);
        assert_eq!(node.ty, ElementType::Suspense);
        assert_eq!(node.rendered.as_node().unwrap().display_name(), "p");

        // next commit shows the fallback subtree instead
        let mut showing_fallback = fx.arena.get(suspense).unwrap().clone();
        showing_fallback.child = Some(fallback);
        fx.arena.stage(suspense, showing_fallback).unwrap();
        fx.arena.commit(suspense).unwrap();

        let suspended = fx.normalize(suspense);
        let node = suspended.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Function);
        assert_eq!(node.ty, ElementType::Suspense);
        assert_eq!(node.props.get("fallback"), Some(&Value::from("loading")));
        assert_eq!(node.rendered.as_node().unwrap().display_name(), "span");
    }

    #[test]
    fn test_mode_lazy_and_consumer_splice_into_parent() {
        let mut fx = Fixture::new();
        let div = fx.arena.add(fx.host("div", Props::new()));
        let mode = fx.arena.add_child(div, fx.fiber(FiberKind::Mode)).unwrap();
        let lazy = fx.arena.add_child(mode, fx.fiber(FiberKind::Lazy)).unwrap();
        let consumer = fx.arena.add_child(mode, fx.fiber(FiberKind::ContextConsumer)).unwrap();
        fx.arena.add_child(lazy, fx.host("a", Props::new())).unwrap();
        fx.arena.add_child(consumer, fx.host("b", Props::new())).unwrap();
        fx.arena.add_child(consumer, fx.host("c", Props::new())).unwrap();

        let rendered = fx.normalize(div);
        let names: Vec<String> = rendered
            .as_node()
            .unwrap()
            .rendered
            .nodes()
            .iter()
            .map(|node| node.display_name())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(rendered.as_node().unwrap().rendered.as_list().unwrap().len(), 3);
    }

    #[test]
    fn test_profiler_uses_pending_props() {
        let mut fx = Fixture::new();
        let profiler = fx.arena.add(
            fx.fiber(FiberKind::Profiler)
                .with_type(ElementType::Profiler)
                .with_memoized_props(Props::new().with("id", "stale"))
                .with_pending_props(Props::new().with("id", "nav")),
        );
        fx.arena.add_child(profiler, fx.host("nav", Props::new())).unwrap();

        let rendered = fx.normalize(profiler);
        let node = rendered.as_node().unwrap();
        assert_eq!(node.node_type, NodeType::Function);
        assert_eq!(node.display_name(), "Profiler");
        assert_eq!(node.props.get("id"), Some(&Value::from("nav")));
        assert_eq!(node.rendered.as_node().unwrap().display_name(), "nav");
    }

    #[test]
    fn test_deep_host_chain_snapshot() {
        const DEPTH: usize = 20_000;
        let mut fx = Fixture::new();
        let root = fx.arena.add(fx.host("div", Props::new()));
        let mut parent = root;
        for _ in 0..DEPTH {
            parent = fx.arena.add_child(parent, fx.host("div", Props::new())).unwrap();
        }
        fx.arena.add_child(parent, fx.text("leaf")).unwrap();

        let first = fx.normalize(root);
        let second = fx.normalize(root);
        assert!(first == second);

        let copy = first.clone();
        assert!(copy == first);

        let mut depth = 0;
        let mut current = first.as_node();
        while let Some(node) = current {
            depth += 1;
            current = node
                .rendered
                .as_list()
                .and_then(|items| items.first())
                .and_then(Rendered::as_node);
        }
        assert_eq!(depth, DEPTH + 1);

        let json = first.as_node().unwrap().to_json().unwrap();
        assert!(json.ends_with(&"]}".repeat(DEPTH + 1)));

        drop(first);
        drop(second);
        drop(copy);
    }

    #[test]
    fn test_deep_fragment_chain_is_spliced() {
        let mut fx = Fixture::new();
        let root = fx.arena.add(fx.host("div", Props::new()));
        let mut parent = root;
        for _ in 0..20_000 {
            parent = fx.arena.add_child(parent, fx.fiber(FiberKind::Fragment)).unwrap();
        }
        fx.arena.add_child(parent, fx.text("leaf")).unwrap();

        let rendered = fx.normalize(root);
        assert_eq!(
            rendered.as_node().unwrap().rendered,
            Rendered::List(vec![Rendered::Value(Value::from("leaf"))])
        );
    }

    #[test]
    fn test_static_element() {
        let item =
            |label: &str| Value::from(Element::new("li", Props::new().with("children", label)));
        let nested = Value::from(vec![item("a"), Value::from(vec![item("b"), Value::Null])]);
        let list = Element::new("ul", Props::new().with("children", nested)).with_key("list");

        let node = Normalizer::default().normalize_static(&list).unwrap();
        assert_eq!(node.key.as_deref(), Some("list"));
        let items = node.rendered.as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_node().unwrap().rendered, Rendered::Value(Value::from("b")));
        assert_eq!(items[2], Rendered::Empty);
    }

    #[test]
    fn test_static_portal_and_key_absent() {
        let container = NativeHandle::new("body");
        let portal = Element::portal("modal", container.clone());
        let node = element_to_tree(&portal).unwrap();
        assert_eq!(node.node_type, NodeType::Portal);
        assert_eq!(node.key, None);
        assert_eq!(node.rendered, Rendered::Value(Value::from("modal")));
        assert_eq!(node.props.keys().collect::<Vec<_>>(), vec!["children", "containerInfo"]);
    }

    #[test]
    fn test_inner_html_with_children_rejected() {
        let el = Element::new(
            "div",
            Props::new()
                .with("dangerouslySetInnerHTML", Props::new().with("__html", "<b/>"))
                .with("children", "text"),
        );
        assert!(matches!(element_to_tree(&el), Err(TreeError::ConflictingChildren)));

        let ok = Element::new(
            "div",
            Props::new().with("dangerouslySetInnerHTML", Props::new().with("__html", "<b/>")),
        );
        assert!(element_to_tree(&ok).is_ok());
    }
}
