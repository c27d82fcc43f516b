//! Core snapshot types
//!
//! Key design principles:
//! 1. A `RenderNode` is a frozen snapshot: no interior mutability reachable
//!    through it except the live instance it points at
//! 2. `Rendered` never nests lists; flattening happens at construction
//! 3. Keys are `Option<String>`, so an absent key cannot leak as `"null"`

use crate::component::InstanceHandle;
use crate::element::ElementType;
use crate::value::{Props, Value};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Semantic role of a normalized node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Class,
    Function,
    Host,
    Text,
    Portal,
}

impl NodeType {
    /// Role implied by an element type
    pub fn of(ty: &ElementType) -> Self {
        match ty {
            ElementType::Host(_) => NodeType::Host,
            ElementType::Class(_) => NodeType::Class,
            ElementType::Portal => NodeType::Portal,
            _ => NodeType::Function,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Class => "class",
            NodeType::Function => "function",
            NodeType::Host => "host",
            NodeType::Text => "text",
            NodeType::Portal => "portal",
        }
    }
}

/// Platform-native node produced by the host engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeHandle {
    id: Uuid,
    tag: Rc<str>,
}

impl NativeHandle {
    pub fn new(tag: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            tag: Rc::from(tag),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Serialize for NativeHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("[{}]", self.tag))
    }
}

/// Live object a node owns: a class instance or a native node
#[derive(Clone)]
pub enum Instance {
    Component(InstanceHandle),
    Native(NativeHandle),
}

impl Instance {
    pub fn as_component(&self) -> Option<&InstanceHandle> {
        match self {
            Instance::Component(handle) => Some(handle),
            Instance::Native(_) => None,
        }
    }

    pub fn as_native(&self) -> Option<&NativeHandle> {
        match self {
            Instance::Native(handle) => Some(handle),
            Instance::Component(_) => None,
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Instance::Component(a), Instance::Component(b)) => Rc::ptr_eq(a, b),
            (Instance::Native(a), Instance::Native(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instance::Component(handle) => match handle.try_borrow() {
                Ok(instance) => write!(f, "Component({})", instance.class().display_name()),
                Err(_) => f.write_str("Component(<rendering>)"),
            },
            Instance::Native(handle) => write!(f, "Native({})", handle.tag()),
        }
    }
}

/// Caller-owned attachment point for a ref
pub type RefTarget = Rc<RefCell<Option<Instance>>>;

/// Non-owning back-reference to a `RefTarget`
#[derive(Debug, Clone)]
pub struct RefHandle(Weak<RefCell<Option<Instance>>>);

impl RefHandle {
    pub fn new(target: &RefTarget) -> Self {
        Self(Rc::downgrade(target))
    }

    /// The attachment point, if the caller still holds it
    pub fn target(&self) -> Option<RefTarget> {
        self.0.upgrade()
    }

    /// Store `instance` in the attachment point. Returns false when the
    /// caller has already dropped it.
    pub fn attach(&self, instance: Instance) -> bool {
        match self.0.upgrade() {
            Some(target) => {
                *target.borrow_mut() = Some(instance);
                true
            }
            None => false,
        }
    }
}

impl PartialEq for RefHandle {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

/// Child payload of a `RenderNode`
///
/// Snapshots can be as deep as the tree they came from, so cloning,
/// comparing and dropping them use explicit stacks.
#[derive(Debug, Default)]
pub enum Rendered {
    #[default]
    Empty,
    /// Raw primitive (rendered text, numbers, ...)
    Value(Value),
    Node(Box<RenderNode>),
    /// Ordered siblings. Items are never `List`.
    List(Vec<Rendered>),
}

impl Rendered {
    /// Splice nested lists into a single flat sequence (iterative, any depth)
    pub fn flatten(items: Vec<Rendered>) -> Vec<Rendered> {
        let mut out = Vec::with_capacity(items.len());
        let mut stack = vec![items.into_iter()];

        loop {
            let next = match stack.last_mut() {
                Some(iter) => iter.next(),
                None => break,
            };
            match next {
                Some(Rendered::List(inner)) => stack.push(inner.into_iter()),
                Some(item) => out.push(item),
                None => {
                    stack.pop();
                }
            }
        }

        out
    }

    /// Primitive child value: null becomes `Empty`
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Rendered::Empty,
            Some(value) => Rendered::Value(value.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Rendered::Empty)
    }

    pub fn as_node(&self) -> Option<&RenderNode> {
        match self {
            Rendered::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Rendered]> {
        match self {
            Rendered::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Rendered::Value(value) => Some(value),
            _ => None,
        }
    }

    /// `Text` for primitives, the node's role for nodes
    pub fn node_type(&self) -> Option<NodeType> {
        match self {
            Rendered::Value(_) => Some(NodeType::Text),
            Rendered::Node(node) => Some(node.node_type),
            Rendered::Empty | Rendered::List(_) => None,
        }
    }

    /// Direct child nodes, skipping primitives and empty slots
    pub fn nodes(&self) -> Vec<&RenderNode> {
        match self {
            Rendered::Node(node) => vec![node.as_ref()],
            Rendered::List(items) => items.iter().filter_map(Rendered::as_node).collect(),
            Rendered::Empty | Rendered::Value(_) => Vec::new(),
        }
    }
}

impl Clone for Rendered {
    fn clone(&self) -> Self {
        enum Step<'a> {
            Visit(&'a Rendered),
            /// Pop the cloned payload and wrap it into a copy of this node
            Node(&'a RenderNode),
            List(usize),
        }

        let mut work = vec![Step::Visit(self)];
        let mut results: Vec<Rendered> = Vec::new();

        while let Some(step) = work.pop() {
            match step {
                Step::Visit(Rendered::Empty) => results.push(Rendered::Empty),
                Step::Visit(Rendered::Value(value)) => results.push(Rendered::Value(value.clone())),
                Step::Visit(Rendered::Node(node)) => {
                    work.push(Step::Node(node));
                    work.push(Step::Visit(&node.rendered));
                }
                Step::Visit(Rendered::List(items)) => {
                    work.push(Step::List(items.len()));
                    work.extend(items.iter().rev().map(Step::Visit));
                }
                Step::Node(node) => {
                    let rendered = results.pop().unwrap_or_default();
                    results.push(Rendered::Node(Box::new(node.with_rendered(rendered))));
                }
                Step::List(n) => {
                    let items = results.split_off(results.len().saturating_sub(n));
                    results.push(Rendered::List(items));
                }
            }
        }

        results.pop().unwrap_or_default()
    }
}

impl PartialEq for Rendered {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];

        while let Some((a, b)) = stack.pop() {
            match (a, b) {
                (Rendered::Empty, Rendered::Empty) => {}
                (Rendered::Value(a), Rendered::Value(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Rendered::Node(a), Rendered::Node(b)) => {
                    if !a.same_shell(b) {
                        return false;
                    }
                    stack.push((&a.rendered, &b.rendered));
                }
                (Rendered::List(a), Rendered::List(b)) => {
                    if a.len() != b.len() {
                        return false;
                    }
                    stack.extend(a.iter().zip(b.iter()));
                }
                _ => return false,
            }
        }

        true
    }
}

impl Serialize for Rendered {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rendered::Empty => serializer.serialize_unit(),
            Rendered::Value(value) => value.serialize(serializer),
            Rendered::Node(node) => node.serialize(serializer),
            Rendered::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

/// Uniform snapshot of one node of a rendered hierarchy
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub node_type: NodeType,
    #[serde(rename = "type")]
    pub ty: ElementType,
    pub props: Props,
    pub key: Option<String>,
    #[serde(skip)]
    pub ref_handle: Option<RefHandle>,
    #[serde(skip)]
    pub instance: Option<Instance>,
    pub rendered: Rendered,
}

impl RenderNode {
    pub fn display_name(&self) -> String {
        self.ty.display_name()
    }

    pub fn component_instance(&self) -> Option<&InstanceHandle> {
        self.instance.as_ref().and_then(Instance::as_component)
    }

    /// Compact JSON dump, for debugging and snapshot assertions. Same shape
    /// as the `Serialize` impl, written without recursing into `rendered`.
    pub fn to_json(&self) -> crate::Result<String> {
        enum Piece<'a> {
            Node(&'a RenderNode),
            Rendered(&'a Rendered),
            Text(&'static str),
        }

        let mut out = String::new();
        let mut work = vec![Piece::Node(self)];

        while let Some(piece) = work.pop() {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Node(node) => {
                    out.push_str("{\"nodeType\":");
                    out.push_str(&serde_json::to_string(&node.node_type)?);
                    out.push_str(",\"type\":");
                    out.push_str(&serde_json::to_string(&node.ty)?);
                    out.push_str(",\"props\":");
                    out.push_str(&serde_json::to_string(&node.props)?);
                    out.push_str(",\"key\":");
                    out.push_str(&serde_json::to_string(&node.key)?);
                    out.push_str(",\"rendered\":");
                    work.push(Piece::Text("}"));
                    work.push(Piece::Rendered(&node.rendered));
                }
                Piece::Rendered(Rendered::Node(node)) => work.push(Piece::Node(node)),
                Piece::Rendered(Rendered::List(items)) => {
                    out.push('[');
                    work.push(Piece::Text("]"));
                    for (i, item) in items.iter().enumerate().rev() {
                        work.push(Piece::Rendered(item));
                        if i > 0 {
                            work.push(Piece::Text(","));
                        }
                    }
                }
                Piece::Rendered(leaf) => out.push_str(&serde_json::to_string(leaf)?),
            }
        }

        Ok(out)
    }

    /// Copy of everything but `rendered`
    fn with_rendered(&self, rendered: Rendered) -> RenderNode {
        RenderNode {
            node_type: self.node_type,
            ty: self.ty.clone(),
            props: self.props.clone(),
            key: self.key.clone(),
            ref_handle: self.ref_handle.clone(),
            instance: self.instance.clone(),
            rendered,
        }
    }

    /// Equality of everything but `rendered`
    fn same_shell(&self, other: &RenderNode) -> bool {
        self.node_type == other.node_type
            && self.ty == other.ty
            && self.props == other.props
            && self.key == other.key
            && self.ref_handle == other.ref_handle
            && self.instance == other.instance
    }
}

impl Clone for RenderNode {
    fn clone(&self) -> Self {
        self.with_rendered(self.rendered.clone())
    }
}

impl PartialEq for RenderNode {
    fn eq(&self, other: &Self) -> bool {
        self.same_shell(other) && self.rendered == other.rendered
    }
}

impl Drop for RenderNode {
    fn drop(&mut self) {
        // detach descendants onto the heap so each node drops with an empty payload
        let mut stack = match std::mem::take(&mut self.rendered) {
            Rendered::Empty | Rendered::Value(_) => return,
            rendered => vec![rendered],
        };

        while let Some(rendered) = stack.pop() {
            match rendered {
                Rendered::Node(mut node) => stack.push(std::mem::take(&mut node.rendered)),
                Rendered::List(items) => stack.extend(items),
                Rendered::Empty | Rendered::Value(_) => {}
            }
        }
    }
}
