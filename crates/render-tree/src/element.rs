//! Declarative elements and element types
//!
//! An `Element` is the `{type, props, key, ref}` value a component returns.
//! `ElementType` is a closed enum: the dispatch every walker does on "what kind
//! of thing is this" becomes an exhaustive match instead of runtime probing.
//! Component identity is pointer identity of the shared definition.

use crate::component::{Comparator, ComponentClass, FunctionComponent};
use crate::types::{NativeHandle, NodeType, RefHandle, RenderNode};
use crate::value::{Props, Value};
use serde::{Serialize, Serializer};
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Context object shared by a provider/consumer pair
#[derive(Debug)]
pub struct Context {
    id: Uuid,
    display_name: Option<String>,
    default_value: Value,
}

impl Context {
    pub fn new(default_value: impl Into<Value>) -> Rc<Self> {
        Rc::new(Self {
            id: Uuid::new_v4(),
            display_name: None,
            default_value: default_value.into(),
        })
    }

    pub fn named(name: &str, default_value: impl Into<Value>) -> Rc<Self> {
        Rc::new(Self {
            id: Uuid::new_v4(),
            display_name: Some(name.to_string()),
            default_value: default_value.into(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Value seen by a consumer with no provider above it
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn provider(self: &Rc<Self>) -> ElementType {
        ElementType::Provider(Rc::clone(self))
    }

    pub fn consumer(self: &Rc<Self>) -> ElementType {
        ElementType::Consumer(Rc::downgrade(self))
    }
}

/// `memo(inner, compare)`
pub struct MemoType {
    pub inner: ElementType,
    /// Returns true when the two prop sets are equal. `None` means shallow equality.
    pub compare: Option<Comparator>,
    pub display_name: Option<String>,
}

impl MemoType {
    pub fn new(inner: ElementType) -> Self {
        Self {
            inner,
            compare: None,
            display_name: None,
        }
    }

    pub fn with_compare(mut self, compare: impl Fn(&Props, &Props) -> bool + 'static) -> Self {
        self.compare = Some(Rc::new(compare));
        self
    }

    pub fn into_type(self) -> ElementType {
        ElementType::Memo(Rc::new(self))
    }
}

/// `lazy(loader)`; only its identity matters here
#[derive(Debug, Default)]
pub struct LazyType {
    pub display_name: Option<String>,
}

/// What an element renders
#[derive(Clone)]
pub enum ElementType {
    /// Platform element, by tag name
    Host(Rc<str>),
    Class(Rc<ComponentClass>),
    Function(Rc<FunctionComponent>),
    ForwardRef(Rc<FunctionComponent>),
    Memo(Rc<MemoType>),
    Provider(Rc<Context>),
    /// Consumers link back to their context without owning it
    Consumer(Weak<Context>),
    Lazy(Rc<LazyType>),
    Fragment,
    StrictMode,
    Profiler,
    Suspense,
    Portal,
}

impl ElementType {
    pub fn host(tag: &str) -> Self {
        ElementType::Host(Rc::from(tag))
    }

    pub fn lazy() -> Self {
        ElementType::Lazy(Rc::new(LazyType::default()))
    }

    pub fn is_host(&self) -> bool {
        matches!(self, ElementType::Host(_))
    }

    pub fn is_stateful(&self) -> bool {
        matches!(self, ElementType::Class(_))
    }

    /// The wrapped type for memo types, `self` otherwise
    pub fn unmemo(&self) -> &ElementType {
        match self {
            ElementType::Memo(memo) => &memo.inner,
            other => other,
        }
    }

    /// Types that run user logic (or stand in for it) when rendered
    pub fn is_custom_component(&self) -> bool {
        matches!(
            self,
            ElementType::Class(_)
                | ElementType::Function(_)
                | ElementType::ForwardRef(_)
                | ElementType::Provider(_)
                | ElementType::Consumer(_)
                | ElementType::Suspense
        )
    }

    pub fn default_props(&self) -> Option<&Props> {
        match self {
            ElementType::Class(class) => class.default_props.as_ref(),
            ElementType::Function(func) | ElementType::ForwardRef(func) => {
                func.default_props.as_ref()
            }
            _ => None,
        }
    }

    /// Legacy context keys this type reads
    pub fn context_types(&self) -> Option<&[String]> {
        match self {
            ElementType::Class(class) => class.context_types.as_deref(),
            ElementType::Function(func) => func.context_types.as_deref(),
            _ => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            ElementType::Host(tag) => tag.to_string(),
            ElementType::Class(class) => class.display_name(),
            ElementType::Function(func) => func.display_name(),
            ElementType::ForwardRef(func) => match &func.display_name {
                Some(name) => name.clone(),
                None if !func.name.is_empty() => format!("ForwardRef({})", func.name),
                None => "ForwardRef".to_string(),
            },
            ElementType::Memo(memo) => match &memo.display_name {
                Some(name) => name.clone(),
                None => format!("Memo({})", memo.inner.display_name()),
            },
            ElementType::Provider(_) => "ContextProvider".to_string(),
            ElementType::Consumer(_) => "ContextConsumer".to_string(),
            ElementType::Lazy(_) => "lazy".to_string(),
            ElementType::Fragment => "Fragment".to_string(),
            ElementType::StrictMode => "StrictMode".to_string(),
            ElementType::Profiler => "Profiler".to_string(),
            ElementType::Suspense => "Suspense".to_string(),
            ElementType::Portal => "Portal".to_string(),
        }
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        use ElementType::*;
        match (self, other) {
            (Host(a), Host(b)) => a == b,
            (Class(a), Class(b)) => Rc::ptr_eq(a, b),
            (Function(a), Function(b)) | (ForwardRef(a), ForwardRef(b)) => Rc::ptr_eq(a, b),
            (Memo(a), Memo(b)) => Rc::ptr_eq(a, b),
            (Provider(a), Provider(b)) => Rc::ptr_eq(a, b),
            (Consumer(a), Consumer(b)) => Weak::ptr_eq(a, b),
            (Lazy(a), Lazy(b)) => Rc::ptr_eq(a, b),
            (Fragment, Fragment)
            | (StrictMode, StrictMode)
            | (Profiler, Profiler)
            | (Suspense, Suspense)
            | (Portal, Portal) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl Serialize for ElementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display_name())
    }
}

impl From<ComponentClass> for ElementType {
    fn from(class: ComponentClass) -> Self {
        ElementType::Class(Rc::new(class))
    }
}

impl From<FunctionComponent> for ElementType {
    fn from(func: FunctionComponent) -> Self {
        ElementType::Function(Rc::new(func))
    }
}

impl From<MemoType> for ElementType {
    fn from(memo: MemoType) -> Self {
        memo.into_type()
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::host(tag)
    }
}

/// `{type, props, key, ref}`
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub ty: ElementType,
    pub props: Props,
    pub key: Option<String>,
    pub ref_handle: Option<RefHandle>,
}

impl Element {
    pub fn new(ty: impl Into<ElementType>, props: Props) -> Self {
        Self {
            ty: ty.into(),
            props,
            key: None,
            ref_handle: None,
        }
    }

    /// Portal element: renders `children` into `container`
    pub fn portal(children: impl Into<Value>, container: NativeHandle) -> Self {
        let props = Props::new()
            .with("children", children)
            .with("containerInfo", container);
        Self::new(ElementType::Portal, props)
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_ref(mut self, ref_handle: RefHandle) -> Self {
        self.ref_handle = Some(ref_handle);
        self
    }

    pub fn with_children(mut self, children: impl Into<Value>) -> Self {
        self.props.insert("children", children);
        self
    }

    /// Same element (same props identity) with a different type
    pub fn with_type(&self, ty: ElementType) -> Self {
        Self {
            ty,
            props: self.props.clone(),
            key: self.key.clone(),
            ref_handle: self.ref_handle.clone(),
        }
    }

    pub fn children(&self) -> Option<&Value> {
        self.props.children()
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::of(&self.ty)
    }
}

/// Compare a node's type with `ty`, looking through memo wrappers on both sides
pub fn matches_element_type(node: &RenderNode, ty: &ElementType) -> bool {
    node.ty.unmemo() == ty.unmemo()
}

/// Rebuild the element a snapshot node was rendered from
pub fn node_to_element(node: &RenderNode) -> Element {
    Element {
        ty: node.ty.unmemo().clone(),
        props: node.props.clone(),
        key: node.key.clone(),
        ref_handle: node.ref_handle.clone(),
    }
}
