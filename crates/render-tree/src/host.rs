//! Host node resolution
//!
//! Maps a snapshot node to the platform-native node(s) it stands for.
//! Function components own no instance, so the walk descends through their
//! output until it meets a node that does.

use crate::types::{Instance, NativeHandle, RenderNode, Rendered};

/// Result of resolving a node to native nodes
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostNodes {
    /// Nothing rendered (null output or a bare primitive)
    #[default]
    None,
    One(NativeHandle),
    /// Fragment-style output, one entry per item (`None` for items without one)
    Many(Vec<Option<NativeHandle>>),
}

impl HostNodes {
    /// First native node, if any
    pub fn first(&self) -> Option<&NativeHandle> {
        match self {
            HostNodes::None => None,
            HostNodes::One(handle) => Some(handle),
            HostNodes::Many(handles) => handles.iter().flatten().next(),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, HostNodes::None)
    }
}

/// Resolves snapshot nodes to the native nodes behind them
#[derive(Debug, Default, Clone, Copy)]
pub struct HostNodeResolver;

impl HostNodeResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Native node(s) `node` stands for
    pub fn resolve(&self, node: &RenderNode) -> HostNodes {
        let mut current = node;

        while current.instance.is_none() {
            match &current.rendered {
                Rendered::Node(next) => current = next,
                Rendered::List(items) => {
                    return HostNodes::Many(items.iter().map(map_item).collect())
                }
                Rendered::Empty | Rendered::Value(_) => return HostNodes::None,
            }
        }

        match &current.rendered {
            Rendered::List(items) if current.node_type == crate::types::NodeType::Class => {
                HostNodes::Many(items.iter().map(map_item).collect())
            }
            _ => match find_native(current) {
                Some(handle) => HostNodes::One(handle),
                None => HostNodes::None,
            },
        }
    }

    /// Exactly one native node: the first one found
    pub fn resolve_first(&self, node: &RenderNode) -> Option<NativeHandle> {
        self.resolve(node).first().cloned()
    }
}

fn map_item(item: &Rendered) -> Option<NativeHandle> {
    item.as_node().and_then(find_native)
}

/// Native node behind a node's instance: the handle itself for host nodes,
/// the first host node in the rendered output for class instances
fn find_native(node: &RenderNode) -> Option<NativeHandle> {
    match node.instance.as_ref()? {
        Instance::Native(handle) => Some(handle.clone()),
        Instance::Component(_) => first_native_below(&node.rendered),
    }
}

fn first_native_below(rendered: &Rendered) -> Option<NativeHandle> {
    let mut stack = vec![rendered];

    while let Some(rendered) = stack.pop() {
        match rendered {
            Rendered::Node(node) => {
                if let Some(Instance::Native(handle)) = &node.instance {
                    return Some(handle.clone());
                }
                stack.push(&node.rendered);
            }
            Rendered::List(items) => stack.extend(items.iter().rev()),
            Rendered::Empty | Rendered::Value(_) => {}
        }
    }

    None
}
