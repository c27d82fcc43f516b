//! Error boundary simulation
//!
//! Feeds a simulated render error to the nearest boundary in an ancestry
//! chain, the way the engine would during a real render failure.

use crate::component::InstanceHandle;
use crate::element::ElementType;
use crate::error::{Result, SimulatedError, TreeError};
use crate::types::{NodeType, RenderNode};
use crate::value::Props;
use serde::Serialize;

/// Second argument of the instance-level catch callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub component_stack: String,
}

/// Outcome of a caught error
#[derive(Debug, Clone, PartialEq)]
pub struct Caught {
    /// Display name of the boundary that caught it
    pub boundary: String,
    /// State produced by the static capability, queued on the instance
    pub derived_state: Option<Props>,
    /// Whether the instance-level callback ran
    pub did_catch: bool,
}

/// Name the stack ends with: the wrapper the test harness renders around the root
const WRAPPER_NAME: &str = "WrapperComponent";

#[derive(Debug, Default, Clone, Copy)]
pub struct ErrorBoundarySimulator;

impl ErrorBoundarySimulator {
    /// Create a simulator
    pub fn new() -> Self {
        Self
    }

    /// A class declaring the static capability, or an instance that catches
    pub fn is_boundary(node: &RenderNode) -> bool {
        if let ElementType::Class(class) = &node.ty {
            if class.derive_state_from_error.is_some() {
                return true;
            }
        }
        node.component_instance()
            .is_some_and(|handle| handle.borrow().component().catches_errors())
    }

    /// Nearest boundary; `ancestry[0]` is the node that threw
    pub fn find_boundary(ancestry: &[RenderNode]) -> Option<&RenderNode> {
        ancestry.iter().find(|node| Self::is_boundary(node))
    }

    /// Deliver `error` to the nearest boundary in `ancestry` (nearest first)
    pub fn simulate(&self, ancestry: &[RenderNode], error: &SimulatedError) -> Result<Caught> {
        let hierarchy: Vec<&RenderNode> = ancestry.iter().collect();

        match Self::find_boundary(ancestry) {
            Some(boundary) => {
                tracing::debug!(
                    "[ErrorBoundarySimulator] {} caught: {}",
                    boundary.display_name(),
                    error
                );
                self.capture(error, boundary.component_instance(), &boundary.ty, &hierarchy)
            }
            None => {
                tracing::debug!("[ErrorBoundarySimulator] No boundary for: {}", error);
                Err(TreeError::Uncaught(error.clone()))
            }
        }
    }

    /// Run the capture protocol on one instance: the static capability
    /// first (its result is queued as a state update), then the instance
    /// callback with the component stack of `hierarchy`.
    pub fn capture(
        &self,
        error: &SimulatedError,
        instance: Option<&InstanceHandle>,
        ty: &ElementType,
        hierarchy: &[&RenderNode],
    ) -> Result<Caught> {
        let derive = match ty {
            ElementType::Class(class) => class.derive_state_from_error.clone(),
            _ => None,
        };
        let catches = instance.is_some_and(|handle| handle.borrow().component().catches_errors());

        if derive.is_none() && !catches {
            return Err(TreeError::Uncaught(error.clone()));
        }

        let derived_state = derive.map(|derive| derive(error));
        if let (Some(state), Some(handle)) = (&derived_state, instance) {
            handle.borrow().set_state(state.clone());
        }

        if catches {
            if let Some(handle) = instance {
                let info = ErrorInfo {
                    component_stack: component_stack(hierarchy),
                };
                handle.borrow_mut().did_catch(error, &info);
            }
        }

        Ok(Caught {
            boundary: ty.display_name(),
            derived_state,
            did_catch: catches,
        })
    }
}

/// `"\n    in Name (created by Owner)"` per node, nearest first, where the
/// owner is the next non-host entry further out
pub fn component_stack(hierarchy: &[&RenderNode]) -> String {
    let entries: Vec<(NodeType, String)> = hierarchy
        .iter()
        .map(|node| (node.node_type, node.display_name()))
        .chain(std::iter::once((NodeType::Class, WRAPPER_NAME.to_string())))
        .collect();

    let mut stack = String::new();
    for (i, (_, name)) in entries.iter().enumerate() {
        stack.push_str("\n    in ");
        stack.push_str(name);
        let owner = entries[i + 1..]
            .iter()
            .find(|(node_type, _)| *node_type != NodeType::Host);
        if let Some((_, owner)) = owner {
            stack.push_str(&format!(" (created by {})", owner));
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{
        ClassInstance, Component, ComponentClass, ComponentView, FunctionComponent, MountOptions,
        StateUpdater,
    };
    use crate::types::{Instance, Rendered};
    use crate::value::Value;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Boundary {
        caught: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl Component for Boundary {
        fn render(&self, _view: &ComponentView<'_>) -> Value {
            Value::Null
        }

        fn catches_errors(&self) -> bool {
            true
        }

        fn component_did_catch(
            &mut self,
            error: &SimulatedError,
            info: &ErrorInfo,
            updater: &StateUpdater,
        ) {
            self.caught
                .borrow_mut()
                .push((error.message.clone(), info.component_stack.clone()));
            updater.set_state(Props::new().with("caught", true));
        }
    }

    struct Plain;

    impl Component for Plain {
        fn render(&self, _view: &ComponentView<'_>) -> Value {
            Value::Null
        }
    }

    fn class_node(class: ComponentClass) -> RenderNode {
        let class = Rc::new(class);
        let handle = ClassInstance::mount(
            class.clone(),
            Props::new(),
            Props::new(),
            MountOptions::default(),
        );
        RenderNode {
            node_type: NodeType::Class,
            ty: ElementType::Class(class),
            props: Props::new(),
            key: None,
            ref_handle: None,
            instance: Some(Instance::Component(handle)),
            rendered: Rendered::Empty,
        }
    }

    fn function_node(name: &str) -> RenderNode {
        RenderNode {
            node_type: NodeType::Function,
            ty: ElementType::Function(Rc::new(FunctionComponent::new(name, |_, _| Value::Null))),
            props: Props::new(),
            key: None,
            ref_handle: None,
            instance: None,
            rendered: Rendered::Empty,
        }
    }

    fn catching(name: &str, log: &Rc<RefCell<Vec<(String, String)>>>) -> ComponentClass {
        let log = log.clone();
        ComponentClass::new(name, move |_| Box::new(Boundary { caught: log.clone() }))
    }

    #[test]
    fn test_nearest_boundary_catches() {
        let inner_log = Rc::new(RefCell::new(Vec::new()));
        let root_log = Rc::new(RefCell::new(Vec::new()));
        let ancestry = vec![
            function_node("Leaf"),
            class_node(ComponentClass::new("Middle", |_| Box::new(Plain))),
            class_node(catching("Catcher", &inner_log)),
            class_node(catching("Root", &root_log)),
        ];

        let caught = ErrorBoundarySimulator::new()
            .simulate(&ancestry, &SimulatedError::new("boom"))
            .unwrap();

        assert_eq!(caught.boundary, "Catcher");
        assert!(caught.did_catch);
        assert!(root_log.borrow().is_empty());

        let log = inner_log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, "boom");
        assert_eq!(
            log[0].1,
            "\n    in Leaf (created by Middle)\n    in Middle (created by Catcher)\n    in Catcher (created by Root)\n    in Root (created by WrapperComponent)\n    in WrapperComponent"
        );

        let handle = ancestry[2].component_instance().unwrap();
        assert!(handle.borrow().has_pending_state());
    }

    #[test]
    fn test_no_boundary_propagates() {
        let ancestry = vec![
            function_node("Leaf"),
            class_node(ComponentClass::new("Root", |_| Box::new(Plain))),
        ];
        let err = ErrorBoundarySimulator::new()
            .simulate(&ancestry, &SimulatedError::new("boom"))
            .unwrap_err();
        assert!(matches!(err, TreeError::Uncaught(ref e) if e.message == "boom"));
    }

    #[test]
    fn test_static_capability_queues_state() {
        let class = ComponentClass::new("Fallback", |_| Box::new(Plain))
            .with_derived_state_from_error(|error| {
                Props::new().with("error", error.message.as_str())
            });
        let ancestry = vec![function_node("Leaf"), class_node(class)];

        let caught = ErrorBoundarySimulator::new()
            .simulate(&ancestry, &SimulatedError::new("bad"))
            .unwrap();

        assert!(!caught.did_catch);
        assert_eq!(
            caught.derived_state.as_ref().and_then(|s| s.get("error")),
            Some(&Value::from("bad"))
        );
        let handle = ancestry[1].component_instance().unwrap();
        assert_eq!(
            handle.borrow().next_state().and_then(|s| s.get("error").cloned()),
            Some(Value::from("bad"))
        );
    }

    #[test]
    fn test_host_entries_are_never_owners() {
        let host = RenderNode {
            node_type: NodeType::Host,
            ty: ElementType::host("div"),
            props: Props::new(),
            key: None,
            ref_handle: None,
            instance: None,
            rendered: Rendered::Empty,
        };
        let leaf = function_node("Leaf");
        let stack = component_stack(&[&leaf, &host]);
        assert_eq!(
            stack,
            "\n    in Leaf (created by WrapperComponent)\n    in div (created by WrapperComponent)\n    in WrapperComponent"
        );
    }
}
