//! One-level render primitive
//!
//! Renders exactly one element without descending into the output. The
//! engine only talks to it through `OneLevelRender`, so a different
//! primitive can be plugged in.

use crate::error::{Result, ShallowError};
use render_tree::{
    ClassInstance, ComponentClass, Element, ElementType, InstanceHandle, MountOptions, Props, Value,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Per-call instructions from the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderCall {
    /// Give the instance a fresh copy of its props for this update only, so
    /// an update with the same props reference is not skipped
    pub detach_props: bool,
    /// Read the engine's empty-state placeholder back as "no state"
    pub mask_empty_state: bool,
}

/// Known defects of the engine version being emulated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineQuirks {
    /// Class instances without declared state get an empty placeholder
    /// object instead of null
    pub empty_state_sentinel: bool,
}

/// Primitive that renders a single element without descending into its output
pub trait OneLevelRender {
    /// Render `element` one level deep and return its output
    fn render(&mut self, element: &Element, context: &Props, call: RenderCall) -> Result<Value>;

    /// Render the last element again (picks up queued state).
    /// `None` when nothing is rendered.
    fn rerender(&mut self) -> Result<Option<Value>>;

    fn output(&self) -> Option<&Value>;

    /// Live instance when the last element was a class component
    fn instance(&self) -> Option<&InstanceHandle>;

    fn unmount(&mut self);

    /// Fresh, empty renderer with the same configuration
    fn scratch(&self) -> Self
    where
        Self: Sized;
}

/// Reference primitive
#[derive(Debug, Default)]
pub struct ShallowRenderer {
    quirks: EngineQuirks,
    element: Option<Element>,
    context: Props,
    output: Option<Value>,
    instance: Option<InstanceHandle>,
}

impl ShallowRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quirks(quirks: EngineQuirks) -> Self {
        Self {
            quirks,
            ..Self::default()
        }
    }

    pub fn quirks(&self) -> EngineQuirks {
        self.quirks
    }

    fn mount_class(
        &mut self,
        class: &Rc<ComponentClass>,
        element: &Element,
        context: &Props,
        call: RenderCall,
    ) -> Value {
        let props = element.props.with_defaults(class.default_props.as_ref());
        let options = MountOptions {
            empty_state_sentinel: self.quirks.empty_state_sentinel,
            mask_empty_state: call.mask_empty_state,
        };
        let handle = ClassInstance::mount(Rc::clone(class), props, context.clone(), options);
        let output = handle.borrow().render();
        self.instance = Some(handle);
        output
    }

    fn update_class(
        &mut self,
        handle: InstanceHandle,
        class: &Rc<ComponentClass>,
        element: &Element,
        context: &Props,
        call: RenderCall,
    ) -> Value {
        let next_props = element.props.with_defaults(class.default_props.as_ref());
        let mut instance = handle.borrow_mut();

        let original = if call.detach_props {
            let detached = instance.props().detached();
            Some(instance.replace_props(detached))
        } else {
            None
        };

        let unchanged = Props::same(instance.props(), &next_props) && !instance.has_pending_state();
        let output = if unchanged {
            tracing::trace!("[ShallowRenderer] {} skipped: same props", class.display_name());
            self.output.clone().unwrap_or_default()
        } else {
            let next_state = instance.next_state();
            let should_update = instance.should_update(&next_props, next_state.as_ref());
            instance.commit(next_props, context.clone());
            if should_update {
                instance.render()
            } else {
                self.output.clone().unwrap_or_default()
            }
        };

        if let Some(original) = original {
            instance.replace_props(original);
        }
        output
    }
}

impl OneLevelRender for ShallowRenderer {
    fn render(&mut self, element: &Element, context: &Props, call: RenderCall) -> Result<Value> {
        if self.element.as_ref().is_some_and(|prev| prev.ty != element.ty) {
            self.unmount();
        }

        let output = match &element.ty {
            ElementType::Function(func) | ElementType::ForwardRef(func) => {
                func.render(&element.props, context)
            }
            ElementType::Class(class) => match self.instance.clone() {
                Some(handle) => self.update_class(handle, class, element, context, call),
                None => self.mount_class(class, element, context, call),
            },
            other => return Err(ShallowError::InvalidElementType(other.display_name())),
        };

        self.element = Some(element.clone());
        self.context = context.clone();
        self.output = Some(output.clone());
        Ok(output)
    }

    fn rerender(&mut self) -> Result<Option<Value>> {
        let element = match self.element.clone() {
            Some(element) => element,
            None => return Ok(None),
        };
        let context = self.context.clone();
        self.render(&element, &context, RenderCall::default()).map(Some)
    }

    fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }

    fn instance(&self) -> Option<&InstanceHandle> {
        self.instance.as_ref()
    }

    fn unmount(&mut self) {
        self.element = None;
        self.context = Props::new();
        self.output = None;
        self.instance = None;
    }

    fn scratch(&self) -> Self {
        Self::with_quirks(self.quirks)
    }
}
