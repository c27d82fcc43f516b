//! Shallow render engine
//!
//! Decides, per element, what the one-level renderer is actually asked to
//! render: host elements are read back statically, context providers and
//! consumers become stand-in functions, memo types go through a wrapper
//! cached per component identity, and `Suspense` goes through a stand-in
//! that can swap lazy children for the fallback.

use crate::error::{Result, ShallowError};
use crate::events::prop_from_event;
use crate::memo::{memoizing_function, pure_class, with_default_props, MemoState};
use crate::renderer::{OneLevelRender, RenderCall, ShallowRenderer};
use crate::suspense::check_is_suspense_and_clone_element;
use ahash::AHashMap;
use render_tree::component::Comparator;
use render_tree::normalizer::{element_to_tree, value_to_tree};
use render_tree::{
    mask_context, shallow_equal, Caught, Component, ComponentClass, ComponentView, Element,
    ElementType, ErrorBoundarySimulator, FunctionComponent, Instance, InstanceHandle, Props,
    RenderMode, RenderNode, RenderOptions, Rendered, SimulatedError, TreeError, Value,
};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

/// Values registered by provider renders, keyed by context id
pub type ProviderValues = AHashMap<Uuid, Value>;

/// Configuration for the shallow engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShallowOptions {
    /// Render the fallback in place of lazy children of `Suspense`
    pub suspense_fallback: bool,
    /// Hide the empty-state placeholder some engine versions assign to
    /// classes without declared state
    pub empty_state_shim: bool,
}

impl Default for ShallowOptions {
    fn default() -> Self {
        Self {
            suspense_fallback: false,
            empty_state_shim: true,
        }
    }
}

impl ShallowOptions {
    /// Shallow options from the shared render options, rejecting any the
    /// shallow mode cannot honor
    pub fn from_render_options(options: &RenderOptions) -> render_tree::Result<Self> {
        options.validate(RenderMode::Shallow)?;
        Ok(Self {
            suspense_fallback: options.suspense_fallback.unwrap_or(false),
            ..Self::default()
        })
    }
}

/// Class with no declared state, used to probe the renderer for the
/// empty-state placeholder
struct EmptyState;

impl Component for EmptyState {
    fn render(&self, _view: &ComponentView<'_>) -> Value {
        Value::Null
    }
}

/// Renders one element at a time, one level deep, and keeps the result
/// for `get_node()`
pub struct ShallowRenderEngine<R: OneLevelRender = ShallowRenderer> {
    renderer: R,
    options: ShallowOptions,
    /// Last element was a host element
    is_dom: bool,
    /// Last element passed to `render`, as given
    cached: Option<Element>,
    memo: Option<MemoState>,
    /// Probe result, computed on first class render
    empty_state: Option<bool>,
    batch_depth: usize,
}

impl ShallowRenderEngine<ShallowRenderer> {
    /// Engine over the reference renderer with default options
    pub fn new() -> Self {
        Self::with_options(ShallowOptions::default())
    }

    /// Engine over the reference renderer
    pub fn with_options(options: ShallowOptions) -> Self {
        Self::with_renderer(ShallowRenderer::new(), options)
    }
}

impl Default for ShallowRenderEngine<ShallowRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: OneLevelRender> ShallowRenderEngine<R> {
    /// Engine over a custom one-level renderer
    pub fn with_renderer(renderer: R, options: ShallowOptions) -> Self {
        Self {
            renderer,
            options,
            is_dom: false,
            cached: None,
            memo: None,
            empty_state: None,
            batch_depth: 0,
        }
    }

    pub fn options(&self) -> &ShallowOptions {
        &self.options
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Render `el` one level deep. Read the result with `get_node()`.
    pub fn render(
        &mut self,
        el: &Element,
        context: &Props,
        provider_values: &mut ProviderValues,
    ) -> Result<()> {
        self.cached = Some(el.clone());

        match &el.ty {
            ElementType::Host(_) => {
                self.is_dom = true;
                Ok(())
            }
            ElementType::Provider(provided) => {
                self.is_dom = false;
                let value = el.props.get("value").cloned().unwrap_or_default();
                provider_values.insert(provided.id(), value);
                let stand_in = provider_stand_in(&el.ty);
                self.render_batched(&el.with_type(stand_in), &Props::new(), RenderCall::default())
            }
            ElementType::Consumer(link) => {
                self.is_dom = false;
                let provided = link.upgrade().ok_or(TreeError::UnresolvedProvider)?;
                let value = provider_values
                    .get(&provided.id())
                    .cloned()
                    .unwrap_or_else(|| provided.default_value().clone());
                let stand_in = consumer_stand_in(&el.ty, value);
                self.render_batched(&el.with_type(stand_in), &Props::new(), RenderCall::default())
            }
            ElementType::Lazy(_) => {
                self.is_dom = false;
                Err(ShallowError::Unsupported("lazy"))
            }
            _ => {
                self.is_dom = false;
                self.render_component(el, context)
            }
        }
    }

    fn render_component(&mut self, el: &Element, unmasked_context: &Props) -> Result<()> {
        let rendered_el = check_is_suspense_and_clone_element(el, self.options.suspense_fallback);
        let context = mask_context(rendered_el.ty.context_types(), unmasked_context);

        if let ElementType::Memo(memo) = &el.ty {
            let wrapped = self.wrap_pure_component(&memo.inner, memo.compare.clone());
            return self.render_batched(&el.with_type(wrapped), &context, RenderCall::default());
        }

        match &rendered_el.ty {
            ElementType::Function(func) => {
                let ty = self.wrap_functional_component(func);
                self.render_batched(&rendered_el.with_type(ty), &context, RenderCall::default())
            }
            ElementType::Class(_) => {
                // same props reference, different context: the update must not be skipped
                let detach_props = self.renderer.instance().is_some_and(|handle| {
                    let instance = handle.borrow();
                    Props::same(&el.props, instance.props())
                        && !shallow_equal(&context, instance.context())
                });
                let mask_empty_state =
                    self.options.empty_state_shim && self.empty_state_sentinel()?;
                let call = RenderCall {
                    detach_props,
                    mask_empty_state,
                };
                self.render_batched(&rendered_el, &context, call)
            }
            _ => self.render_batched(&rendered_el, &context, RenderCall::default()),
        }
    }

    fn render_batched(&mut self, el: &Element, context: &Props, call: RenderCall) -> Result<()> {
        self.batched_updates(|engine| engine.render_element(el, context, call))??;
        Ok(())
    }

    /// One-level render; an output of type `Suspense` is rendered again
    /// through the suspense stand-in
    fn render_element(&mut self, el: &Element, context: &Props, call: RenderCall) -> Result<Value> {
        let output = self.renderer.render(el, context, call)?;

        if let Some(out) = output.as_element() {
            let cloned = check_is_suspense_and_clone_element(out, self.options.suspense_fallback);
            if cloned.ty != out.ty {
                tracing::debug!(
                    "[ShallowRenderEngine] Output is Suspense, rendering through the stand-in"
                );
                return self.renderer.render(&el.with_type(cloned.ty), context, call);
            }
        }

        Ok(output)
    }

    /// Wrapper for a memo's inner type, rebuilt only when the inner
    /// component identity changes
    fn wrap_pure_component(
        &mut self,
        inner: &ElementType,
        compare: Option<Comparator>,
    ) -> ElementType {
        if let Some(state) = &self.memo {
            if state.last_component == *inner {
                return state.wrapped.clone();
            }
        }

        let wrapped = match inner {
            ElementType::Class(class) => ElementType::Class(Rc::new(pure_class(class, compare))),
            ElementType::Function(func) | ElementType::ForwardRef(func) => {
                ElementType::Function(Rc::new(memoizing_function(func.clone(), compare)))
            }
            other => other.clone(),
        };
        tracing::debug!("[ShallowRenderEngine] Wrapped memo component {}", inner.display_name());

        self.memo = Some(MemoState {
            last_component: inner.clone(),
            wrapped: wrapped.clone(),
        });
        wrapped
    }

    /// Functions with default props get an adapter that merges them
    fn wrap_functional_component(&mut self, func: &Rc<FunctionComponent>) -> ElementType {
        let ty = ElementType::Function(func.clone());
        if func.default_props.is_none() {
            return ty;
        }

        if let Some(state) = &self.memo {
            if state.last_component == ty {
                return state.wrapped.clone();
            }
        }

        let wrapped = ElementType::Function(Rc::new(with_default_props(func.clone())));
        self.memo = Some(MemoState {
            last_component: ty,
            wrapped: wrapped.clone(),
        });
        wrapped
    }

    /// Whether the renderer writes an empty-state placeholder into classes
    /// without declared state
    fn empty_state_sentinel(&mut self) -> Result<bool> {
        if let Some(detected) = self.empty_state {
            return Ok(detected);
        }

        let mut probe = self.renderer.scratch();
        let class = ComponentClass::new("EmptyState", |_| Box::new(EmptyState));
        probe.render(&Element::new(class, Props::new()), &Props::new(), RenderCall::default())?;
        let detected = probe
            .instance()
            .is_some_and(|handle| handle.borrow().state().is_some());
        probe.unmount();

        if detected {
            tracing::debug!(
                "[ShallowRenderEngine] Renderer assigns an empty-state placeholder, masking it"
            );
        }
        self.empty_state = Some(detected);
        Ok(detected)
    }

    /// Snapshot of the last render
    pub fn get_node(&self) -> Result<Option<RenderNode>> {
        let cached = match &self.cached {
            Some(cached) => cached,
            None => return Ok(None),
        };

        if self.is_dom {
            return Ok(Some(element_to_tree(cached)?));
        }

        let rendered = match self.renderer.output() {
            Some(output) => value_to_tree(output)?,
            None => Rendered::Empty,
        };

        Ok(Some(RenderNode {
            node_type: cached.node_type(),
            ty: cached.ty.clone(),
            props: cached.props.clone(),
            key: cached.key.clone(),
            ref_handle: cached.ref_handle.clone(),
            instance: self.renderer.instance().cloned().map(Instance::Component),
            rendered,
        }))
    }

    /// Class instance of the last render, if any
    pub fn instance(&self) -> Option<&InstanceHandle> {
        self.renderer.instance()
    }

    /// Raw output of the last render
    pub fn output(&self) -> Option<&Value> {
        self.renderer.output()
    }

    /// Drop the rendered instance and output
    pub fn unmount(&mut self) {
        self.renderer.unmount();
    }

    /// Queue a state update on the rendered instance. Outside a batch the
    /// instance re-renders right away.
    pub fn set_state(&mut self, partial: Props) -> Result<()> {
        let handle = self.renderer.instance().cloned().ok_or(ShallowError::NotRendered)?;
        handle.borrow().set_state(partial);
        if self.batch_depth == 0 {
            self.flush()?;
        }
        Ok(())
    }

    /// Run `f` with re-renders deferred until the outermost batch ends
    pub fn batched_updates<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Result<T> {
        self.batch_depth += 1;
        let value = f(self);
        self.batch_depth -= 1;

        if self.batch_depth == 0 {
            self.flush()?;
        }
        Ok(value)
    }

    fn flush(&mut self) -> Result<()> {
        let pending = self
            .renderer
            .instance()
            .is_some_and(|handle| handle.borrow().has_pending_state());
        if pending {
            tracing::trace!("[ShallowRenderEngine] Flushing queued state");
            self.renderer.rerender()?;
        }
        Ok(())
    }

    /// Call the `on<Event>` handler of `node`, if it has one, inside a batch
    pub fn simulate_event(&mut self, node: &RenderNode, event: &str, args: &[Value]) -> Result<()> {
        let prop = prop_from_event(event);
        match node.props.get(&prop).and_then(Value::as_callback).cloned() {
            Some(handler) => {
                self.batched_updates(|_| handler.call(args))?;
            }
            None => tracing::trace!(
                "[ShallowRenderEngine] No {} handler on {}",
                prop,
                node.display_name()
            ),
        }
        Ok(())
    }

    /// Deliver `error` to the rendered root instance. `ancestry` (nearest
    /// first) only shapes the component stack.
    pub fn simulate_error(
        &mut self,
        ancestry: &[RenderNode],
        error: &SimulatedError,
    ) -> Result<Caught> {
        let root = self.get_node()?.ok_or(ShallowError::NotRendered)?;
        let instance = self.renderer.instance().cloned();

        let mut hierarchy: Vec<&RenderNode> = ancestry.iter().collect();
        hierarchy.push(&root);

        let caught = ErrorBoundarySimulator::new().capture(
            error,
            instance.as_ref(),
            &root.ty,
            &hierarchy,
        )?;
        self.flush()?;
        Ok(caught)
    }
}

/// Function echoing its children, standing in for a provider
fn provider_stand_in(ty: &ElementType) -> ElementType {
    let func = FunctionComponent::new(&ty.display_name(), |props, _| {
        props.children().cloned().unwrap_or_default()
    });
    ElementType::Function(Rc::new(func))
}

/// Function calling its render-prop children with `value`, standing in for a consumer
fn consumer_stand_in(ty: &ElementType, value: Value) -> ElementType {
    let func = FunctionComponent::new(&ty.display_name(), move |props, _| {
        match props.children().and_then(Value::as_callback) {
            Some(render) => render.call(std::slice::from_ref(&value)),
            None => Value::Null,
        }
    });
    ElementType::Function(Rc::new(func))
}
