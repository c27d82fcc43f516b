//! Component model
//!
//! Function components are a render closure plus statics. Class components
//! split in two: `ComponentClass` holds the statics (name, default props,
//! update policy, the derive-state-from-error capability) and a factory;
//! the factory produces a `Component` trait object that carries behavior.
//!
//! No inheritance: a memo decorator is a `ComponentClass` clone with a
//! different `UpdatePolicy`.

use crate::boundary::ErrorInfo;
use crate::error::SimulatedError;
use crate::value::{shallow_equal, Props, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Returns true when two prop sets should be treated as equal
pub type Comparator = Rc<dyn Fn(&Props, &Props) -> bool>;

/// `(props, context) -> output`
pub type RenderFn = Rc<dyn Fn(&Props, &Props) -> Value>;

/// Static error capability: error -> state update
pub type DeriveStateFn = Rc<dyn Fn(&SimulatedError) -> Props>;

pub type Factory = Rc<dyn Fn(&Props) -> Box<dyn Component>>;

pub type InstanceHandle = Rc<RefCell<ClassInstance>>;

/// Stateless component
#[derive(Clone)]
pub struct FunctionComponent {
    pub name: String,
    pub display_name: Option<String>,
    pub default_props: Option<Props>,
    pub context_types: Option<Vec<String>>,
    render: RenderFn,
}

impl FunctionComponent {
    pub fn new(name: &str, render: impl Fn(&Props, &Props) -> Value + 'static) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            default_props: None,
            context_types: None,
            render: Rc::new(render),
        }
    }

    pub fn with_default_props(mut self, defaults: Props) -> Self {
        self.default_props = Some(defaults);
        self
    }

    pub fn with_context_types(mut self, keys: &[&str]) -> Self {
        self.context_types = Some(keys.iter().map(|key| key.to_string()).collect());
        self
    }

    pub fn with_display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Run the body as-is: no default props are merged here
    pub fn render(&self, props: &Props, context: &Props) -> Value {
        (self.render)(props, context)
    }

    pub fn display_name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None if !self.name.is_empty() => self.name.clone(),
            None => "Component".to_string(),
        }
    }
}

impl fmt::Debug for FunctionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionComponent")
            .field("name", &self.display_name())
            .finish()
    }
}

/// What a class instance sees while rendering
pub struct ComponentView<'a> {
    pub props: &'a Props,
    pub state: Option<&'a Props>,
    pub context: &'a Props,
    pub updater: &'a StateUpdater,
}

/// Behavior of a class component instance
pub trait Component {
    /// State assigned in the constructor. `None` means "declared no state".
    fn initial_state(&self) -> Option<Props> {
        None
    }

    fn render(&self, view: &ComponentView<'_>) -> Value;

    fn should_component_update(
        &self,
        _view: &ComponentView<'_>,
        _next_props: &Props,
        _next_state: Option<&Props>,
    ) -> bool {
        true
    }

    /// Instance-level error capability
    fn catches_errors(&self) -> bool {
        false
    }

    fn component_did_catch(
        &mut self,
        _error: &SimulatedError,
        _info: &ErrorInfo,
        _updater: &StateUpdater,
    ) {
    }
}

/// How a class decides whether an update re-renders
#[derive(Clone, Default)]
pub enum UpdatePolicy {
    /// Ask the instance (`Component::should_component_update`)
    #[default]
    Default,
    /// Shallow-compare props and state
    Pure,
    /// Skip the render when the comparator reports equal props
    SkipWhenEqual(Comparator),
}

impl fmt::Debug for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePolicy::Default => f.write_str("Default"),
            UpdatePolicy::Pure => f.write_str("Pure"),
            UpdatePolicy::SkipWhenEqual(_) => f.write_str("SkipWhenEqual(..)"),
        }
    }
}

/// Statics of a class component
#[derive(Clone)]
pub struct ComponentClass {
    pub name: String,
    pub display_name: Option<String>,
    pub default_props: Option<Props>,
    pub context_types: Option<Vec<String>>,
    pub update_policy: UpdatePolicy,
    pub derive_state_from_error: Option<DeriveStateFn>,
    factory: Factory,
}

impl ComponentClass {
    pub fn new(name: &str, factory: impl Fn(&Props) -> Box<dyn Component> + 'static) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            default_props: None,
            context_types: None,
            update_policy: UpdatePolicy::Default,
            derive_state_from_error: None,
            factory: Rc::new(factory),
        }
    }

    pub fn pure(mut self) -> Self {
        self.update_policy = UpdatePolicy::Pure;
        self
    }

    pub fn with_default_props(mut self, defaults: Props) -> Self {
        self.default_props = Some(defaults);
        self
    }

    pub fn with_context_types(mut self, keys: &[&str]) -> Self {
        self.context_types = Some(keys.iter().map(|key| key.to_string()).collect());
        self
    }

    pub fn with_derived_state_from_error(
        mut self,
        derive: impl Fn(&SimulatedError) -> Props + 'static,
    ) -> Self {
        self.derive_state_from_error = Some(Rc::new(derive));
        self
    }

    /// A copy of these statics with another update policy and a display
    /// name pointing back at the original. The copy has its own identity.
    pub fn decorated(&self, update_policy: UpdatePolicy) -> Self {
        Self {
            display_name: Some(self.display_name()),
            update_policy,
            ..self.clone()
        }
    }

    pub fn instantiate(&self, props: &Props) -> Box<dyn Component> {
        (self.factory)(props)
    }

    pub fn display_name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None if !self.name.is_empty() => self.name.clone(),
            None => "Component".to_string(),
        }
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.display_name())
            .field("update_policy", &self.update_policy)
            .finish()
    }
}

/// Queue for `set_state` calls. Separate from the instance so handlers and
/// error callbacks can enqueue while the instance itself is borrowed.
#[derive(Clone, Default)]
pub struct StateUpdater(Rc<RefCell<Option<Props>>>);

impl StateUpdater {
    /// Merge `partial` into the pending update
    pub fn set_state(&self, partial: Props) {
        let mut pending = self.0.borrow_mut();
        let next = match pending.take() {
            Some(queued) => queued.merge(&partial),
            None => partial,
        };
        *pending = Some(next);
    }

    pub fn has_pending(&self) -> bool {
        self.0.borrow().is_some()
    }

    pub fn pending(&self) -> Option<Props> {
        self.0.borrow().clone()
    }

    fn take(&self) -> Option<Props> {
        self.0.borrow_mut().take()
    }
}

impl fmt::Debug for StateUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateUpdater").field(&self.pending()).finish()
    }
}

/// State slot of an instance
#[derive(Debug, Clone)]
enum StateSlot {
    Unset,
    /// Placeholder some engine versions assign when no state was declared
    EmptySentinel(Props),
    Set(Props),
}

/// Options applied when an instance is constructed
#[derive(Debug, Clone, Copy, Default)]
pub struct MountOptions {
    /// Engine writes its empty-state placeholder into undeclared state
    pub empty_state_sentinel: bool,
    /// Read that placeholder back as "no state"
    pub mask_empty_state: bool,
}

/// Live class component instance
pub struct ClassInstance {
    class: Rc<ComponentClass>,
    component: Box<dyn Component>,
    props: Props,
    context: Props,
    state: StateSlot,
    mask_empty_state: bool,
    updater: StateUpdater,
}

impl ClassInstance {
    pub fn mount(
        class: Rc<ComponentClass>,
        props: Props,
        context: Props,
        options: MountOptions,
    ) -> InstanceHandle {
        let component = class.instantiate(&props);
        let state = match component.initial_state() {
            Some(state) => StateSlot::Set(state),
            None if options.empty_state_sentinel => StateSlot::EmptySentinel(Props::new()),
            None => StateSlot::Unset,
        };

        Rc::new(RefCell::new(Self {
            class,
            component,
            props,
            context,
            state,
            mask_empty_state: options.mask_empty_state,
            updater: StateUpdater::default(),
        }))
    }

    pub fn class(&self) -> &Rc<ComponentClass> {
        &self.class
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn context(&self) -> &Props {
        &self.context
    }

    /// Committed state. The empty-state placeholder reads as `None` when masked.
    pub fn state(&self) -> Option<&Props> {
        match &self.state {
            StateSlot::Set(state) => Some(state),
            StateSlot::EmptySentinel(_) if self.mask_empty_state => None,
            StateSlot::EmptySentinel(placeholder) => Some(placeholder),
            StateSlot::Unset => None,
        }
    }

    /// Whether the engine wrote its placeholder instead of real state
    pub fn has_empty_state_sentinel(&self) -> bool {
        matches!(self.state, StateSlot::EmptySentinel(_))
    }

    pub fn updater(&self) -> &StateUpdater {
        &self.updater
    }

    pub fn set_state(&self, partial: Props) {
        self.updater.set_state(partial);
    }

    pub fn has_pending_state(&self) -> bool {
        self.updater.has_pending()
    }

    /// State the next render will see: pending updates merged over the
    /// committed state. `None` when nothing was ever set.
    pub fn next_state(&self) -> Option<Props> {
        let committed = match &self.state {
            StateSlot::Set(state) => Some(state),
            StateSlot::EmptySentinel(_) | StateSlot::Unset => None,
        };
        match (committed, self.updater.pending()) {
            (Some(state), Some(pending)) => Some(state.merge(&pending)),
            (None, Some(pending)) => Some(pending),
            (Some(state), None) => Some(state.clone()),
            (None, None) => None,
        }
    }

    /// Swap the props reference, returning the previous one
    pub fn replace_props(&mut self, props: Props) -> Props {
        std::mem::replace(&mut self.props, props)
    }

    /// Decide whether moving to `next_props`/`next_state` re-renders
    pub fn should_update(&self, next_props: &Props, next_state: Option<&Props>) -> bool {
        match &self.class.update_policy {
            UpdatePolicy::SkipWhenEqual(compare) => !compare(&self.props, next_props),
            UpdatePolicy::Pure => {
                let state_equal = match (self.state(), next_state) {
                    (Some(a), Some(b)) => shallow_equal(a, b),
                    (None, None) => true,
                    _ => false,
                };
                !shallow_equal(&self.props, next_props) || !state_equal
            }
            UpdatePolicy::Default => {
                self.component
                    .should_component_update(&self.view(), next_props, next_state)
            }
        }
    }

    /// Install the next props/context/state, consuming the pending queue
    pub fn commit(&mut self, props: Props, context: Props) {
        if let Some(pending) = self.updater.take() {
            let next = match &self.state {
                StateSlot::Set(state) => state.merge(&pending),
                StateSlot::EmptySentinel(_) | StateSlot::Unset => pending,
            };
            self.state = StateSlot::Set(next);
        }
        self.props = props;
        self.context = context;
    }

    pub fn render(&self) -> Value {
        self.component.render(&self.view())
    }

    pub fn did_catch(&mut self, error: &SimulatedError, info: &ErrorInfo) {
        let updater = self.updater.clone();
        self.component.component_did_catch(error, info, &updater);
    }

    fn view(&self) -> ComponentView<'_> {
        ComponentView {
            props: &self.props,
            state: self.state(),
            context: &self.context,
            updater: &self.updater,
        }
    }
}

impl fmt::Debug for ClassInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInstance")
            .field("class", &self.class.display_name())
            .field("props", &self.props)
            .field("state", &self.state())
            .finish()
    }
}

/// Pick the declared legacy context keys out of the full context
pub fn mask_context(context_types: Option<&[String]>, unmasked: &Props) -> Props {
    match context_types {
        Some(keys) => unmasked.pick(keys),
        None => Props::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Component for Counter {
        fn initial_state(&self) -> Option<Props> {
            Some(Props::new().with("count", 0))
        }

        fn render(&self, view: &ComponentView<'_>) -> Value {
            view.state
                .and_then(|state| state.get("count"))
                .cloned()
                .unwrap_or_default()
        }
    }

    struct Stateless;

    impl Component for Stateless {
        fn render(&self, _view: &ComponentView<'_>) -> Value {
            Value::Null
        }
    }

    #[test]
    fn test_state_updates_are_queued_until_commit() {
        let class = Rc::new(ComponentClass::new("Counter", |_| Box::new(Counter)));
        let handle =
            ClassInstance::mount(class, Props::new(), Props::new(), MountOptions::default());

        handle.borrow().set_state(Props::new().with("count", 1));
        handle.borrow().set_state(Props::new().with("extra", true));
        assert_eq!(handle.borrow().render(), Value::from(0));

        let next = handle.borrow().next_state().unwrap();
        assert_eq!(next.get("count"), Some(&Value::from(1)));
        assert_eq!(next.get("extra"), Some(&Value::from(true)));

        let props = handle.borrow().props().clone();
        handle.borrow_mut().commit(props, Props::new());
        assert_eq!(handle.borrow().render(), Value::from(1));
        assert!(!handle.borrow().has_pending_state());
    }

    #[test]
    fn test_empty_state_sentinel_masking() {
        let class = Rc::new(ComponentClass::new("Stateless", |_| Box::new(Stateless)));
        let raw = ClassInstance::mount(
            class.clone(),
            Props::new(),
            Props::new(),
            MountOptions { empty_state_sentinel: true, mask_empty_state: false },
        );
        assert!(raw.borrow().state().is_some());

        let masked = ClassInstance::mount(
            class,
            Props::new(),
            Props::new(),
            MountOptions { empty_state_sentinel: true, mask_empty_state: true },
        );
        assert!(masked.borrow().state().is_none());
        assert!(masked.borrow().has_empty_state_sentinel());

        masked.borrow().set_state(Props::new().with("ready", true));
        let props = masked.borrow().props().clone();
        masked.borrow_mut().commit(props, Props::new());
        assert_eq!(
            masked.borrow().state().and_then(|s| s.get("ready")),
            Some(&Value::from(true))
        );
    }

    #[test]
    fn test_skip_when_equal_policy() {
        let class = ComponentClass::new("Stateless", |_| Box::new(Stateless));
        let decorated = class.decorated(UpdatePolicy::SkipWhenEqual(Rc::new(|a: &Props, b: &Props| {
            a.get("id") == b.get("id")
        })));
        let handle = ClassInstance::mount(
            Rc::new(decorated),
            Props::new().with("id", 1).with("label", "a"),
            Props::new(),
            MountOptions::default(),
        );

        let same_id = Props::new().with("id", 1).with("label", "b");
        let new_id = Props::new().with("id", 2);
        assert!(!handle.borrow().should_update(&same_id, None));
        assert!(handle.borrow().should_update(&new_id, None));
    }

    #[test]
    fn test_mask_context() {
        let context = Props::new().with("theme", "dark").with("locale", "en");
        let keys = vec!["theme".to_string()];
        let masked = mask_context(Some(&keys), &context);
        assert_eq!(masked.len(), 1);
        assert!(mask_context(None, &context).is_empty());
    }
}
