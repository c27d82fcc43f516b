//! Memo and default-props wrappers
//!
//! A memoized element is rendered through a wrapper type built once per
//! component identity. Classes get a decorated copy with a "skip when equal"
//! update policy; functions get a memoizing adapter around their body.

use render_tree::component::Comparator;
use render_tree::{
    shallow_equal, ComponentClass, ElementType, FunctionComponent, Props, UpdatePolicy, Value,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Memo cache of one function wrapper
#[derive(Debug, Clone, Default)]
pub enum MemoCell {
    #[default]
    Uninitialized,
    Memoized { props: Props, output: Value },
}

impl MemoCell {
    /// Whether `props` requires running the body again
    fn is_stale(&self, props: &Props, compare: Option<&Comparator>) -> bool {
        match self {
            MemoCell::Uninitialized => true,
            MemoCell::Memoized { props: prev, .. } => match compare {
                Some(compare) => !compare(prev, props),
                None => !shallow_equal(prev, props),
            },
        }
    }
}

/// Wrapper built for the last component identity seen
#[derive(Debug, Clone)]
pub struct MemoState {
    pub last_component: ElementType,
    pub wrapped: ElementType,
}

/// Decorated copy of `class` that skips renders when props compare equal
/// (shallow props and state equality without a comparator)
pub fn pure_class(class: &ComponentClass, compare: Option<Comparator>) -> ComponentClass {
    let policy = match compare {
        Some(compare) => UpdatePolicy::SkipWhenEqual(compare),
        None => UpdatePolicy::Pure,
    };
    class.decorated(policy)
}

/// Function that runs `inner` only when props changed since the last call,
/// with default props merged on every run
pub fn memoizing_function(
    inner: Rc<FunctionComponent>,
    compare: Option<Comparator>,
) -> FunctionComponent {
    let cell = Rc::new(RefCell::new(MemoCell::Uninitialized));
    let (name, display_name) = (inner.name.clone(), inner.display_name());
    let statics = inner.clone();

    let mut wrapped = FunctionComponent::new(&name, move |props, context| {
        let stale = cell.borrow().is_stale(props, compare.as_ref());
        if stale {
            let output = inner.render(&props.with_defaults(inner.default_props.as_ref()), context);
            *cell.borrow_mut() = MemoCell::Memoized {
                props: props.clone(),
                output: output.clone(),
            };
            return output;
        }
        match &*cell.borrow() {
            MemoCell::Memoized { output, .. } => output.clone(),
            MemoCell::Uninitialized => Value::Null,
        }
    })
    .with_display_name(&display_name);
    wrapped.default_props = statics.default_props.clone();
    wrapped.context_types = statics.context_types.clone();
    wrapped
}

/// Function that merges `inner`'s default props before running it
pub fn with_default_props(inner: Rc<FunctionComponent>) -> FunctionComponent {
    let (name, display_name) = (inner.name.clone(), inner.display_name());
    let statics = inner.clone();

    let mut wrapped = FunctionComponent::new(&name, move |props, context| {
        inner.render(&props.with_defaults(inner.default_props.as_ref()), context)
    })
    .with_display_name(&display_name);
    wrapped.default_props = statics.default_props.clone();
    wrapped.context_types = statics.context_types.clone();
    wrapped
}
