//! Shallow rendering on top of `render-tree`
//!
//! Renders a component exactly one level deep and reads the result back as a
//! `RenderNode` snapshot. Children stay unrendered elements.
//!
//! ```text
//! Element ─→ ShallowRenderEngine ─→ OneLevelRender ─→ output Value
//!               │  memo / suspense / context stand-ins       │
//!               └──────────────── get_node() ←── value_to_tree
//! ```

pub mod engine;
pub mod error;
pub mod events;
pub mod memo;
pub mod renderer;
pub mod suspense;

pub use engine::{ProviderValues, ShallowOptions, ShallowRenderEngine};
pub use error::{Result, ShallowError};
pub use events::prop_from_event;
pub use renderer::{EngineQuirks, OneLevelRender, RenderCall, ShallowRenderer};
