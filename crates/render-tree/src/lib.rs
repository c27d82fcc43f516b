//! Render tree adapter core
//!
//! Normalizes a declarative UI engine's internal render tree into one
//! uniform snapshot shape that test and query code can walk without knowing
//! the engine's private layout.
//!
//! ## Core Design
//!
//! ```text
//! FiberArena (current version per position) ─┐
//!                                            ├→ Normalizer → RenderNode snapshot
//! Element (static)                         ──┘        ↑            ↓
//!                                              FiberTagTable   HostNodeResolver
//!                                                              ErrorBoundarySimulator
//! ```
//!
//! - Fiber kinds are a closed enum; numeric tags go through one lookup table
//! - Snapshots are immutable; a changed tree must be normalized again
//! - Single-threaded: `Rc`/`RefCell` throughout, nothing is `Send`

pub mod arena;
pub mod boundary;
pub mod component;
pub mod config;
pub mod element;
pub mod error;
pub mod host;
pub mod live;
pub mod normalizer;
pub mod tags;
pub mod types;
pub mod value;

pub use arena::{Fiber, FiberArena, FiberId, StateNode};
pub use boundary::{Caught, ErrorBoundarySimulator, ErrorInfo};
pub use component::{
    mask_context, ClassInstance, Component, ComponentClass, ComponentView, FunctionComponent,
    InstanceHandle, MountOptions, StateUpdater, UpdatePolicy,
};
pub use config::{RenderMode, RenderOptions};
pub use element::{
    matches_element_type, node_to_element, Context, Element, ElementType, LazyType, MemoType,
};
pub use error::{Result, SimulatedError, TreeError};
pub use host::{HostNodeResolver, HostNodes};
pub use live::LiveRoot;
pub use normalizer::Normalizer;
pub use tags::{FiberKind, FiberTagTable};
pub use types::*;
pub use value::{shallow_equal, Callback, Props, Value};
