//! Live root handle for query code
//!
//! Wraps the arena of a mounted tree. Unmounting is deferred: `unmount()`
//! only raises a flag, and the next `get_node()` still sees the whole tree
//! before it is torn down.

use crate::arena::FiberArena;
use crate::boundary::{Caught, ErrorBoundarySimulator};
use crate::config::{RenderMode, RenderOptions};
use crate::error::{Result, SimulatedError};
use crate::host::{HostNodeResolver, HostNodes};
use crate::normalizer::Normalizer;
use crate::types::{RenderNode, Rendered};

#[derive(Debug)]
pub struct LiveRoot {
    arena: FiberArena,
    normalizer: Normalizer,
    unmount_requested: bool,
}

impl LiveRoot {
    pub fn new(arena: FiberArena, options: &RenderOptions) -> Result<Self> {
        options.validate(RenderMode::Mount)?;
        Ok(Self {
            arena,
            normalizer: Normalizer::new(options.tags.clone()),
            unmount_requested: false,
        })
    }

    pub fn arena(&self) -> &FiberArena {
        &self.arena
    }

    /// Mutable access for the engine side (staging and committing updates)
    pub fn arena_mut(&mut self) -> &mut FiberArena {
        &mut self.arena
    }

    pub fn is_mounted(&self) -> bool {
        self.arena.root_id().is_some()
    }

    /// Snapshot of the whole tree. Empty once torn down.
    pub fn get_node(&mut self) -> Result<Rendered> {
        let snapshot = match self.arena.root_id() {
            Some(root) => self.normalizer.normalize_live(&self.arena, root)?,
            None => Rendered::Empty,
        };

        if self.unmount_requested {
            tracing::debug!("[LiveRoot] Tearing down {} fibers", self.arena.len());
            self.arena.clear();
            self.unmount_requested = false;
        }

        Ok(snapshot)
    }

    /// Request teardown; it happens on the next `get_node()`
    pub fn unmount(&mut self) {
        if self.is_mounted() {
            self.unmount_requested = true;
        }
    }

    pub fn host_nodes(&self, node: &RenderNode) -> HostNodes {
        HostNodeResolver::new().resolve(node)
    }

    /// `ancestry[0]` is the node that throws
    pub fn simulate_error(
        &self,
        ancestry: &[RenderNode],
        error: &SimulatedError,
    ) -> Result<Caught> {
        ErrorBoundarySimulator::new().simulate(ancestry, error)
    }
}
