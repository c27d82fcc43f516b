//! Arena-based fiber storage
//!
//! The host engine keeps up to two versions of every tree position: the one
//! on screen and the one being worked on. Here a position is a `FiberSlot`
//! holding both versions plus an explicit "which one is committed" marker.
//! `FiberId` indexes positions, so links survive a commit and every read
//! resolves to the committed version.
//!
//! ```text
//! Arena: Vec<FiberSlot>
//!        [slot0][slot1][slot2]...
//!         primary / alternate / current
//! ```

use crate::component::InstanceHandle;
use crate::element::ElementType;
use crate::error::{Result, TreeError};
use crate::types::{NativeHandle, RefHandle};
use crate::value::{Props, Value};
use smallvec::SmallVec;

/// Position index into the arena
pub type FiberId = u32;

/// What a fiber owns
#[derive(Debug, Clone)]
pub enum StateNode {
    Instance(InstanceHandle),
    Host(NativeHandle),
    Portal { container: NativeHandle },
}

/// One version of one position in the engine's internal tree
#[derive(Debug, Clone)]
pub struct Fiber {
    pub tag: u32,
    pub key: Option<String>,
    /// Type as written in the element (a memo wrapper stays a memo wrapper)
    pub element_type: Option<ElementType>,
    /// Resolved type
    pub ty: Option<ElementType>,
    /// Props of the last commit: an object for components and host
    /// elements, the text for text nodes, the children for portals
    pub memoized_props: Value,
    pub pending_props: Value,
    pub state_node: Option<StateNode>,
    pub ref_handle: Option<RefHandle>,

    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
}

impl Fiber {
    /// Empty fiber with the given numeric tag
    pub fn new(tag: u32) -> Self {
        Self {
            tag,
            key: None,
            element_type: None,
            ty: None,
            memoized_props: Value::Object(Props::new()),
            pending_props: Value::Object(Props::new()),
            state_node: None,
            ref_handle: None,
            parent: None,
            child: None,
            sibling: None,
        }
    }

    /// Text fiber
    pub fn text(tag: u32, text: &str) -> Self {
        let mut fiber = Self::new(tag);
        fiber.memoized_props = Value::from(text);
        fiber.pending_props = Value::from(text);
        fiber
    }

    /// Set both `element_type` and `ty`
    pub fn with_type(mut self, ty: ElementType) -> Self {
        self.element_type = Some(ty.clone());
        self.ty = Some(ty);
        self
    }

    /// Set `element_type` only (memo fibers resolve `ty` separately)
    pub fn with_element_type(mut self, ty: ElementType) -> Self {
        self.element_type = Some(ty);
        self
    }

    /// Set both memoized and pending props
    pub fn with_props(mut self, props: Props) -> Self {
        self.memoized_props = Value::Object(props.clone());
        self.pending_props = Value::Object(props);
        self
    }

    /// Set the props of the last commit
    pub fn with_memoized_props(mut self, props: impl Into<Value>) -> Self {
        self.memoized_props = props.into();
        self
    }

    /// Set the props of the render in progress
    pub fn with_pending_props(mut self, props: impl Into<Value>) -> Self {
        self.pending_props = props.into();
        self
    }

    /// Set the reconciliation key
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    /// Attach a ref
    pub fn with_ref(mut self, ref_handle: RefHandle) -> Self {
        self.ref_handle = Some(ref_handle);
        self
    }

    /// Set the instance or native node this fiber owns
    pub fn with_state_node(mut self, state_node: StateNode) -> Self {
        self.state_node = Some(state_node);
        self
    }

    /// Memoized props as an object (empty for text and portal fibers)
    pub fn props(&self) -> Props {
        self.memoized_props.as_object().cloned().unwrap_or_default()
    }

    /// Pending props as an object, empty when not one
    pub fn pending(&self) -> Props {
        self.pending_props.as_object().cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Version {
    Primary,
    Alternate,
}

#[derive(Debug)]
struct FiberSlot {
    primary: Fiber,
    alternate: Option<Fiber>,
    current: Version,
}

impl FiberSlot {
    fn current(&self) -> &Fiber {
        match (self.current, &self.alternate) {
            (Version::Alternate, Some(alternate)) => alternate,
            _ => &self.primary,
        }
    }

    fn current_mut(&mut self) -> &mut Fiber {
        match (self.current, &mut self.alternate) {
            (Version::Alternate, Some(alternate)) => alternate,
            _ => &mut self.primary,
        }
    }

    fn work_in_progress(&self) -> Option<&Fiber> {
        match self.current {
            Version::Primary => self.alternate.as_ref(),
            Version::Alternate => Some(&self.primary),
        }
    }
}

/// Arena of fiber positions
#[derive(Debug, Default)]
pub struct FiberArena {
    slots: Vec<FiberSlot>,
    root_id: Option<FiberId>,
}

impl FiberArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a position holding `fiber` as its committed version
    pub fn add(&mut self, fiber: Fiber) -> FiberId {
        let fiber_id = self.slots.len() as FiberId;
        self.slots.push(FiberSlot {
            primary: fiber,
            alternate: None,
            current: Version::Primary,
        });
        fiber_id
    }

    /// Committed version of a position
    pub fn get(&self, fiber_id: FiberId) -> Result<&Fiber> {
        self.slots
            .get(fiber_id as usize)
            .map(FiberSlot::current)
            .ok_or(TreeError::FiberNotFound(fiber_id))
    }

    /// Committed version of a position (mutable)
    pub fn get_mut(&mut self, fiber_id: FiberId) -> Result<&mut Fiber> {
        self.slots
            .get_mut(fiber_id as usize)
            .map(FiberSlot::current_mut)
            .ok_or(TreeError::FiberNotFound(fiber_id))
    }

    /// Uncommitted version of a position, if one is staged
    pub fn work_in_progress(&self, fiber_id: FiberId) -> Result<Option<&Fiber>> {
        self.slots
            .get(fiber_id as usize)
            .map(FiberSlot::work_in_progress)
            .ok_or(TreeError::FiberNotFound(fiber_id))
    }

    /// Write the next version of a position without making it visible
    pub fn stage(&mut self, fiber_id: FiberId, fiber: Fiber) -> Result<()> {
        let slot = self
            .slots
            .get_mut(fiber_id as usize)
            .ok_or(TreeError::FiberNotFound(fiber_id))?;
        match slot.current {
            Version::Primary => slot.alternate = Some(fiber),
            Version::Alternate => slot.primary = fiber,
        }
        Ok(())
    }

    /// Make the staged version of a position the committed one.
    /// Returns false when nothing was staged.
    pub fn commit(&mut self, fiber_id: FiberId) -> Result<bool> {
        let slot = self
            .slots
            .get_mut(fiber_id as usize)
            .ok_or(TreeError::FiberNotFound(fiber_id))?;
        match (slot.current, slot.alternate.is_some()) {
            (Version::Primary, true) => slot.current = Version::Alternate,
            (Version::Alternate, _) => slot.current = Version::Primary,
            (Version::Primary, false) => return Ok(false),
        }
        Ok(true)
    }

    /// Append `child` to the end of `parent`'s child list (committed versions)
    pub fn append_child(&mut self, parent_id: FiberId, child_id: FiberId) -> Result<()> {
        let last = self.sibling_ids(self.get(parent_id)?.child)?.last().copied();
        match last {
            Some(last_id) => self.get_mut(last_id)?.sibling = Some(child_id),
            None => self.get_mut(parent_id)?.child = Some(child_id),
        }
        self.get_mut(child_id)?.parent = Some(parent_id);
        Ok(())
    }

    /// Add `fiber` and append it under `parent_id`
    pub fn add_child(&mut self, parent_id: FiberId, fiber: Fiber) -> Result<FiberId> {
        let child_id = self.add(fiber);
        self.append_child(parent_id, child_id)?;
        Ok(child_id)
    }

    /// Positions of a sibling chain, in order
    pub fn sibling_ids(&self, first: Option<FiberId>) -> Result<SmallVec<[FiberId; 4]>> {
        let mut ids = SmallVec::new();
        let mut cursor = first;

        while let Some(fiber_id) = cursor {
            if ids.len() > self.slots.len() {
                return Err(TreeError::SiblingCycle(first.unwrap_or(fiber_id)));
            }
            ids.push(fiber_id);
            cursor = self.get(fiber_id)?.sibling;
        }

        Ok(ids)
    }

    /// Set root fiber
    pub fn set_root(&mut self, fiber_id: FiberId) -> Result<()> {
        self.get(fiber_id)?;
        self.root_id = Some(fiber_id);
        Ok(())
    }

    /// Get root fiber ID
    pub fn root_id(&self) -> Option<FiberId> {
        self.root_id
    }

    /// Total number of positions
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Depth-first walk over committed versions (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: FiberId, mut visit: F) -> Result<()>
    where
        F: FnMut(FiberId, &Fiber) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(fiber_id) = stack.pop() {
            let fiber = self.get(fiber_id)?;
            visit(fiber_id, fiber)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in self.sibling_ids(fiber.child)?.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Positions whose committed version matches `predicate`
    pub fn find<F>(&self, predicate: F) -> Vec<FiberId>
    where
        F: Fn(&Fiber) -> bool,
    {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| predicate(slot.current()))
            .map(|(idx, _)| idx as FiberId)
            .collect()
    }

    /// Drop every position (reuse allocation)
    pub fn clear(&mut self) {
        self.slots.clear();
        self.root_id = None;
    }
}
