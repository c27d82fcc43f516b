//! Fiber tag table
//!
//! The host engine tags every internal node with a small integer. The
//! numbers move between engine versions; the roles do not. `FiberKind` is
//! the closed set of roles, `FiberTagTable` maps numbers to roles and is
//! supplied once at startup (from version detection or a JSON file).

use crate::error::{Result, TreeError};
use serde::{Deserialize, Serialize};

/// Role of an internal node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FiberKind {
    HostRoot,
    ClassComponent,
    Fragment,
    FunctionComponent,
    MemoSfc,
    MemoClass,
    HostPortal,
    HostComponent,
    HostText,
    Mode,
    ContextConsumer,
    ContextProvider,
    ForwardRef,
    Profiler,
    Suspense,
    Lazy,
    Offscreen,
}

impl FiberKind {
    pub const ALL: [FiberKind; 17] = [
        FiberKind::HostRoot,
        FiberKind::ClassComponent,
        FiberKind::Fragment,
        FiberKind::FunctionComponent,
        FiberKind::MemoSfc,
        FiberKind::MemoClass,
        FiberKind::HostPortal,
        FiberKind::HostComponent,
        FiberKind::HostText,
        FiberKind::Mode,
        FiberKind::ContextConsumer,
        FiberKind::ContextProvider,
        FiberKind::ForwardRef,
        FiberKind::Profiler,
        FiberKind::Suspense,
        FiberKind::Lazy,
        FiberKind::Offscreen,
    ];

    /// Kinds that contribute no node of their own, only their children
    pub fn is_transparent(&self) -> bool {
        matches!(
            self,
            FiberKind::HostRoot
                | FiberKind::Fragment
                | FiberKind::Mode
                | FiberKind::ContextConsumer
                | FiberKind::ContextProvider
                | FiberKind::Lazy
        )
    }
}

/// Numeric tag for every `FiberKind`
///
/// Field names follow the engine's own naming so a detected table can be
/// loaded verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FiberTagTable {
    pub host_root: u32,
    pub class_component: u32,
    pub fragment: u32,
    pub functional_component: u32,
    #[serde(rename = "MemoSFC")]
    pub memo_sfc: u32,
    pub memo_class: u32,
    pub host_portal: u32,
    pub host_component: u32,
    pub host_text: u32,
    pub mode: u32,
    pub context_consumer: u32,
    pub context_provider: u32,
    pub forward_ref: u32,
    pub profiler: u32,
    pub suspense: u32,
    pub lazy: u32,
    pub offscreen_component: u32,
}

impl Default for FiberTagTable {
    /// Tags of the 18.x engine line
    fn default() -> Self {
        Self {
            host_root: 3,
            class_component: 1,
            fragment: 7,
            functional_component: 0,
            memo_sfc: 15,
            memo_class: 14,
            host_portal: 4,
            host_component: 5,
            host_text: 6,
            mode: 8,
            context_consumer: 9,
            context_provider: 10,
            forward_ref: 11,
            profiler: 12,
            suspense: 13,
            lazy: 16,
            offscreen_component: 22,
        }
    }
}

impl FiberTagTable {
    /// Parse and validate a table from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let table: FiberTagTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Every tag must identify exactly one kind
    pub fn validate(&self) -> Result<()> {
        let entries = self.entries();
        for (i, (tag, _)) in entries.iter().enumerate() {
            if entries[i + 1..].iter().any(|(other, _)| other == tag) {
                return Err(TreeError::DuplicateTag(*tag));
            }
        }
        Ok(())
    }

    pub fn kind_of(&self, tag: u32) -> Option<FiberKind> {
        self.entries()
            .into_iter()
            .find(|(candidate, _)| *candidate == tag)
            .map(|(_, kind)| kind)
    }

    pub fn tag_of(&self, kind: FiberKind) -> u32 {
        match kind {
            FiberKind::HostRoot => self.host_root,
            FiberKind::ClassComponent => self.class_component,
            FiberKind::Fragment => self.fragment,
            FiberKind::FunctionComponent => self.functional_component,
            FiberKind::MemoSfc => self.memo_sfc,
            FiberKind::MemoClass => self.memo_class,
            FiberKind::HostPortal => self.host_portal,
            FiberKind::HostComponent => self.host_component,
            FiberKind::HostText => self.host_text,
            FiberKind::Mode => self.mode,
            FiberKind::ContextConsumer => self.context_consumer,
            FiberKind::ContextProvider => self.context_provider,
            FiberKind::ForwardRef => self.forward_ref,
            FiberKind::Profiler => self.profiler,
            FiberKind::Suspense => self.suspense,
            FiberKind::Lazy => self.lazy,
            FiberKind::Offscreen => self.offscreen_component,
        }
    }

    fn entries(&self) -> [(u32, FiberKind); 17] {
        FiberKind::ALL.map(|kind| (self.tag_of(kind), kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_round_trips_every_kind() {
        let table = FiberTagTable::default();
        table.validate().unwrap();
        for kind in FiberKind::ALL {
            assert_eq!(table.kind_of(table.tag_of(kind)), Some(kind));
        }
        assert_eq!(table.kind_of(2), None);
    }

    #[test]
    fn test_from_json() {
        let mut json = serde_json::to_value(FiberTagTable::default()).unwrap();
        assert_eq!(json["MemoSFC"], 15);
        json["OffscreenComponent"] = serde_json::json!(23);

        let table = FiberTagTable::from_json(&json.to_string()).unwrap();
        assert_eq!(table.kind_of(23), Some(FiberKind::Offscreen));
        assert_eq!(table.kind_of(22), None);
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let mut json = serde_json::to_value(FiberTagTable::default()).unwrap();
        json["Lazy"] = serde_json::json!(5);

        let err = FiberTagTable::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, TreeError::DuplicateTag(5)));
    }
}
