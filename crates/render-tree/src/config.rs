//! Renderer configuration

use crate::error::{Result, TreeError};
use crate::tags::FiberTagTable;
use serde::{Deserialize, Serialize};

/// Which renderer the surrounding adapter is building
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Mount,
    Shallow,
    String,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Mount => "mount",
            RenderMode::Shallow => "shallow",
            RenderMode::String => "string",
        }
    }
}

/// Options shared by every renderer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Substitute the fallback for lazy children of `Suspense` (shallow only)
    pub suspense_fallback: Option<bool>,
    pub tags: FiberTagTable,
}

impl RenderOptions {
    pub fn with_tags(mut self, tags: FiberTagTable) -> Self {
        self.tags = tags;
        self
    }

    /// Reject options the given mode cannot honor, before anything renders
    pub fn validate(&self, mode: RenderMode) -> Result<()> {
        if self.suspense_fallback.is_some() && mode != RenderMode::Shallow {
            return Err(TreeError::UnsupportedOption {
                option: "suspenseFallback",
                mode: mode.as_str(),
            });
        }
        self.tags.validate()
    }
}
