#![forbid(unsafe_code)]

//! Panel id generation.

use fdeck_core::id::PanelId;

/// Source of fresh panel ids for panels created without an explicit id.
pub trait IdGenerator {
    fn next_id(&mut self) -> PanelId;
}

/// Random v4 UUIDs, the default.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> PanelId {
        PanelId::from(uuid::Uuid::new_v4().to_string())
    }
}

/// Deterministic `prefix-1`, `prefix-2`, ... ids.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("panel")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> PanelId {
        let id = PanelId::from(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
