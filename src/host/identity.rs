//! Widget Identity Allocator.
//!
//! Hands out a sequential index per element kind. Counters are scoped to one
//! allocation cycle; the host starts a new cycle when a commit finishes, so
//! an allocated identity is stable across frames for as long as the node
//! keeps its position among same-kind nodes in traversal order. Widgets that
//! move around need an explicit `id` property instead.

use std::collections::HashMap;

use super::node::{ElementKind, Identity};

/// Per-kind sequential identity counters.
#[derive(Debug, Default)]
pub struct IdentityAllocator {
    counters: HashMap<ElementKind, u32>,
    cycle: u64,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next identity for `kind` in the current cycle.
    pub fn next(&mut self, kind: ElementKind) -> Identity {
        let counter = self.counters.entry(kind).or_insert(0);
        let index = *counter;
        *counter += 1;
        Identity::Allocated { kind, index }
    }

    /// Start a new cycle: every counter returns to zero.
    pub fn reset(&mut self) {
        self.counters.clear();
        self.cycle += 1;
    }

    /// Number of completed resets.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// How many identities of `kind` were handed out this cycle.
    pub fn issued(&self, kind: ElementKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }
}
