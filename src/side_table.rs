//! Per-agent storage for scenario state.
//!
//! Scenarios keep their own bookkeeping (state machine labels, timers,
//! render handles) here, indexed by agent id, instead of on the agent. The
//! steering engine never looks at it.

use std::collections::BTreeMap;

use crate::structs::AgentId;

/// Entries are kept in id order, so `iter` walks agents the same way the
/// crowd does.
#[derive(Debug, Clone)]
pub struct SideTable<T> {
    entries: BTreeMap<AgentId, T>,
}

impl<T> Default for SideTable<T> {
    fn default() -> Self {
        SideTable {
            entries: BTreeMap::new(),
        }
    }
}

impl<T> SideTable<T> {
    pub fn new() -> Self {
        SideTable::default()
    }

    /// Stores `value` for `id`, returning the previous entry.
    pub fn insert(&mut self, id: AgentId, value: T) -> Option<T> {
        self.entries.insert(id, value)
    }

    pub fn get(&self, id: AgentId) -> Option<&T> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    pub fn remove(&mut self, id: AgentId) -> Option<T> {
        self.entries.remove(&id)
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &T)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }
}
