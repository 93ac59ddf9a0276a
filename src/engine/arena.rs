use crate::types::AgentId;

use super::agent_system::Agent;

/// Slot storage for live agents. An id is `base` plus its slot index; ids are
/// never handed out twice in one arena, so a handle held across a removal or a
/// compaction stays dead.
#[derive(Clone, Debug, Default)]
pub struct AgentArena {
    slots: Vec<Option<Agent>>,
    base: usize,
    live: usize,
}

impl AgentArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_with(&mut self, build: impl FnOnce(AgentId) -> Agent) -> AgentId {
        let id = AgentId(self.base + self.slots.len());
        self.slots.push(Some(build(id)));
        self.live += 1;
        id
    }

    fn slot(&self, id: AgentId) -> Option<usize> {
        id.0.checked_sub(self.base)
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.slots.get(self.slot(id)?).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let slot = self.slot(id)?;
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Agent> {
        let slot = self.slot(id)?;
        let removed = self.slots.get_mut(slot).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.iter().map(|agent| agent.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Drops every slot, live or not.
    pub fn clear(&mut self) {
        self.base += self.slots.len();
        self.slots.clear();
        self.live = 0;
    }

    /// Releases the slots of an arena whose agents are all dead.
    pub fn compact(&mut self) {
        if self.live == 0 {
            self.clear();
        }
    }
}
