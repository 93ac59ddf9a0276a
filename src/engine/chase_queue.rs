use std::collections::VecDeque;

use crate::types::AgentId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChaseSlot {
    Granted,
    Waiting,
}

/// Designated chaser plus a FIFO of agents waiting for the slot.
#[derive(Clone, Debug, Default)]
pub struct ChaseQueue {
    current: Option<AgentId>,
    waiting: VecDeque<AgentId>,
}

impl ChaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<AgentId> {
        self.current
    }

    pub fn waiting(&self) -> impl Iterator<Item = &AgentId> {
        self.waiting.iter()
    }

    pub fn is_waiting(&self, id: AgentId) -> bool {
        self.waiting.contains(&id)
    }

    pub fn request(&mut self, id: AgentId, throttle: bool) -> ChaseSlot {
        match self.current {
            None => {
                self.waiting.retain(|queued| *queued != id);
                self.current = Some(id);
                ChaseSlot::Granted
            }
            Some(current) if current == id => ChaseSlot::Granted,
            Some(_) if !throttle => ChaseSlot::Granted,
            Some(_) => {
                if !self.waiting.contains(&id) {
                    self.waiting.push_back(id);
                }
                ChaseSlot::Waiting
            }
        }
    }

    /// Drops `id` from the queue. Returns the promoted agent when `id` held the
    /// designated slot and someone was waiting.
    pub fn release(&mut self, id: AgentId) -> Option<AgentId> {
        if self.current == Some(id) {
            self.current = self.waiting.pop_front();
            return self.current;
        }
        self.waiting.retain(|queued| *queued != id);
        None
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.waiting.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{ChaseQueue, ChaseSlot};
    use crate::types::AgentId;

    #[test]
    fn releasing_current_promotes_queue_head() {
        let mut queue = ChaseQueue::new();
        assert_eq!(queue.request(AgentId(1), true), ChaseSlot::Granted);
        assert_eq!(queue.request(AgentId(2), true), ChaseSlot::Waiting);
        assert_eq!(queue.request(AgentId(3), true), ChaseSlot::Waiting);
        assert_eq!(queue.request(AgentId(2), true), ChaseSlot::Waiting);
        assert_eq!(queue.waiting().count(), 2);

        assert_eq!(queue.release(AgentId(1)), Some(AgentId(2)));
        assert_eq!(queue.current(), Some(AgentId(2)));
        assert_eq!(queue.release(AgentId(2)), Some(AgentId(3)));
        assert_eq!(queue.release(AgentId(3)), None);
        assert_eq!(queue.current(), None);
    }

    #[test]
    fn releasing_a_waiting_agent_only_removes_it() {
        let mut queue = ChaseQueue::new();
        queue.request(AgentId(1), true);
        queue.request(AgentId(2), true);
        queue.request(AgentId(3), true);

        assert_eq!(queue.release(AgentId(2)), None);
        assert!(!queue.is_waiting(AgentId(2)));
        assert_eq!(queue.current(), Some(AgentId(1)));
        assert_eq!(queue.release(AgentId(1)), Some(AgentId(3)));
    }

    #[test]
    fn unknown_release_is_noop() {
        let mut queue = ChaseQueue::new();
        queue.request(AgentId(4), false);
        assert_eq!(queue.release(AgentId(9)), None);
        assert_eq!(queue.current(), Some(AgentId(4)));
    }

    #[test]
    fn unthrottled_requests_are_all_granted() {
        let mut queue = ChaseQueue::new();
        for id in 0..5 {
            assert_eq!(queue.request(AgentId(id), false), ChaseSlot::Granted);
        }
        assert_eq!(queue.current(), Some(AgentId(0)));
        assert_eq!(queue.waiting().count(), 0);
    }
}
