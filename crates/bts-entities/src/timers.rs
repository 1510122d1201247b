use std::collections::HashMap;
use std::time::{Duration, Instant};

use bts_core::BtsNr;
use bts_core::bts_entities::BtsEntity;

/// Cooperative one-shot timers. They fire only when the event loop gets to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Delayed process exit after a shutdown request
    Shutdown,
    /// Periodic CCCH load indication of one BTS
    LoadInd(BtsNr),
}

impl TimerId {
    /// Entity that handles expiry. None means the router handles it.
    pub fn owner(self) -> Option<BtsEntity> {
        match self {
            TimerId::Shutdown => None,
            TimerId::LoadInd(_) => Some(BtsEntity::Bts),
        }
    }
}

#[derive(Default)]
pub struct Timers {
    pending: HashMap<TimerId, Instant>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms a timer, replacing any pending deadline for the same id
    pub fn schedule(&mut self, id: TimerId, delay: Duration) {
        self.schedule_at(id, Instant::now() + delay);
    }

    pub fn schedule_at(&mut self, id: TimerId, deadline: Instant) {
        tracing::trace!("schedule {:?} at {:?}", id, deadline);
        self.pending.insert(id, deadline);
    }

    /// Returns true if the timer was pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn deadline(&self, id: TimerId) -> Option<Instant> {
        self.pending.get(&id).copied()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns all timers due at `now`, earliest first
    pub fn take_expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut expired: Vec<(TimerId, Instant)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*id, *deadline))
            .collect();
        expired.sort_by_key(|(_, deadline)| *deadline);
        for (id, _) in &expired {
            self.pending.remove(id);
        }
        expired.into_iter().map(|(id, _)| id).collect()
    }
}
