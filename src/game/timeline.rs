// Copyright 2023 Tobin Edwards
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.


use serde::{Deserialize, Serialize};
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

/// Generation counter bumped on every reset. A deliberation scheduled in an
/// earlier epoch is stale and must not be applied.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A pending computer move: when it is due and the epoch it belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Deliberation {
    pub due: Duration,
    pub epoch: Epoch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tick,
    Deliberation(Deliberation),
}

/// Virtual time for a session. Nothing happens until the owner advances it,
/// so the clock and the computer's delay are fully deterministic.
#[derive(Debug, Clone)]
pub struct Timeline {
    now: Duration,
    next_tick: Duration,
    pending: Option<Deliberation>,
    epoch: Epoch,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_tick: TICK,
            pending: None,
            epoch: Epoch::default(),
        }
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }
    #[inline]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
    #[inline]
    pub fn pending(&self) -> Option<Deliberation> {
        self.pending
    }

    /// Starts a new epoch: drops any pending deliberation and restarts the
    /// one-second tick from the current instant.
    pub fn restart(&mut self) -> Epoch {
        self.epoch = self.epoch.next();
        self.pending = None;
        self.next_tick = self.now + TICK;
        self.epoch
    }

    pub fn schedule(&mut self, delay: Duration) -> Deliberation {
        let deliberation = Deliberation {
            due: self.now + delay,
            epoch: self.epoch,
        };
        self.pending = Some(deliberation);
        deliberation
    }

    /// Clears the pending deliberation if it is `token`. Returns whether it
    /// was.
    pub fn settle(&mut self, token: Deliberation) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Returns the next event due no later than `until` and moves the
    /// current instant to it. A tick due at the same instant as a
    /// deliberation comes first. A deliberation stays pending until its
    /// owner settles it.
    pub fn next_event(&mut self, until: Duration) -> Option<Event> {
        let tick_first = match self.pending {
            Some(deliberation) => self.next_tick <= deliberation.due,
            None => true,
        };
        if tick_first {
            if self.next_tick > until {
                return None;
            }
            self.now = self.next_tick;
            self.next_tick += TICK;
            return Some(Event::Tick);
        }
        let deliberation = self.pending.filter(|d| d.due <= until)?;
        self.now = deliberation.due;
        Some(Event::Deliberation(deliberation))
    }

    /// Moves the current instant forward to `until` once its events have
    /// been drained.
    pub fn finish(&mut self, until: Duration) {
        if until > self.now {
            self.now = until;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timeline: &mut Timeline, until: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = timeline.next_event(until) {
            if let Event::Deliberation(token) = event {
                assert!(timeline.settle(token));
            }
            events.push(event);
        }
        timeline.finish(until);
        events
    }

    #[test]
    fn test_ticks_once_per_second() {
        let mut timeline = Timeline::new();
        let events = drain(&mut timeline, Duration::from_millis(3500));
        assert_eq!(events, vec![Event::Tick; 3]);
        assert_eq!(timeline.now(), Duration::from_millis(3500));
        let events = drain(&mut timeline, Duration::from_millis(4000));
        assert_eq!(events, vec![Event::Tick]);
    }
    #[test]
    fn test_deliberation_fires_when_due() {
        let mut timeline = Timeline::new();
        let token = timeline.schedule(Duration::from_millis(500));
        assert!(drain(&mut timeline, Duration::from_millis(499)).is_empty());
        let events = drain(&mut timeline, Duration::from_millis(500));
        assert_eq!(events, vec![Event::Deliberation(token)]);
        assert_eq!(timeline.pending(), None);
        assert!(!timeline.settle(token));
    }
    #[test]
    fn test_deliberation_stays_pending_until_settled() {
        let mut timeline = Timeline::new();
        let token = timeline.schedule(Duration::from_millis(200));
        let until = Duration::from_millis(300);
        assert_eq!(timeline.next_event(until), Some(Event::Deliberation(token)));
        assert_eq!(timeline.pending(), Some(token));
        assert_eq!(timeline.now(), Duration::from_millis(200));
        assert!(timeline.settle(token));
        assert_eq!(timeline.next_event(until), None);
    }
    #[test]
    fn test_tick_precedes_deliberation_at_same_instant() {
        let mut timeline = Timeline::new();
        let token = timeline.schedule(Duration::from_secs(1));
        let events = drain(&mut timeline, Duration::from_secs(1));
        assert_eq!(events, vec![Event::Tick, Event::Deliberation(token)]);
    }
    #[test]
    fn test_restart_drops_pending() {
        let mut timeline = Timeline::new();
        let token = timeline.schedule(Duration::from_secs(1));
        drain(&mut timeline, Duration::from_millis(400));
        let epoch = timeline.restart();
        assert_ne!(epoch, token.epoch);
        assert_eq!(timeline.pending(), None);
        assert!(!timeline.settle(token));
        // the tick restarts from the reset instant
        assert!(drain(&mut timeline, Duration::from_millis(1399)).is_empty());
        assert_eq!(drain(&mut timeline, Duration::from_millis(1400)), vec![Event::Tick]);
    }
}
