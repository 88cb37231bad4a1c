//! Dual-domain timer scheduling.
//!
//! Timers live in one of two time-ordered collections, one per
//! [`TimeDomain`]. Entries are keyed by `(fire_time, sequence)` where the
//! sequence number is a monotonically increasing insertion counter: two
//! timers with an identical fire time are processed in the order they were
//! set, deterministically across runs and platforms.
//!
//! The service is clock-agnostic. Callers pass the current clock value of
//! the relevant domain; the [`Director`](crate::frame::Director) feeds it
//! elapsed simulation time and elapsed real time each frame.

use std::collections::BTreeMap;

use tracing::debug;

use stagehand_types::{
    ActorId, MachineId, Message, MessageKind, MessagePayload, TimerPayload,
};

use crate::clock::{seconds_to_us, us_to_seconds};

/// Which clock a timer is scheduled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeDomain {
    /// The real (wall-elapsed) clock; keeps ticking while paused.
    Real,
    /// The simulated clock; frozen while paused.
    Simulation,
}

/// Ordering key: absolute fire time, then insertion sequence.
type TimerKey = (i64, u64);

/// One scheduled timer.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TimerEntry {
    /// The name carried in the elapsed message and used by `clear_timer`.
    name: String,
    /// The actor the elapsed message is about, if any.
    about_actor: Option<ActorId>,
    /// Interval between firings, microseconds.
    interval_us: i64,
    /// Whether the timer re-arms after firing.
    repeat: bool,
}

/// Two time-ordered collections of scheduled timers.
#[derive(Debug, Default)]
pub struct TimerService {
    real: BTreeMap<TimerKey, TimerEntry>,
    sim: BTreeMap<TimerKey, TimerEntry>,
    /// Next insertion sequence, shared across domains.
    next_seq: u64,
}

impl TimerService {
    /// Create a service with no timers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer.
    ///
    /// The absolute fire time is `now_us + duration_seconds` converted to
    /// microseconds; `now_us` must be the current clock value of the
    /// chosen domain. Non-positive durations fire on the next
    /// `process_due` call.
    pub fn set_timer(
        &mut self,
        name: impl Into<String>,
        about_actor: Option<ActorId>,
        duration_seconds: f64,
        repeat: bool,
        domain: TimeDomain,
        now_us: i64,
    ) {
        let name = name.into();
        let interval_us = seconds_to_us(duration_seconds);
        let fire_at_us = now_us.saturating_add(interval_us);
        let seq = self.alloc_seq();
        debug!(
            timer = %name,
            ?domain,
            fire_at_us,
            repeat,
            "Timer set"
        );
        self.map_mut(domain).insert(
            (fire_at_us, seq),
            TimerEntry {
                name,
                about_actor,
                interval_us,
                repeat,
            },
        );
    }

    /// Remove scheduled timers by name.
    ///
    /// With `about_actor = None`, every entry with this name is removed
    /// regardless of target; otherwise only entries matching both name and
    /// target. Returns the number of entries removed from both domains.
    pub fn clear_timer(&mut self, name: &str, about_actor: Option<ActorId>) -> usize {
        let mut removed: usize = 0;
        for map in [&mut self.real, &mut self.sim] {
            let before = map.len();
            map.retain(|_, entry| {
                entry.name != name
                    || about_actor.is_some_and(|target| entry.about_actor != Some(target))
            });
            removed = removed.saturating_add(before.saturating_sub(map.len()));
        }
        if removed > 0 {
            debug!(timer = %name, removed, "Timers cleared");
        }
        removed
    }

    /// Fire every timer of a domain whose fire time is due.
    ///
    /// Scans the earliest entries while `fire_time <= now_us`; the
    /// ordering guarantees nothing past the first future entry can be due.
    /// Each due timer produces one timer-elapsed message carrying its
    /// name, target actor, and how late it fired in seconds. Repeating
    /// timers are re-inserted with `next fire = scheduled + interval`
    /// *after* the scan completes, so a just-fired repeating timer is
    /// never re-processed within the same call.
    pub fn process_due(
        &mut self,
        domain: TimeDomain,
        now_us: i64,
        source: MachineId,
    ) -> Vec<Message> {
        let Self {
            real,
            sim,
            next_seq,
        } = self;
        let map = match domain {
            TimeDomain::Real => real,
            TimeDomain::Simulation => sim,
        };

        let due_keys: Vec<TimerKey> = map
            .keys()
            .take_while(|(fire_at_us, _)| *fire_at_us <= now_us)
            .copied()
            .collect();

        let mut messages = Vec::with_capacity(due_keys.len());
        let mut requeue: Vec<(i64, TimerEntry)> = Vec::new();

        for key in due_keys {
            let (scheduled_us, _) = key;
            let Some(entry) = map.remove(&key) else {
                continue;
            };

            let late_seconds = us_to_seconds(now_us.saturating_sub(scheduled_us));
            let mut message = Message::new(MessageKind::TimerElapsed, source).with_payload(
                MessagePayload::Timer(TimerPayload {
                    timer_name: entry.name.clone(),
                    late_seconds,
                }),
            );
            if let Some(about) = entry.about_actor {
                message = message.with_about_actor(about);
            }
            messages.push(message);

            if entry.repeat {
                let next_fire_us = scheduled_us.saturating_add(entry.interval_us);
                requeue.push((next_fire_us, entry));
            }
        }

        for (fire_at_us, entry) in requeue {
            let seq = *next_seq;
            *next_seq = next_seq.wrapping_add(1);
            map.insert((fire_at_us, seq), entry);
        }

        messages
    }

    /// Number of timers scheduled in a domain.
    pub fn len(&self, domain: TimeDomain) -> usize {
        self.map(domain).len()
    }

    /// Whether both domains are empty.
    pub fn is_empty(&self) -> bool {
        self.real.is_empty() && self.sim.is_empty()
    }

    /// Whether any timer with this name is scheduled, in either domain.
    pub fn has_timer(&self, name: &str) -> bool {
        self.real.values().any(|entry| entry.name == name)
            || self.sim.values().any(|entry| entry.name == name)
    }

    const fn map(&self, domain: TimeDomain) -> &BTreeMap<TimerKey, TimerEntry> {
        match domain {
            TimeDomain::Real => &self.real,
            TimeDomain::Simulation => &self.sim,
        }
    }

    const fn map_mut(&mut self, domain: TimeDomain) -> &mut BTreeMap<TimerKey, TimerEntry> {
        match domain {
            TimeDomain::Real => &mut self.real,
            TimeDomain::Simulation => &mut self.sim,
        }
    }

    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        seq
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use stagehand_types::TimerPayload;

    use super::*;

    fn timer_payload(message: &Message) -> &TimerPayload {
        match &message.payload {
            MessagePayload::Timer(payload) => payload,
            other => panic!("expected timer payload, got {other:?}"),
        }
    }

    #[test]
    fn repeating_timer_fires_once_per_second() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        timers.set_timer("T", None, 1.0, true, TimeDomain::Simulation, 0);

        for now_us in [1_000_000_i64, 2_000_000, 3_000_000] {
            let messages = timers.process_due(TimeDomain::Simulation, now_us, source);
            assert_eq!(messages.len(), 1, "exactly one firing at {now_us}");
            let payload = timer_payload(messages.first().unwrap());
            assert_eq!(payload.timer_name, "T");
            assert!(payload.late_seconds.abs() < f64::EPSILON);
            assert!(timers.has_timer("T"), "timer remains scheduled");
        }
    }

    #[test]
    fn one_shot_timer_is_removed_after_firing() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        timers.set_timer("once", None, 0.5, false, TimeDomain::Real, 0);

        let messages = timers.process_due(TimeDomain::Real, 600_000, source);
        assert_eq!(messages.len(), 1);
        assert!(!timers.has_timer("once"));
        assert!(timers.process_due(TimeDomain::Real, 10_000_000, source).is_empty());
    }

    #[test]
    fn late_time_reflects_processing_delay() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        timers.set_timer("late", None, 1.0, false, TimeDomain::Simulation, 0);

        let messages = timers.process_due(TimeDomain::Simulation, 1_250_000, source);
        let payload = timer_payload(messages.first().unwrap());
        assert!((payload.late_seconds - 0.25).abs() < 1e-9);
    }

    #[test]
    fn future_timers_do_not_fire() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        timers.set_timer("soon", None, 2.0, false, TimeDomain::Simulation, 0);

        assert!(timers.process_due(TimeDomain::Simulation, 1_999_999, source).is_empty());
        assert_eq!(timers.len(TimeDomain::Simulation), 1);
    }

    #[test]
    fn equal_fire_times_process_in_insertion_order() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        timers.set_timer("first", None, 1.0, false, TimeDomain::Simulation, 0);
        timers.set_timer("second", None, 1.0, false, TimeDomain::Simulation, 0);

        let messages = timers.process_due(TimeDomain::Simulation, 1_000_000, source);
        let names: Vec<&str> = messages
            .iter()
            .map(|message| timer_payload(message).timer_name.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn clear_by_name_removes_all_targets() {
        let mut timers = TimerService::new();
        let actor_a = ActorId::new();
        let actor_b = ActorId::new();
        timers.set_timer("T", Some(actor_a), 1.0, false, TimeDomain::Simulation, 0);
        timers.set_timer("T", Some(actor_b), 1.0, false, TimeDomain::Simulation, 0);

        assert_eq!(timers.clear_timer("T", None), 2);
        assert!(timers.is_empty());
    }

    #[test]
    fn clear_by_actor_removes_only_matching_target() {
        let mut timers = TimerService::new();
        let actor_a = ActorId::new();
        let actor_b = ActorId::new();
        timers.set_timer("T", Some(actor_a), 1.0, false, TimeDomain::Simulation, 0);
        timers.set_timer("T", Some(actor_b), 1.0, false, TimeDomain::Simulation, 0);

        assert_eq!(timers.clear_timer("T", Some(actor_a)), 1);
        assert_eq!(timers.len(TimeDomain::Simulation), 1);

        let source = MachineId::new();
        let messages = timers.process_due(TimeDomain::Simulation, 1_000_000, source);
        assert_eq!(messages.first().unwrap().about_actor, Some(actor_b));
    }

    #[test]
    fn domains_are_independent() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        timers.set_timer("real", None, 1.0, false, TimeDomain::Real, 0);
        timers.set_timer("sim", None, 1.0, false, TimeDomain::Simulation, 0);

        let messages = timers.process_due(TimeDomain::Real, 5_000_000, source);
        assert_eq!(messages.len(), 1);
        assert_eq!(timer_payload(messages.first().unwrap()).timer_name, "real");
        assert_eq!(timers.len(TimeDomain::Simulation), 1);
    }

    #[test]
    fn elapsed_message_carries_about_actor() {
        let mut timers = TimerService::new();
        let source = MachineId::new();
        let actor = ActorId::new();
        timers.set_timer("T", Some(actor), 1.0, false, TimeDomain::Simulation, 0);

        let messages = timers.process_due(TimeDomain::Simulation, 1_000_000, source);
        let message = messages.first().unwrap();
        assert_eq!(message.kind, MessageKind::TimerElapsed);
        assert_eq!(message.about_actor, Some(actor));
        assert_eq!(message.source, source);
    }
}
