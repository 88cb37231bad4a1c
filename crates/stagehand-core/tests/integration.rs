//! End-to-end scenario tests for the `stagehand-core` frame driver.
//!
//! These stand up a full [`Director`] with a real factory, components, and
//! actors, then run multi-frame scenarios exercising the complete frame
//! cycle: outbound drain, tick pair, timers, local dispatch, and deferred
//! deletion.

// Integration tests use expect/unwrap extensively for clarity -- panicking
// on failure is the correct behavior in test code.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::items_after_statements,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use std::cell::RefCell;
use std::rc::Rc;

use stagehand_core::{
    ActorFactory, ActorProxy, Component, CoreError, Director, FrameClock, Outbox,
};
use stagehand_types::{
    ActorKind, ActorTypeDesc, ComponentPriority, Message, MessageKind, MessagePayload,
};

/// One simulated frame at 60 Hz, in microseconds.
const FRAME_US: i64 = 16_667;

// =============================================================================
// Helper: a factory with one game type and one passive type
// =============================================================================

struct DemoFactory;

impl ActorFactory for DemoFactory {
    fn create_proxy(&self, actor_type: &str) -> Result<ActorProxy, CoreError> {
        match actor_type {
            "Sentry" => {
                let desc = ActorTypeDesc::new("Sentry", "demo", "A game actor that reacts");
                Ok(
                    ActorProxy::new("sentry", desc, ActorKind::Game).with_invokable_builder(
                        Box::new(|proxy| {
                            let pings = Rc::new(RefCell::new(0_u32));
                            let pings_in = Rc::clone(&pings);
                            proxy.register_invokable(
                                "OnPing",
                                Box::new(move |_message, _outbox| {
                                    let mut count = pings_in.borrow_mut();
                                    *count = count.saturating_add(1);
                                }),
                            );
                            proxy.register_handler(MessageKind::custom("Ping"), "OnPing");
                        }),
                    ),
                )
            }
            "Prop" => {
                let desc = ActorTypeDesc::new("Prop", "demo", "Inert scenery");
                Ok(ActorProxy::new("prop", desc, ActorKind::Passive))
            }
            other => Err(CoreError::UnknownActorType {
                actor_type: other.to_owned(),
            }),
        }
    }
}

/// Component recording every message kind it sees, in order.
struct Journal {
    log: Rc<RefCell<Vec<MessageKind>>>,
}

impl Component for Journal {
    fn name(&self) -> &str {
        "journal"
    }

    fn on_message(&mut self, message: &Message, _outbox: &mut Outbox) {
        self.log.borrow_mut().push(message.kind.clone());
    }
}

fn make_director() -> Director {
    let clock = FrameClock::with_epoch(1.0, 0).expect("valid time scale");
    Director::new(clock, Box::new(DemoFactory))
}

fn journaled(director: &mut Director) -> Rc<RefCell<Vec<MessageKind>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    director.add_component(
        Box::new(Journal {
            log: Rc::clone(&log),
        }),
        ComponentPriority::Normal,
    );
    log
}

fn kind_count(log: &Rc<RefCell<Vec<MessageKind>>>, kind: &MessageKind) -> usize {
    log.borrow().iter().filter(|k| *k == kind).count()
}

// =============================================================================
// Full-lifecycle scenarios
// =============================================================================

#[test]
fn actor_lifecycle_announcements_arrive_in_order() {
    let mut director = make_director();
    let log = journaled(&mut director);

    let proxy = director.create_actor("Sentry").expect("known type");
    let id = director.add_actor(proxy, false, true).expect("local add");
    director.pre_frame(FRAME_US, FRAME_US).expect("frame 1");
    director.post_frame();

    director.delete_actor(id).expect("registered");
    director.pre_frame(FRAME_US, FRAME_US).expect("frame 2");
    director.post_frame();

    let lifecycle: Vec<MessageKind> = log
        .borrow()
        .iter()
        .filter(|kind| {
            matches!(
                kind,
                MessageKind::ActorCreated | MessageKind::ActorPublished | MessageKind::ActorDeleted
            )
        })
        .cloned()
        .collect();
    assert_eq!(
        lifecycle,
        vec![
            MessageKind::ActorCreated,
            MessageKind::ActorPublished,
            MessageKind::ActorDeleted,
        ]
    );
    assert!(director.actor(id).is_none());
    assert_eq!(director.actor_count(), 0);
}

#[test]
fn factory_built_invokables_respond_to_targeted_messages() {
    let mut director = make_director();

    let proxy = director.create_actor("Sentry").expect("known type");
    assert!(proxy.has_invokable("OnPing"), "builder ran during create");
    let id = director.add_actor(proxy, false, false).expect("local add");

    // A Ping about the sentry reaches its own handler table.
    let seen = Rc::new(RefCell::new(0_u32));
    let seen_in = Rc::clone(&seen);
    director
        .actor_mut(id)
        .expect("registered")
        .register_invokable(
            "CountPing",
            Box::new(move |_message, _outbox| {
                let mut count = seen_in.borrow_mut();
                *count = count.saturating_add(1);
            }),
        );
    director
        .actor_mut(id)
        .expect("registered")
        .register_handler(MessageKind::custom("Ping"), "CountPing");

    let message = director
        .create_message(MessageKind::custom("Ping"))
        .with_about_actor(id);
    director.process_message(message);
    director.pre_frame(FRAME_US, FRAME_US).expect("frame");

    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn ticks_accumulate_simulated_time_under_scaling() {
    let clock = FrameClock::with_epoch(2.0, 0).expect("valid time scale");
    let mut director = Director::new(clock, Box::new(DemoFactory));
    let log = journaled(&mut director);

    for _ in 0..4 {
        let sim_delta = director.clock().scaled_delta_us(FRAME_US);
        director.pre_frame(sim_delta, FRAME_US).expect("frame");
        director.post_frame();
    }

    assert_eq!(kind_count(&log, &MessageKind::TickLocal), 4);
    assert_eq!(kind_count(&log, &MessageKind::TickRemote), 4);
    // Four frames of 16 667 us, doubled in the simulated domain.
    assert_eq!(director.clock().real_time_us(), 66_668);
    assert_eq!(director.clock().simulation_time_us(), 133_336);

    // Tick payloads report the scaled delta.
    let tick = log.borrow().iter().position(|k| *k == MessageKind::TickLocal);
    assert!(tick.is_some());
}

#[test]
fn repeating_simulation_timer_survives_pause_and_resume() {
    let mut director = make_director();
    let log = journaled(&mut director);

    director.set_timer("pulse", None, 0.05, true, false);

    // Three 50 ms frames: one firing each.
    for _ in 0..3 {
        director.pre_frame(50_000, 50_000).expect("frame");
        director.post_frame();
    }
    assert_eq!(kind_count(&log, &MessageKind::TimerElapsed), 3);

    // Paused frames freeze simulated time, so the timer goes quiet.
    director.set_paused(true);
    for _ in 0..3 {
        director.pre_frame(50_000, 50_000).expect("frame");
        director.post_frame();
    }
    assert_eq!(kind_count(&log, &MessageKind::TimerElapsed), 3);

    // Resuming picks the schedule back up.
    director.set_paused(false);
    director.pre_frame(50_000, 50_000).expect("frame");
    assert_eq!(kind_count(&log, &MessageKind::TimerElapsed), 4);
    assert!(director.has_timer("pulse"));
}

#[test]
fn real_time_timer_fires_while_paused() {
    let mut director = make_director();
    let log = journaled(&mut director);

    director.set_paused(true);
    director.set_timer("wall", None, 0.05, false, true);

    director.pre_frame(50_000, 50_000).expect("frame");
    assert_eq!(kind_count(&log, &MessageKind::TimerElapsed), 1);
    assert!(!director.has_timer("wall"));
}

#[test]
fn timer_payload_names_the_timer_and_target() {
    let mut director = make_director();

    let proxy = director.create_actor("Sentry").expect("known type");
    let id = director.add_actor(proxy, false, false).expect("local add");

    let captured: Rc<RefCell<Option<Message>>> = Rc::new(RefCell::new(None));
    let captured_in = Rc::clone(&captured);
    director
        .actor_mut(id)
        .expect("registered")
        .register_invokable(
            "OnAlarm",
            Box::new(move |message, _outbox| {
                *captured_in.borrow_mut() = Some(message.clone());
            }),
        );
    director.register_actor_listener(MessageKind::TimerElapsed, id, id, "OnAlarm");

    director.set_timer("alarm", Some(id), 0.05, false, false);
    director.pre_frame(50_000, 50_000).expect("frame");

    let message = captured.borrow().clone().expect("alarm delivered");
    assert_eq!(message.kind, MessageKind::TimerElapsed);
    assert_eq!(message.about_actor, Some(id));
    match message.payload {
        MessagePayload::Timer(payload) => {
            assert_eq!(payload.timer_name, "alarm");
            assert!(payload.late_seconds >= 0.0);
        }
        other => panic!("expected timer payload, got {other:?}"),
    }
}

#[test]
fn deletion_during_dispatch_still_delivers_remaining_messages() {
    let mut director = make_director();

    let first = director
        .add_actor(
            director.create_actor("Sentry").expect("known type"),
            false,
            false,
        )
        .expect("add");
    let second = director
        .add_actor(
            director.create_actor("Sentry").expect("known type"),
            false,
            false,
        )
        .expect("add");

    // The first actor's handler deletes nothing itself; we delete before
    // the frame and both queued messages must still reach both actors.
    let hits = Rc::new(RefCell::new(0_u32));
    for id in [first, second] {
        let hits_in = Rc::clone(&hits);
        director.actor_mut(id).expect("registered").register_invokable(
            "OnBlast",
            Box::new(move |_message, _outbox| {
                let mut count = hits_in.borrow_mut();
                *count = count.saturating_add(1);
            }),
        );
        director.register_global_listener(MessageKind::custom("Blast"), id, "OnBlast");
    }

    let blast = director.create_message(MessageKind::custom("Blast"));
    director.process_message(blast);
    director.delete_actor(first).expect("registered");

    director.pre_frame(FRAME_US, FRAME_US).expect("frame");

    assert_eq!(*hits.borrow(), 2, "pending-delete actor still heard it");
    assert!(director.actor(first).is_none());
    assert!(director.actor(second).is_some());
    // Only the survivor's registration remains.
    assert_eq!(director.listener_count(), 1);
}

#[test]
fn outbound_queue_never_reaches_actor_listeners() {
    let mut director = make_director();
    let log = journaled(&mut director);

    let id = director
        .add_actor(
            director.create_actor("Sentry").expect("known type"),
            false,
            false,
        )
        .expect("add");
    let heard = Rc::new(RefCell::new(0_u32));
    let heard_in = Rc::clone(&heard);
    director.actor_mut(id).expect("registered").register_invokable(
        "OnStatus",
        Box::new(move |_message, _outbox| {
            let mut count = heard_in.borrow_mut();
            *count = count.saturating_add(1);
        }),
    );
    director.register_global_listener(MessageKind::custom("Status"), id, "OnStatus");

    let outbound = director.create_message(MessageKind::custom("Status"));
    director.send_message(outbound);
    director.pre_frame(FRAME_US, FRAME_US).expect("frame");

    assert_eq!(kind_count(&log, &MessageKind::custom("Status")), 1);
    assert_eq!(*heard.borrow(), 0);
}

#[test]
fn custom_payloads_travel_through_dispatch_intact() {
    let mut director = make_director();

    let proxy = director.create_actor("Sentry").expect("known type");
    let id = director.add_actor(proxy, false, false).expect("local add");

    let captured: Rc<RefCell<Option<Message>>> = Rc::new(RefCell::new(None));
    let captured_in = Rc::clone(&captured);
    director
        .actor_mut(id)
        .expect("registered")
        .register_invokable(
            "OnOrder",
            Box::new(move |message, _outbox| {
                *captured_in.borrow_mut() = Some(message.clone());
            }),
        );
    director.register_global_listener(MessageKind::custom("Order"), id, "OnOrder");

    let payload = serde_json::json!({
        "action": "patrol",
        "waypoints": ["gate", "tower"],
        "urgency": 2,
    });
    let message = director
        .create_message(MessageKind::custom("Order"))
        .with_payload(MessagePayload::Custom(payload.clone()));
    director.process_message(message);
    director.pre_frame(FRAME_US, FRAME_US).expect("frame");

    let message = captured.borrow().clone().expect("order delivered");
    assert_eq!(message.payload, MessagePayload::Custom(payload));
}

#[test]
fn stats_reflect_a_frame_of_traffic() {
    let mut director = make_director();

    director.set_timer("once", None, 0.01, false, false);
    let message = director.create_message(MessageKind::custom("Hello"));
    director.process_message(message);
    let outbound = director.create_message(MessageKind::custom("Status"));
    director.send_message(outbound);

    director.pre_frame(FRAME_US, FRAME_US).expect("frame");

    let stats = director.stats();
    assert_eq!(stats.frames(), 1);
    assert_eq!(stats.messages_sent(), 1);
    assert_eq!(stats.timers_fired(), 1);
    // Hello + tick pair + timer elapsed.
    assert_eq!(stats.messages_processed(), 4);
}
