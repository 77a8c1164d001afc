//! # KEYSTONE Event Bus
//!
//! Synchronous, type-indexed publish/subscribe between systems.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  emit(ctx, E)   ┌──────────────┐   handler(ctx, &mut E)
//! │  Publisher   │────────────────>│   EventBus   │──────────────────────> H1
//! │  (Collision) │                 │  TypeId(E) → │──────────────────────> H2
//! └──────────────┘                 │  [H1, H2..]  │
//!                                  └──────────────┘
//! ```
//!
//! Handlers run on the emitting thread, in subscription order, before `emit`
//! returns. Each handler receives the bus context (the registry, in the game
//! loop) by mutable reference alongside the event.
//!
//! ## Re-entrancy
//!
//! `emit` holds `&mut self` for the whole dispatch and handlers never see the
//! bus, so a handler can neither subscribe nor emit on the bus that is calling
//! it. That rule is enforced by the borrow checker.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use keystone_core::Entity;
use tracing::{debug, trace, Span};

/// Marker for values that can be emitted on an [`EventBus`].
pub trait Event: 'static {}

type ErasedHandler<Ctx> = Box<dyn FnMut(&mut Ctx, &mut dyn Any)>;

struct Subscription<Ctx> {
    /// Type name of the subscribing system.
    owner: &'static str,
    handler: ErasedHandler<Ctx>,
}

/// Type-indexed event bus.
///
/// # Example
///
/// ```rust
/// use keystone::{Event, EventBus};
///
/// struct Scored(u32);
/// impl Event for Scored {}
///
/// struct Scoreboard;
///
/// let mut bus: EventBus<u32> = EventBus::new();
/// bus.subscribe::<Scoreboard, Scored>(|total, event| *total += event.0);
///
/// let mut total = 0;
/// assert_eq!(bus.emit(&mut total, Scored(3)), 1);
/// assert_eq!(total, 3);
/// ```
pub struct EventBus<Ctx> {
    subscribers: HashMap<TypeId, Vec<Subscription<Ctx>>>,
    span: Span,
}

impl<Ctx: 'static> EventBus<Ctx> {
    /// Creates an empty bus that logs under a fresh `event_bus` span.
    #[must_use]
    pub fn new() -> Self {
        Self::with_span(tracing::debug_span!("event_bus"))
    }

    /// Creates an empty bus that logs every event under `span`.
    #[must_use]
    pub fn with_span(span: Span) -> Self {
        debug!(parent: &span, "event bus created");
        Self {
            subscribers: HashMap::new(),
            span,
        }
    }

    /// Registers `handler` for events of type `E` on behalf of owner `O`.
    ///
    /// Handlers for the same event type run in the order they subscribed.
    ///
    /// # Arguments
    ///
    /// * `handler` - Called with the bus context and the emitted event
    pub fn subscribe<O: 'static, E: Event>(
        &mut self,
        mut handler: impl FnMut(&mut Ctx, &mut E) + 'static,
    ) {
        let erased: ErasedHandler<Ctx> = Box::new(move |ctx, event| {
            if let Some(event) = event.downcast_mut::<E>() {
                handler(ctx, event);
            }
        });
        self.subscribers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Subscription {
                owner: type_name::<O>(),
                handler: erased,
            });
        trace!(
            parent: &self.span,
            owner = type_name::<O>(),
            event = type_name::<E>(),
            "handler subscribed"
        );
    }

    /// Delivers `event` to every handler subscribed to `E`.
    ///
    /// Returns the number of handlers invoked. Emitting an event nobody
    /// listens to is a no-op.
    pub fn emit<E: Event>(&mut self, ctx: &mut Ctx, mut event: E) -> usize {
        let Self { subscribers, span } = self;
        let Some(subscriptions) = subscribers.get_mut(&TypeId::of::<E>()) else {
            return 0;
        };

        let erased: &mut dyn Any = &mut event;
        for subscription in subscriptions.iter_mut() {
            trace!(
                parent: &*span,
                owner = subscription.owner,
                event = type_name::<E>(),
                "dispatching event"
            );
            (subscription.handler)(&mut *ctx, &mut *erased);
        }
        subscriptions.len()
    }

    /// Drops every subscription.
    pub fn reset(&mut self) {
        self.subscribers.clear();
        trace!(parent: &self.span, "event bus reset");
    }

    /// Number of handlers subscribed to `E`.
    #[must_use]
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.subscribers
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Owners of the handlers subscribed to `E`, in dispatch order.
    #[must_use]
    pub fn subscriber_owners<E: Event>(&self) -> Vec<&'static str> {
        self.subscribers
            .get(&TypeId::of::<E>())
            .map(|subscriptions| subscriptions.iter().map(|s| s.owner).collect())
            .unwrap_or_default()
    }

    /// Whether no handler is subscribed to anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.values().all(Vec::is_empty)
    }
}

impl<Ctx: 'static> Default for EventBus<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Gameplay events
// =============================================================================

/// Two colliders overlapped this frame.
///
/// Emitted by: `CollisionSystem`
/// Consumed by: `DamageSystem`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// First entity of the pair, earlier in the collision system's list.
    pub a: Entity,
    /// Second entity of the pair.
    pub b: Entity,
}

impl Event for CollisionEvent {}

/// Keys the simulation reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Up arrow.
    Up,
    /// Right arrow.
    Right,
    /// Down arrow.
    Down,
    /// Left arrow.
    Left,
    /// Space bar.
    Space,
    /// Any other printable key.
    Char(char),
}

/// A key was pressed.
///
/// Emitted by: `GameLoop` input dispatch
/// Consumed by: `KeyboardControlSystem`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyPressedEvent {
    /// The key.
    pub key: Key,
}

impl Event for KeyPressedEvent {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping(u32);
    impl Event for Ping {}

    struct Pong;
    impl Event for Pong {}

    struct First;
    struct Second;

    #[test]
    fn test_dispatch_in_subscription_order() {
        let mut bus: EventBus<Vec<&'static str>> = EventBus::new();
        bus.subscribe::<First, Ping>(|log, _| log.push("first"));
        bus.subscribe::<Second, Ping>(|log, _| log.push("second"));

        let mut log = Vec::new();
        assert_eq!(bus.emit(&mut log, Ping(0)), 2);
        assert_eq!(log, vec!["first", "second"]);
        assert_eq!(bus.subscriber_owners::<Ping>().len(), 2);
        assert!(bus.subscriber_owners::<Ping>()[0].ends_with("First"));
    }

    #[test]
    fn test_handlers_see_mutations_of_earlier_handlers() {
        let mut bus: EventBus<Vec<u32>> = EventBus::new();
        bus.subscribe::<First, Ping>(|_, ping| ping.0 += 1);
        bus.subscribe::<Second, Ping>(|seen, ping| seen.push(ping.0));

        let mut seen = Vec::new();
        bus.emit(&mut seen, Ping(41));
        assert_eq!(seen, vec![42]);
    }

    #[test]
    fn test_no_subscribers_is_noop() {
        let mut bus: EventBus<u32> = EventBus::new();
        bus.subscribe::<First, Ping>(|count, _| *count += 1);

        let mut count = 0;
        assert_eq!(bus.emit(&mut count, Pong), 0);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut bus: EventBus<u32> = EventBus::new();
        bus.subscribe::<First, Ping>(|count, _| *count += 1);
        bus.subscribe::<First, Pong>(|count, _| *count += 10);
        assert_eq!(bus.subscriber_count::<Ping>(), 1);
        assert!(!bus.is_empty());

        bus.reset();
        assert!(bus.is_empty());
        assert_eq!(bus.subscriber_count::<Pong>(), 0);

        let mut count = 0;
        bus.emit(&mut count, Ping(1));
        assert_eq!(count, 0);
    }
}
