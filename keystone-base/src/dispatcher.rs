//! Event dispatcher
//!
//! This module provides the publish/subscribe half of the library. Each
//! [`EventDispatcher`] owns its registry exclusively: a mapping of event name
//! to an ordered list of listeners, created empty and discarded with the
//! dispatcher. All operations are synchronous and run to completion on the
//! caller's thread.
//!
//! # Example
//! ```
//! use keystone_base::dispatcher::EventDispatcher;
//! use keystone_base::types::callback;
//! use serde_json::json;
//!
//! let mut dispatcher = EventDispatcher::new();
//! let cb = callback(|_ctx, args| {
//!     println!("changed: {:?}", args);
//!     Ok(())
//! });
//!
//! dispatcher.on("change save", cb.clone(), None);
//! dispatcher.trigger("change", &[json!({"field": "name"})]);
//! dispatcher.off(Some("change"), Some(&cb), None);
//! assert_eq!(dispatcher.callback_events(), vec!["save"]);
//! ```

use crate::types::{Callback, Context, Listener, Value};
use serde::{Deserialize, Serialize};

/// One event name and its ordered listener list
#[derive(Debug)]
struct EventEntry {
    name: String,
    listeners: Vec<Listener>,
}

/// A per-instance event registry with add/remove/dispatch semantics
///
/// Listener lists preserve insertion order, which defines invocation order.
/// Event names are also kept in insertion order, so [`callback_events`]
/// reports them in the order they were first registered.
///
/// [`callback_events`]: EventDispatcher::callback_events
#[derive(Default)]
pub struct EventDispatcher {
    /// Event name -> ordered listeners, in name insertion order
    registry: Vec<EventEntry>,
}

impl EventDispatcher {
    /// Create a dispatcher with an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one or more events
    ///
    /// `events` is one or more event names separated by whitespace. For each
    /// name, the (callback, context) pair is appended to that name's listener
    /// list, creating the list if absent. A blank `events` string registers
    /// nothing.
    ///
    /// Returns `&mut Self` for fluent chaining.
    pub fn on(&mut self, events: &str, callback: Callback, context: Option<Context>) -> &mut Self {
        for name in events.split_whitespace() {
            log::debug!("Registering listener for event '{}'", name);
            let listener = Listener::new(callback.clone(), context.clone());
            match self.entry_mut(name) {
                Some(entry) => entry.listeners.push(listener),
                None => self.registry.push(EventEntry {
                    name: name.to_string(),
                    listeners: vec![listener],
                }),
            }
        }
        self
    }

    /// Remove listeners matching the given filters
    ///
    /// - All three arguments `None`: clear the entire registry.
    /// - `events` given: only those names are affected; otherwise every event
    ///   currently present is.
    /// - Per affected event: with no callback and no context filter the whole
    ///   list is removed; otherwise every listener matching the present
    ///   filters (absent filter matches everything, present filter must be
    ///   the same allocation) is removed.
    ///
    /// Empty registry is a no-op. Events whose list becomes empty are dropped
    /// from the registry. Returns `&mut Self` for fluent chaining.
    pub fn off(
        &mut self,
        events: Option<&str>,
        callback: Option<&Callback>,
        context: Option<&Context>,
    ) -> &mut Self {
        if self.registry.is_empty() {
            return self;
        }
        if events.is_none() && callback.is_none() && context.is_none() {
            log::debug!("Clearing all {} event registrations", self.registry.len());
            self.registry.clear();
            return self;
        }

        let names: Vec<String> = match events {
            Some(events) => events.split_whitespace().map(str::to_string).collect(),
            None => self.registry.iter().map(|e| e.name.clone()).collect(),
        };

        for name in &names {
            let Some(index) = self.registry.iter().position(|e| &e.name == name) else {
                continue;
            };
            if callback.is_none() && context.is_none() {
                // No filters: drop the whole list for this event
                self.registry.remove(index);
                continue;
            }
            let entry = &mut self.registry[index];
            entry
                .listeners
                .retain(|listener| !listener.matches(callback, context));
            if entry.listeners.is_empty() {
                self.registry.remove(index);
            }
        }
        self
    }

    /// Invoke every listener registered for `event`, in registration order
    ///
    /// Each callback receives its registered context as explicit receiver and
    /// `args` forwarded. Listeners run synchronously on the caller's thread.
    /// A failing listener is reported via the log facade and does not prevent
    /// subsequent listeners from running. Unknown event names are a no-op.
    pub fn trigger(&self, event: &str, args: &[Value]) {
        let Some(entry) = self.registry.iter().find(|e| e.name == event) else {
            return;
        };
        for listener in &entry.listeners {
            if let Err(e) = (listener.callback)(listener.context.as_ref(), args) {
                log::warn!("Listener for event '{}' failed: {}", event, e);
            }
        }
    }

    /// Every event name currently present in the registry, in insertion order
    pub fn callback_events(&self) -> Vec<String> {
        self.registry.iter().map(|e| e.name.clone()).collect()
    }

    /// Number of listeners currently registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry
            .iter()
            .find(|e| e.name == event)
            .map_or(0, |e| e.listeners.len())
    }

    /// True if no listeners are registered for any event
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Get statistics about the current registry
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            num_events: self.registry.len(),
            num_listeners: self.registry.iter().map(|e| e.listeners.len()).sum(),
        }
    }

    fn entry_mut(&mut self, name: &str) -> Option<&mut EventEntry> {
        self.registry.iter_mut().find(|e| e.name == name)
    }
}

/// Registry statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatcherStats {
    /// Number of event names with at least one listener
    pub num_events: usize,
    /// Total number of listener registrations
    pub num_listeners: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::callback;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn counting_callback(counter: Arc<AtomicUsize>) -> Callback {
        callback(move |_ctx, _args| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    #[test]
    fn test_on_then_off_removes_listener() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cb = counting_callback(counter.clone());

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("save", cb.clone(), None);
        dispatcher.off(Some("save"), Some(&cb), None);

        dispatcher.trigger("save", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();

        for tag in ["first", "second", "third"] {
            let order = order.clone();
            dispatcher.on(
                "step",
                callback(move |_ctx, _args| {
                    order.lock().unwrap().push(tag);
                    Ok(())
                }),
                None,
            );
        }

        dispatcher.trigger("step", &[]);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_off_without_arguments_clears_everything() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("a", counting_callback(counter.clone()), None);
        dispatcher.on("b c", counting_callback(counter.clone()), None);

        dispatcher.off(None, None, None);

        for event in ["a", "b", "c"] {
            dispatcher.trigger(event, &[]);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(dispatcher.callback_events(), Vec::<String>::new());
    }

    #[test]
    fn test_off_by_callback_spans_all_events() {
        let counter = Arc::new(AtomicUsize::new(0));
        let target = counting_callback(counter.clone());
        let other = counting_callback(counter.clone());
        let ctx: Context = Arc::new(7u32);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("a", target.clone(), None);
        dispatcher.on("b", target.clone(), Some(ctx)); // Different context, same callback
        dispatcher.on("b", other, None);

        // No event filter: the callback goes away everywhere, context ignored
        dispatcher.off(None, Some(&target), None);

        assert_eq!(dispatcher.listener_count("a"), 0);
        assert_eq!(dispatcher.listener_count("b"), 1);
        dispatcher.trigger("b", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_off_by_context_only() {
        let counter = Arc::new(AtomicUsize::new(0));
        let cb = counting_callback(counter.clone());
        let ctx: Context = Arc::new("widget".to_string());

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("render", cb.clone(), Some(ctx.clone()));
        dispatcher.on("render", cb.clone(), None);

        dispatcher.off(None, None, Some(&ctx));

        // Only the context-bound registration was removed
        assert_eq!(dispatcher.listener_count("render"), 1);
        dispatcher.trigger("render", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_multi_event_registration_and_key_list() {
        let cb = callback(|_ctx, _args| Ok(()));
        let ctx: Context = Arc::new(1u8);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("a b", cb.clone(), Some(ctx));
        assert_eq!(dispatcher.callback_events(), vec!["a", "b"]);

        dispatcher.off(Some("a"), Some(&cb), None);
        assert_eq!(dispatcher.callback_events(), vec!["b"]);
    }

    #[test]
    fn test_failing_listener_does_not_stop_dispatch() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut dispatcher = EventDispatcher::new();

        dispatcher.on(
            "sync",
            callback(|_ctx, _args| Err("listener exploded".into())),
            None,
        );
        dispatcher.on("sync", counting_callback(counter.clone()), None);

        dispatcher.trigger("sync", &[]);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_context_passed_as_receiver() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();
        let ctx: Context = Arc::new(42usize);

        let mut dispatcher = EventDispatcher::new();
        dispatcher.on(
            "ping",
            callback(move |ctx, args| {
                let receiver = ctx
                    .and_then(|c| c.downcast_ref::<usize>())
                    .copied()
                    .unwrap_or(0);
                let arg = args.first().and_then(Value::as_u64).unwrap_or(0) as usize;
                seen_clone.store(receiver + arg, Ordering::SeqCst);
                Ok(())
            }),
            Some(ctx),
        );

        dispatcher.trigger("ping", &[json!(8)]);
        assert_eq!(seen.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn test_off_on_empty_registry_is_noop() {
        let cb = callback(|_ctx, _args| Ok(()));
        let mut dispatcher = EventDispatcher::new();

        dispatcher.off(Some("anything"), Some(&cb), None);
        dispatcher.off(None, None, None);
        assert!(dispatcher.is_empty());
    }

    #[test]
    fn test_trigger_unknown_event_is_noop() {
        let dispatcher = EventDispatcher::new();
        dispatcher.trigger("missing", &[json!(1)]);
    }

    #[test]
    fn test_stats() {
        let cb = callback(|_ctx, _args| Ok(()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("a b", cb.clone(), None);
        dispatcher.on("a", cb, None);

        let stats = dispatcher.stats();
        assert_eq!(stats.num_events, 2);
        assert_eq!(stats.num_listeners, 3);
    }

    #[test]
    fn test_blank_events_register_nothing() {
        let cb = callback(|_ctx, _args| Ok(()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.on("   ", cb, None);
        assert!(dispatcher.is_empty());
    }
}
