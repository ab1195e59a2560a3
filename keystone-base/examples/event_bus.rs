//! Standalone event bus demo
//!
//! Wires several listeners onto one dispatcher, triggers events with
//! arguments, and shows selective removal and failure isolation.
//!
//! Usage:
//!   cargo run --example event_bus
//!
//! Run with RUST_LOG=warn to see the isolated listener failure reported.

use anyhow::Result;
use keystone_base::types::callback;
use keystone_base::{Context, EventDispatcher};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let mut bus = EventDispatcher::new();
    let delivered = Arc::new(AtomicUsize::new(0));

    // A logging listener on two events at once
    let delivered_clone = delivered.clone();
    let audit = callback(move |_ctx, args| {
        delivered_clone.fetch_add(1, Ordering::SeqCst);
        println!("[audit] {:?}", args);
        Ok(())
    });
    bus.on("created updated", audit.clone(), None);

    // A context-bound listener: the context is its explicit receiver
    let mailbox: Context = Arc::new("ops@example.com".to_string());
    bus.on(
        "created",
        callback(|ctx, args| {
            let to = ctx
                .and_then(|c| c.downcast_ref::<String>())
                .map(String::as_str)
                .unwrap_or("<nobody>");
            println!("[mail] notifying {} about {:?}", to, args);
            Ok(())
        }),
        Some(mailbox),
    );

    // A listener that fails; dispatch must continue past it
    bus.on(
        "updated",
        callback(|_ctx, _args| Err("flaky downstream".into())),
        None,
    );

    println!("registered events: {:?}", bus.callback_events());

    bus.trigger("created", &[json!({"id": 1, "kind": "order"})]);
    bus.trigger("updated", &[json!({"id": 1, "field": "status"})]);

    // Remove the audit listener everywhere, then trigger again
    bus.off(None, Some(&audit), None);
    bus.trigger("updated", &[json!({"id": 2})]);

    let stats = bus.stats();
    println!("\n=== EVENT BUS SUMMARY ===");
    println!("Audit deliveries: {}", delivered.load(Ordering::SeqCst));
    println!("Events still registered: {}", stats.num_events);
    println!("Listeners still registered: {}", stats.num_listeners);

    Ok(())
}
