//! Keystone Base Library
//!
//! A minimal object-oriented utility library with two independent mechanisms:
//! a classical-inheritance helper and a publish/subscribe event dispatcher.
//!
//! # Architecture
//!
//! This library is intentionally minimal:
//! - [`TypeDescriptor::extend`] builds new types from a parent, delegating
//!   unoverridden behavior up a single-inheritance chain
//! - [`EventDispatcher`] maps event names to ordered (callback, context)
//!   lists with registration, selective/bulk removal, and dispatch
//! - [`TypeRegistry`] holds named types with explicit, test-injectable init
//!
//! The library does NOT:
//! - Do any networking or I/O
//! - Share state across dispatcher instances
//! - Dispatch asynchronously (listeners run synchronously, in registration
//!   order, on the caller's thread)
//! - Persist anything
//!
//! # Example Usage
//!
//! ```
//! use keystone_base::{EventDispatcher, Members, TypeDescriptor};
//! use keystone_base::types::callback;
//! use serde_json::json;
//!
//! // Build a small type chain
//! let model = TypeDescriptor::base()
//!     .extend(
//!         "Model",
//!         Members::new().method("greet", |_inst, _args| Ok(json!("hello"))),
//!     )
//!     .unwrap();
//! let mut instance = model.construct(&[]).unwrap();
//! assert_eq!(instance.call("greet", &[]).unwrap(), json!("hello"));
//!
//! // Wire an event dispatcher
//! let mut dispatcher = EventDispatcher::new();
//! dispatcher.on(
//!     "saved",
//!     callback(|_ctx, args| {
//!         println!("saved with {:?}", args);
//!         Ok(())
//!     }),
//!     None,
//! );
//! dispatcher.trigger("saved", &[json!({"id": 1})]);
//! ```

// Public modules
pub mod class;
pub mod dispatcher;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use class::{Constructor, Instance, Member, Members, Method, TypeDescriptor};
pub use dispatcher::{DispatcherStats, EventDispatcher};
pub use registry::TypeRegistry;
pub use types::{Callback, Context, KeystoneError, Listener, ListenerResult, Result, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: ensure we can create both mechanisms
        let dispatcher = EventDispatcher::new();
        assert!(dispatcher.is_empty());

        let base = TypeDescriptor::base();
        assert_eq!(base.name(), "Base");
        assert!(base.parent().is_none());
    }
}
