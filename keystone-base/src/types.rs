//! Core types for the Keystone base library
//!
//! This module defines the shared currency types used by both mechanisms in the
//! library: the error enum and `Result` alias, the dynamic `Value` passed
//! through members and event arguments, and the callback/context/listener types
//! used by the event dispatcher.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Dynamic value type carried by instance members and event arguments
pub type Value = serde_json::Value;

/// Result type for library operations
pub type Result<T> = std::result::Result<T, KeystoneError>;

/// Boxed error returned by a failing listener
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by event listeners
///
/// A listener that fails returns `Err`; the dispatcher reports the failure and
/// continues with the remaining listeners.
pub type ListenerResult = std::result::Result<(), BoxError>;

/// Context passed to a listener as its explicit receiver
///
/// Contexts are compared by allocation identity (`Arc::ptr_eq`): two clones of
/// the same `Arc` are the same context, two separate allocations are not.
pub type Context = Arc<dyn Any + Send + Sync>;

/// An event callback
///
/// Invoked with the context the listener was registered with (if any) and the
/// arguments forwarded by `trigger`. Like contexts, callbacks are compared by
/// allocation identity when filtering in `off`.
pub type Callback = Arc<dyn Fn(Option<&Context>, &[Value]) -> ListenerResult + Send + Sync>;

/// Wrap a closure into a [`Callback`]
///
/// # Example
/// ```
/// use keystone_base::types::callback;
///
/// let cb = callback(|_ctx, args| {
///     println!("got {} arguments", args.len());
///     Ok(())
/// });
/// ```
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(Option<&Context>, &[Value]) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Errors that can occur in library operations
#[derive(Debug, thiserror::Error)]
pub enum KeystoneError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Member not found: {0}")]
    MemberNotFound(String),

    #[error("Member is not callable: {0}")]
    NotCallable(String),

    #[error("Type already registered: {0}")]
    DuplicateType(String),

    #[error("Constructor failed: {0}")]
    ConstructorFailed(String),
}

/// A registered listener: a callback plus its optional context
///
/// Insertion order of listeners under an event name is preserved by the
/// dispatcher and defines invocation order.
#[derive(Clone)]
pub struct Listener {
    /// The callback to invoke
    pub callback: Callback,
    /// Optional context passed to the callback as its receiver
    pub context: Option<Context>,
}

impl Listener {
    /// Create a listener from a callback and optional context
    pub fn new(callback: Callback, context: Option<Context>) -> Self {
        Self { callback, context }
    }

    /// True if this listener matches the given filters
    ///
    /// An absent filter matches everything; a present filter must be the same
    /// allocation. A listener registered without a context never matches a
    /// present context filter.
    pub fn matches(&self, callback: Option<&Callback>, context: Option<&Context>) -> bool {
        let callback_match = callback.map_or(true, |cb| Arc::ptr_eq(cb, &self.callback));
        let context_match = context.map_or(true, |ctx| match &self.context {
            Some(own) => Arc::ptr_eq(ctx, own),
            None => false,
        });
        callback_match && context_match
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Arc::as_ptr(&self.callback))
            .field("has_context", &self.context.is_some())
            .finish()
    }
}
