//! Handler values: a callback paired with optional pass-through context.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque pass-through value bound to a handler at registration time
/// and handed back to its callback on every invocation.
pub type Context = Arc<dyn Any + Send + Sync>;

/// Callback signature for event handlers.
pub type Callback<E> = fn(&E, Option<&Context>);

/// A registered callable: a plain function plus the context value it
/// was bound with.
///
/// A callback can be registered multiple times with different
/// pass-through contexts (or even with the same, though that is less
/// useful); each registration is independent. Unregistering requires
/// exactly the same callback/context combination, so callers keep a
/// clone of the handler they registered.
pub struct Handler<E> {
    callback: Callback<E>,
    context: Option<Context>,
}

impl<E> Handler<E> {
    /// Handler with no bound context.
    pub fn new(callback: Callback<E>) -> Self {
        Self {
            callback,
            context: None,
        }
    }

    /// Handler carrying a shared context value.
    pub fn with_context<C: Any + Send + Sync>(callback: Callback<E>, context: Arc<C>) -> Self {
        Self {
            callback,
            context: Some(context as Context),
        }
    }

    /// The bound context, if any.
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Run the callback against `event`.
    pub fn invoke(&self, event: &E) {
        (self.callback)(event, self.context.as_ref());
    }
}

// Derived Clone would demand `E: Clone`; the handler never stores an
// event value.
impl<E> Clone for Handler<E> {
    fn clone(&self) -> Self {
        Self {
            callback: self.callback,
            context: self.context.clone(),
        }
    }
}

impl<E> PartialEq for Handler<E> {
    /// Structural equality: the same function address and the same
    /// context allocation (or both contexts absent).
    ///
    /// Function addresses are only meaningful between handlers built
    /// from the same function item; the compiler may fold identical
    /// instantiations of a generic function into one address.
    fn eq(&self, other: &Self) -> bool {
        if self.callback as usize != other.callback as usize {
            return false;
        }
        match (&self.context, &other.context) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<E> Eq for Handler<E> {}

impl<E> fmt::Debug for Handler<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("callback", &(self.callback as usize as *const ()))
            .field("has_context", &self.context.is_some())
            .finish()
    }
}
