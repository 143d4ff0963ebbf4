// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ordered multicast dispatch with pluggable locking.

use std::cell::{Cell, RefCell};

use smallvec::SmallVec;
use tracing::{error, trace};

use crate::error::{EventError, Result};
use crate::handler::Handler;
use crate::lock::{LockPolicy, PolicyGuard, SingleThread, ThreadSafe};

/// Inline handler slots before the sequence spills to the heap.
const INLINE_HANDLERS: usize = 4;

/// Counters accumulated by a dispatcher over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchMetrics {
    /// Completed broadcast passes.
    pub broadcast_count: u64,

    /// Handler invocations summed over all passes.
    pub invocation_count: u64,
}

/// Ordered multicast event dispatcher.
///
/// Handlers run synchronously on the broadcasting thread, in
/// registration order. The locking policy `L` decides whether the
/// dispatcher may be shared across threads ([`ThreadSafe`], the
/// default) or is confined to one ([`SingleThread`], zero locking
/// overhead).
pub struct EventDispatcher<E, L: LockPolicy = ThreadSafe> {
    handlers: RefCell<SmallVec<[Handler<E>; INLINE_HANDLERS]>>,
    broadcasting: Cell<bool>,
    broadcast_count: Cell<u64>,
    invocation_count: Cell<u64>,
    lock: L,
}

/// Dispatcher confined to a single thread; locking compiles away.
pub type LocalEventDispatcher<E> = EventDispatcher<E, SingleThread>;

// A `Sync` policy provides reentrant mutual exclusion around every
// operation (the `LockPolicy` safety contract), which keeps the
// single-threaded interior mutability below sound when the dispatcher
// is reached from multiple threads.
unsafe impl<E, L: LockPolicy + Sync> Sync for EventDispatcher<E, L> {}

impl<E, L: LockPolicy> EventDispatcher<E, L> {
    /// Empty dispatcher using inline handler storage.
    pub fn new() -> Self {
        Self::with_storage(SmallVec::new())
    }

    /// Empty dispatcher with room for `capacity` handlers before the
    /// sequence reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_storage(SmallVec::with_capacity(capacity))
    }

    fn with_storage(storage: SmallVec<[Handler<E>; INLINE_HANDLERS]>) -> Self {
        Self {
            handlers: RefCell::new(storage),
            broadcasting: Cell::new(false),
            broadcast_count: Cell::new(0),
            invocation_count: Cell::new(0),
            lock: L::default(),
        }
    }

    /// Register `handler` at the end of the invocation order.
    ///
    /// No duplicate check is performed: the same callback/context
    /// combination may be registered several times, and each
    /// registration is removed independently.
    pub fn add_handler(&self, handler: Handler<E>) {
        let _lock = PolicyGuard::acquire(&self.lock);
        self.handlers.borrow_mut().push(handler);
        trace!(count = self.handlers.borrow().len(), "handler registered");
    }

    /// Unregister one handler.
    ///
    /// Exactly the same callback/context combination that was
    /// registered must be passed in; the first matching registration
    /// is removed, later duplicates stay. Removing a handler that is
    /// not registered fails with [`EventError::UnmatchedRemoval`] and
    /// leaves the sequence untouched — silently ignoring it would mask
    /// dangling-subscription bugs in the caller.
    pub fn remove_handler(&self, handler: &Handler<E>) -> Result<()> {
        let _lock = PolicyGuard::acquire(&self.lock);
        let mut handlers = self.handlers.borrow_mut();
        match handlers.iter().position(|registered| registered == handler) {
            Some(index) => {
                handlers.remove(index);
                trace!(count = handlers.len(), "handler unregistered");
                Ok(())
            }
            None => {
                error!(?handler, "{}", EventError::UnmatchedRemoval);
                Err(EventError::UnmatchedRemoval)
            }
        }
    }

    /// Invoke every registered handler with `event`, in registration
    /// order.
    ///
    /// The pass iterates the live sequence, not a snapshot: a handler
    /// that registers a new handler during the pass causes it to be
    /// invoked later in the same pass, and a removal during the pass
    /// takes effect immediately. Removal shifts later entries down one
    /// slot, so removing an entry at or before the pass cursor moves
    /// the next unvisited handler into an already-visited slot and it
    /// is skipped for that pass.
    ///
    /// A broadcast while another broadcast on this dispatcher is still
    /// in progress fails with [`EventError::ReentrantBroadcast`],
    /// invoking nothing. Under [`ThreadSafe`] locking that only arises
    /// when a handler re-broadcasts on its own dispatcher; a broadcast
    /// from another thread instead blocks until the current pass
    /// completes.
    ///
    /// A panicking handler aborts the pass and propagates to the
    /// caller; the dispatcher itself stays usable for later broadcasts.
    pub fn broadcast(&self, event: &E) -> Result<()> {
        let _lock = PolicyGuard::acquire(&self.lock);

        if self.broadcasting.get() {
            error!("{}", EventError::ReentrantBroadcast);
            return Err(EventError::ReentrantBroadcast);
        }

        let _pass = BroadcastGuard::begin(&self.broadcasting);

        let mut cursor = 0;
        loop {
            // Clone the handler out and drop the borrow before running
            // it: the handler body may mutate the sequence. The bound
            // is re-read from the live sequence every step.
            let handler = {
                let handlers = self.handlers.borrow();
                match handlers.get(cursor) {
                    Some(handler) => handler.clone(),
                    None => break,
                }
            };
            handler.invoke(event);
            self.invocation_count.set(self.invocation_count.get() + 1);
            cursor += 1;
        }

        self.broadcast_count.set(self.broadcast_count.get() + 1);
        Ok(())
    }

    /// Whether this exact callback/context combination is currently
    /// registered.
    pub fn has_handler(&self, handler: &Handler<E>) -> bool {
        let _lock = PolicyGuard::acquire(&self.lock);
        self.handlers
            .borrow()
            .iter()
            .any(|registered| registered == handler)
    }

    /// Number of registrations, duplicates counted.
    pub fn handler_count(&self) -> usize {
        let _lock = PolicyGuard::acquire(&self.lock);
        self.handlers.borrow().len()
    }

    /// True when no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handler_count() == 0
    }

    /// Snapshot of the lifetime counters.
    pub fn metrics(&self) -> DispatchMetrics {
        let _lock = PolicyGuard::acquire(&self.lock);
        DispatchMetrics {
            broadcast_count: self.broadcast_count.get(),
            invocation_count: self.invocation_count.get(),
        }
    }
}

impl<E, L: LockPolicy> Default for EventDispatcher<E, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the broadcast flag on every exit path, a panicking handler
/// included.
struct BroadcastGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> BroadcastGuard<'a> {
    fn begin(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for BroadcastGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Context;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn count_up(_: &u32, context: Option<&Context>) {
        let counter = context.unwrap().downcast_ref::<AtomicUsize>().unwrap();
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[test]
    fn broadcast_reaches_every_registration() {
        let dispatcher: LocalEventDispatcher<u32> = LocalEventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));

        dispatcher.add_handler(Handler::with_context(count_up, counter.clone()));
        dispatcher.add_handler(Handler::with_context(count_up, counter.clone()));

        dispatcher.broadcast(&7).unwrap();
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn empty_broadcast_succeeds() {
        let dispatcher: LocalEventDispatcher<u32> = LocalEventDispatcher::new();
        assert!(dispatcher.is_empty());
        dispatcher.broadcast(&0).unwrap();
    }

    #[test]
    fn remove_of_unknown_handler_fails() {
        let dispatcher: LocalEventDispatcher<u32> = LocalEventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let never_added = Handler::with_context(count_up, counter);

        assert_eq!(
            dispatcher.remove_handler(&never_added),
            Err(EventError::UnmatchedRemoval)
        );
    }

    #[test]
    fn has_handler_tracks_registration() {
        let dispatcher: LocalEventDispatcher<u32> = LocalEventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler = Handler::with_context(count_up, counter);

        assert!(!dispatcher.has_handler(&handler));
        dispatcher.add_handler(handler.clone());
        assert!(dispatcher.has_handler(&handler));
        dispatcher.remove_handler(&handler).unwrap();
        assert!(!dispatcher.has_handler(&handler));
    }

    #[test]
    fn metrics_count_passes_and_invocations() {
        let dispatcher: LocalEventDispatcher<u32> = LocalEventDispatcher::new();
        let counter = Arc::new(AtomicUsize::new(0));
        dispatcher.add_handler(Handler::with_context(count_up, counter.clone()));
        dispatcher.add_handler(Handler::with_context(count_up, counter));

        dispatcher.broadcast(&1).unwrap();
        dispatcher.broadcast(&2).unwrap();

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.broadcast_count, 2);
        assert_eq!(metrics.invocation_count, 4);
    }

    #[test]
    fn with_capacity_starts_empty() {
        let dispatcher: LocalEventDispatcher<u32> = LocalEventDispatcher::with_capacity(32);
        assert_eq!(dispatcher.handler_count(), 0);
        dispatcher.broadcast(&0).unwrap();
    }

    #[test]
    fn thread_safe_dispatcher_is_send_and_sync() {
        fn shareable<T: Send + Sync>() {}
        shareable::<EventDispatcher<u32>>();
    }
}
