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

//! Locking policies selected at the dispatcher's type level.

use parking_lot::lock_api::RawReentrantMutex;
use parking_lot::{RawMutex, RawThreadId};
use std::cell::Cell;
use std::marker::PhantomData;

/// Locking discipline bracketing every dispatcher operation.
///
/// The dispatcher calls `acquire`/`release` in strictly nested pairs,
/// possibly nested on the same thread: a handler may register or
/// unregister handlers on its own dispatcher while a broadcast pass
/// holds the lock.
///
/// # Safety
///
/// Implementations that are `Sync` must provide reentrant mutual
/// exclusion between threads under that call pattern. The dispatcher's
/// `Sync` impl relies on this to make its interior mutability sound.
pub unsafe trait LockPolicy: Default {
    /// Block until this thread owns the lock. Reentrant.
    fn acquire(&self);

    /// Give up one level of ownership.
    ///
    /// # Safety
    ///
    /// Must follow a matching [`acquire`](Self::acquire) on the same
    /// thread.
    unsafe fn release(&self);
}

/// Zero-overhead policy for dispatchers confined to one thread.
///
/// Both methods compile to nothing. The policy is not `Sync`, so a
/// dispatcher using it cannot be shared across threads in the first
/// place:
///
/// ```compile_fail
/// use event_fanout::{EventDispatcher, SingleThread};
///
/// fn shared<T: Sync>(_: &T) {}
///
/// let dispatcher: EventDispatcher<u32, SingleThread> = EventDispatcher::new();
/// shared(&dispatcher);
/// ```
#[derive(Debug, Default)]
pub struct SingleThread {
    _not_sync: PhantomData<Cell<()>>,
}

unsafe impl LockPolicy for SingleThread {
    fn acquire(&self) {}

    unsafe fn release(&self) {}
}

/// Reentrant mutual exclusion for dispatchers shared across threads.
///
/// A broadcast holds the lock for its entire handler pass, so
/// concurrent broadcasts and cross-thread registration changes
/// serialize against it. The mutex must be reentrant because handlers
/// are allowed to mutate the handler sequence of the dispatcher that
/// is currently invoking them.
pub struct ThreadSafe {
    raw: RawReentrantMutex<RawMutex, RawThreadId>,
}

impl Default for ThreadSafe {
    fn default() -> Self {
        Self {
            raw: RawReentrantMutex::INIT,
        }
    }
}

unsafe impl LockPolicy for ThreadSafe {
    fn acquire(&self) {
        self.raw.lock();
    }

    unsafe fn release(&self) {
        self.raw.unlock();
    }
}

/// Scope guard pairing `acquire` with `release` on every exit path.
pub(crate) struct PolicyGuard<'a, L: LockPolicy> {
    policy: &'a L,
}

impl<'a, L: LockPolicy> PolicyGuard<'a, L> {
    pub(crate) fn acquire(policy: &'a L) -> Self {
        policy.acquire();
        Self { policy }
    }
}

impl<L: LockPolicy> Drop for PolicyGuard<'_, L> {
    fn drop(&mut self) {
        // The constructor acquired on this thread.
        unsafe { self.policy.release() };
    }
}
