//! Convenient re-exports of commonly used types.
//!
//! The prelude can be imported with:
//! ```
//! use event_fanout::prelude::*;
//! ```

pub use crate::dispatcher::{DispatchMetrics, EventDispatcher, LocalEventDispatcher};
pub use crate::error::{EventError, Result};
pub use crate::handler::{Callback, Context, Handler};
pub use crate::lock::{LockPolicy, SingleThread, ThreadSafe};
