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

//! Synchronous multicast event dispatch.
//!
//! An ordered publish/subscribe primitive: handlers register on an
//! [`EventDispatcher`], and a broadcast invokes each of them once, on
//! the broadcasting thread, in registration order. The locking policy
//! is a type parameter — [`ThreadSafe`] dispatchers may be shared
//! across threads, [`SingleThread`] dispatchers compile the locking
//! away entirely.
//!
//! ```
//! use event_fanout::{Context, EventDispatcher, Handler, SingleThread};
//!
//! fn greet(name: &String, _context: Option<&Context>) {
//!     println!("hello {name}");
//! }
//!
//! let dispatcher: EventDispatcher<String, SingleThread> = EventDispatcher::new();
//! let handler = Handler::new(greet);
//!
//! dispatcher.add_handler(handler.clone());
//! dispatcher.broadcast(&"world".to_string()).unwrap();
//! dispatcher.remove_handler(&handler).unwrap();
//! ```

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod lock;
pub mod prelude;
pub mod stock;

pub use dispatcher::*;
pub use error::*;
pub use handler::*;
pub use lock::*;
