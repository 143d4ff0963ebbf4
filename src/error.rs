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

//! Error types

use std::fmt;

/// Dispatch error type
///
/// Both variants indicate a caller-side lifecycle bug, never an
/// expected runtime condition; neither is retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventError {
    /// A handler was removed that has not been registered, or has
    /// already been unregistered
    UnmatchedRemoval,

    /// A broadcast was triggered while a broadcast on the same
    /// dispatcher was still in progress
    ReentrantBroadcast,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::UnmatchedRemoval => {
                write!(f, "handler has not been registered or has already been unregistered")
            }
            EventError::ReentrantBroadcast => {
                write!(f, "broadcast triggered recursively or from several threads simultaneously")
            }
        }
    }
}

impl std::error::Error for EventError {}

/// Result type alias
pub type Result<T> = std::result::Result<T, EventError>;
