// Ridebook
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Sources of the current time.

use time::OffsetDateTime;

/// Generic definition of a clock.
pub trait Clock {
    /// Returns the current UTC time, truncated to microseconds.
    fn now_utc(&self) -> OffsetDateTime;
}

/// Drops the sub-microsecond part of `nanos`.
///
/// PostgreSQL timestamps only carry microseconds, so anything finer would not survive a round trip
/// through the database and would make values read back differ from the values written.
fn truncate_to_micros(nanos: i128) -> i128 {
    nanos / 1000 * 1000
}

/// Clock implementation that uses the system clock.
#[derive(Clone, Default)]
pub struct SystemClock {}

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        let nanos = truncate_to_micros(OffsetDateTime::now_utc().unix_timestamp_nanos());
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .expect("nanos must be in range because they come from the current timestamp")
    }
}

/// Test utilities.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    /// A clock that starts at a fixed instant and moves forward by a fixed step every time it is
    /// read.  This makes every reading unique and predictable.
    pub struct SteppingClock {
        /// Time to return on the next reading, in microseconds since the epoch.
        next_us: AtomicU64,

        /// Amount of microseconds to add after every reading.
        step_us: u64,
    }

    impl SteppingClock {
        /// Creates a new clock whose first reading is `start` and whose subsequent readings are
        /// `step` apart.  Both quantities must have microsecond precision at most.
        pub fn new(start: OffsetDateTime, step: Duration) -> Self {
            let start_ns = start.unix_timestamp_nanos();
            assert!(start_ns % 1000 == 0, "Nanosecond precision not supported");
            let step_ns = step.as_nanos();
            assert!(step_ns % 1000 == 0, "Nanosecond precision not supported");
            Self {
                next_us: AtomicU64::new(u64::try_from(start_ns / 1000).unwrap()),
                step_us: u64::try_from(step_ns / 1000).unwrap(),
            }
        }

        /// Returns the value of the `n`th reading of a clock created with `start` and `step`,
        /// counting from zero.
        pub fn nth(start: OffsetDateTime, step: Duration, n: u32) -> OffsetDateTime {
            start + step * n
        }
    }

    impl Clock for SteppingClock {
        fn now_utc(&self) -> OffsetDateTime {
            let now_us = self.next_us.fetch_add(self.step_us, Ordering::SeqCst);
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(now_us) * 1000).unwrap()
        }
    }

}
