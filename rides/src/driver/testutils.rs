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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::{Ride, RideRequest};
use ridebook_core::clocks::testutils::SteppingClock;
use ridebook_core::db::{Db, Executor};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::datetime;

/// First reading of the clock used in tests.
pub(crate) const CLOCK_START: OffsetDateTime = datetime!(2023-12-01 05:50:00 UTC);

/// Amount by which the clock used in tests advances on every reading.
pub(crate) const CLOCK_STEP: Duration = Duration::from_secs(1);

/// Returns the timestamp that the `n`th ride created in a test context gets, counting from zero.
pub(crate) fn nth_created(n: u32) -> OffsetDateTime {
    SteppingClock::nth(CLOCK_START, CLOCK_STEP, n)
}

/// Creates a valid ride creation request whose contents derive from `i`.
pub(crate) fn valid_request(i: u16) -> RideRequest {
    RideRequest {
        start_lat: json!(f64::from(i % 90)),
        start_long: json!(f64::from(i % 180)),
        end_lat: json!(-f64::from(i % 90)),
        end_long: json!(-f64::from(i % 180)),
        rider_name: json!(format!("Rider {}", i)),
        driver_name: json!(format!("Driver {}", i)),
        driver_vehicle: json!(format!("Vehicle {}", i)),
    }
}

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes a driver backed by an in-memory database and a clock that advances one
    /// step on every reading.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(ridebook_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SteppingClock::new(CLOCK_START, CLOCK_STEP));
        let driver = Driver::new(db.clone(), clock);
        Self { db, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets a copy of the driver under test.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Creates `count` rides through the driver and returns them in creation order.
    pub(crate) async fn put_rides(&self, count: u16) -> Vec<Ride> {
        let mut rides = Vec::with_capacity(usize::from(count));
        for i in 0..count {
            let mut created = self.driver().create_ride(valid_request(i)).await.unwrap();
            assert_eq!(1, created.len());
            rides.push(created.remove(0));
        }
        rides
    }

    /// Gets all rides straight from the database.
    pub(crate) async fn all_rides(&self) -> Vec<Ride> {
        db::list_rides(&mut self.ex().await, None).await.unwrap()
    }

    /// Shuts the database down so that further operations fail.
    pub(crate) async fn close(&self) {
        self.db.close().await;
    }
}
