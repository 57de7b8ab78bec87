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

//! Test utilities for the REST API.

use crate::driver;
use crate::model::Ride;
use crate::rest::app;
use axum::Router;
use serde_json::{Value, json};

pub(crate) use crate::driver::testutils::nth_created;

/// Creates the JSON payload of a valid ride creation request whose contents derive from `i`.
pub(crate) fn valid_json(i: u16) -> Value {
    let request = driver::testutils::valid_request(i);
    json!({
        "start_lat": request.start_lat,
        "start_long": request.start_long,
        "end_lat": request.end_lat,
        "end_long": request.end_long,
        "rider_name": request.rider_name,
        "driver_name": request.driver_name,
        "driver_vehicle": request.driver_vehicle,
    })
}

/// State of a running test against the REST API.
pub(crate) struct TestContext {
    /// Context of the driver that backs the app.
    driver: driver::testutils::TestContext,

    /// The app under test.
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let driver = driver::testutils::TestContext::setup().await;
        let app = app(driver.driver());
        Self { driver, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Creates `count` valid rides and returns them in creation order.
    pub(crate) async fn put_rides(&self, count: u16) -> Vec<Ride> {
        self.driver.put_rides(count).await
    }

    pub(crate) async fn all_rides(&self) -> Vec<Ride> {
        self.driver.all_rides().await
    }

    /// Shuts the database down so that further requests fail.
    pub(crate) async fn close(&self) {
        self.driver.close().await;
    }
}
