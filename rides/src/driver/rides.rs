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

//! Operations on rides.

use crate::db;
use crate::driver::pagination::page_window;
use crate::driver::validation::validate;
use crate::driver::{Driver, DriverError, DriverResult};
use crate::model::{PageRequest, Ride, RideId, RideRequest};
use log::info;
use ridebook_core::db::DbError;
use std::str::FromStr;

impl Driver {
    /// Validates and stores a new ride described by `request`.
    ///
    /// Returns the stored ride, as read back from the database, as the only element of the
    /// result.
    pub(crate) async fn create_ride(self, request: RideRequest) -> DriverResult<Vec<Ride>> {
        let ride = validate(request).inspect_err(|e| info!("Rejected new ride: {}", e))?;

        let mut ex = self.db.ex().await?;
        let id = db::create_ride(&mut ex, &ride, self.clock.now_utc()).await?;
        match db::get_ride(&mut ex, id).await? {
            Some(ride) => Ok(vec![ride]),
            None => {
                let e = DbError::BackendError(format!("Ride {} vanished after creation", id));
                Err(e.into())
            }
        }
    }

    /// Lists rides in ascending identifier order, restricted to the page described by `request`
    /// if it carries pagination parameters.
    pub(crate) async fn list_rides(self, request: PageRequest) -> DriverResult<Vec<Ride>> {
        let window =
            page_window(&request).inspect_err(|e| info!("Rejected ride listing: {}", e))?;

        let rides = db::list_rides(&mut self.db.ex().await?, window).await?;
        if rides.is_empty() {
            info!("No rides found for {:?}", window);
            return Err(DriverError::NotFound);
        }
        Ok(rides)
    }

    /// Gets the ride identified by the untrusted `id` as the only element of the result.
    pub(crate) async fn get_ride(self, id: &str) -> DriverResult<Vec<Ride>> {
        let id = RideId::from_str(id).inspect_err(|e| info!("Rejected ride lookup: {}", e))?;

        match db::get_ride(&mut self.db.ex().await?, id).await? {
            Some(ride) => Ok(vec![ride]),
            None => {
                info!("Ride {} not found", id);
                Err(DriverError::NotFound)
            }
        }
    }
}
