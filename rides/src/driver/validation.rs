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

//! Validation of untrusted ride creation requests.

use crate::driver::{DriverError, DriverResult};
use crate::model::{GeoPoint, NewRide, RideRequest};
use serde_json::Value;

/// Message for an invalid pickup point.
const INVALID_START: &str =
    "Start latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively";

/// Message for an invalid drop-off point.
const INVALID_END: &str =
    "End latitude and longitude must be between -90 - 90 and -180 to 180 degrees respectively";

/// Message for an invalid rider name.
const INVALID_RIDER_NAME: &str = "Rider name must be a non empty string";

/// Message for an invalid driver name.
const INVALID_DRIVER_NAME: &str = "Driver name must be a non empty string";

/// Message for an invalid vehicle.
const INVALID_DRIVER_VEHICLE: &str = "Driver Vehicle must be a non empty string";

/// Interprets `value` as a finite number.
///
/// Numbers are taken as is and strings are parsed after trimming surrounding whitespace.
fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Interprets the `lat`/`long` pair as a point within the valid coordinate ranges.
fn coerce_point(lat: &Value, long: &Value) -> Option<GeoPoint> {
    let point = GeoPoint::new(coerce_number(lat)?, coerce_number(long)?);
    point.in_bounds().then_some(point)
}

/// Interprets `value` as a non-empty string.
fn coerce_name(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Validates the contents of a ride creation `request`.
///
/// Rules are checked in a fixed order and only the first violation is reported.
pub(super) fn validate(request: RideRequest) -> DriverResult<NewRide> {
    let invalid = |message: &str| DriverError::InvalidInput(message.to_owned());

    let start = coerce_point(&request.start_lat, &request.start_long)
        .ok_or_else(|| invalid(INVALID_START))?;
    let end =
        coerce_point(&request.end_lat, &request.end_long).ok_or_else(|| invalid(INVALID_END))?;
    let rider_name = coerce_name(request.rider_name).ok_or_else(|| invalid(INVALID_RIDER_NAME))?;
    let driver_name =
        coerce_name(request.driver_name).ok_or_else(|| invalid(INVALID_DRIVER_NAME))?;
    let driver_vehicle =
        coerce_name(request.driver_vehicle).ok_or_else(|| invalid(INVALID_DRIVER_VEHICLE))?;

    Ok(NewRide::new(start, end, rider_name, driver_name, driver_vehicle))
}
