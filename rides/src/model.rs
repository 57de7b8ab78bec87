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

//! High-level data types.

use derive_getters::Getters;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;
use time::OffsetDateTime;

/// Model errors.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ModelError(pub String);

/// Result type for this module.
pub type ModelResult<T> = Result<T, ModelError>;

/// Kinds of errors reported to callers.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The caller-supplied ride data violates a domain rule.
    ValidationError,

    /// A well-formed query matched no rides.
    RidesNotFoundError,

    /// The request could not be served because of a storage failure or a malformed request.
    ServerError,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RidesNotFoundError => "RIDES_NOT_FOUND_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
        }
    }
}

/// Identifier of a ride, assigned by the store at insertion time.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RideId(i64);

impl RideId {
    /// Wraps a raw identifier obtained from the store.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the identifier as an `i64`, which is what both database backends use.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl FromStr for RideId {
    type Err = ModelError;

    fn from_str(s: &str) -> ModelResult<Self> {
        match s.parse::<i64>() {
            Ok(id) => Ok(Self(id)),
            Err(e) => Err(ModelError(format!("Invalid ride identifier '{}': {}", s, e))),
        }
    }
}

/// A point on Earth expressed as degrees of latitude and longitude.
#[derive(Clone, Copy, Constructor, Debug, PartialEq)]
pub struct GeoPoint {
    /// Latitude, valid in the `[-90, 90]` range.
    lat: f64,

    /// Longitude, valid in the `[-180, 180]` range.
    long: f64,
}

impl GeoPoint {
    /// Returns the latitude of the point.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Returns the longitude of the point.
    pub fn long(&self) -> f64 {
        self.long
    }

    /// Checks whether both coordinates are within their valid ranges.
    ///
    /// Non-finite coordinates are never in range.
    pub fn in_bounds(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.long)
    }
}

/// Untrusted contents of a ride creation request, exactly as the caller sent them.
///
/// Every field holds an arbitrary JSON value because interpreting them is up to the validator.
/// Fields that were not present in the request are `Value::Null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RideRequest {
    /// Latitude of the pickup point.
    pub start_lat: Value,

    /// Longitude of the pickup point.
    pub start_long: Value,

    /// Latitude of the drop-off point.
    pub end_lat: Value,

    /// Longitude of the drop-off point.
    pub end_long: Value,

    /// Name of the rider.
    pub rider_name: Value,

    /// Name of the driver.
    pub driver_name: Value,

    /// Identifier of the driver's vehicle.
    pub driver_vehicle: Value,
}

impl From<Map<String, Value>> for RideRequest {
    fn from(mut fields: Map<String, Value>) -> Self {
        let mut take = |name: &str| fields.remove(name).unwrap_or(Value::Null);
        Self {
            start_lat: take("start_lat"),
            start_long: take("start_long"),
            end_lat: take("end_lat"),
            end_long: take("end_long"),
            rider_name: take("rider_name"),
            driver_name: take("driver_name"),
            driver_vehicle: take("driver_vehicle"),
        }
    }
}

/// A validated ride that has not been stored yet.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct NewRide {
    /// Pickup point.
    start: GeoPoint,

    /// Drop-off point.
    end: GeoPoint,

    /// Name of the rider.
    rider_name: String,

    /// Name of the driver.
    driver_name: String,

    /// Identifier of the driver's vehicle.
    driver_vehicle: String,
}

/// A ride as persisted in the store.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    /// Identifier of the ride.
    #[serde(rename = "rideID")]
    ride_id: RideId,

    /// Latitude of the pickup point.
    start_lat: f64,

    /// Longitude of the pickup point.
    start_long: f64,

    /// Latitude of the drop-off point.
    end_lat: f64,

    /// Longitude of the drop-off point.
    end_long: f64,

    /// Name of the rider.
    rider_name: String,

    /// Name of the driver.
    driver_name: String,

    /// Identifier of the driver's vehicle.
    driver_vehicle: String,

    /// Time at which the ride was stored.
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
}

impl Ride {
    /// Creates a stored ride from the `ride` contents, its `ride_id` and `created` timestamp.
    pub fn new(ride_id: RideId, ride: NewRide, created: OffsetDateTime) -> Self {
        Self {
            ride_id,
            start_lat: ride.start.lat,
            start_long: ride.start.long,
            end_lat: ride.end.lat,
            end_long: ride.end.long,
            rider_name: ride.rider_name,
            driver_name: ride.driver_name,
            driver_vehicle: ride.driver_vehicle,
            created,
        }
    }
}

/// Raw pagination parameters of a listing request.
///
/// Parameters are kept as strings so that malformed values can be told apart from missing ones.
#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct PageRequest {
    /// 1-based number of the page to return.
    pub page_no: Option<String>,

    /// Number of rides per page.
    pub page_size: Option<String>,
}

/// Range of rides to return from the set of all rides ordered by identifier.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageWindow {
    /// Number of rides to skip.
    offset: i64,

    /// Maximum number of rides to return.
    limit: i64,
}

impl PageWindow {
    /// Creates a new window.  Both quantities must be non-negative.
    pub(crate) fn new(offset: i64, limit: i64) -> Self {
        debug_assert!(offset >= 0 && limit >= 0);
        Self { offset, limit }
    }

    /// Returns the number of rides to skip.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Returns the maximum number of rides to return.
    pub fn limit(&self) -> i64 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serde_test::{Token, assert_tokens};
    use time::macros::datetime;

    #[test]
    fn test_error_code_ser_de() {
        assert_tokens(
            &ErrorCode::ValidationError,
            &[Token::UnitVariant { name: "ErrorCode", variant: "VALIDATION_ERROR" }],
        );
        assert_tokens(
            &ErrorCode::RidesNotFoundError,
            &[Token::UnitVariant { name: "ErrorCode", variant: "RIDES_NOT_FOUND_ERROR" }],
        );
        assert_tokens(
            &ErrorCode::ServerError,
            &[Token::UnitVariant { name: "ErrorCode", variant: "SERVER_ERROR" }],
        );
    }

    #[test]
    fn test_error_code_as_str_matches_serde() {
        for code in [ErrorCode::ValidationError, ErrorCode::RidesNotFoundError, ErrorCode::ServerError]
        {
            assert_eq!(json!(code.as_str()), serde_json::to_value(code).unwrap());
        }
    }

    #[test]
    fn test_ride_id_ser_de() {
        assert_tokens(&RideId::new(42), &[Token::I64(42)]);
    }

    #[test]
    fn test_ride_id_from_str() {
        assert_eq!(RideId::new(17), RideId::from_str("17").unwrap());
        assert_eq!(RideId::new(-3), RideId::from_str("-3").unwrap());

        for raw in ["", "abc", "1 OR 1=1", "1.5", "99999999999999999999"] {
            let err = RideId::from_str(raw).unwrap_err();
            assert!(err.0.starts_with(&format!("Invalid ride identifier '{}'", raw)));
        }
    }

    #[test]
    fn test_geo_point_in_bounds() {
        assert!(GeoPoint::new(0.0, 0.0).in_bounds());
        assert!(GeoPoint::new(90.0, 180.0).in_bounds());
        assert!(GeoPoint::new(-90.0, -180.0).in_bounds());

        assert!(!GeoPoint::new(90.000001, 0.0).in_bounds());
        assert!(!GeoPoint::new(-90.5, 0.0).in_bounds());
        assert!(!GeoPoint::new(0.0, 180.1).in_bounds());
        assert!(!GeoPoint::new(0.0, -181.0).in_bounds());
        assert!(!GeoPoint::new(f64::NAN, 0.0).in_bounds());
        assert!(!GeoPoint::new(0.0, f64::INFINITY).in_bounds());
    }

    #[test]
    fn test_ride_request_from_map() {
        let fields = json!({
            "start_lat": 10,
            "start_long": "20",
            "rider_name": "Rider",
            "driver_vehicle": true,
            "unrelated": "ignored",
        });
        let Value::Object(fields) = fields else { panic!("Must be an object") };

        let request = RideRequest::from(fields);
        assert_eq!(
            RideRequest {
                start_lat: json!(10),
                start_long: json!("20"),
                end_lat: Value::Null,
                end_long: Value::Null,
                rider_name: json!("Rider"),
                driver_name: Value::Null,
                driver_vehicle: json!(true),
            },
            request
        );
    }

    #[test]
    fn test_ride_json_representation() {
        let ride = Ride::new(
            RideId::new(7),
            NewRide::new(
                GeoPoint::new(90.0, 90.0),
                GeoPoint::new(85.5, -85.25),
                "Rider".to_owned(),
                "Driver".to_owned(),
                "Car".to_owned(),
            ),
            datetime!(2023-12-01 10:15:00.5 UTC),
        );

        let value = serde_json::to_value(&ride).unwrap();
        assert_eq!(
            json!({
                "rideID": 7,
                "startLat": 90.0,
                "startLong": 90.0,
                "endLat": 85.5,
                "endLong": -85.25,
                "riderName": "Rider",
                "driverName": "Driver",
                "driverVehicle": "Car",
                "created": "2023-12-01T10:15:00.5Z",
            }),
            value
        );

        assert_eq!(ride, serde_json::from_value::<Ride>(value).unwrap());
    }

    #[test]
    fn test_page_window_accessors() {
        let window = PageWindow::new(10, 5);
        assert_eq!(10, window.offset());
        assert_eq!(5, window.limit());
    }
}
