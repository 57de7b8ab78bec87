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

//! API to record a new ride.

use crate::driver::Driver;
use crate::model::RideRequest;
use crate::rest::RestResult;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Json(body): Json<Value>,
) -> RestResult<impl IntoResponse> {
    // A JSON document that is not an object carries no fields, so validation reports the first
    // missing one.
    let fields = match body {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    let rides = driver.create_ride(RideRequest::from(fields)).await?;
    Ok((StatusCode::CREATED, Json(rides)))
}
