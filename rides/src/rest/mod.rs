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

//! Entry point to the REST server.

use crate::driver::{Driver, DriverError};
use crate::model::ErrorCode;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use log::warn;
use ridebook_core::rest::ErrorResponse;

mod health_get;
mod ride_get;
mod rides_get;
mod rides_post;
#[cfg(test)]
mod testutils;

/// Frontend errors.  These are the errors that are visible to the user on failed requests.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error(transparent)]
pub(crate) struct RestError(#[from] DriverError);

impl IntoResponse for RestError {
    fn into_response(self) -> axum::response::Response {
        let code = self.0.code();
        let status = match code {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::RidesNotFoundError => StatusCode::NOT_FOUND,
            ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Server errors are opaque to the caller; the detail only goes to the log.
        let message = match code {
            ErrorCode::ServerError => {
                warn!("Request failed with server error: {}", self.0);
                "Unknown error".to_owned()
            }
            _ => self.0.to_string(),
        };

        let response = ErrorResponse::new(code.as_str(), message);
        (status, Json(response)).into_response()
    }
}

/// Result type for this module.
pub(crate) type RestResult<T> = Result<T, RestError>;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route("/health", get(health_get::handler))
        .route("/rides", get(rides_get::handler).post(rides_post::handler))
        .route("/rides/:id", get(ride_get::handler))
        .with_state(driver)
}
