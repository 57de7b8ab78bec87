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

//! Business logic for the service.

use crate::model::{ErrorCode, ModelError};
use log::warn;
use ridebook_core::clocks::Clock;
use ridebook_core::db::{Db, DbError};
use std::sync::Arc;

mod pagination;
mod rides;
#[cfg(test)]
pub(crate) mod testutils;
mod validation;

/// Business logic errors.  These errors encapsulate backend errors or unsatisfied conditions
/// that prevent the operations from completing.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// Indicates a failure in the storage layer.  The details are logged but never exposed.
    #[error("Unknown error")]
    BackendError,

    /// Indicates that the caller-supplied ride data violates a domain rule.
    #[error("{0}")]
    InvalidInput(String),

    /// Indicates that the request parameters cannot be interpreted.
    #[error("{0}")]
    MalformedRequest(String),

    /// Indicates that the query matched no rides.
    #[error("Could not find any rides")]
    NotFound,
}

impl DriverError {
    /// Returns the kind of error to report to callers.
    pub fn code(&self) -> ErrorCode {
        match self {
            DriverError::BackendError => ErrorCode::ServerError,
            DriverError::InvalidInput(_) => ErrorCode::ValidationError,
            DriverError::MalformedRequest(_) => ErrorCode::ServerError,
            DriverError::NotFound => ErrorCode::RidesNotFoundError,
        }
    }
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        warn!("Database operation failed: {}", e);
        DriverError::BackendError
    }
}

impl From<ModelError> for DriverError {
    fn from(e: ModelError) -> Self {
        DriverError::MalformedRequest(e.0)
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": each acquires its own
/// database executor and releases it before returning.
#[derive(Clone)]
pub struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock used to timestamp new rides.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub fn new(db: Arc<dyn Db + Send + Sync>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { db, clock }
    }
}
