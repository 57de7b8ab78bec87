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

//! Ride record service.
//!
//! A small REST service that records taxi rides and serves them back, either all at once, one page
//! at a time or one ride at a time.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::info;
use ridebook_core::clocks::Clock;
use ridebook_core::db::Db;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

pub mod config;
pub mod db;
pub mod driver;
use driver::Driver;
pub mod model;
mod rest;
use rest::app;

/// Instantiates all resources to serve the application on `bind_addr`.
///
/// The `db` must already have been initialized with `db::init_schema`.  While it'd be nice to push
/// the creation of the driver to `main`, doing so would force us to expose many crate-internal
/// types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
) -> Result<(), Box<dyn Error>> {
    let driver = Driver::new(db, clock);
    let app = app(driver);

    let listener = tokio::net::TcpListener::bind(bind_addr.into()).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
