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

//! Shared plumbing for database-backed REST services.
//!
//! Services built on top of this crate are split in the following layers, each living in its own
//! module of the service crate:
//!
//! 1.  `model`: Plain data types that describe the domain.  Types validate themselves at
//!     construction time so that the rest of the service can trust them.
//!
//! 1.  `db`: The persistence layer.  A collection of free functions that take an `Executor` and
//!     issue queries against whichever backend the executor is connected to.
//!
//! 1.  `driver`: The business logic layer.  A `Driver` type holds the injected dependencies (the
//!     database and the clock) and implements the operations exposed by the service.
//!
//! 1.  `rest`: The HTTP layer.  An `axum::Router` whose handlers delegate to the `Driver`.
//!
//! 1.  `main`: The launcher.  Reads configuration from the environment and hands it to the
//!     service's `serve` function.
//!
//! Every layer has its own error type and errors float up with `?`, being reinterpreted by each
//! layer on their way to the HTTP response.
//!
//! The heavy dependencies (the database drivers) are only pulled in when the corresponding feature
//! is enabled.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod clocks;
pub mod db;
pub mod env;
pub mod rest;
