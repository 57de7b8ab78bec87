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

//! Generic abstraction to access different database systems.
//!
//! Services talk to the database through an `Executor`, which is an enum with one variant per
//! supported backend.  Query functions match on the executor and issue the SQL dialect of the
//! backend they got, which keeps the queries for all backends side by side.
//!
//! The SQLite backend is always used by unit tests and is good enough for single-node deployments.
//! The PostgreSQL backend is meant for production deployments.

use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Storage failures, classified by what the caller can do about them.
///
/// Backends map the errors they recognize to the specific variants.  Anything else becomes a
/// `BackendError` carrying the raw detail, which is meant for logs and not for end users.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DbError {
    /// A row with the same unique key is already stored.
    #[error("Already exists")]
    AlreadyExists,

    /// Unclassified failure reported by the backend.
    #[error("Database error: {0}")]
    BackendError(String),

    /// A row violates a constraint, either when writing it or when decoding it.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// A query that must return one row returned none.
    #[error("Entity not found")]
    NotFound,

    /// The pool is closed or cannot hand out a connection.
    #[error("Unavailable")]
    Unavailable,
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A pooled connection to whichever backend the service was configured with.
///
/// Query functions match on the variant to pick the SQL dialect, so the statements for every
/// backend live side by side.
#[derive(Debug)]
pub enum Executor {
    /// Connection to a PostgreSQL server.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// Connection to a SQLite database.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteExecutor),
}

/// A database shared by all requests of a service.
#[async_trait]
pub trait Db {
    /// Takes a connection out of the pool.  It goes back to the pool when the `Executor` drops.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes the pool.  Later calls to `ex` fail with `Unavailable`.
    async fn close(&self);
}

/// Macros to run one set of test functions against every database backend.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Defines the test `name` as a call to `module::name` with the database built by `setup`.
    ///
    /// `generate_tests!` is the entry point; this only exists because a `#[meta]` captured once
    /// cannot be expanded inside a second repetition.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Defines one `#[tokio::test]` per `name`, each calling `module::name` with the value of
    /// `setup`, which is evaluated anew for every test.
    ///
    /// An optional leading `#[meta]` is attached to all generated tests, which is how backends
    /// that need a live server mark their instances as `#[ignore]`d.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}
