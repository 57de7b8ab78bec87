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

//! Common utilities to interact with an SQLite database.

use crate::db::{Db, DbError, DbResult, Executor};
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Takes a raw SQLx error `e` and converts it to our generic error type.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { source, .. } => DbError::DataIntegrityError(source.to_string()),
        sqlx::Error::Database(e) if e.is_unique_violation() => DbError::AlreadyExists,
        sqlx::Error::Database(e) if e.is_check_violation() => {
            DbError::DataIntegrityError(e.to_string())
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Opens a connection pool against the database described by `conn_str`.
///
/// The connection string can be a path to a file, which is created if missing, or `:memory:` for
/// a private in-memory database that is shared by all connections in the pool.
pub async fn connect(conn_str: &str) -> DbResult<SqliteDb> {
    let options = SqliteConnectOptions::from_str(conn_str)
        .map_err(map_sqlx_error)?
        .create_if_missing(true);

    // In-memory databases vanish once their last connection is gone, so never let the pool reap
    // idle connections.
    let pool = SqlitePoolOptions::new()
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(map_sqlx_error)?;
    Ok(SqliteDb { pool })
}

/// A database executor for SQLite backed by a pooled connection.
pub type SqliteExecutor = PoolConnection<Sqlite>;

/// A database instance backed by a SQLite database.
pub struct SqliteDb {
    /// Shared SQLite connection pool.  This is a cloneable type that all concurrent requests can
    /// use concurrently.
    pool: SqlitePool,
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("Dropping connection without having called close() first");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Sqlite(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Helper function to initialize the database with a `schema` that may contain multiple
/// statements.
pub async fn run_schema(conn: &mut SqliteConnection, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(conn).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Test utilities for the SQLite connection.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Initializes the test database.
    pub async fn setup() -> SqliteDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        connect(":memory:").await.unwrap()
    }
}
