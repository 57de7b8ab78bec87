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

//! PostgreSQL backend for production deployments.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::{EnvResult, get_optional_var, get_required_var};
use async_trait::async_trait;
use derivative::Derivative;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions, Postgres};
use std::time::Duration;

/// How long to wait for a pooled connection before declaring the database unavailable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Converts a raw `sqlx` error into a `DbError` by looking at PostgreSQL's SQLSTATE codes.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::Database(e) => match e.code().as_deref() {
            Some("23505") => DbError::AlreadyExists,
            Some("23514") => DbError::DataIntegrityError(e.to_string()),
            Some("53300") => DbError::Unavailable,
            code => DbError::BackendError(format!("SQLSTATE {:?}: {}", code, e)),
        },
        sqlx::Error::ColumnDecode { index, source } => {
            DbError::DataIntegrityError(format!("Cannot decode column {}: {}", index, source))
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Connection settings for a PostgreSQL server.
#[derive(Derivative)]
#[derivative(Debug, Default)]
pub struct PostgresOptions {
    /// Hostname of the server.
    pub host: String,

    /// TCP port of the server.
    pub port: u16,

    /// Name of the database holding the service's tables.
    pub database: String,

    /// Role to log in as.
    pub username: String,

    /// Password of the role.  Never printed.
    #[derivative(Debug = "ignore")]
    pub password: String,

    /// Connections to keep open even when idle, or the pool's default if `None`.
    pub min_connections: Option<u32>,

    /// Upper bound on open connections, or the pool's default if `None`.
    pub max_connections: Option<u32>,
}

impl PostgresOptions {
    /// Reads the settings from `<prefix>_HOST`, `<prefix>_PORT`, `<prefix>_DATABASE`,
    /// `<prefix>_USERNAME` and `<prefix>_PASSWORD`, all required, plus the optional
    /// `<prefix>_MIN_CONNECTIONS` and `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> EnvResult<Self> {
        Ok(Self {
            host: get_required_var(prefix, "HOST")?,
            port: get_required_var(prefix, "PORT")?,
            database: get_required_var(prefix, "DATABASE")?,
            username: get_required_var(prefix, "USERNAME")?,
            password: get_required_var(prefix, "PASSWORD")?,
            min_connections: get_optional_var(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var(prefix, "MAX_CONNECTIONS")?,
        })
    }

    /// Builds the settings for every connection opened by the pool.
    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.username)
            .password(&self.password)
    }

    /// Builds the settings of the pool itself.
    fn pool_options(&self) -> PgPoolOptions {
        let mut options = PgPoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT);
        if let Some(n) = self.min_connections {
            options = options.min_connections(n);
        }
        if let Some(n) = self.max_connections {
            options = options.max_connections(n);
        }
        options
    }
}

/// A pooled connection to a PostgreSQL server.
pub type PostgresExecutor = PoolConnection<Postgres>;

/// A PostgreSQL database accessed through a connection pool.
pub struct PostgresDb {
    /// The pool, shared by all concurrent requests.
    pool: PgPool,
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("PostgreSQL pool dropped while still open; call close() first");
        }
    }
}

impl PostgresDb {
    /// Sets up a pool for the server described by `opts`.
    ///
    /// Connections are opened lazily so this succeeds even if the server is down.  Failures
    /// surface on the first call to `ex`.
    pub fn connect(opts: PostgresOptions) -> DbResult<Self> {
        let pool = opts.pool_options().connect_lazy_with(opts.connect_options());
        Ok(Self { pool })
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        Ok(Executor::Postgres(conn))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Runs every statement in `schema` against `conn`.
pub async fn run_schema(conn: &mut PgConnection, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(conn).await.map_err(map_sqlx_error).map(|_| ())
}

/// Test utilities for the PostgreSQL backend.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Connects to the server described by the `PGSQL_TEST_*` variables.
    ///
    /// The pool is pinned to a single connection whose `search_path` points at `pg_temp`, so every
    /// table created by a test is private to it and vanishes when the pool closes.
    pub async fn setup() -> PostgresDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let opts = PostgresOptions {
            min_connections: Some(1),
            max_connections: Some(1),
            ..PostgresOptions::from_env("PGSQL_TEST").unwrap()
        };
        let db = PostgresDb::connect(opts).unwrap();

        let mut conn = db.pool.acquire().await.unwrap();
        sqlx::query("SET search_path TO pg_temp").execute(&mut *conn).await.unwrap();
        db
    }
}
