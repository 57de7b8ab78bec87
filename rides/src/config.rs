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

//! Service configuration read from the environment.

#[cfg(feature = "postgres")]
use ridebook_core::db::postgres::{PostgresDb, PostgresOptions};
use ridebook_core::db::{Db, DbResult};
use ridebook_core::env::{EnvError, EnvResult, get_optional_var};
use std::sync::Arc;

/// Port to listen on when none is configured.
pub const DEFAULT_PORT: u16 = 8010;

/// Connection string of the SQLite database to use when none is configured.
#[cfg(any(feature = "sqlite", test))]
pub const DEFAULT_SQLITE_PATH: &str = "sqlite::memory:";

/// Prefix of the variables that configure the production PostgreSQL database.
#[cfg(feature = "postgres")]
const PGSQL_PREFIX: &str = "PGSQL_PROD";

/// Database backend selected by the configuration.
#[derive(Debug)]
pub enum DbBackend {
    /// PostgreSQL database described by a set of connection options.
    #[cfg(feature = "postgres")]
    Postgres(PostgresOptions),

    /// SQLite database at the given connection string.
    #[cfg(any(feature = "sqlite", test))]
    Sqlite(String),
}

impl DbBackend {
    /// Connects to the configured database.
    pub async fn connect(self) -> DbResult<Arc<dyn Db + Send + Sync>> {
        match self {
            #[cfg(feature = "postgres")]
            DbBackend::Postgres(opts) => Ok(Arc::new(PostgresDb::connect(opts)?)),

            #[cfg(any(feature = "sqlite", test))]
            DbBackend::Sqlite(path) => {
                Ok(Arc::new(ridebook_core::db::sqlite::connect(&path).await?))
            }
        }
    }
}

/// Configuration of the service.
#[derive(Debug)]
pub struct ServiceOptions {
    /// TCP port to listen on.
    pub port: u16,

    /// Database to store rides in.
    pub db: DbBackend,
}

impl ServiceOptions {
    /// Initializes the configuration from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use `<prefix>_PORT`, `<prefix>_DB_BACKEND` (either `sqlite` or `postgres`) and
    /// `<prefix>_SQLITE_PATH`.  The PostgreSQL backend takes its settings from the `PGSQL_PROD_*`
    /// variables.
    pub fn from_env(prefix: &str) -> EnvResult<Self> {
        let port = get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT);

        let backend = get_optional_var::<String>(prefix, "DB_BACKEND")?;
        let db = match backend.as_deref().unwrap_or("sqlite") {
            #[cfg(feature = "postgres")]
            "postgres" => DbBackend::Postgres(PostgresOptions::from_env(PGSQL_PREFIX)?),

            #[cfg(any(feature = "sqlite", test))]
            "sqlite" => DbBackend::Sqlite(
                get_optional_var::<String>(prefix, "SQLITE_PATH")?
                    .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_owned()),
            ),

            other => {
                return Err(EnvError::BadValue {
                    name: format!("{}_DB_BACKEND", prefix),
                    value: other.to_owned(),
                    reason: "unsupported database backend".to_owned(),
                });
            }
        };

        Ok(Self { port, db })
    }
}
