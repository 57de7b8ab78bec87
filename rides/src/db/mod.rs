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

//! Database abstractions to store and query rides.
//!
//! Every value supplied by callers travels as a bound parameter.  Column names are aliased to
//! lowercase identifiers in every `SELECT` so that rows can be decoded the same way regardless of
//! PostgreSQL folding unquoted identifiers to lowercase.

use crate::model::{GeoPoint, NewRide, PageWindow, Ride, RideId};
#[cfg(feature = "postgres")]
use ridebook_core::db::postgres;
#[cfg(any(feature = "sqlite", test))]
use ridebook_core::db::sqlite;
use ridebook_core::db::{DbError, DbResult, Executor};
use sqlx::{ColumnIndex, Decode, Row, Type};
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Decodes a ride from a `row` that was fetched with the column aliases used by this module.
///
/// `map_err` is the backend-specific function to translate decoding errors.
fn ride_from_row<'r, R>(row: &'r R, map_err: fn(sqlx::Error) -> DbError) -> DbResult<Ride>
where
    R: Row,
    for<'a> &'a str: ColumnIndex<R>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
    f64: Decode<'r, R::Database> + Type<R::Database>,
    String: Decode<'r, R::Database> + Type<R::Database>,
    OffsetDateTime: Decode<'r, R::Database> + Type<R::Database>,
{
    let ride_id: i64 = row.try_get("ride_id").map_err(map_err)?;
    let start_lat: f64 = row.try_get("start_lat").map_err(map_err)?;
    let start_long: f64 = row.try_get("start_long").map_err(map_err)?;
    let end_lat: f64 = row.try_get("end_lat").map_err(map_err)?;
    let end_long: f64 = row.try_get("end_long").map_err(map_err)?;
    let rider_name: String = row.try_get("rider_name").map_err(map_err)?;
    let driver_name: String = row.try_get("driver_name").map_err(map_err)?;
    let driver_vehicle: String = row.try_get("driver_vehicle").map_err(map_err)?;
    let created: OffsetDateTime = row.try_get("created").map_err(map_err)?;

    let ride = NewRide::new(
        GeoPoint::new(start_lat, start_long),
        GeoPoint::new(end_lat, end_long),
        rider_name,
        driver_name,
        driver_vehicle,
    );
    Ok(Ride::new(RideId::new(ride_id), ride, created))
}

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Stores a new `ride` that was received at `created` and returns the identifier that the
/// database assigned to it.
pub(crate) async fn create_ride(
    ex: &mut Executor,
    ride: &NewRide,
    created: OffsetDateTime,
) -> DbResult<RideId> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO Rides
                    (startLat, startLong, endLat, endLong,
                    riderName, driverName, driverVehicle, created)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING rideID AS ride_id
            ";
            let row = sqlx::query(query_str)
                .bind(ride.start().lat())
                .bind(ride.start().long())
                .bind(ride.end().lat())
                .bind(ride.end().long())
                .bind(ride.rider_name())
                .bind(ride.driver_name())
                .bind(ride.driver_vehicle())
                .bind(created)
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            let id: i64 = row.try_get("ride_id").map_err(postgres::map_sqlx_error)?;
            Ok(RideId::new(id))
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO Rides
                    (startLat, startLong, endLat, endLong,
                    riderName, driverName, driverVehicle, created)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ";
            let done = sqlx::query(query_str)
                .bind(ride.start().lat())
                .bind(ride.start().long())
                .bind(ride.end().lat())
                .bind(ride.end().long())
                .bind(ride.rider_name())
                .bind(ride.driver_name())
                .bind(ride.driver_vehicle())
                .bind(created)
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(format!(
                    "Insert created {} rows",
                    done.rows_affected()
                )));
            }
            Ok(RideId::new(done.last_insert_rowid()))
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Fetches the ride identified by `id`, or `None` if it does not exist.
pub(crate) async fn get_ride(ex: &mut Executor, id: RideId) -> DbResult<Option<Ride>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = "
                SELECT
                    rideID AS ride_id, startLat AS start_lat, startLong AS start_long,
                    endLat AS end_lat, endLong AS end_long, riderName AS rider_name,
                    driverName AS driver_name, driverVehicle AS driver_vehicle, created
                FROM Rides
                WHERE rideID = $1
            ";
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            maybe_row.map(|row| ride_from_row(&row, postgres::map_sqlx_error)).transpose()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let query_str = "
                SELECT
                    rideID AS ride_id, startLat AS start_lat, startLong AS start_long,
                    endLat AS end_lat, endLong AS end_long, riderName AS rider_name,
                    driverName AS driver_name, driverVehicle AS driver_vehicle, created
                FROM Rides
                WHERE rideID = ?
            ";
            let maybe_row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_optional(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            maybe_row.map(|row| ride_from_row(&row, sqlite::map_sqlx_error)).transpose()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Fetches rides ordered by ascending identifier.
///
/// If `window` is `None`, all rides are returned.  Otherwise, only the rides within the window
/// are returned, which may be none if the window lies past the end of the data.
pub(crate) async fn list_rides(
    ex: &mut Executor,
    window: Option<PageWindow>,
) -> DbResult<Vec<Ride>> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let rows = match window {
                None => {
                    let query_str = "
                        SELECT
                            rideID AS ride_id, startLat AS start_lat, startLong AS start_long,
                            endLat AS end_lat, endLong AS end_long, riderName AS rider_name,
                            driverName AS driver_name, driverVehicle AS driver_vehicle, created
                        FROM Rides
                        ORDER BY rideID ASC
                    ";
                    sqlx::query(query_str).fetch_all(&mut **ex).await
                }
                Some(window) => {
                    let query_str = "
                        SELECT
                            rideID AS ride_id, startLat AS start_lat, startLong AS start_long,
                            endLat AS end_lat, endLong AS end_long, riderName AS rider_name,
                            driverName AS driver_name, driverVehicle AS driver_vehicle, created
                        FROM Rides
                        ORDER BY rideID ASC
                        LIMIT $1 OFFSET $2
                    ";
                    sqlx::query(query_str)
                        .bind(window.limit())
                        .bind(window.offset())
                        .fetch_all(&mut **ex)
                        .await
                }
            }
            .map_err(postgres::map_sqlx_error)?;
            rows.iter().map(|row| ride_from_row(row, postgres::map_sqlx_error)).collect()
        }

        #[cfg(any(feature = "sqlite", test))]
        Executor::Sqlite(ex) => {
            let rows = match window {
                None => {
                    let query_str = "
                        SELECT
                            rideID AS ride_id, startLat AS start_lat, startLong AS start_long,
                            endLat AS end_lat, endLong AS end_long, riderName AS rider_name,
                            driverName AS driver_name, driverVehicle AS driver_vehicle, created
                        FROM Rides
                        ORDER BY rideID ASC
                    ";
                    sqlx::query(query_str).fetch_all(&mut **ex).await
                }
                Some(window) => {
                    let query_str = "
                        SELECT
                            rideID AS ride_id, startLat AS start_lat, startLong AS start_long,
                            endLat AS end_lat, endLong AS end_long, riderName AS rider_name,
                            driverName AS driver_name, driverVehicle AS driver_vehicle, created
                        FROM Rides
                        ORDER BY rideID ASC
                        LIMIT ? OFFSET ?
                    ";
                    sqlx::query(query_str)
                        .bind(window.limit())
                        .bind(window.offset())
                        .fetch_all(&mut **ex)
                        .await
                }
            }
            .map_err(sqlite::map_sqlx_error)?;
            rows.iter().map(|row| ride_from_row(row, sqlite::map_sqlx_error)).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}
