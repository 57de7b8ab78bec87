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

//! Common tests for any database implementation.

use crate::db::{create_ride, get_ride, init_schema, list_rides};
use crate::model::{GeoPoint, NewRide, PageWindow, Ride, RideId};
use ridebook_core::db::{Db, DbError};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use time::macros::datetime;

/// Initializes the schema of a freshly-connected `db` and returns it in its shareable form.
async fn attach<D: Db + Send + Sync + 'static>(db: D) -> Arc<dyn Db + Send + Sync> {
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();
    Arc::from(db)
}

/// Creates a valid ride whose contents derive from `i`.
fn new_ride(i: u16) -> NewRide {
    NewRide::new(
        GeoPoint::new(f64::from(i % 90), -f64::from(i % 180)),
        GeoPoint::new(-f64::from(i % 90) / 2.0, f64::from(i % 180) / 4.0),
        format!("Rider {}", i),
        format!("Driver {}", i),
        format!("Vehicle {}", i),
    )
}

/// Timestamp assigned to the ride created in the `i`th position.
fn created(i: u16) -> OffsetDateTime {
    datetime!(2023-12-01 10:15:00.123456 UTC) + Duration::from_secs(u64::from(i))
}

/// Stores `count` rides built by `new_ride` and returns their assigned identifiers.
async fn put_rides(db: &Arc<dyn Db + Send + Sync>, count: u16) -> Vec<RideId> {
    let mut ids = Vec::with_capacity(usize::from(count));
    for i in 0..count {
        let id = create_ride(&mut db.ex().await.unwrap(), &new_ride(i), created(i)).await.unwrap();
        ids.push(id);
    }
    ids
}

async fn test_create_and_get(db: Arc<dyn Db + Send + Sync>) {
    let ride = new_ride(5);
    let id = create_ride(&mut db.ex().await.unwrap(), &ride, created(5)).await.unwrap();

    let fetched = get_ride(&mut db.ex().await.unwrap(), id).await.unwrap().unwrap();
    assert_eq!(Ride::new(id, ride, created(5)), fetched);

    db.close().await;
}

async fn test_create_assigns_new_ids(db: Arc<dyn Db + Send + Sync>) {
    let ids = put_rides(&db, 3).await;
    assert!(ids[0] < ids[1]);
    assert!(ids[1] < ids[2]);

    db.close().await;
}

async fn test_create_stores_text_literally(db: Arc<dyn Db + Send + Sync>) {
    let ride = NewRide::new(
        GeoPoint::new(1.0, 2.0),
        GeoPoint::new(3.0, 4.0),
        "Robert'); DROP TABLE Rides; --".to_owned(),
        "?".to_owned(),
        "$1".to_owned(),
    );
    let id = create_ride(&mut db.ex().await.unwrap(), &ride, created(0)).await.unwrap();

    let fetched = get_ride(&mut db.ex().await.unwrap(), id).await.unwrap().unwrap();
    assert_eq!("Robert'); DROP TABLE Rides; --", fetched.rider_name());
    assert_eq!("?", fetched.driver_name());
    assert_eq!("$1", fetched.driver_vehicle());
    assert_eq!(1, list_rides(&mut db.ex().await.unwrap(), None).await.unwrap().len());

    db.close().await;
}

async fn test_create_rejects_out_of_bounds(db: Arc<dyn Db + Send + Sync>) {
    let ride = NewRide::new(
        GeoPoint::new(91.0, 0.0),
        GeoPoint::new(0.0, 0.0),
        "Rider".to_owned(),
        "Driver".to_owned(),
        "Vehicle".to_owned(),
    );
    match create_ride(&mut db.ex().await.unwrap(), &ride, created(0)).await {
        Err(DbError::DataIntegrityError(_)) => (),
        e => panic!("Unexpected result {:?}", e),
    }
    assert!(list_rides(&mut db.ex().await.unwrap(), None).await.unwrap().is_empty());

    db.close().await;
}

async fn test_create_rejects_empty_names(db: Arc<dyn Db + Send + Sync>) {
    let ride = NewRide::new(
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 0.0),
        "Rider".to_owned(),
        "".to_owned(),
        "Vehicle".to_owned(),
    );
    match create_ride(&mut db.ex().await.unwrap(), &ride, created(0)).await {
        Err(DbError::DataIntegrityError(_)) => (),
        e => panic!("Unexpected result {:?}", e),
    }

    db.close().await;
}

async fn test_get_missing(db: Arc<dyn Db + Send + Sync>) {
    let ids = put_rides(&db, 2).await;
    let missing = RideId::new(ids[1].as_i64() + 100);
    assert_eq!(None, get_ride(&mut db.ex().await.unwrap(), missing).await.unwrap());

    db.close().await;
}

async fn test_list_all_empty(db: Arc<dyn Db + Send + Sync>) {
    assert!(list_rides(&mut db.ex().await.unwrap(), None).await.unwrap().is_empty());

    db.close().await;
}

async fn test_list_all_ordered(db: Arc<dyn Db + Send + Sync>) {
    let ids = put_rides(&db, 13).await;

    let rides = list_rides(&mut db.ex().await.unwrap(), None).await.unwrap();
    assert_eq!(ids, rides.iter().map(|r| *r.ride_id()).collect::<Vec<RideId>>());
    for (i, ride) in rides.into_iter().enumerate() {
        let i = u16::try_from(i).unwrap();
        assert_eq!(Ride::new(ids[usize::from(i)], new_ride(i), created(i)), ride);
    }

    db.close().await;
}

async fn test_list_window(db: Arc<dyn Db + Send + Sync>) {
    let ids = put_rides(&db, 13).await;

    let rides =
        list_rides(&mut db.ex().await.unwrap(), Some(PageWindow::new(0, 5))).await.unwrap();
    assert_eq!(&ids[0..5], rides.iter().map(|r| *r.ride_id()).collect::<Vec<RideId>>());

    let rides =
        list_rides(&mut db.ex().await.unwrap(), Some(PageWindow::new(5, 5))).await.unwrap();
    assert_eq!(&ids[5..10], rides.iter().map(|r| *r.ride_id()).collect::<Vec<RideId>>());

    let rides =
        list_rides(&mut db.ex().await.unwrap(), Some(PageWindow::new(10, 5))).await.unwrap();
    assert_eq!(&ids[10..13], rides.iter().map(|r| *r.ride_id()).collect::<Vec<RideId>>());

    let rides =
        list_rides(&mut db.ex().await.unwrap(), Some(PageWindow::new(495, 5))).await.unwrap();
    assert!(rides.is_empty());

    db.close().await;
}

async fn test_closed_db_is_unavailable(db: Arc<dyn Db + Send + Sync>) {
    put_rides(&db, 1).await;
    db.close().await;

    assert_eq!(DbError::Unavailable, db.ex().await.unwrap_err());
}

macro_rules! generate_db_tests [
    ( $setup:expr $(, #[$extra:meta] )? ) => {
        ridebook_core::db::testutils::generate_tests!(
            $(#[$extra],)?
            $setup,
            $crate::db::tests,
            test_create_and_get,
            test_create_assigns_new_ids,
            test_create_stores_text_literally,
            test_create_rejects_out_of_bounds,
            test_create_rejects_empty_names,
            test_get_missing,
            test_list_all_empty,
            test_list_all_ordered,
            test_list_window,
            test_closed_db_is_unavailable
        );
    }
];

mod sqlite {
    use super::*;

    generate_db_tests!(attach(ridebook_core::db::sqlite::testutils::setup().await).await);
}

#[cfg(feature = "postgres")]
mod postgres {
    use super::*;

    generate_db_tests!(
        attach(ridebook_core::db::postgres::testutils::setup().await).await,
        #[ignore = "Requires environment configuration and is expensive"]
    );
}
