//! Place-store-backed proximity index.
//!
//! A linear haversine scan over the stored places. Good enough for the
//! place counts this system manages; swap in a remote index via
//! [`super::HttpProximityIndex`] when the place set outgrows it.

use super::{GeoPoint, PlaceHit, ProximityIndex};
use crate::error::ProximityError;
use crate::storage::PlaceDb;
use crate::task::Category;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points, meters.
fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Proximity index over the local place store.
pub struct LocalPlaceIndex {
    db: PlaceDb,
}

impl LocalPlaceIndex {
    pub fn new(db: PlaceDb) -> Self {
        Self { db }
    }

    /// Open an index over the default place database.
    pub fn open() -> Result<Self, crate::error::StoreError> {
        Ok(Self {
            db: PlaceDb::open()?,
        })
    }
}

impl ProximityIndex for LocalPlaceIndex {
    fn nearby(
        &self,
        category: Category,
        point: GeoPoint,
        radius_m: f64,
    ) -> Result<Vec<PlaceHit>, ProximityError> {
        let places = self
            .db
            .list_by_category(category)
            .map_err(|e| ProximityError::Unavailable(e.to_string()))?;

        let mut hits: Vec<PlaceHit> = places
            .into_iter()
            .filter_map(|place| {
                let distance = haversine_m(point, GeoPoint::new(place.lat, place.lng));
                if distance <= radius_m {
                    Some(PlaceHit {
                        name: place.name,
                        category: place.category,
                        distance_m: distance.round() as u64,
                        price_level: place.price_level,
                        rating: place.rating,
                    })
                } else {
                    None
                }
            })
            .collect();
        hits.sort_by_key(|hit| hit.distance_m);
        Ok(hits)
    }
}
