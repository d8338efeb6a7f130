//! Remote proximity index over HTTP.
//!
//! Expects a JSON endpoint shaped like
//! `GET {base}/nearby?lat=..&lng=..&category=..&radius=..` returning an
//! array of `{name, category, distance, price_level?, rating?}` sorted by
//! distance. Every request carries a bounded timeout; a timeout surfaces
//! as [`ProximityError::Timeout`] so the engine can degrade to "no match"
//! instead of failing the pass.

use std::time::Duration;

use serde::Deserialize;

use super::{GeoPoint, PlaceHit, ProximityIndex};
use crate::error::ProximityError;
use crate::task::Category;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Wire shape of one place in the lookup service response.
#[derive(Debug, Deserialize)]
struct WirePlace {
    name: String,
    category: String,
    distance: f64,
    #[serde(default)]
    price_level: Option<i64>,
    #[serde(default)]
    rating: Option<f64>,
}

/// HTTP-backed proximity index.
pub struct HttpProximityIndex {
    client: reqwest::blocking::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpProximityIndex {
    /// Create an index against `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProximityError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create an index against `base_url` with an explicit timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProximityError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProximityError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl ProximityIndex for HttpProximityIndex {
    fn nearby(
        &self,
        category: Category,
        point: GeoPoint,
        radius_m: f64,
    ) -> Result<Vec<PlaceHit>, ProximityError> {
        let url = format!("{}/nearby", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lng", point.lng.to_string()),
                ("category", category.as_str().to_string()),
                ("radius", radius_m.to_string()),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ProximityError::Timeout {
                        timeout_secs: self.timeout_secs,
                    }
                } else {
                    ProximityError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ProximityError::Unavailable(format!(
                "lookup service returned {}",
                response.status()
            )));
        }

        let places: Vec<WirePlace> = response
            .json()
            .map_err(|e| ProximityError::InvalidResponse(e.to_string()))?;

        Ok(places
            .into_iter()
            .map(|place| PlaceHit {
                name: place.name,
                category: Category::parse(&place.category).unwrap_or(Category::General),
                distance_m: place.distance.max(0.0).round() as u64,
                price_level: place.price_level,
                rating: place.rating,
            })
            .collect())
    }
}
