//! Nearby "safe space" lookup against an Overpass map-data endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::GeoConfig;
use crate::error::{Error, Result};

/// Map tags considered calm, public places
const PLACE_TAGS: &[(&str, &str)] = &[
    ("leisure", "park"),
    ("amenity", "library"),
    ("amenity", "place_of_worship"),
    ("amenity", "community_centre"),
    ("amenity", "hospital"),
    ("amenity", "cafe"),
];

/// A simplified place returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub vicinity: String,
}

#[async_trait]
pub trait PlaceFinder: Send + Sync {
    async fn nearby(&self, latitude: f64, longitude: f64) -> Result<Vec<Place>>;
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

pub struct GeoClient {
    client: Client,
    endpoint: String,
    radius_m: u32,
    timeout_secs: u64,
    max_results: usize,
}

impl GeoClient {
    pub fn new(config: &GeoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            radius_m: config.radius_m,
            timeout_secs: config.timeout_secs,
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl PlaceFinder for GeoClient {
    async fn nearby(&self, latitude: f64, longitude: f64) -> Result<Vec<Place>> {
        // Over-fetch so duplicates can be dropped without running short
        let limit = self.max_results.saturating_mul(4).max(1);
        let query = build_query(latitude, longitude, self.radius_m, self.timeout_secs, limit);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| Error::GeoError(format!("Overpass request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "Overpass returned error");
            return Err(Error::GeoError(format!("Overpass returned {}", status)));
        }

        let parsed: OverpassResponse = response
            .json()
            .await
            .map_err(|e| Error::GeoError(format!("Failed to parse Overpass response: {}", e)))?;

        let places = to_places(parsed.elements, self.max_results);
        debug!("Found {} places near ({}, {})", places.len(), latitude, longitude);
        Ok(places)
    }
}

/// Overpass QL for every place tag within `radius_m` of the point
pub fn build_query(latitude: f64, longitude: f64, radius_m: u32, timeout_secs: u64, limit: usize) -> String {
    let mut query = format!("[out:json][timeout:{}];\n(\n", timeout_secs);
    for (key, value) in PLACE_TAGS {
        let _ = writeln!(
            query,
            "  nwr[\"{}\"=\"{}\"](around:{},{},{});",
            key, value, radius_m, latitude, longitude
        );
    }
    let _ = write!(query, ");\nout center {};", limit);
    query
}

fn to_places(elements: Vec<OverpassElement>, max_results: usize) -> Vec<Place> {
    let mut seen = HashSet::new();
    elements
        .into_iter()
        .filter_map(|element| to_place(&element.tags))
        .filter(|place| seen.insert((place.name.clone(), place.kind.clone())))
        .take(max_results)
        .collect()
}

fn to_place(tags: &BTreeMap<String, String>) -> Option<Place> {
    let raw_kind = PLACE_TAGS
        .iter()
        .find_map(|(key, _)| tags.get(*key).filter(|v| is_place_value(key, v)))?;
    let kind = type_label(raw_kind);

    let name = tags
        .get("name")
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| kind.clone());

    Some(Place {
        name,
        kind,
        vicinity: vicinity(tags),
    })
}

fn is_place_value(key: &str, value: &str) -> bool {
    PLACE_TAGS.iter().any(|(k, v)| *k == key && *v == value)
}

/// `place_of_worship` -> `Place Of Worship`
fn type_label(raw: &str) -> String {
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn vicinity(tags: &BTreeMap<String, String>) -> String {
    let street = match (tags.get("addr:housenumber"), tags.get("addr:street")) {
        (Some(number), Some(street)) => Some(format!("{} {}", number, street)),
        (None, Some(street)) => Some(street.clone()),
        _ => None,
    };

    let parts: Vec<String> = street
        .into_iter()
        .chain(tags.get("addr:city").cloned())
        .collect();

    if parts.is_empty() {
        "Nearby".to_string()
    } else {
        parts.join(", ")
    }
}
