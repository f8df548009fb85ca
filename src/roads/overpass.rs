use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{RoadClass, RoadProvider, RoadQuery, RoadSegment};
use crate::error::GridError;
use crate::hex_index::GeoPoint;

/// Overpass API client (`out geom` JSON).
pub struct OverpassProvider {
    client: Client,
    endpoint: String,
}

impl OverpassProvider {
    /// Client for `endpoint` with a per-request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GridError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hex-base/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GridError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl RoadProvider for OverpassProvider {
    fn fetch(&self, query: &RoadQuery) -> Result<Vec<RoadSegment>, GridError> {
        let ql = query.to_overpass_ql();
        let body = self
            .client
            .post(&self.endpoint)
            .form(&[("data", ql.as_str())])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| GridError::Transport(e.to_string()))?;
        parse_response(&body, query)
    }
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    id: u64,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    geometry: Vec<OverpassPoint>,
}

#[derive(Deserialize)]
struct OverpassPoint {
    lat: f64,
    lon: f64,
}

/// Decodes an Overpass JSON body into road segments accepted by `query`.
///
/// Non-way elements and ways without geometry are skipped. A way whose
/// `highway` tag is outside the query's classes is dropped; untagged ways are
/// kept since the server already filtered them.
pub fn parse_response(body: &str, query: &RoadQuery) -> Result<Vec<RoadSegment>, GridError> {
    let response: OverpassResponse =
        serde_json::from_str(body).map_err(|e| GridError::Parse(e.to_string()))?;

    let roads = response
        .elements
        .into_iter()
        .filter(|el| el.kind == "way" && !el.geometry.is_empty())
        .filter_map(|el| {
            let highway = el.tags.get("highway");
            if let Some(tag) = highway
                && !query.accepts(tag)
            {
                return None;
            }
            Some(RoadSegment {
                way_id: el.id,
                class: highway.and_then(|t| RoadClass::from_tag(t)),
                points: el
                    .geometry
                    .iter()
                    .map(|p| GeoPoint::new(p.lat, p.lon))
                    .collect(),
            })
        })
        .collect();
    Ok(roads)
}
