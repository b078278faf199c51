use async_trait::async_trait;
use geo_types::{Coord, Geometry, LineString, Point};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::RouteSolver,
    entities::{DirectionStep, SolvedRoute, Stop},
    error::{invalid_input_error, solver_error, upstream_error, Error},
};

/// Sample San Diego network analysis service.
pub const SAMPLE_ROUTE_SERVICE_URL: &str =
    "https://sampleserver6.arcgisonline.com/arcgis/rest/services/NetworkAnalysis/SanDiego/NAServer/Route";

/// Route solver backed by an ArcGIS network analysis route service.
#[derive(Clone, Debug)]
pub struct RouteService {
    client: reqwest::Client,
    service_url: String,
    api_key: Option<String>,
}

impl RouteService {
    pub fn new(service_url: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            service_url,
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SolveResponse {
    routes: Option<FeatureSet<RouteFeature>>,
    directions: Option<Vec<Directions>>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct FeatureSet<T> {
    features: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    attributes: RouteAttributes,
    geometry: Option<Polyline>,
}

#[derive(Debug, Deserialize)]
struct RouteAttributes {
    #[serde(rename = "Name")]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Polyline {
    paths: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Directions {
    route_name: Option<String>,
    summary: Summary,
    #[serde(default)]
    features: Vec<DirectionFeature>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Summary {
    total_length: f64,
    total_time: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectionFeature {
    attributes: DirectionAttributes,
    compressed_geometry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectionAttributes {
    text: String,
    length: Option<f64>,
    time: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
    #[serde(default)]
    details: Vec<String>,
}

#[async_trait]
impl RouteSolver for RouteService {
    #[tracing::instrument(skip(self))]
    async fn solve(&self, stops: Vec<Stop>) -> Result<SolvedRoute, Error> {
        if stops.len() < 2 {
            return Err(invalid_input_error());
        }

        let url = format!("{}/solve", self.service_url.trim_end_matches('/'));

        let features: Vec<_> = stops
            .iter()
            .map(|stop| {
                json!({
                    "geometry": {
                        "x": stop.location.longitude,
                        "y": stop.location.latitude,
                        "spatialReference": { "wkid": stop.location.spatial_reference.wkid },
                    }
                })
            })
            .collect();
        let stops_param = json!({ "features": features }).to_string();

        let mut req = self
            .client
            .get(url)
            .query(&[("f", "json")])
            .query(&[("stops", stops_param.as_str())])
            .query(&[("returnRoutes", "true")])
            .query(&[("returnDirections", "true")])
            .query(&[("directionsLengthUnits", "esriNAUMeters")])
            .query(&[("outSR", "4326")]);

        if let Some(key) = &self.api_key {
            req = req.query(&[("token", key.as_str())]);
        }

        let res = req.send().await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: SolveResponse = res.json().await?;

        route_from_response(data)
    }
}

fn route_from_response(data: SolveResponse) -> Result<SolvedRoute, Error> {
    if let Some(err) = data.error {
        let mut message = err.message;
        if !err.details.is_empty() {
            message = format!("{}: {}", message, err.details.join("; "));
        }

        return Err(solver_error(message));
    }

    let feature = data
        .routes
        .and_then(|routes| routes.features.into_iter().next())
        .ok_or_else(|| solver_error("no route returned"))?;

    let directions = data
        .directions
        .and_then(|directions| directions.into_iter().next())
        .ok_or_else(|| solver_error("no directions returned"))?;

    let name = directions
        .route_name
        .or(feature.attributes.name)
        .unwrap_or_else(|| "Route".into());

    let path: Vec<Coord<f64>> = feature
        .geometry
        .map(|polyline| {
            polyline
                .paths
                .into_iter()
                .flatten()
                .filter(|point| point.len() >= 2)
                .map(|point| Coord {
                    x: point[0],
                    y: point[1],
                })
                .collect()
        })
        .unwrap_or_default();

    let steps = directions
        .features
        .into_iter()
        .map(|feature| {
            let geometry = feature
                .compressed_geometry
                .as_deref()
                .and_then(|compressed| match decode_compressed_geometry(compressed) {
                    Ok(coords) => step_geometry(coords),
                    Err(err) => {
                        tracing::warn!("skipping undecodable maneuver geometry: {}", err);
                        None
                    }
                });

            DirectionStep {
                text: feature.attributes.text,
                geometry,
                length_meters: feature.attributes.length.unwrap_or_default(),
                time_minutes: feature.attributes.time.unwrap_or_default(),
            }
        })
        .collect();

    Ok(SolvedRoute::new(
        name,
        directions.summary.total_time,
        directions.summary.total_length,
    )
    .with_geometry(LineString::new(path))
    .with_directions(steps))
}

fn step_geometry(coords: Vec<Coord<f64>>) -> Option<Geometry<f64>> {
    match coords.len() {
        0 => None,
        1 => Some(Geometry::Point(Point::from(coords[0]))),
        _ => Some(Geometry::LineString(LineString::new(coords))),
    }
}

/// Decodes the compressed geometry string the route service attaches to
/// direction features: a base-32 multiplier followed by delta-encoded x/y
/// pairs, every token prefixed by its sign.
pub fn decode_compressed_geometry(compressed: &str) -> Result<Vec<Coord<f64>>, Error> {
    let mut tokens = vec![];
    let mut start = None;

    for (i, c) in compressed.char_indices() {
        if c == '+' || c == '-' {
            if let Some(s) = start {
                tokens.push(parse_token(&compressed[s..i])?);
            }
            start = Some(i);
        }
    }

    match start {
        Some(s) => tokens.push(parse_token(&compressed[s..])?),
        None => return Err(invalid_input_error()),
    }

    let multiplier = tokens[0] as f64;
    let deltas = &tokens[1..];

    if multiplier == 0.0 || deltas.len() % 2 != 0 {
        return Err(invalid_input_error());
    }

    let mut x = 0i64;
    let mut y = 0i64;
    let mut coords = Vec::with_capacity(deltas.len() / 2);

    for pair in deltas.chunks(2) {
        x = x.checked_add(pair[0]).ok_or_else(invalid_input_error)?;
        y = y.checked_add(pair[1]).ok_or_else(invalid_input_error)?;

        coords.push(Coord {
            x: x as f64 / multiplier,
            y: y as f64 / multiplier,
        });
    }

    Ok(coords)
}

fn parse_token(token: &str) -> Result<i64, Error> {
    let (sign, digits) = token.split_at(1);

    let value = i64::from_str_radix(digits, 32).map_err(|_| invalid_input_error())?;

    Ok(if sign == "-" { -value } else { value })
}
