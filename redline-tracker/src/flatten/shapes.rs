//! Route geometry from shape payloads.
//!
//! A shape is either an encoded polyline (precision 5) or, in older
//! payloads, an explicit list of points. Routes come back as many shapes,
//! one per service pattern.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::domain::{ShapeGeometry, path_from_lon_lat};
use crate::mbta::{Attributes, FeedResponse, RawResource};

const POLYLINE_PRECISION: u32 = 5;

/// Decode one shape resource.
///
/// The polyline wins when present; if it fails to decode the shape is
/// skipped rather than falling back to points.
pub fn decode_shape(shape: &RawResource) -> Option<ShapeGeometry> {
    let attrs = shape.attrs();

    if let Some(encoded) = attrs.text("polyline") {
        let path = match polyline::decode_polyline(encoded, POLYLINE_PRECISION) {
            Ok(path) if !path.0.is_empty() => path,
            _ => {
                debug!(shape = %shape.id, "skipping undecodable polyline");
                return None;
            }
        };
        return Some(ShapeGeometry::new(shape.id.clone(), path));
    }

    let points: Vec<(f64, f64)> = attrs
        .array("points")?
        .iter()
        .filter_map(Value::as_object)
        .map(Attributes::new)
        .filter_map(|point| {
            let lat = point.float("latitude").or_else(|| point.float("lat"))?;
            let lon = point
                .float("longitude")
                .or_else(|| point.float("lon"))
                .or_else(|| point.float("lng"))?;
            Some((lon, lat))
        })
        .collect();

    if points.is_empty() {
        return None;
    }
    Some(ShapeGeometry::new(shape.id.clone(), path_from_lon_lat(points)))
}

/// Every decodable shape for a route, in payload order.
pub fn route_segments(response: &FeedResponse) -> Vec<ShapeGeometry> {
    let Ok(payload) = response else {
        return Vec::new();
    };
    payload.data.iter().filter_map(decode_shape).collect()
}

/// The segment with the most points, standing in for the whole route.
///
/// The first of equally long segments wins. `None` when nothing decodes.
pub fn merged_route_shape(response: &FeedResponse) -> Option<ShapeGeometry> {
    route_segments(response)
        .into_iter()
        .fold(None, |best: Option<ShapeGeometry>, shape| match best {
            Some(b) if b.point_count() >= shape.point_count() => Some(b),
            _ => Some(shape),
        })
}

/// One merged geometry per route id; failed or empty routes are omitted.
pub fn merged_shapes_by_route<'a, I>(responses: I) -> BTreeMap<String, ShapeGeometry>
where
    I: IntoIterator<Item = (&'a str, &'a FeedResponse)>,
{
    responses
        .into_iter()
        .filter_map(|(route_id, response)| {
            merged_route_shape(response).map(|shape| (route_id.to_string(), shape))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbta::{FetchError, RawPayload};

    // Three points: (38.5, -120.2), (40.7, -120.95), (43.252, -126.453).
    const ENCODED: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

    fn parse(json: &str) -> FeedResponse {
        Ok(serde_json::from_str::<RawPayload>(json).unwrap())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn decodes_polyline_as_lon_lat() {
        let resp = parse(&format!(
            r#"{{"data": [{{"type": "shape", "id": "s1", "attributes": {{"polyline": "{ENCODED}"}}}}]}}"#
        ));

        let segments = route_segments(&resp);
        assert_eq!(segments.len(), 1);
        let shape = &segments[0];
        assert_eq!(shape.shape_id, "s1");
        assert_eq!(shape.point_count(), 3);
        assert!(close(shape.longitudes()[0], -120.2));
        assert!(close(shape.latitudes()[0], 38.5));
        assert!(close(shape.latitudes()[2], 43.252));
    }

    #[test]
    fn falls_back_to_points() {
        let resp = parse(
            r#"{"data": [{"type": "shape", "id": "s1", "attributes": {"points": [
                {"latitude": 42.39, "longitude": -71.14},
                {"lat": 42.38, "lng": -71.12},
                {"lat": 42.37, "lon": "-71.11"},
                {"lat": 42.36},
                "not a point"
            ]}}]}"#,
        );

        let segments = route_segments(&resp);
        assert_eq!(segments[0].point_count(), 3);
        assert_eq!(segments[0].longitudes(), vec![-71.14, -71.12, -71.11]);
    }

    #[test]
    fn bad_polyline_does_not_fall_back() {
        let resp = parse(
            r#"{"data": [{"type": "shape", "id": "s1", "attributes": {
                "polyline": "!!!",
                "points": [{"latitude": 42.39, "longitude": -71.14}]
            }}]}"#,
        );

        assert!(route_segments(&resp).is_empty());
    }

    #[test]
    fn undecodable_shapes_are_skipped() {
        let resp = parse(&format!(
            r#"{{"data": [
                {{"type": "shape", "id": "empty", "attributes": {{}}}},
                {{"type": "shape", "id": "bad", "attributes": {{"polyline": "!!!"}}}},
                {{"type": "shape", "id": "good", "attributes": {{"polyline": "{ENCODED}"}}}}
            ]}}"#
        ));

        let ids: Vec<_> = route_segments(&resp).into_iter().map(|s| s.shape_id).collect();
        assert_eq!(ids, vec!["good"]);
    }

    #[test]
    fn merged_picks_most_points_first_on_tie() {
        let resp = parse(&format!(
            r#"{{"data": [
                {{"type": "shape", "id": "short", "attributes": {{"points": [{{"lat": 1, "lon": 1}}]}}}},
                {{"type": "shape", "id": "long-a", "attributes": {{"polyline": "{ENCODED}"}}}},
                {{"type": "shape", "id": "long-b", "attributes": {{"points": [
                    {{"lat": 1, "lon": 1}}, {{"lat": 2, "lon": 2}}, {{"lat": 3, "lon": 3}}
                ]}}}}
            ]}}"#
        ));

        assert_eq!(merged_route_shape(&resp).unwrap().shape_id, "long-a");
    }

    #[test]
    fn merged_of_nothing_is_none() {
        let only_bad = parse(
            r#"{"data": [{"type": "shape", "id": "bad", "attributes": {"polyline": "!!!"}}]}"#,
        );
        assert!(merged_route_shape(&only_bad).is_none());
        assert!(merged_route_shape(&Err(FetchError::RateLimited)).is_none());
    }

    #[test]
    fn merged_by_route_skips_failures() {
        let red = parse(&format!(
            r#"{{"data": [{{"type": "shape", "id": "r", "attributes": {{"polyline": "{ENCODED}"}}}}]}}"#
        ));
        let blue: FeedResponse = Err(FetchError::RateLimited);
        let orange = parse(r#"{"data": []}"#);

        let merged = merged_shapes_by_route([("Red", &red), ("Blue", &blue), ("Orange", &orange)]);

        assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["Red"]);
        assert_eq!(merged["Red"].shape_id, "r");
    }
}
