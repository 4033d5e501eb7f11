//! MBTA V3 API response DTOs.
//!
//! The V3 API speaks JSON:API: every response carries a primary `data`
//! array and an optional `included` side-table of related resources,
//! cross-referenced through `relationships`. Attributes vary by resource
//! type and are frequently absent, so they are kept as a raw JSON map and
//! read through the [`Attributes`] view.
//!
//! Deserialization is per record: a resource that is not an object with a
//! string `type` and `id` is dropped, and null or malformed `attributes`,
//! `relationships` and linkages read as empty. One odd record never costs
//! the rest of the payload.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

/// A list response from the V3 API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPayload {
    /// Primary resources.
    #[serde(default, deserialize_with = "lenient_resources")]
    pub data: Vec<RawResource>,

    /// Related resources requested with `include=...`.
    #[serde(default, deserialize_with = "lenient_resources")]
    pub included: Vec<RawResource>,
}

/// A single JSON:API resource object.
#[derive(Debug, Clone, Deserialize)]
pub struct RawResource {
    /// Resource type tag, e.g. `"prediction"`, `"trip"`, `"stop"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Resource id, unique within its type.
    pub id: String,

    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: Map<String, Value>,

    #[serde(default, deserialize_with = "lenient_relationships")]
    pub relationships: HashMap<String, Relationship>,
}

/// A relationship entry. `data` is null when the related resource does not
/// exist (e.g. a prediction with no vehicle assigned yet).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default, deserialize_with = "lenient_linkage")]
    pub data: Option<Linkage>,
}

/// Resource linkage: to-one or to-many.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Linkage {
    One(ResourceIdentifier),
    Many(Vec<ResourceIdentifier>),
}

/// A `{type, id}` pointer to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

fn lenient_resources<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawResource>, D::Error> {
    let values = match Option::<Value>::deserialize(d)? {
        Some(Value::Array(values)) => values,
        Some(single @ Value::Object(_)) => vec![single],
        _ => Vec::new(),
    };
    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawResource>(value) {
            Ok(resource) => Some(resource),
            Err(e) => {
                debug!(error = %e, "skipping malformed resource");
                None
            }
        })
        .collect())
}

fn lenient_attributes<'de, D: Deserializer<'de>>(d: D) -> Result<Map<String, Value>, D::Error> {
    match Option::<Value>::deserialize(d)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Ok(Map::new()),
    }
}

fn lenient_relationships<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<HashMap<String, Relationship>, D::Error> {
    let Some(Value::Object(raw)) = Option::<Value>::deserialize(d)? else {
        return Ok(HashMap::new());
    };
    Ok(raw
        .into_iter()
        .map(|(name, value)| (name, serde_json::from_value(value).unwrap_or_default()))
        .collect())
}

// A linkage missing `type` or `id` is treated as no linkage.
fn lenient_linkage<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Linkage>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Error body returned by the API on 4xx/5xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Vec<ErrorObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorObject {
    pub status: Option<String>,
    pub code: Option<String>,
    pub detail: Option<String>,
}

impl ErrorBody {
    /// First human-readable message in the body, if any.
    pub fn first_message(&self) -> Option<String> {
        self.errors
            .iter()
            .find_map(|e| e.detail.clone().or_else(|| e.code.clone()))
    }
}

impl RawResource {
    /// Read-only view over this resource's attributes.
    pub fn attrs(&self) -> Attributes<'_> {
        Attributes::new(&self.attributes)
    }

    /// Id of the to-one related resource under `name`.
    ///
    /// Returns `None` when the relationship is missing, null, or to-many.
    pub fn related_id(&self, name: &str) -> Option<&str> {
        match self.relationships.get(name)?.data.as_ref()? {
            Linkage::One(ident) => Some(ident.id.as_str()),
            Linkage::Many(_) => None,
        }
    }
}

/// Total accessors over a resource's attribute map.
///
/// Every getter returns `None` instead of failing when the key is missing or
/// holds an unexpected type. A view over a missing resource behaves like an
/// empty map.
#[derive(Debug, Clone, Copy)]
pub struct Attributes<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Attributes<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map: Some(map) }
    }

    /// View with no attributes at all.
    pub fn empty() -> Self {
        Self { map: None }
    }

    /// Raw value under `key`; JSON null counts as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map?.get(key).filter(|v| !v.is_null())
    }

    /// Non-empty string under `key`.
    pub fn text(&self, key: &str) -> Option<&'a str> {
        self.get(key)?.as_str().filter(|s| !s.is_empty())
    }

    /// First non-empty string among `keys`, in order.
    pub fn first_text(&self, keys: &[&str]) -> Option<&'a str> {
        keys.iter().find_map(|k| self.text(k))
    }

    /// Integer under `key`. Accepts JSON integers and all-digit strings.
    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().ok()
            }
            _ => None,
        }
    }

    /// Float under `key`. Accepts JSON numbers and numeric strings.
    pub fn float(&self, key: &str) -> Option<f64> {
        value_as_f64(self.get(key)?)
    }

    /// Nested object under `key`, as another view.
    pub fn object(&self, key: &str) -> Option<Attributes<'a>> {
        self.get(key)?.as_object().map(Attributes::new)
    }

    /// Array under `key`.
    pub fn array(&self, key: &str) -> Option<&'a Vec<Value>> {
        self.get(key)?.as_array()
    }
}

/// Lenient float conversion: numbers pass through, strings are parsed.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_prediction_payload() {
        let json = r#"{
            "data": [
                {
                    "type": "prediction",
                    "id": "prediction-1",
                    "attributes": {
                        "arrival_time": null,
                        "departure_time": "2024-03-15T08:05:00-04:00",
                        "direction_id": 0
                    },
                    "relationships": {
                        "schedule": {"data": {"type": "schedule", "id": "sch-1"}},
                        "trip": {"data": {"type": "trip", "id": "trip-1"}},
                        "vehicle": {"data": null}
                    }
                }
            ],
            "included": [
                {"type": "trip", "id": "trip-1", "attributes": {"headsign": "Ashmont"}}
            ]
        }"#;

        let payload: RawPayload = serde_json::from_str(json).unwrap();

        assert_eq!(payload.data.len(), 1);
        assert_eq!(payload.included.len(), 1);

        let prediction = &payload.data[0];
        assert_eq!(prediction.kind, "prediction");
        assert_eq!(prediction.related_id("schedule"), Some("sch-1"));
        assert_eq!(prediction.related_id("trip"), Some("trip-1"));
        assert_eq!(prediction.related_id("vehicle"), None);
        assert_eq!(prediction.related_id("stop"), None);

        let attrs = prediction.attrs();
        assert_eq!(attrs.text("arrival_time"), None);
        assert_eq!(
            attrs.text("departure_time"),
            Some("2024-03-15T08:05:00-04:00")
        );
        assert_eq!(attrs.integer("direction_id"), Some(0));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let payload: RawPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.data.is_empty());
        assert!(payload.included.is_empty());

        let resource: RawResource =
            serde_json::from_str(r#"{"type": "stop", "id": "place-alfcl"}"#).unwrap();
        assert!(resource.attributes.is_empty());
        assert!(resource.relationships.is_empty());
    }

    #[test]
    fn odd_records_do_not_sink_the_payload() {
        let json = r#"{
            "data": [
                {
                    "type": "prediction",
                    "id": "good",
                    "attributes": {"direction_id": 0},
                    "relationships": {"trip": {"data": {"type": "trip", "id": "t1"}}}
                },
                {
                    "type": "prediction",
                    "id": "null-vehicle",
                    "attributes": null,
                    "relationships": {"vehicle": null, "trip": {"data": {"id": "t2"}}}
                },
                {"type": "prediction", "attributes": {"direction_id": 1}},
                {"type": "prediction", "id": 7},
                "not an object"
            ],
            "included": [
                {"type": "stop", "id": "70061", "attributes": null, "relationships": null},
                {"type": "stop", "id": "70063", "attributes": "Davis"},
                {"type": "trip", "id": "t1", "attributes": {"headsign": "Ashmont"}}
            ]
        }"#;

        let payload: RawPayload = serde_json::from_str(json).unwrap();

        let ids: Vec<&str> = payload.data.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["good", "null-vehicle"]);
        assert_eq!(payload.data[0].related_id("trip"), Some("t1"));
        assert_eq!(payload.data[0].attrs().integer("direction_id"), Some(0));

        let odd = &payload.data[1];
        assert!(odd.attributes.is_empty());
        assert_eq!(odd.related_id("vehicle"), None);
        assert_eq!(odd.related_id("trip"), None);

        assert_eq!(payload.included.len(), 3);
        assert!(payload.included[0].attributes.is_empty());
        assert!(payload.included[0].relationships.is_empty());
        assert!(payload.included[1].attributes.is_empty());
    }

    #[test]
    fn null_sections_default_to_empty() {
        let payload: RawPayload =
            serde_json::from_str(r#"{"data": null, "included": null}"#).unwrap();
        assert!(payload.data.is_empty());
        assert!(payload.included.is_empty());
    }

    #[test]
    fn single_resource_data_is_one_record() {
        let payload: RawPayload =
            serde_json::from_str(r#"{"data": {"type": "route", "id": "Red"}}"#).unwrap();
        assert_eq!(payload.data.len(), 1);
        assert_eq!(payload.data[0].id, "Red");
    }

    #[test]
    fn to_many_linkage_is_not_a_related_id() {
        let resource: RawResource = serde_json::from_str(
            r#"{
                "type": "route",
                "id": "Red",
                "relationships": {
                    "stops": {"data": [{"type": "stop", "id": "a"}, {"type": "stop", "id": "b"}]}
                }
            }"#,
        )
        .unwrap();

        assert!(matches!(
            resource.relationships["stops"].data,
            Some(Linkage::Many(ref ids)) if ids.len() == 2
        ));
        assert_eq!(resource.related_id("stops"), None);
    }

    #[test]
    fn integer_accepts_digit_strings() {
        let map: Map<String, Value> =
            serde_json::from_str(r#"{"a": "1", "b": "x1", "c": 1.5, "d": ""}"#).unwrap();
        let attrs = Attributes::new(&map);

        assert_eq!(attrs.integer("a"), Some(1));
        assert_eq!(attrs.integer("b"), None);
        assert_eq!(attrs.integer("c"), None);
        assert_eq!(attrs.integer("d"), None);
    }

    #[test]
    fn float_accepts_numeric_strings() {
        let map: Map<String, Value> = serde_json::from_str(
            r#"{"lat": 42.39, "lon": "-71.14", "bad": "north", "flag": true, "nan": "NaN"}"#,
        )
        .unwrap();
        let attrs = Attributes::new(&map);

        assert_eq!(attrs.float("lat"), Some(42.39));
        assert_eq!(attrs.float("lon"), Some(-71.14));
        assert_eq!(attrs.float("bad"), None);
        assert_eq!(attrs.float("flag"), None);
        assert_eq!(attrs.float("nan"), None);
        assert_eq!(attrs.float("missing"), None);
    }

    #[test]
    fn first_text_skips_empty_strings() {
        let map: Map<String, Value> =
            serde_json::from_str(r#"{"description": "", "short_header": "Shuttles"}"#).unwrap();
        let attrs = Attributes::new(&map);

        assert_eq!(
            attrs.first_text(&["description", "short_header", "header"]),
            Some("Shuttles")
        );
    }

    #[test]
    fn empty_view_has_nothing() {
        let attrs = Attributes::empty();
        assert!(attrs.get("anything").is_none());
        assert!(attrs.text("name").is_none());
        assert!(attrs.object("position").is_none());
    }

    #[test]
    fn error_body_message() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"errors": [{"status": "403", "code": "forbidden", "detail": null}]}"#,
        )
        .unwrap();
        assert_eq!(body.first_message().as_deref(), Some("forbidden"));
    }
}
