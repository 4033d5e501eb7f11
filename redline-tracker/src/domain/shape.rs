//! Route geometry.

use geo_types::{Coord, LineString};
use serde::{Serialize, Serializer};

/// One decoded shape: a contiguous path, x = longitude, y = latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeGeometry {
    pub shape_id: String,
    pub path: LineString<f64>,
}

impl ShapeGeometry {
    pub fn new(shape_id: impl Into<String>, path: LineString<f64>) -> Self {
        Self {
            shape_id: shape_id.into(),
            path,
        }
    }

    /// Number of coordinates in the path.
    pub fn point_count(&self) -> usize {
        self.path.0.len()
    }

    pub fn longitudes(&self) -> Vec<f64> {
        self.path.coords().map(|c| c.x).collect()
    }

    pub fn latitudes(&self) -> Vec<f64> {
        self.path.coords().map(|c| c.y).collect()
    }
}

/// Serialized as `{"shape_id", "lons", "lats"}`, the layout map clients plot.
impl Serialize for ShapeGeometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("ShapeGeometry", 3)?;
        s.serialize_field("shape_id", &self.shape_id)?;
        s.serialize_field("lons", &self.longitudes())?;
        s.serialize_field("lats", &self.latitudes())?;
        s.end()
    }
}

/// Build a path from `(longitude, latitude)` pairs.
pub fn path_from_lon_lat(points: impl IntoIterator<Item = (f64, f64)>) -> LineString<f64> {
    LineString::new(points.into_iter().map(|(x, y)| Coord { x, y }).collect())
}
