//! Map layers: which routes make up each line drawn on the map.

use std::fmt;
use std::str::FromStr;

/// A line the map can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapLayer {
    Red,
    Green,
    Blue,
    Orange,
    Silver,
}

impl MapLayer {
    pub const ALL: [MapLayer; 5] = [
        MapLayer::Red,
        MapLayer::Green,
        MapLayer::Blue,
        MapLayer::Orange,
        MapLayer::Silver,
    ];

    /// MBTA route ids drawn for this layer. Green is its four branches.
    pub fn route_ids(self) -> &'static [&'static str] {
        match self {
            MapLayer::Red => &["Red"],
            MapLayer::Green => &["Green-B", "Green-C", "Green-D", "Green-E"],
            MapLayer::Blue => &["Blue"],
            MapLayer::Orange => &["Orange"],
            MapLayer::Silver => &["Silver"],
        }
    }

    /// Brand color, as a CSS hex string.
    pub fn color(self) -> &'static str {
        match self {
            MapLayer::Red => "#DA291C",
            MapLayer::Green => "#00843D",
            MapLayer::Blue => "#003DA5",
            MapLayer::Orange => "#ED8B00",
            MapLayer::Silver => "#7C8793",
        }
    }

    /// Short name, as used in URLs.
    pub fn name(self) -> &'static str {
        match self {
            MapLayer::Red => "Red",
            MapLayer::Green => "Green",
            MapLayer::Blue => "Blue",
            MapLayer::Orange => "Orange",
            MapLayer::Silver => "Silver",
        }
    }
}

impl fmt::Display for MapLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Line", self.name())
    }
}

/// Error returned when a layer name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown map layer: {0}")]
pub struct UnknownLayer(pub String);

impl FromStr for MapLayer {
    type Err = UnknownLayer;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MapLayer::ALL
            .into_iter()
            .find(|layer| layer.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLayer(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_layers() {
        assert_eq!("Red".parse::<MapLayer>(), Ok(MapLayer::Red));
        assert_eq!("green".parse::<MapLayer>(), Ok(MapLayer::Green));
        assert_eq!(
            "Mattapan".parse::<MapLayer>(),
            Err(UnknownLayer("Mattapan".into()))
        );
    }

    #[test]
    fn green_is_four_branches() {
        assert_eq!(MapLayer::Green.route_ids().len(), 4);
        assert!(MapLayer::Green.route_ids().iter().all(|id| id.starts_with("Green-")));
    }

    #[test]
    fn labels() {
        assert_eq!(MapLayer::Silver.to_string(), "Silver Line");
        assert_eq!(MapLayer::Red.color(), "#DA291C");
    }
}
