//! Place records shared by the gateway, the result store and the map layer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` when both components are finite and inside the
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

/// Parses `"lat,lon"` (whitespace around either number is ignored).
impl FromStr for Coordinates {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'lat,lon', got '{s}'"))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude '{}': {e}", lat.trim()))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude '{}': {e}", lon.trim()))?;
        let coords = Self { lat, lon };
        if coords.is_valid() {
            Ok(coords)
        } else {
            Err(format!("coordinates out of range: {s}"))
        }
    }
}

/// A point of interest returned by search, autocomplete, details, or the
/// static seed list.
///
/// Two candidates with the same `id` are the same place. Autocomplete stubs
/// carry no coordinates until resolved through place details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub label: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub open_hours: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Derived attributes keyed by facet name (`genre`, `amenity`, ...).
    #[serde(default)]
    pub facets: BTreeMap<String, Vec<String>>,
}

impl PlaceCandidate {
    /// A located candidate with only the required fields populated.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, coordinates: Coordinates) -> Self {
        let mut place = Self::stub(id, label);
        place.coordinates = Some(coordinates);
        place
    }

    /// A candidate without coordinates, as produced by autocomplete.
    #[must_use]
    pub fn stub(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinates: None,
            label: label.into(),
            category: None,
            rating: None,
            open_hours: None,
            image_url: None,
            facets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_facet<I, S>(mut self, facet: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facets
            .insert(facet.into(), values.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.coordinates.is_some()
    }

    /// Folds a later-arriving record for the same place into this one.
    ///
    /// Fields present on `newer` win; fields it lacks keep their current
    /// value. The `id` never changes.
    #[must_use]
    pub fn merged_with(self, newer: PlaceCandidate) -> PlaceCandidate {
        PlaceCandidate {
            id: self.id,
            coordinates: newer.coordinates.or(self.coordinates),
            label: if newer.label.trim().is_empty() {
                self.label
            } else {
                newer.label
            },
            category: newer.category.or(self.category),
            rating: newer.rating.or(self.rating),
            open_hours: newer.open_hours.or(self.open_hours),
            image_url: newer.image_url.or(self.image_url),
            facets: if newer.facets.is_empty() {
                self.facets
            } else {
                newer.facets
            },
        }
    }
}
