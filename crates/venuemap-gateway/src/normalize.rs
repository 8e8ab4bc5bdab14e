//! Conversion from wire shapes to [`venuemap_core::PlaceCandidate`].

use venuemap_core::{Coordinates, PlaceCandidate};

use crate::types::{WirePlace, WirePrediction};

/// Place types that say nothing about what kind of venue something is.
const GENERIC_TYPES: &[&str] = &["point_of_interest", "establishment", "premise", "geocode"];

/// Derives a display category from the API's `types` list.
///
/// The first non-generic type wins and is title-cased word by word, so
/// `night_club` becomes `Night Club`.
#[must_use]
pub fn category_from_types(types: &[String]) -> Option<String> {
    types
        .iter()
        .map(|t| t.trim())
        .find(|t| !t.is_empty() && !GENERIC_TYPES.contains(t))
        .map(title_case)
}

fn title_case(raw: &str) -> String {
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

/// Normalizes a full place record. Coordinates stay `None` when the
/// record has no usable geometry.
#[must_use]
pub fn normalize_place(place: WirePlace) -> PlaceCandidate {
    let coordinates = place
        .geometry
        .map(|g| Coordinates::new(g.location.lat, g.location.lng))
        .filter(Coordinates::is_valid);

    let open_hours = place
        .opening_hours
        .map(|h| h.weekday_text.join("; "))
        .filter(|s| !s.is_empty());

    let mut candidate = PlaceCandidate::stub(place.place_id, place.name.trim());
    candidate.coordinates = coordinates;
    candidate.category = category_from_types(&place.types);
    candidate.rating = place.rating;
    candidate.open_hours = open_hours;
    candidate.image_url = place.photo_url.filter(|u| !u.trim().is_empty());

    if !place.genres.is_empty() {
        candidate.facets.insert("genre".to_string(), place.genres);
    }
    if !place.amenities.is_empty() {
        candidate.facets.insert("amenity".to_string(), place.amenities);
    }

    candidate
}

/// Normalizes an autocomplete prediction into a coordinate-less stub.
#[must_use]
pub fn normalize_prediction(prediction: WirePrediction) -> PlaceCandidate {
    let mut candidate = PlaceCandidate::stub(prediction.place_id, prediction.description.trim());
    candidate.category = category_from_types(&prediction.types);
    candidate
}
