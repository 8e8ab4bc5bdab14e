use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::place::PlaceCandidate;
use crate::ConfigError;

/// Which attribute of a candidate a filter category matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAttribute {
    /// The candidate's `category` field (venue type).
    Category,
    /// A named entry in the candidate's `facets` map.
    Facet(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterCategory {
    pub id: String,
    pub label: String,
    pub options: Vec<String>,
    /// Facet name to match; absent means the candidate's `category`.
    #[serde(default)]
    pub facet: Option<String>,
}

impl FilterCategory {
    #[must_use]
    pub fn attribute(&self) -> FilterAttribute {
        match &self.facet {
            Some(name) => FilterAttribute::Facet(name.clone()),
            None => FilterAttribute::Category,
        }
    }
}

/// Filter categories and seed places, loaded once at startup and shared
/// read-only for the rest of the process.
#[derive(Debug, Clone, Deserialize)]
pub struct Catalog {
    pub categories: Vec<FilterCategory>,
    #[serde(default)]
    pub seed_places: Vec<PlaceCandidate>,
}

impl Catalog {
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&FilterCategory> {
        self.categories.iter().find(|c| c.id == id)
    }
}

/// Load and validate the catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: &Path) -> Result<Catalog, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_catalog(&content)
}

/// Parse and validate a catalog from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::CatalogFileParse`] on malformed YAML and
/// [`ConfigError::Validation`] when the content breaks a catalog rule.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, ConfigError> {
    let catalog: Catalog = serde_yaml::from_str(yaml)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &Catalog) -> Result<(), ConfigError> {
    let mut seen_categories = HashSet::new();

    for category in &catalog.categories {
        if category.id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "filter category id must be non-empty".to_string(),
            ));
        }

        if !seen_categories.insert(category.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate filter category id: '{}'",
                category.id
            )));
        }

        if category.options.is_empty() {
            return Err(ConfigError::Validation(format!(
                "filter category '{}' has no options",
                category.id
            )));
        }

        let mut seen_options = HashSet::new();
        for option in &category.options {
            if !seen_options.insert(option.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "filter category '{}' lists option '{}' twice",
                    category.id, option
                )));
            }
        }
    }

    let mut seen_places = HashSet::new();
    for place in &catalog.seed_places {
        if !seen_places.insert(place.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate seed place id: '{}'",
                place.id
            )));
        }

        match place.coordinates {
            Some(c) if c.is_valid() => {}
            Some(c) => {
                return Err(ConfigError::Validation(format!(
                    "seed place '{}' has out-of-range coordinates {c}",
                    place.id
                )));
            }
            None => {
                return Err(ConfigError::Validation(format!(
                    "seed place '{}' has no coordinates",
                    place.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
