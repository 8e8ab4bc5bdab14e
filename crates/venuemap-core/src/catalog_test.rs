use super::*;

const VALID: &str = r"
categories:
  - id: venue_type
    label: Venue Type
    options: [Bar, Lounge, Club]
  - id: music_genre
    label: Music Genre
    facet: genre
    options: [Jazz, Blues]
seed_places:
  - id: seed-1
    label: Smalls Jazz Club
    coordinates: { lat: 40.734, lon: -74.002 }
    category: Club
    facets:
      genre: [Jazz]
";

#[test]
fn parses_categories_and_seed_places() {
    let catalog = parse_catalog(VALID).expect("valid catalog");
    assert_eq!(catalog.categories.len(), 2);
    assert_eq!(catalog.seed_places.len(), 1);
    assert_eq!(catalog.seed_places[0].facets["genre"], vec!["Jazz"]);
}

#[test]
fn attribute_defaults_to_category() {
    let catalog = parse_catalog(VALID).unwrap();
    assert_eq!(
        catalog.category("venue_type").unwrap().attribute(),
        FilterAttribute::Category
    );
    assert_eq!(
        catalog.category("music_genre").unwrap().attribute(),
        FilterAttribute::Facet("genre".to_string())
    );
}

#[test]
fn unknown_category_lookup_is_none() {
    let catalog = parse_catalog(VALID).unwrap();
    assert!(catalog.category("price").is_none());
}

#[test]
fn rejects_duplicate_category_ids() {
    let yaml = r"
categories:
  - { id: a, label: A, options: [x] }
  - { id: a, label: A again, options: [y] }
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate filter category id"));
}

#[test]
fn rejects_empty_option_list() {
    let yaml = r"
categories:
  - { id: a, label: A, options: [] }
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("has no options"));
}

#[test]
fn rejects_case_insensitive_duplicate_options() {
    let yaml = r"
categories:
  - { id: a, label: A, options: [Bar, bar] }
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("twice"));
}

#[test]
fn rejects_seed_place_without_coordinates() {
    let yaml = r"
categories:
  - { id: a, label: A, options: [x] }
seed_places:
  - { id: s1, label: Nowhere }
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("has no coordinates"));
}

#[test]
fn rejects_seed_place_out_of_range() {
    let yaml = r"
categories:
  - { id: a, label: A, options: [x] }
seed_places:
  - { id: s1, label: Far, coordinates: { lat: 120.0, lon: 0.0 } }
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("out-of-range"));
}

#[test]
fn rejects_duplicate_seed_ids() {
    let yaml = r"
categories:
  - { id: a, label: A, options: [x] }
seed_places:
  - { id: s1, label: One, coordinates: { lat: 1.0, lon: 1.0 } }
  - { id: s1, label: Two, coordinates: { lat: 2.0, lon: 2.0 } }
";
    let err = parse_catalog(yaml).unwrap_err();
    assert!(err.to_string().contains("duplicate seed place id"));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let err = parse_catalog("categories: [").unwrap_err();
    assert!(matches!(err, ConfigError::CatalogFileParse(_)));
}

#[test]
fn missing_file_is_io_error() {
    let err = load_catalog(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::CatalogFileIo { .. }));
}

#[test]
fn bundled_catalog_is_valid() {
    let yaml = include_str!("../../../config/catalog.yaml");
    let catalog = parse_catalog(yaml).expect("bundled catalog must validate");
    assert!(catalog.category("venue_type").is_some());
    assert!(!catalog.seed_places.is_empty());
}
