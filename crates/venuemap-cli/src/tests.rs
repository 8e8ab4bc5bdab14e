use super::*;
use venuemap_core::{Coordinates, PlaceCandidate};

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["venuemap"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_catalog_command() {
    let cli = Cli::try_parse_from(["venuemap", "catalog"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Catalog)));
}

#[test]
fn parses_suggest_text() {
    let cli = Cli::try_parse_from(["venuemap", "suggest", "jaz"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Suggest { ref text }) if text == "jaz"
    ));
}

#[test]
fn parses_search_with_repeated_filters() {
    let cli = Cli::try_parse_from([
        "venuemap",
        "search",
        "jazz bar",
        "--filter",
        "venue_type=Bar",
        "--filter",
        " music_genre = Jazz ",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Search {
            text,
            filters,
            select,
            details,
        }) => {
            assert_eq!(text, "jazz bar");
            assert_eq!(
                filters,
                vec![
                    ("venue_type".to_string(), "Bar".to_string()),
                    ("music_genre".to_string(), "Jazz".to_string()),
                ]
            );
            assert!(select.is_none());
            assert!(!details);
        }
        other => panic!("expected search command, got {other:?}"),
    }
}

#[test]
fn search_select_with_details() {
    let cli =
        Cli::try_parse_from(["venuemap", "search", "jazz", "--select", "1", "--details"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search { select: Some(ref id), details: true, .. }) if id == "1"
    ));
}

#[test]
fn details_flag_requires_select() {
    assert!(Cli::try_parse_from(["venuemap", "search", "jazz", "--details"]).is_err());
}

#[test]
fn malformed_filter_is_rejected() {
    assert!(Cli::try_parse_from(["venuemap", "search", "jazz", "--filter", "venue_type"]).is_err());
    assert!(Cli::try_parse_from(["venuemap", "search", "jazz", "--filter", "=Bar"]).is_err());
}

#[test]
fn parses_locate_command() {
    let cli = Cli::try_parse_from(["venuemap", "locate"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Locate)));
}

#[test]
fn format_place_includes_present_fields_only() {
    let mut place = PlaceCandidate::new("1", "Smalls", Coordinates::new(40.7344, -74.0027))
        .with_category("Bar");
    place.rating = Some(4.7);
    assert_eq!(
        commands::format_place(&place),
        "1  Smalls  [Bar]  4.7/5  @ 40.734400,-74.002700"
    );

    let stub = PlaceCandidate::stub("s", "Suggestion");
    assert_eq!(commands::format_place(&stub), "s  Suggestion");
}
