//! Command handlers for the CLI.
//!
//! Each handler drives a [`SearchCoordinator`] the way a UI would, lets the
//! remote calls settle, and prints the resulting state to stdout.

use std::sync::Arc;

use anyhow::Context;
use venuemap_core::{query_len, AppConfig, Catalog, PlaceCandidate};
use venuemap_gateway::HttpGateway;
use venuemap_search::{
    CoordinatorSettings, InMemoryMap, SearchCoordinator, SelectionPhase, StaticGeolocator,
};

pub(crate) type Coordinator = SearchCoordinator<HttpGateway, StaticGeolocator, InMemoryMap>;

pub(crate) fn load_catalog(config: &AppConfig) -> anyhow::Result<Arc<Catalog>> {
    let catalog = venuemap_core::load_catalog(&config.catalog_path).with_context(|| {
        format!(
            "failed to load catalog from {}",
            config.catalog_path.display()
        )
    })?;
    tracing::debug!(
        categories = catalog.categories.len(),
        seed_places = catalog.seed_places.len(),
        "catalog loaded"
    );
    Ok(Arc::new(catalog))
}

/// Wires the HTTP gateway, the configured home position and an in-memory
/// map into a coordinator.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built from `config`.
pub(crate) fn build_coordinator(
    config: &AppConfig,
    catalog: Arc<Catalog>,
) -> anyhow::Result<Coordinator> {
    let gateway =
        HttpGateway::from_app_config(config).context("failed to build places gateway")?;
    Ok(SearchCoordinator::new(
        catalog,
        Arc::new(gateway),
        Arc::new(StaticGeolocator::from_home(config.home_position)),
        InMemoryMap::new(),
        CoordinatorSettings::from_app_config(config),
    ))
}

pub(crate) fn run_catalog(catalog: &Catalog) {
    for category in &catalog.categories {
        let matches_on = category.facet.as_deref().unwrap_or("category");
        println!("{} ({}, matches {matches_on})", category.label, category.id);
        for option in &category.options {
            println!("  - {option}");
        }
    }
    println!("{} seed places", catalog.seed_places.len());
}

pub(crate) async fn run_suggest(coordinator: &mut Coordinator, text: &str) {
    let min_chars = coordinator.settings().autocomplete_min_chars;
    if query_len(text) < min_chars {
        println!("Type at least {min_chars} characters for suggestions.");
        return;
    }

    coordinator.on_input_change(text);
    coordinator.settle().await;

    let suggestions = coordinator.suggestions();
    if suggestions.is_empty() {
        println!("No suggestions for '{text}'.");
        return;
    }
    for suggestion in suggestions {
        println!("{}", format_place(suggestion));
    }
}

pub(crate) async fn run_search(
    coordinator: &mut Coordinator,
    text: &str,
    filters: &[(String, String)],
    select: Option<&str>,
    open_details: bool,
) {
    for (category_id, option) in filters {
        coordinator.on_filter_toggle(category_id, option);
    }

    coordinator.on_submit(text);
    coordinator.settle().await;

    let total = coordinator.candidates().len();
    let visible = coordinator.filtered_view();
    println!("{} of {total} results for '{text}':", visible.len());
    for place in visible {
        println!("{}", format_place(place));
    }

    let Some(place_id) = select else {
        return;
    };
    if !coordinator.map().click(place_id) {
        println!("No marker for '{place_id}' in the filtered results.");
        return;
    }
    coordinator.settle().await;
    if open_details {
        coordinator.on_open_detail_panel();
    }
    println!("{}", format_selection(coordinator));
}

pub(crate) async fn run_locate(coordinator: &mut Coordinator) {
    coordinator.on_use_my_location();
    coordinator.settle().await;

    let notices = coordinator.take_notices();
    if notices.is_empty() {
        let state = coordinator.selection();
        println!(
            "Map centered on {} at zoom {}.",
            state.map_center, state.map_zoom
        );
    }
    for notice in notices {
        println!("{}", notice.message);
    }
}

/// One result line: id, label, then whatever optional fields are present.
pub(crate) fn format_place(place: &PlaceCandidate) -> String {
    let mut line = format!("{}  {}", place.id, place.label);
    if let Some(category) = &place.category {
        line.push_str(&format!("  [{category}]"));
    }
    if let Some(rating) = place.rating {
        line.push_str(&format!("  {rating:.1}/5"));
    }
    if let Some(at) = place.coordinates {
        line.push_str(&format!("  @ {at}"));
    }
    line
}

fn format_selection(coordinator: &Coordinator) -> String {
    let state = coordinator.selection();
    let Some(place_id) = state.selected_place_id.as_deref() else {
        return "Nothing selected.".to_owned();
    };
    let mut out = format!(
        "Selected {place_id}; map at {} zoom {}",
        state.map_center, state.map_zoom
    );
    if let Some(popover) = coordinator.map().popover() {
        out.push_str(&format!("\n  {}", popover.title));
        if let Some(hours) = &popover.open_hours {
            out.push_str(&format!("\n  Hours: {hours}"));
        }
    }
    if coordinator.phase() == SelectionPhase::DetailOpen {
        if let Some(image) = coordinator
            .candidates()
            .iter()
            .find(|c| c.id == place_id)
            .and_then(|c| c.image_url.as_deref())
        {
            out.push_str(&format!("\n  Photo: {image}"));
        }
        out.push_str("\n  (detail panel open)");
    }
    out
}
