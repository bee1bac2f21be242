//! Map page driven end to end through a scripted backend.

mod common;

use aquamon_dashboard::model::Severity;
use aquamon_dashboard::page::map::*;
use aquamon_dashboard::page::{Command, Inbound, MapPage, Page, UiAction};
use aquamon_dashboard::quality::{Grade, UNKNOWN_COLOR};
use aquamon_dashboard::session::ViewSettings;
use aquamon_dashboard::sites::SizeClass;
use aquamon_dashboard::view::map::{AlertFilter, SELECTED_COLOR};

use common::*;

/// Site 1 reads Good, site 2 reads Poor, the rest have no readings.
/// Sanjay Lake (3) has an active alert.
fn harness() -> Harness<MapPage> {
    let api = FakeApi::with_reference_sites();
    api.edit(|s| {
        s.sensor.insert(1, snapshot(good_reading(1), 3));
        s.sensor.insert(2, snapshot(poor_reading(2), 3));
        s.alerts = vec![alert(7, "Sanjay Lake", "pH Alert", Severity::High)];
    });
    Harness::new(MapPage::new(ViewSettings::default()), api)
}

fn visible_ids(h: &Harness<MapPage>) -> Vec<u32> {
    h.page
        .map()
        .markers()
        .iter()
        .filter(|m| m.visible)
        .map(|m| m.site.id)
        .collect()
}

#[tokio::test]
async fn test_initial_load_colors_markers_from_latest_readings() {
    let mut h = harness();
    h.start().await;

    let calls = h.api.calls();
    assert_eq!(&calls[..2], &["sites", "alerts"]);
    assert_eq!(calls.len(), 10);
    assert!(calls.contains(&"sensor/8".to_string()));

    let map = h.page.map();
    assert_eq!(map.markers().len(), 8);
    assert_eq!(map.marker(1).unwrap().color(), Grade::Good.color());
    assert_eq!(map.marker(2).unwrap().color(), Grade::Poor.color());
    assert_eq!(map.marker(3).unwrap().color(), UNKNOWN_COLOR);

    assert_eq!(h.text(TOTAL_MARKERS), "8");
    assert_eq!(h.text(ACTIVE_ALERTS), "1");
    assert_eq!(h.text(GOOD_QUALITY_COUNT), "1");
    assert_eq!(h.text(POOR_QUALITY_COUNT), "1");

    let options = h.items(WATER_BODY_FILTER);
    assert_eq!(options.len(), 9);
    assert_eq!(options[0], "all: All Water Bodies");
    assert_eq!(options[3], "3: Sanjay Lake");

    assert!(h.visible(WATER_BODY_INFO));
    assert!(!h.visible(DETAILS));
}

#[tokio::test]
async fn test_quality_filter_then_reset_restores_every_marker() {
    let mut h = harness();
    h.start().await;

    h.ui(UiAction::QualityFilter(Some(Grade::Good))).await;
    assert_eq!(visible_ids(&h), vec![1]);
    assert_eq!(h.text(TOTAL_MARKERS), "1");
    assert_eq!(h.text(POOR_QUALITY_COUNT), "0");

    h.ui(UiAction::QualityFilter(None)).await;
    assert_eq!(visible_ids(&h).len(), 8);
    assert!(h.page.map().filter().is_reset());
    assert_eq!(h.text(TOTAL_MARKERS), "8");
}

#[tokio::test]
async fn test_filters_combine() {
    let mut h = harness();
    h.start().await;

    h.ui(UiAction::SizeFilter(Some(SizeClass::Large))).await;
    assert_eq!(visible_ids(&h), vec![1, 2]);

    h.ui(UiAction::QualityFilter(Some(Grade::Poor))).await;
    assert_eq!(visible_ids(&h), vec![2]);

    h.ui(UiAction::SizeFilter(None)).await;
    h.ui(UiAction::QualityFilter(None)).await;
    h.ui(UiAction::AlertFilter(AlertFilter::WithAlerts)).await;
    assert_eq!(visible_ids(&h), vec![3]);

    h.ui(UiAction::AlertFilter(AlertFilter::WithoutAlerts)).await;
    assert_eq!(visible_ids(&h).len(), 7);
    assert!(!visible_ids(&h).contains(&3));
}

#[tokio::test]
async fn test_pushed_reading_recolors_marker_under_active_filter() {
    let mut h = harness();
    h.start().await;
    h.ui(UiAction::QualityFilter(Some(Grade::Good))).await;
    assert_eq!(visible_ids(&h), vec![1]);

    h.send(pushed(good_reading(4))).await;
    assert_eq!(visible_ids(&h), vec![1, 4]);
    assert_eq!(h.text(GOOD_QUALITY_COUNT), "2");
}

#[tokio::test]
async fn test_site_losing_its_reading_drops_marker_color() {
    let mut h = harness();
    h.start().await;
    assert_eq!(h.page.map().marker(1).unwrap().color(), Grade::Good.color());

    h.api.edit(|s| {
        s.sensor.remove(&1);
    });
    h.send(Inbound::Tick).await;

    assert_eq!(h.page.map().marker(1).unwrap().grade(), None);
    assert_eq!(h.page.map().marker(1).unwrap().color(), UNKNOWN_COLOR);
    assert!(!h.page.session().latest.contains_key(&1));
    assert_eq!(h.text(GOOD_QUALITY_COUNT), "0");
}

#[tokio::test]
async fn test_selection_fills_detail_panel() {
    let mut h = harness();
    h.start().await;
    h.api.clear_calls();

    h.ui(UiAction::SelectSite(2)).await;
    assert_eq!(h.api.calls(), vec!["sensor/2", "alerts"]);

    assert!(!h.visible(WATER_BODY_INFO));
    assert!(h.visible(DETAILS));
    assert_eq!(h.text(SELECTED_NAME), "Hauz Khas Lake");
    assert_eq!(h.text(SELECTED_AREA), "12.5 sq km");
    assert_eq!(h.text(SELECTED_STATUS), "Active");
    assert_eq!(h.text(SELECTED_PH), "9.5");
    assert_eq!(h.text(SELECTED_OXYGEN), "3");
    assert_eq!(h.text(SELECTED_ALERTS), "No Active Alerts");
    assert_eq!(h.page.map().marker(2).unwrap().color(), SELECTED_COLOR);
}

#[tokio::test]
async fn test_new_selection_replaces_detail_panel() {
    let mut h = harness();
    h.start().await;
    h.ui(UiAction::SelectSite(2)).await;
    h.ui(UiAction::SelectSite(3)).await;

    let map = h.page.map();
    assert_eq!(map.selected(), Some(3));
    assert!(!map.marker(2).unwrap().selected);
    assert_eq!(map.marker(2).unwrap().color(), Grade::Poor.color());

    assert_eq!(h.text(SELECTED_NAME), "Sanjay Lake");
    assert_eq!(h.text(SELECTED_PH), "--");
    assert_eq!(h.text(SELECTED_ALERTS), "Active Alerts");
    assert_eq!(h.items(SELECTED_ALERTS), vec!["[high] pH Alert triggered"]);
}

#[tokio::test]
async fn test_late_sensor_result_for_previous_selection_is_ignored() {
    let mut h = harness();
    h.start().await;
    h.ui(UiAction::SelectSite(3)).await;

    h.send(Inbound::Loaded(aquamon_dashboard::page::Loaded::Sensor {
        site_id: 1,
        result: Ok(snapshot(reading(1, 6.9, 22.0, 7.0, 3.0), 1)),
    }))
    .await;

    assert_eq!(h.text(SELECTED_NAME), "Sanjay Lake");
    assert_eq!(h.text(SELECTED_PH), "--");
}

#[tokio::test]
async fn test_refresh_disables_button_until_sites_arrive() {
    let mut h = harness();
    h.start().await;

    let commands = h.page.handle(Inbound::Ui(UiAction::Refresh), h.now);
    assert_eq!(commands, vec![Command::FetchSites, Command::FetchAlerts]);
    let button = h.page.session().doc.get(REFRESH_MAP).unwrap();
    assert!(button.disabled);
    assert_eq!(button.text, "Refreshing...");

    // A second click while refreshing does nothing.
    assert!(h.page.handle(Inbound::Ui(UiAction::Refresh), h.now).is_empty());

    h.run(commands).await;
    let button = h.page.session().doc.get(REFRESH_MAP).unwrap();
    assert!(!button.disabled);
    assert_eq!(button.text, "Refresh");
    assert_eq!(h.toasts(), vec!["[success] Map data refreshed successfully"]);
}

#[tokio::test]
async fn test_failed_refresh_restores_button_with_one_error() {
    let mut h = harness();
    h.start().await;
    h.api.edit(|s| s.fail_sites = true);

    h.ui(UiAction::Refresh).await;
    assert!(!h.page.session().doc.get(REFRESH_MAP).unwrap().disabled);
    assert_eq!(h.toasts(), vec!["[error] Error loading water bodies"]);
    assert_eq!(h.page.map().markers().len(), 8);

    h.advance(chrono::Duration::seconds(4));
    assert_eq!(h.toasts().len(), 1);
    h.advance(chrono::Duration::seconds(1));
    assert!(h.toasts().is_empty());
}

#[tokio::test]
async fn test_tick_does_not_announce_refresh() {
    let mut h = harness();
    h.start().await;
    h.send(Inbound::Tick).await;
    assert!(h.toasts().is_empty());
}

#[tokio::test]
async fn test_vanished_site_clears_selection() {
    let mut h = harness();
    h.start().await;
    h.ui(UiAction::SelectSite(8)).await;
    assert!(h.visible(DETAILS));

    h.api.edit(|s| s.sites.truncate(7));
    h.send(Inbound::Tick).await;

    assert_eq!(h.page.map().selected(), None);
    assert_eq!(h.page.map().markers().len(), 7);
    assert!(h.visible(WATER_BODY_INFO));
    assert!(!h.visible(DETAILS));
}

#[tokio::test]
async fn test_unknown_marker_selection_is_ignored() {
    let mut h = harness();
    h.start().await;
    h.api.clear_calls();
    h.ui(UiAction::SelectSite(99)).await;
    assert!(h.api.calls().is_empty());
    assert!(h.page.map().detail().is_none());
}
