use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wmsview::prelude::*;

/// Integration tests driving the viewer the way a front end does: explicit
/// commands and map events against fake WMS and geocoding services
#[cfg(test)]
mod integration_tests {
    use super::*;
    use wmsview::controllers::search::SearchController;

    const WMS: &str = "https://gis.example.org/geoserver/wms";

    #[derive(Default)]
    struct FakeGeocoder {
        results: Vec<SearchSuggestion>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodingService for FakeGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<SearchSuggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.clone())
        }
    }

    struct FakeWms {
        body: String,
        calls: AtomicUsize,
        last: Mutex<Option<FeatureInfoRequest>>,
    }

    impl FakeWms {
        fn answering(body: &str) -> Self {
            Self {
                body: body.to_string(),
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl FeatureInfoService for FakeWms {
        async fn query(&self, request: &FeatureInfoRequest) -> Result<FeatureInfoResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(request.clone());
            Ok(serde_json::from_str(&self.body)?)
        }
    }

    /// Answers with one feature after `delay`
    struct SlowWms {
        delay: Duration,
        calls: AtomicUsize,
    }

    impl SlowWms {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeatureInfoService for SlowWms {
        async fn query(&self, _request: &FeatureInfoRequest) -> Result<FeatureInfoResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(serde_json::from_str(
                r#"{"features": [{"id": "rivers.7", "properties": {"nome": "Rio Doce"}}]}"#,
            )?)
        }
    }

    fn config(names: &[&str]) -> ViewerConfig {
        let catalog = names
            .iter()
            .map(|n| CatalogLayer::new(*n, format!("ns:{}", n.to_lowercase())))
            .collect();
        ViewerConfig::new(WMS, catalog)
    }

    fn app_with(names: &[&str], geocoder: Arc<FakeGeocoder>, wms: Arc<FakeWms>) -> AppContext {
        AppContext::with_services(config(names), geocoder, wms).unwrap()
    }

    fn app(names: &[&str]) -> AppContext {
        app_with(
            names,
            Arc::new(FakeGeocoder::default()),
            Arc::new(FakeWms::answering(r#"{"features": []}"#)),
        )
    }

    fn click(lat: f64, lng: f64) -> MapEvent {
        MapEvent::click(LatLng::new(lat, lng), Point::new(400.0, 300.0))
    }

    #[test]
    fn test_rivers_roads_scenario() {
        let mut app = app(&["Rivers", "Roads"]);
        app.set_layer_visible("Roads", true).unwrap();
        app.set_layer_visible("Rivers", true).unwrap();

        assert_eq!(app.registry().stacking(app.map()), vec!["Rivers", "Roads"]);
        assert_eq!(app.legend().names(), vec!["Rivers", "Roads"]);

        // Moving Roads to the top of the list puts it on top of the map too
        app.reorder_layers(&["Roads", "Rivers"]).unwrap();
        assert_eq!(app.registry().stacking(app.map()), vec!["Roads", "Rivers"]);
        assert_eq!(app.legend().names(), vec!["Roads", "Rivers"]);
    }

    #[test]
    fn test_legend_tracks_list_order_for_every_permutation() {
        let names = ["A", "B", "C"];
        let permutations = [
            ["A", "B", "C"],
            ["A", "C", "B"],
            ["B", "A", "C"],
            ["B", "C", "A"],
            ["C", "A", "B"],
            ["C", "B", "A"],
        ];

        for mask in 0..8u8 {
            for order in &permutations {
                let mut app = app(&names);
                for (i, name) in names.iter().enumerate() {
                    if mask & (1 << i) != 0 {
                        app.set_layer_visible(name, true).unwrap();
                    }
                }
                app.reorder_layers(order).unwrap();

                let expected = order
                    .iter()
                    .copied()
                    .filter(|n| app.registry().entry(n).unwrap().is_visible())
                    .collect::<Vec<_>>();
                assert_eq!(app.legend().names(), expected);
                assert_eq!(app.legend().is_visible(), mask != 0);
                assert_eq!(app.registry().stacking(app.map()), expected);
            }
        }
    }

    #[test]
    fn test_toggle_returns_layer_to_top() {
        let mut app = app(&["A", "B", "C"]);
        for name in ["A", "B", "C"] {
            app.set_layer_visible(name, true).unwrap();
        }
        app.set_layer_visible("B", false).unwrap();
        app.set_layer_visible("B", true).unwrap();
        assert_eq!(app.registry().stacking(app.map())[0], "B");
    }

    #[test]
    fn test_reorder_idempotent() {
        let mut app = app(&["A", "B", "C"]);
        app.set_layer_visible("A", true).unwrap();
        app.set_layer_visible("C", true).unwrap();

        app.reorder_layers(&["C", "A", "B"]).unwrap();
        let once = app.registry().stacking(app.map()).join(",");
        app.reorder_layers(&["C", "A", "B"]).unwrap();
        assert_eq!(app.registry().stacking(app.map()).join(","), once);
        assert_eq!(app.legend().names(), vec!["C", "A"]);
    }

    #[test]
    fn test_move_layer_and_opacity() {
        let mut app = app(&["A", "B", "C"]);
        app.move_layer("C", -2).unwrap();
        assert_eq!(app.registry().list_order(), vec!["C", "A", "B"]);
        app.move_layer("C", -1).unwrap();
        assert_eq!(app.registry().list_order(), vec!["C", "A", "B"]);

        assert!(!app.set_layer_opacity("A", 0.5).unwrap());
        app.set_layer_visible("A", true).unwrap();
        assert!(app.set_layer_opacity("A", 0.5).unwrap());
        assert_eq!(app.registry().entry("A").unwrap().opacity(), 0.5);
        assert_eq!(app.status().active_layers, 1);
    }

    #[tokio::test]
    async fn test_click_without_layers_skips_network() {
        let wms = Arc::new(FakeWms::answering(r#"{"features": []}"#));
        let mut app = app_with(&["A", "B"], Arc::new(FakeGeocoder::default()), wms.clone());

        app.handle_map_event(click(-19.9, -43.9)).await;
        assert_eq!(wms.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            app.map().popup().unwrap().content,
            PopupContent::NoLayerSelected
        );
    }

    #[tokio::test]
    async fn test_click_with_empty_features_reports_nothing_found() {
        let wms = Arc::new(FakeWms::answering(r#"{"features": []}"#));
        let mut app = app_with(&["A", "B"], Arc::new(FakeGeocoder::default()), wms.clone());
        app.set_layer_visible("A", true).unwrap();
        app.set_layer_visible("B", true).unwrap();

        app.handle_map_event(click(-19.9, -43.9)).await;
        assert_eq!(wms.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.map().popup().unwrap().content, PopupContent::NothingFound);

        let request = wms.last.lock().unwrap().clone().unwrap();
        assert_eq!(request.layers, vec!["ns:a", "ns:b"]);
        let url = request.to_url(WMS);
        assert!(url.contains("query_layers=ns%3Aa%2Cns%3Ab"));
        assert!(url.contains("feature_count=10"));

        app.handle_map_event(MapEvent::MoveStart).await;
        assert!(app.map().popup().is_none());
    }

    #[tokio::test]
    async fn test_measurement_totals_and_undo() {
        let wms = Arc::new(FakeWms::answering(r#"{"features": []}"#));
        let mut app = app_with(&["A"], Arc::new(FakeGeocoder::default()), wms.clone());
        app.set_layer_visible("A", true).unwrap();
        assert!(app.toggle_measure());

        let points = [
            LatLng::new(-19.92, -43.94),
            LatLng::new(-20.38, -43.50),
            LatLng::new(-21.76, -43.35),
            LatLng::new(-18.91, -48.27),
        ];
        for p in points {
            app.handle_map_event(click(p.lat, p.lng)).await;
        }
        assert_eq!(wms.calls.load(Ordering::SeqCst), 0);
        assert!(app.map().popup().is_none());

        let sum = |pts: &[LatLng]| pts.windows(2).map(|w| w[0].distance_to(&w[1])).sum::<f64>();
        let total = app.measure().total_distance().unwrap();
        assert!((total - sum(&points)).abs() < 1e-6);

        assert!(app.handle_map_key(KeyCode::Backspace));
        let total = app.measure().total_distance().unwrap();
        assert!((total - sum(&points[..3])).abs() < 1e-6);

        app.handle_map_key(KeyCode::Delete);
        app.handle_map_key(KeyCode::Delete);
        let session = app.measure().session().unwrap();
        assert_eq!(session.points().len(), 1);
        assert!(session.path().is_none());

        app.undo_measure_point();
        let session = app.measure().session().unwrap();
        assert!(session.points().is_empty());
        assert!(session.path().is_none());
        assert_eq!(app.map().polyline_count(), 0);

        assert!(app.handle_map_key(KeyCode::Escape));
        assert!(!app.measure().is_measuring());
        app.handle_map_event(click(-19.9, -43.9)).await;
        assert_eq!(wms.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_coordinate_literal_bypasses_geocoder() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let mut app = app_with(
            &["A"],
            geocoder.clone(),
            Arc::new(FakeWms::answering("{}")),
        );

        app.suggest("19.9, -43.9").await;
        let before = geocoder.calls.load(Ordering::SeqCst);
        app.submit_search().await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), before);
        assert_eq!(app.map().marker_count(), 1);
        assert_eq!(app.map().viewport().center, LatLng::new(19.9, -43.9));
        assert_eq!(app.map().zoom(), 12.0);

        app.suggest("Belo Horizonte").await;
        let before = geocoder.calls.load(Ordering::SeqCst);
        app.submit_search().await;
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_results_warns_without_markers() {
        let mut app = app(&["A"]);
        app.suggest("Nowhere at all").await;
        app.submit_search().await;

        assert_eq!(app.map().marker_count(), 0);
        let last = app.notifier().drain().pop().unwrap();
        assert_eq!(last.kind, NotificationKind::Warning);
        assert_eq!(last.title, "Nothing found");
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggestions_then_keyboard_select() {
        let geocoder = Arc::new(FakeGeocoder {
            results: vec![
                SearchSuggestion::new("Ouro Preto, Minas Gerais, Brasil", LatLng::new(-20.38, -43.50), "town"),
                SearchSuggestion::new("Ouro Branco, Minas Gerais, Brasil", LatLng::new(-20.52, -43.69), "town"),
            ],
            calls: AtomicUsize::new(0),
        });
        let mut app = app_with(&["A"], geocoder.clone(), Arc::new(FakeWms::answering("{}")));

        assert!(app.suggest("Ouro").await);
        assert_eq!(app.search().suggestions().len(), 2);

        // Same query again is served from the cache
        assert!(app.suggest("Ouro").await);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);

        app.search_key(KeyCode::ArrowDown);
        app.search_key(KeyCode::ArrowDown);
        assert_eq!(app.search_key(KeyCode::Enter), SearchKeyOutcome::Select(1));
        assert_eq!(app.search().query(), "Ouro Branco, Minas Gerais, Brasil");
        assert_eq!(app.map().marker_count(), 1);
        assert!(!app.search().suggestions_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_suggestions_never_land() {
        let geocoder = FakeGeocoder {
            results: vec![SearchSuggestion::new("Belo Horizonte", LatLng::new(-19.92, -43.94), "city")],
            calls: AtomicUsize::new(0),
        };
        let mut search = SearchController::new(Duration::from_millis(300), 12.0);

        let first = search.on_input("Be").unwrap();
        let first_wait = search.debounce(&first);
        let second = search.on_input("Belo").unwrap();
        let (first_live, second_live) = futures::join!(first_wait, search.debounce(&second));
        assert!(!first_live);
        assert!(second_live);

        let response = geocoder.search(second.query()).await;
        search.on_input("");
        assert!(!search.apply_suggestions(&second, response));
        assert!(search.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_inside_debounce_make_one_lookup() {
        let geocoder = Arc::new(FakeGeocoder {
            results: vec![SearchSuggestion::new("Belo Horizonte", LatLng::new(-19.92, -43.94), "city")],
            calls: AtomicUsize::new(0),
        });
        let mut app = app_with(&["A"], geocoder.clone(), Arc::new(FakeWms::answering("{}")));

        let mut pending = Vec::new();
        for text in ["Be", "Bel", "Belo"] {
            let ticket = app.search_input(text).unwrap();
            let lookup = tokio::spawn(app.suggestion_lookup(&ticket));
            pending.push((ticket, lookup));
            tokio::time::advance(Duration::from_millis(100)).await;
        }

        let mut applied = Vec::new();
        for (ticket, lookup) in pending {
            if let Some(result) = lookup.await.unwrap() {
                applied.push((ticket.query().to_string(), app.apply_suggestions(&ticket, result)));
            }
        }
        assert_eq!(applied, vec![("Belo".to_string(), true)]);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.search().suggestions().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleared_input_discards_late_suggestions() {
        let geocoder = Arc::new(FakeGeocoder {
            results: vec![SearchSuggestion::new("Belo Horizonte", LatLng::new(-19.92, -43.94), "city")],
            calls: AtomicUsize::new(0),
        });
        let mut app = app_with(&["A"], geocoder.clone(), Arc::new(FakeWms::answering("{}")));

        let ticket = app.search_input("Belo").unwrap();
        let lookup = tokio::spawn(app.suggestion_lookup(&ticket));
        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(app.search_input("").is_none());

        assert!(lookup.await.unwrap().is_none());
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
        assert!(!app.search().suggestions_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_view_change_closes_popup_of_pending_query() {
        let wms = Arc::new(SlowWms::new(Duration::from_millis(500)));
        let mut app = AppContext::with_services(
            config(&["Rivers"]),
            Arc::new(FakeGeocoder::default()),
            wms.clone(),
        )
        .unwrap();
        app.set_layer_visible("Rivers", true).unwrap();

        let ticket = app.map_event(click(-19.9, -43.9)).unwrap();
        assert_eq!(app.map().popup().unwrap().content, PopupContent::Loading);
        let lookup = tokio::spawn(app.feature_info_lookup(&ticket));

        // The loop keeps handling events while the query is out
        tokio::time::advance(Duration::from_millis(100)).await;
        let cursor = LatLng::new(-19.95, -43.92);
        assert!(app.map_event(MapEvent::MouseMove { lat_lng: cursor }).is_none());
        assert!(app.map_event(MapEvent::MoveStart).is_none());
        assert!(app.map().popup().is_none());
        assert_eq!(app.status().cursor, Some(cursor));

        let result = lookup.await.unwrap();
        assert!(result.is_ok());
        assert!(!app.complete_feature_info(ticket, result));
        assert!(app.map().popup().is_none());
        assert_eq!(wms.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_click_wins_over_slower_first() {
        let wms = Arc::new(SlowWms::new(Duration::from_millis(500)));
        let mut app = AppContext::with_services(
            config(&["Rivers"]),
            Arc::new(FakeGeocoder::default()),
            wms.clone(),
        )
        .unwrap();
        app.set_layer_visible("Rivers", true).unwrap();

        let first = app.map_event(click(-19.9, -43.9)).unwrap();
        let first_lookup = tokio::spawn(app.feature_info_lookup(&first));
        tokio::time::advance(Duration::from_millis(200)).await;
        let second = app.map_event(click(-20.1, -44.0)).unwrap();
        let second_lookup = tokio::spawn(app.feature_info_lookup(&second));

        let result = first_lookup.await.unwrap();
        assert!(!app.complete_feature_info(first, result));
        assert_eq!(app.map().popup().unwrap().content, PopupContent::Loading);
        assert_eq!(app.map().popup().unwrap().position, LatLng::new(-20.1, -44.0));

        let result = second_lookup.await.unwrap();
        assert!(app.complete_feature_info(second, result));
        let PopupContent::Features(blocks) = &app.map().popup().unwrap().content else {
            panic!("expected feature blocks");
        };
        assert_eq!(blocks[0].title, "rivers");
        assert_eq!(blocks[0].rows, vec![("NOME".to_string(), "Rio Doce".to_string())]);
        assert_eq!(wms.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_split_full_search_drops_overtaken_answer() {
        let geocoder = Arc::new(FakeGeocoder {
            results: vec![SearchSuggestion::new("Mariana, Minas Gerais, Brasil", LatLng::new(-20.38, -43.42), "town")],
            calls: AtomicUsize::new(0),
        });
        let mut app = app_with(&["A"], geocoder.clone(), Arc::new(FakeWms::answering("{}")));

        app.search_input("Mariana");
        let SubmitOutcome::Lookup(stale) = app.begin_search() else {
            panic!("expected a geocoder lookup");
        };
        let stale_result = app.search_lookup(&stale).await;
        let SubmitOutcome::Lookup(fresh) = app.begin_search() else {
            panic!("expected a geocoder lookup");
        };

        assert!(!app.complete_search(stale, stale_result));
        assert_eq!(app.map().marker_count(), 0);

        let result = app.search_lookup(&fresh).await;
        assert!(app.complete_search(fresh, result));
        assert_eq!(app.map().marker_count(), 1);
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_filter_leaves_registry_alone() {
        let mut app = app(&["Unidades de Conservação", "Limite MG", "Rios"]);
        app.set_layer_visible("Limite MG", true).unwrap();
        app.apply_filter(LayerFilter::from_key("uc"));

        assert!(app.filter().row_visible("Unidades de Conservação"));
        assert!(!app.filter().row_visible("Limite MG"));
        assert!(app.registry().entry("Limite MG").unwrap().is_visible());
        assert_eq!(app.legend().names(), vec!["Limite MG"]);
    }

    #[test]
    fn test_toolbar_and_unexpected_errors() {
        let mut app = app(&["A"]);
        app.zoom_to_extent();
        assert_eq!(app.map().zoom(), 7.0);

        app.show_help();
        app.report_unexpected(&MapError::Layer("boom".into()));
        let notes = app.notifier().drain();
        assert_eq!(notes[1].duration, Duration::from_millis(8000));
        assert_eq!(notes[2].kind, NotificationKind::Error);
        assert_eq!(notes[2].title, "Unexpected error");
    }

    #[test]
    fn test_startup_failure_goes_through_the_trap() {
        let notifier = Notifier::default();
        let err = AppContext::with_services(
            config(&["A", "A"]),
            Arc::new(FakeGeocoder::default()),
            Arc::new(FakeWms::answering("{}")),
        )
        .err()
        .unwrap();

        wmsview::app::report_unexpected(&notifier, &err);
        let notes = notifier.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert_eq!(notes[0].title, "Unexpected error");
    }

    #[test]
    fn test_startup_rejects_duplicate_names() {
        let result = AppContext::with_services(
            config(&["A", "A"]),
            Arc::new(FakeGeocoder::default()),
            Arc::new(FakeWms::answering("{}")),
        );
        assert!(matches!(result, Err(MapError::Config(_))));
    }
}
