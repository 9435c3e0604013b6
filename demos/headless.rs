use wmsview::{
    app::report_unexpected,
    prelude::*,
    services::feature_info::FeatureInfoRequest,
    ui::status::MapStatus,
};

/// Loads the configuration from a URL, a file or the built-in sample, then
/// starts the viewer
async fn start(source: Option<String>) -> wmsview::Result<AppContext> {
    let config = match source {
        Some(path) if path.starts_with("http") => ViewerConfig::fetch(&path).await?,
        Some(path) => ViewerConfig::from_file(&path)?,
        None => ViewerConfig::new(
            "https://geoserver.example.org/geoserver/wms",
            vec![
                CatalogLayer::new("Unidades de Conservação", "sisema:ucs"),
                CatalogLayer::new("Limite MG", "sisema:limite_mg"),
                CatalogLayer::new("Hidrografia", "sisema:hidrografia"),
            ],
        ),
    };
    AppContext::startup(config)
}

fn print_notifications(notifier: &Notifier) {
    println!("\n🔔 Notifications:");
    for note in notifier.drain() {
        println!("   [{:?}] {}: {}", note.kind, note.title, note.message);
    }
}

fn print_status(status: &MapStatus) {
    println!(
        "   {} | {} | {} | {}",
        status.coordinates_text(),
        status.zoom_text(),
        status.scale_text(),
        status.layers_text()
    );
}

/// Drives the viewer without any UI: loads a configuration, toggles layers,
/// runs a measurement and a coordinate search, then prints what a front end
/// would render.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("🗺️ wmsview headless demo");
    println!("========================");

    // Startup problems end up as the generic notification, like any other
    // unexpected error
    let notifier = Notifier::default();
    let mut app = match start(std::env::args().nth(1)).await {
        Ok(app) => app,
        Err(e) => {
            report_unexpected(&notifier, &e);
            print_notifications(&notifier);
            return Ok(());
        }
    };
    println!("✅ {} layers registered", app.registry().len());

    let names = app
        .registry()
        .list_order()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    for name in names.iter().rev() {
        if let Err(e) = app.set_layer_visible(name, true) {
            app.report_unexpected(&e);
        }
    }
    if let Some(first) = names.first() {
        if let Err(e) = app.set_layer_opacity(first, 0.6) {
            app.report_unexpected(&e);
        }
    }

    println!("\n📚 Legend:");
    for entry in app.legend().entries() {
        println!("   {} -> {}", entry.name, entry.icon_url);
    }
    println!("🧱 Map stack (front to back): {:?}", app.registry().stacking(app.map()));

    let viewport = app.map().viewport();
    let (width, height) = viewport.pixel_size();
    let request = FeatureInfoRequest {
        layers: app.registry().active_layer_names(),
        bbox: viewport.bounds(),
        width,
        height,
        x: width / 2,
        y: height / 2,
    };
    println!("\n🔎 Feature-info query for a center click:\n   {}", request.to_url(&app.config().geoserver_url));

    println!("\n📏 Measuring Belo Horizonte -> Ouro Preto -> Mariana:");
    app.toggle_measure();
    for (lat, lng) in [(-19.9167, -43.9345), (-20.3856, -43.5035), (-20.3777, -43.4159)] {
        let pixel = app.map().viewport().lat_lng_to_pixel(&LatLng::new(lat, lng));
        app.handle_map_event(MapEvent::click(LatLng::new(lat, lng), pixel)).await;
    }
    if let Some(total) = app.measure().total_distance() {
        println!("   total: {}", wmsview::controllers::format_distance(total));
    }
    app.handle_map_key(KeyCode::Escape);

    println!("\n📍 Coordinate search:");
    app.search_blur();
    app.suggest("-19.9167, -43.9345").await;
    app.submit_search().await;
    app.handle_map_event(MapEvent::MouseMove {
        lat_lng: LatLng::new(-19.92, -43.94),
    })
    .await;
    print_status(&app.status());

    print_notifications(app.notifier());

    Ok(())
}
