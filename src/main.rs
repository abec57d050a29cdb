//! Seismic Hazard Curve Explorer - Main Entry Point
//!
//! Wires the hazard service worker thread to the egui frontend and starts
//! the native window.

use clap::Parser;
use hazvis_rs::backend::{HazardService, HttpHazardService, MockHazardService, ServiceBridge};
use hazvis_rs::config::query;
use hazvis_rs::config::{AppState, UiPreferences};
use hazvis_rs::frontend::HazVisApp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "hazvis", version, about = "Interactive seismic hazard curve explorer")]
struct Cli {
    /// Deep-link query string to restore, e.g.
    /// "edition=E2014&region=COUS&imt=PGA&vs30=760&latitude=34&longitude=-118.25"
    #[arg(long)]
    query: Option<String>,

    /// Base URL of the hazard web service; omit to use the built-in mock
    /// model
    #[arg(long)]
    service_url: Option<String>,

    /// Ignore the last session's persisted query
    #[arg(long)]
    fresh: bool,
}

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,hazvis_rs=trace")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hazard curve explorer");

    let cli = Cli::parse();
    let app_state = AppState::load_or_default();
    let prefs = UiPreferences::load_or_default();

    // Explicit --query wins over the persisted last session
    let link_source = cli.query.clone().or_else(|| {
        if cli.fresh {
            None
        } else {
            app_state.last_query.clone()
        }
    });
    let initial_link = link_source.and_then(|raw| match query::decode(&raw) {
        Ok(link) => Some(link),
        Err(e) => {
            tracing::warn!("Ignoring malformed query {raw:?}: {e}");
            None
        }
    });

    let service_url = cli.service_url.clone().or_else(|| app_state.service_url.clone());
    let service: Box<dyn HazardService> = match service_url {
        Some(url) => {
            tracing::info!("Using hazard service at {url}");
            Box::new(HttpHazardService::new(&url))
        }
        None => {
            tracing::info!("Using built-in mock hazard model");
            Box::new(MockHazardService::new())
        }
    };

    let (bridge, service_handle) = ServiceBridge::spawn(service);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Hazard Curve Explorer"),
        ..Default::default()
    };

    let dark_mode = prefs.dark_mode;
    let result = eframe::run_native(
        "Hazard Curve Explorer",
        native_options,
        Box::new(move |cc| {
            if dark_mode {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
            } else {
                cc.egui_ctx.set_visuals(egui::Visuals::light());
            }

            Ok(Box::new(HazVisApp::new(
                bridge,
                app_state,
                prefs,
                initial_link,
            )))
        }),
    );

    tracing::info!("Shutting down...");
    let _ = service_handle.join();

    result
}
