//! # HazVis-RS: Seismic Hazard Curve Explorer
//!
//! An interactive viewer for probabilistic seismic hazard curves. A
//! cascading parameter form (model edition, region, intensity measure
//! type, site class) drives hazard computations against a web service or a
//! built-in mock model, and the resulting curves render on linked log-log
//! panels.
//!
//! ## Architecture
//!
//! - **Backend**: Runs the hazard service on a worker thread behind a
//!   [`backend::HazardService`] trait (HTTP or mock)
//! - **Catalog**: Parameter metadata plus the dependency resolver that
//!   keeps cascading menus mutually legal
//! - **Frontend**: Renders the UI using eframe/egui with egui_plot panels
//! - **Communication**: Crossbeam channels for thread-safe data transfer
//!
//! ## Configuration
//!
//! Application state (recent queries, preferences) is stored in the
//! platform-appropriate data directory under `org.hazvis.hazvis-rs`:
//!
//! - **Linux**: `~/.local/share/org.hazvis.hazvis-rs/`
//! - **macOS**: `~/Library/Application Support/org.hazvis.hazvis-rs/`
//! - **Windows**: `%APPDATA%\org.hazvis.hazvis-rs\`
//!
//! ## Example
//!
//! ```ignore
//! use hazvis_rs::{
//!     backend::{MockHazardService, ServiceBridge},
//!     config::{AppState, UiPreferences},
//!     frontend::HazVisApp,
//! };
//!
//! fn main() -> eframe::Result<()> {
//!     let app_state = AppState::load_or_default();
//!     let prefs = UiPreferences::load_or_default();
//!     let (bridge, _handle) = ServiceBridge::spawn(Box::new(MockHazardService::new()));
//!
//!     eframe::run_native(
//!         "HazVis-RS",
//!         eframe::NativeOptions::default(),
//!         Box::new(|_cc| Ok(Box::new(HazVisApp::new(bridge, app_state, prefs, None)))),
//!     )
//! }
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod frontend;
pub mod types;
pub mod wire;

// Re-export commonly used types
pub use backend::{HazardService, MockHazardService, ServiceBridge, ServiceMessage};
pub use catalog::{DependencyResolver, FlowConfig, FlowKind, ParameterCatalog};
pub use error::{HazVisError, Result};
pub use frontend::HazVisApp;
pub use types::{ParamKey, Selection};
