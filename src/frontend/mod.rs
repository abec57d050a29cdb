//! Frontend module for egui UI
//!
//! This module provides the main UI using eframe/egui. It talks to the
//! hazard service worker through crossbeam channels and renders curve
//! panels with egui_plot.
//!
//! # Architecture
//!
//! A fixed sidebar hosts the cascading parameter form; the central area
//! hosts the curve panels, laid out by [`PanelLayoutManager`]. All series
//! highlighting funnels through [`LinkedSelectionController`], and every
//! in-flight computation carries a generation number so late responses
//! from an abandoned request can never overwrite newer curves.
//!
//! # Main Types
//!
//! - [`HazVisApp`] - Main application state implementing [`eframe::App`]
//! - [`ParameterForm`] - Cascading parameter controls
//! - [`Panel`] / [`PanelLayoutManager`] - Curve surfaces and their sizing
//!
//! # Submodules
//!
//! - `form` - Parameter form and submission gating
//! - `panel` - Panel model and layout management
//! - `plot` - Log-log curve rendering with egui_plot
//! - `selection` - Linked series selection
//! - `state` - View lifecycle state machine
//! - `export` - CSV export

pub mod export;
pub mod form;
pub mod panel;
pub mod plot;
pub mod selection;
pub mod state;

pub use form::{FormResponse, ParameterForm};
pub use panel::{Panel, PanelId, PanelLayoutManager, PanelSet, PanelSize};
pub use plot::PanelEvent;
pub use selection::{DerivedUpdate, LinkedSelectionController, SelectionSource};
pub use state::ViewPhase;

use crate::backend::{ServiceBridge, ServiceMessage};
use crate::catalog::FlowKind;
use crate::config::query::DeepLink;
use crate::config::{AppState, UiPreferences};
use crate::extract::CurveDataExtractor;
use crate::types::ParamKey;
use crate::wire::{CurveResponse, DataShape};
use std::time::Duration;

const HAZARD_TITLE: &str = "Hazard Curves";
const HAZARD_FILENAME: &str = "hazardCurves";
const COMPONENT_TITLE: &str = "Component Curves";
const COMPONENT_FILENAME: &str = "componentCurves";

/// Main application state
pub struct HazVisApp {
    bridge: ServiceBridge,
    form: ParameterForm,
    panels: PanelSet,
    layout: PanelLayoutManager,
    phase: ViewPhase,
    app_state: AppState,
    prefs: UiPreferences,
    /// Monotone id handed to each computation; only the newest is accepted
    generation: u64,
    /// Groups of the last accepted computation, kept for derived rebuilds
    response: CurveResponse,
    /// Query echoed with exports, describing the curves on screen
    rendered_query: String,
    /// Query of the computation currently in flight
    inflight_query: String,
    /// Deep link to apply (and auto-submit) once the catalog arrives
    pending_link: Option<DeepLink>,
    error_banner: Option<String>,
}

impl HazVisApp {
    pub fn new(
        bridge: ServiceBridge,
        app_state: AppState,
        prefs: UiPreferences,
        initial_link: Option<DeepLink>,
    ) -> Self {
        bridge.fetch_parameters();
        Self {
            bridge,
            form: ParameterForm::new(FlowKind::Explorer),
            panels: PanelSet::default(),
            layout: PanelLayoutManager::new(),
            phase: ViewPhase::LoadingParameters,
            app_state,
            prefs,
            generation: 0,
            response: Vec::new(),
            rendered_query: String::new(),
            inflight_query: String::new(),
            pending_link: initial_link,
            error_banner: None,
        }
    }

    fn process_messages(&mut self) {
        for message in self.bridge.drain() {
            match message {
                ServiceMessage::Parameters(catalog) => {
                    tracing::info!("parameter catalog loaded");
                    self.form.set_catalog(catalog);
                    self.phase = ViewPhase::Ready;
                    if let Some(link) = self.pending_link.take() {
                        self.form.apply_deep_link(&link);
                        if self.form.is_submit_ready() {
                            self.submit();
                        }
                    }
                }
                ServiceMessage::ParametersFailed(error) => {
                    tracing::error!(%error, "parameter catalog load failed");
                    self.phase = ViewPhase::CatalogFailed(error);
                }
                ServiceMessage::ComputeComplete {
                    generation,
                    response,
                } => {
                    if self.phase.accepts_generation(generation) {
                        self.apply_response(response);
                    } else {
                        tracing::debug!(generation, "discarding stale compute response");
                    }
                }
                ServiceMessage::ComputeFailed { generation, error } => {
                    if self.phase.accepts_generation(generation) {
                        tracing::error!(%error, "computation failed");
                        self.error_banner = Some(error);
                        self.phase = if self.panels.hazard.visible {
                            ViewPhase::Rendered
                        } else {
                            ViewPhase::Ready
                        };
                    } else {
                        tracing::debug!(generation, "discarding stale compute failure");
                    }
                }
            }
        }
    }

    fn submit(&mut self) {
        let requests = match self.form.requests() {
            Ok(requests) => requests,
            Err(error) => {
                self.error_banner = Some(error.to_string());
                return;
            }
        };

        let query = self.form.query_string();
        self.app_state.record_query(query.clone());
        self.inflight_query = query;

        self.generation += 1;
        tracing::info!(generation = self.generation, count = requests.len(), "submitting computation");
        self.bridge.compute(self.generation, requests);
        self.phase = ViewPhase::AwaitingComputation {
            generation: self.generation,
        };
        self.error_banner = None;
    }

    fn apply_response(&mut self, response: CurveResponse) {
        self.response = response;
        self.rendered_query = std::mem::take(&mut self.inflight_query);

        match self.form.flow_kind() {
            FlowKind::Explorer => self.render_explorer(),
            FlowKind::Compare => self.render_compare(),
        }

        self.phase = ViewPhase::Rendered;
        self.error_banner = None;
    }

    fn render_explorer(&mut self) {
        let Some(group) = self.response.first() else {
            tracing::warn!("computation returned no response groups");
            return;
        };

        let imt_ids = self.form.legal_for(ParamKey::Imt).to_vec();
        let extracted = CurveDataExtractor::extract_totals(group, &imt_ids);
        self.panels.hazard.apply(
            extracted,
            HAZARD_TITLE.to_string(),
            HAZARD_FILENAME.to_string(),
        );

        // A static response carries no component breakdown; drop whatever
        // a previous dynamic response left on screen
        if !self.derives_component() {
            self.panels.component.clear();
        }

        // The bound IMT control doubles as the initial highlight
        let imt = self.form.selection().single(ParamKey::Imt).map(str::to_string);
        self.sync_hazard_highlight(imt.as_deref(), SelectionSource::Form);
    }

    fn render_compare(&mut self) {
        let Some(imt) = self.form.selection().single(ParamKey::Imt) else {
            tracing::warn!("no IMT selected for comparison rendering");
            return;
        };
        let imt = imt.to_string();
        let extracted = CurveDataExtractor::extract_edition_totals(&self.response, &imt);
        let display = self
            .form
            .catalog()
            .map(|c| c.display(ParamKey::Imt, &imt))
            .unwrap_or_else(|| imt.clone());
        self.panels.hazard.apply(
            extracted,
            format!("{HAZARD_TITLE} at {display}"),
            format!("{HAZARD_FILENAME}-{imt}"),
        );
        // Comparison has no component breakdown
        self.panels.component.clear();
    }

    /// Whether the on-screen explorer response can break totals into
    /// source components
    fn derives_component(&self) -> bool {
        self.form.flow_kind() == FlowKind::Explorer
            && self
                .response
                .first()
                .map(|g| g.shape() == DataShape::Dynamic)
                .unwrap_or(false)
    }

    /// Route a highlight change on the hazard panel through the selection
    /// controller and rebuild or hide the component panel as directed
    fn sync_hazard_highlight(&mut self, series: Option<&str>, source: SelectionSource) {
        let derives = self.derives_component();
        let effect =
            LinkedSelectionController::select(&mut self.panels.hazard, derives, series, source);

        match effect.derived {
            DerivedUpdate::Rebuild(imt) => {
                let Some(group) = self.response.first() else {
                    return;
                };
                let extracted = CurveDataExtractor::extract_components(group, &imt);
                if extracted.is_empty() {
                    self.panels.component.clear();
                } else {
                    self.panels.component.apply(
                        extracted,
                        COMPONENT_TITLE.to_string(),
                        format!("{COMPONENT_FILENAME}-{imt}"),
                    );
                }
            }
            DerivedUpdate::Clear => self.panels.component.clear(),
            DerivedUpdate::None => {}
        }
    }

    fn handle_panel_event(&mut self, id: PanelId, event: PanelEvent) {
        match event {
            PanelEvent::ToggleMaximize => self.layout.toggle_maximize(id),
            PanelEvent::Export => {
                let panel = self.panels.get_mut(id);
                let result = export::export_panel(panel, &self.rendered_query);
                if let Err(error) = result {
                    self.error_banner = Some(error.to_string());
                }
            }
            PanelEvent::Select { series, source } => match id {
                PanelId::Hazard => {
                    self.sync_hazard_highlight(series.as_deref(), source);
                    // In the explorer the hazard series are IMTs; keep the
                    // form control in step with the clicked curve
                    if self.form.flow_kind() == FlowKind::Explorer {
                        if let Some(series) = &series {
                            if self.panels.hazard.highlighted.as_deref() == Some(series.as_str()) {
                                self.form.select_value(ParamKey::Imt, series);
                            }
                        }
                    }
                }
                PanelId::Component => {
                    LinkedSelectionController::select(
                        &mut self.panels.component,
                        false,
                        series.as_deref(),
                        source,
                    );
                }
            },
        }
    }

    fn switch_flow(&mut self, kind: FlowKind) {
        if self.form.flow_kind() == kind {
            return;
        }
        tracing::info!(?kind, "switching flow");
        self.form.set_flow(kind);
        self.panels.hazard.clear();
        self.panels.component.clear();
        self.response.clear();
        self.rendered_query.clear();
        if !matches!(
            self.phase,
            ViewPhase::LoadingParameters | ViewPhase::CatalogFailed(_)
        ) {
            self.phase = ViewPhase::Ready;
        }
    }

    fn show_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let mut kind = self.form.flow_kind();
                ui.selectable_value(&mut kind, FlowKind::Explorer, "Model Explorer");
                ui.selectable_value(&mut kind, FlowKind::Compare, "Model Comparison");
                self.switch_flow(kind);

                ui.separator();

                ui.menu_button("Recent", |ui| {
                    if self.app_state.recent_queries.is_empty() {
                        ui.label("No recent queries");
                    }
                    let queries = self.app_state.recent_queries.clone();
                    for query in queries {
                        if ui.button(&query).clicked() {
                            self.apply_query(&query);
                            ui.close();
                        }
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut self.prefs.dark_mode, "Dark mode").changed() {
                        ui.ctx().set_visuals(if self.prefs.dark_mode {
                            egui::Visuals::dark()
                        } else {
                            egui::Visuals::light()
                        });
                    }
                    ui.checkbox(&mut self.prefs.show_grid, "Show grid");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let query = self.form.query_string();
                    if !query.is_empty() {
                        if ui.small_button("Copy link").clicked() {
                            ui.ctx().copy_text(query.clone());
                        }
                        ui.monospace(&query);
                    }
                });
            });
        });
    }

    fn apply_query(&mut self, query: &str) {
        match crate::config::query::decode(query) {
            Ok(link) => {
                self.form.apply_deep_link(&link);
                if self.form.is_submit_ready() {
                    self.submit();
                }
            }
            Err(error) => {
                tracing::warn!(%error, query, "rejecting malformed query");
                self.error_banner = Some(error.to_string());
            }
        }
    }

    fn show_panels(&mut self, ui: &mut egui::Ui) {
        self.layout.layout(&mut self.panels);

        let mut events: Vec<(PanelId, PanelEvent)> = Vec::new();
        let half_pair = self.panels.hazard.visible
            && self.panels.component.visible
            && self.panels.hazard.size == PanelSize::Half
            && self.panels.component.size == PanelSize::Half;

        if half_pair {
            ui.columns(2, |columns| {
                for event in plot::show_panel(&mut columns[0], &self.panels.hazard, &self.prefs) {
                    events.push((PanelId::Hazard, event));
                }
                for event in plot::show_panel(&mut columns[1], &self.panels.component, &self.prefs)
                {
                    events.push((PanelId::Component, event));
                }
            });
        } else {
            for panel in [&self.panels.hazard, &self.panels.component] {
                if !panel.visible {
                    continue;
                }
                let id = panel.id;
                for event in plot::show_panel(ui, panel, &self.prefs) {
                    events.push((id, event));
                }
            }
        }

        for (id, event) in events {
            self.handle_panel_event(id, event);
        }
    }

    fn show_central(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(error) = self.error_banner.clone() {
                ui.horizontal(|ui| {
                    ui.colored_label(ui.visuals().error_fg_color, &error);
                    if ui.small_button("✖").clicked() {
                        self.error_banner = None;
                    }
                });
                ui.separator();
            }

            match &self.phase.clone() {
                ViewPhase::CatalogFailed(error) => {
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        format!("Failed to load parameters: {error}"),
                    );
                    if ui.button("Retry").clicked() {
                        self.phase = ViewPhase::LoadingParameters;
                        self.bridge.fetch_parameters();
                    }
                }
                ViewPhase::LoadingParameters => {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                }
                _ => {
                    if self.panels.hazard.visible || self.panels.component.visible {
                        self.show_panels(ui);
                    } else {
                        ui.centered_and_justified(|ui| {
                            ui.label("Choose parameters and a site, then update the plot");
                        });
                    }
                }
            }
        });
    }
}

impl eframe::App for HazVisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        self.show_top_bar(ctx);

        egui::SidePanel::left("parameter_form")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let imt_before = self
                        .form
                        .selection()
                        .single(ParamKey::Imt)
                        .map(str::to_string);
                    let response = self.form.show(ui, self.phase.is_busy());
                    if response.submitted {
                        self.submit();
                    } else if response.changed && self.phase == ViewPhase::Rendered {
                        // IMT is a display-side control: the response
                        // already covers every IMT, so retarget without
                        // recomputing
                        let imt = self
                            .form
                            .selection()
                            .single(ParamKey::Imt)
                            .map(str::to_string);
                        match self.form.flow_kind() {
                            FlowKind::Explorer => {
                                self.sync_hazard_highlight(imt.as_deref(), SelectionSource::Form);
                            }
                            FlowKind::Compare => {
                                if imt != imt_before {
                                    self.render_compare();
                                }
                            }
                        }
                    }
                });
            });

        self.show_central(ctx);

        // Channel messages arrive outside egui's event loop
        if self.phase.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        let query = self.form.query_string();
        if !query.is_empty() {
            self.app_state.last_query = Some(query);
        }
        if let Err(error) = self.app_state.save() {
            tracing::warn!(%error, "failed to save application state");
        }
        if let Err(error) = self.prefs.save() {
            tracing::warn!(%error, "failed to save preferences");
        }
        self.bridge.shutdown();
    }
}
