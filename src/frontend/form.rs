//! Parameter form: the cascading control sidebar
//!
//! Owns the live [`Selection`] plus the legal value sets the resolver last
//! computed, and re-runs the resolver in the same frame as any edit so the
//! menus a user sees are never stale. Submission is gated on a complete,
//! legal selection and on site coordinates inside the selected region's
//! declared bounds.

use crate::catalog::{DependencyResolver, FlowConfig, FlowKind, ParameterCatalog, SelectionMode};
use crate::config::query::{self, DeepLink};
use crate::error::{HazVisError, Result};
use crate::types::{HazardRequest, ParamKey, Selection, ValueId};
use egui::Ui;
use std::collections::BTreeMap;

/// What the form reported after rendering one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormResponse {
    /// Any parameter or coordinate changed this frame
    pub changed: bool,
    /// The user asked to compute (button or Enter in a coordinate field)
    pub submitted: bool,
}

pub struct ParameterForm {
    flow: FlowConfig,
    catalog: Option<ParameterCatalog>,
    selection: Selection,
    legal: BTreeMap<ParamKey, Vec<ValueId>>,
    latitude_input: String,
    longitude_input: String,
}

impl ParameterForm {
    pub fn new(kind: FlowKind) -> Self {
        Self {
            flow: FlowConfig::for_kind(kind),
            catalog: None,
            selection: Selection::new(),
            legal: BTreeMap::new(),
            latitude_input: String::new(),
            longitude_input: String::new(),
        }
    }

    pub fn flow_kind(&self) -> FlowKind {
        self.flow.kind
    }

    /// Switch flows, keeping whatever of the current selection survives the
    /// new flow's cascade
    pub fn set_flow(&mut self, kind: FlowKind) {
        if self.flow.kind == kind {
            return;
        }
        self.flow = FlowConfig::for_kind(kind);
        self.resolve_all();
    }

    /// Install the loaded catalog and resolve the full cascade, filling
    /// unset parameters from the flow defaults
    pub fn set_catalog(&mut self, catalog: ParameterCatalog) {
        self.catalog = Some(catalog);
        self.resolve_all();
    }

    pub fn catalog(&self) -> Option<&ParameterCatalog> {
        self.catalog.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Overlay a decoded deep link onto the form and re-resolve. Illegal
    /// link values are repaired by the cascade exactly like user edits.
    pub fn apply_deep_link(&mut self, link: &DeepLink) {
        for (key, ids) in link.selection.iter() {
            self.selection.set_many(key, ids.to_vec());
        }
        if let Some(lat) = link.latitude {
            self.latitude_input = lat.to_string();
        }
        if let Some(lon) = link.longitude {
            self.longitude_input = lon.to_string();
        }
        self.resolve_all();
    }

    /// Legal ids the resolver last computed for `key`
    pub fn legal_for(&self, key: ParamKey) -> &[ValueId] {
        self.legal.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Programmatically select a single value, as if the user picked it in
    /// the menu. Used to keep the form in step with curve/legend clicks.
    pub fn select_value(&mut self, key: ParamKey, id: &str) {
        if self.selection.single(key) == Some(id) {
            return;
        }
        self.selection.set_single(key, id);
        self.resolve_from(key);
    }

    /// The current form contents as a shareable query string
    pub fn query_string(&self) -> String {
        query::encode(&self.selection, self.latitude(), self.longitude())
    }

    pub fn latitude(&self) -> Option<f64> {
        self.latitude_input.trim().parse().ok()
    }

    pub fn longitude(&self) -> Option<f64> {
        self.longitude_input.trim().parse().ok()
    }

    fn resolve_all(&mut self) {
        let Some(catalog) = &self.catalog else { return };
        let resolution = DependencyResolver::resolve_all(catalog, &self.flow, &self.selection);
        self.selection = resolution.selection;
        self.legal = resolution.legal;
    }

    /// Re-resolve the parameters downstream of `changed`
    fn resolve_from(&mut self, changed: ParamKey) {
        let Some(catalog) = &self.catalog else { return };
        let resolution =
            DependencyResolver::resolve(catalog, &self.flow, &self.selection, changed);
        self.selection = resolution.selection;
        for (key, ids) in resolution.legal {
            self.legal.insert(key, ids);
        }
    }

    fn coordinates_in_bounds(&self) -> bool {
        let (Some(lat), Some(lon)) = (self.latitude(), self.longitude()) else {
            return false;
        };
        let Some(catalog) = &self.catalog else {
            return false;
        };
        let Some(region) = self.selection.single(ParamKey::Region) else {
            return false;
        };
        match catalog.region_bounds(region) {
            Some(bounds) => bounds.contains(lat, lon),
            None => true,
        }
    }

    /// Whether submit may be offered at all
    pub fn is_submit_ready(&self) -> bool {
        let Some(catalog) = &self.catalog else {
            return false;
        };
        DependencyResolver::is_complete_and_legal(catalog, &self.flow, &self.selection)
            && self.coordinates_in_bounds()
    }

    /// One computation request per selected edition, validated
    pub fn requests(&self) -> Result<Vec<HazardRequest>> {
        if !self.is_submit_ready() {
            return Err(HazVisError::IllegalSelection(
                "selection is incomplete or out of bounds".to_string(),
            ));
        }
        let region = self
            .selection
            .single(ParamKey::Region)
            .unwrap_or_default()
            .to_string();
        let vs30 = self
            .selection
            .single(ParamKey::Vs30)
            .unwrap_or_default()
            .to_string();
        let (latitude, longitude) = (
            self.latitude().unwrap_or_default(),
            self.longitude().unwrap_or_default(),
        );

        Ok(self
            .selection
            .get(ParamKey::Edition)
            .iter()
            .map(|edition| HazardRequest {
                edition: edition.clone(),
                region: region.clone(),
                latitude,
                longitude,
                vs30: vs30.clone(),
            })
            .collect())
    }

    /// Render the form. Controls are disabled while a computation is in
    /// flight so the echoed selection cannot drift under the response.
    pub fn show(&mut self, ui: &mut Ui, busy: bool) -> FormResponse {
        let mut response = FormResponse::default();

        let Some(catalog) = self.catalog.clone() else {
            ui.spinner();
            ui.label("Loading parameters…");
            return response;
        };

        let cascade = self.flow.cascade.clone();
        ui.add_enabled_ui(!busy, |ui| {
            for key in cascade {
                let changed = match self.flow.rule(key).mode {
                    SelectionMode::Single => self.show_single_select(ui, &catalog, key),
                    SelectionMode::Multi => self.show_multi_select(ui, &catalog, key),
                };
                if changed {
                    response.changed = true;
                    if key == ParamKey::Region {
                        // A new region invalidates the old site location
                        self.latitude_input.clear();
                        self.longitude_input.clear();
                    }
                    self.resolve_from(key);
                }
            }

            ui.separator();
            response.submitted |= self.show_coordinates(ui, &catalog, &mut response.changed);

            ui.separator();
            let ready = self.is_submit_ready();
            ui.add_enabled_ui(ready, |ui| {
                if ui.button("Update plot").clicked() {
                    response.submitted = true;
                }
            });
        });

        if busy {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Computing…");
            });
        }

        response.submitted &= self.is_submit_ready();
        response
    }

    fn show_single_select(
        &mut self,
        ui: &mut Ui,
        catalog: &ParameterCatalog,
        key: ParamKey,
    ) -> bool {
        let legal = self.legal.get(&key).cloned().unwrap_or_default();
        let mut changed = false;

        ui.label(Self::control_label(key));
        let selected_text = self
            .selection
            .single(key)
            .map(|id| catalog.display(key, id))
            .unwrap_or_default();

        ui.add_enabled_ui(!legal.is_empty(), |ui| {
            egui::ComboBox::from_id_salt(("param_select", key.as_str()))
                .width(ui.available_width())
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for id in &legal {
                        let picked = self.selection.single(key) == Some(id.as_str());
                        if ui
                            .selectable_label(picked, catalog.display(key, id))
                            .clicked()
                            && !picked
                        {
                            self.selection.set_single(key, id.clone());
                            changed = true;
                        }
                    }
                });
        });

        changed
    }

    fn show_multi_select(
        &mut self,
        ui: &mut Ui,
        catalog: &ParameterCatalog,
        key: ParamKey,
    ) -> bool {
        let legal = self.legal.get(&key).cloned().unwrap_or_default();
        let mut changed = false;

        ui.label(Self::control_label(key));
        ui.add_enabled_ui(!legal.is_empty(), |ui| {
            let all_selected = !legal.is_empty()
                && legal.iter().all(|id| self.selection.contains(key, id));
            let mut select_all = all_selected;
            if ui.checkbox(&mut select_all, "Select all").changed() {
                if select_all {
                    self.selection.set_many(key, legal.clone());
                } else {
                    self.selection.clear(key);
                }
                changed = true;
            }

            for id in &legal {
                let mut picked = self.selection.contains(key, id);
                if ui.checkbox(&mut picked, catalog.display(key, id)).changed() {
                    let mut ids: Vec<ValueId> = self
                        .selection
                        .get(key)
                        .iter()
                        .filter(|s| s.as_str() != id.as_str())
                        .cloned()
                        .collect();
                    if picked {
                        ids.push(id.clone());
                        // Keep menu order, not click order
                        ids.sort_by_key(|v| legal.iter().position(|l| l == v));
                    }
                    self.selection.set_many(key, ids);
                    changed = true;
                }
            }
        });

        changed
    }

    fn show_coordinates(
        &mut self,
        ui: &mut Ui,
        catalog: &ParameterCatalog,
        changed: &mut bool,
    ) -> bool {
        let bounds = self
            .selection
            .single(ParamKey::Region)
            .and_then(|region| catalog.region_bounds(region));

        let mut submitted = false;
        for (label, input) in [
            ("Latitude", &mut self.latitude_input),
            ("Longitude", &mut self.longitude_input),
        ] {
            ui.label(label);
            let edit = ui.text_edit_singleline(input);
            if edit.changed() {
                *changed = true;
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submitted = true;
            }
        }

        if let Some(bounds) = bounds {
            ui.small(format!(
                "Range: [{}, {}] lat, [{}, {}] lon",
                bounds.minlatitude, bounds.maxlatitude, bounds.minlongitude, bounds.maxlongitude
            ));
            if let (Some(lat), Some(lon)) = (self.latitude(), self.longitude()) {
                if !bounds.contains(lat, lon) {
                    ui.colored_label(
                        ui.visuals().error_fg_color,
                        "Location is outside the selected region",
                    );
                }
            }
        }

        submitted
    }

    fn control_label(key: ParamKey) -> &'static str {
        match key {
            ParamKey::Edition => "Model edition",
            ParamKey::Region => "Region",
            ParamKey::Imt => "Intensity measure type",
            ParamKey::Vs30 => "Site soil class (Vs30)",
        }
    }
}
