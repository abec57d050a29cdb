//! Plot panels and panel layout
//!
//! A [`Panel`] is one visualization surface: title, export filename, axis
//! labels, an ordered series list and the id of the currently highlighted
//! series. Panel content is replaced wholesale on every successful
//! computation; it is never partially mutated mid-render.
//!
//! The [`PanelLayoutManager`] owns the only true layout state. It observes
//! the set of visible panels every frame (immediate-mode rendering makes
//! the layout pass itself the observation mechanism) rather than being
//! called imperatively from every site that shows or hides a panel: one
//! visible panel gets the full width, two or more each get half,
//! retroactively. A manual maximize toggle overrides a single panel to full
//! width; any change in the visible set resets the override.

use crate::extract::ExtractedPanel;
use crate::types::{SeriesDescriptor, ValueId};

/// Identity of the fixed panels of one view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelId {
    /// Primary hazard-curve panel
    Hazard,
    /// Derived component-breakdown panel (dynamic responses only)
    Component,
}

/// Width class assigned by the layout manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelSize {
    #[default]
    Full,
    Half,
}

/// One visualization surface
#[derive(Debug, Clone)]
pub struct Panel {
    pub id: PanelId,
    pub title: String,
    /// Base name used when the panel's data is exported
    pub filename: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<SeriesDescriptor>,
    /// Currently highlighted series id; `None` means all series render
    /// unemphasized
    pub highlighted: Option<ValueId>,
    pub size: PanelSize,
    pub visible: bool,
}

impl Panel {
    pub fn new(id: PanelId) -> Self {
        Self {
            id,
            title: String::new(),
            filename: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
            highlighted: None,
            size: PanelSize::Full,
            visible: false,
        }
    }

    /// Replace the panel's content wholesale. A highlight pointing at a
    /// series that no longer exists is cleared, never left dangling.
    pub fn apply(&mut self, extracted: ExtractedPanel, title: String, filename: String) {
        self.title = title;
        self.filename = filename;
        self.x_label = extracted.x_label;
        self.y_label = extracted.y_label;
        self.series = extracted.series;
        if let Some(id) = &self.highlighted {
            if !self.has_series(id) {
                self.highlighted = None;
            }
        }
        self.visible = true;
    }

    /// Hide the panel and drop its content
    pub fn clear(&mut self) {
        self.series.clear();
        self.highlighted = None;
        self.visible = false;
    }

    pub fn has_series(&self, id: &str) -> bool {
        self.series.iter().any(|s| s.id == id)
    }
}

/// The fixed panels of one view
#[derive(Debug, Clone)]
pub struct PanelSet {
    pub hazard: Panel,
    pub component: Panel,
}

impl Default for PanelSet {
    fn default() -> Self {
        Self {
            hazard: Panel::new(PanelId::Hazard),
            component: Panel::new(PanelId::Component),
        }
    }
}

impl PanelSet {
    pub fn get_mut(&mut self, id: PanelId) -> &mut Panel {
        match id {
            PanelId::Hazard => &mut self.hazard,
            PanelId::Component => &mut self.component,
        }
    }

    pub fn visible_mut(&mut self) -> Vec<&mut Panel> {
        [&mut self.hazard, &mut self.component]
            .into_iter()
            .filter(|p| p.visible)
            .collect()
    }
}

/// Owns the maximize override and assigns width classes each layout pass
#[derive(Debug, Clone, Default)]
pub struct PanelLayoutManager {
    maximized: Option<PanelId>,
    last_visible: Vec<PanelId>,
}

impl PanelLayoutManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle the manual full-width override for one panel
    pub fn toggle_maximize(&mut self, id: PanelId) {
        self.maximized = match self.maximized {
            Some(current) if current == id => None,
            _ => Some(id),
        };
    }

    pub fn is_maximized(&self, id: PanelId) -> bool {
        self.maximized == Some(id)
    }

    /// Recompute every visible panel's width class. Called once per frame;
    /// a change in the visible set resets the maximize override.
    pub fn layout(&mut self, panels: &mut PanelSet) {
        let mut visible = panels.visible_mut();
        let visible_ids: Vec<PanelId> = visible.iter().map(|p| p.id).collect();

        if visible_ids != self.last_visible {
            self.maximized = None;
            self.last_visible = visible_ids;
        }

        match visible.len() {
            0 | 1 => {
                for panel in &mut visible {
                    panel.size = PanelSize::Full;
                }
            }
            _ => {
                for panel in &mut visible {
                    panel.size = if self.maximized == Some(panel.id) {
                        PanelSize::Full
                    } else {
                        PanelSize::Half
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(ids: &[&str]) -> ExtractedPanel {
        ExtractedPanel {
            series: ids
                .iter()
                .map(|id| SeriesDescriptor::new(*id, id.to_uppercase(), vec![[0.01, 0.5]]))
                .collect(),
            x_label: "Ground Motion (g)".to_string(),
            y_label: "Annual Frequency of Exceedence".to_string(),
        }
    }

    fn visible_panel_set() -> PanelSet {
        let mut panels = PanelSet::default();
        panels.hazard.apply(
            extracted(&["pga"]),
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );
        panels
    }

    #[test]
    fn test_single_panel_gets_full_width() {
        let mut panels = visible_panel_set();
        let mut layout = PanelLayoutManager::new();
        layout.layout(&mut panels);
        assert_eq!(panels.hazard.size, PanelSize::Full);
        assert!(!panels.component.visible);
    }

    #[test]
    fn test_second_panel_halves_both_retroactively() {
        let mut panels = visible_panel_set();
        let mut layout = PanelLayoutManager::new();
        layout.layout(&mut panels);
        assert_eq!(panels.hazard.size, PanelSize::Full);

        panels.component.apply(
            extracted(&["fault"]),
            "Component Curves".to_string(),
            "componentCurves-PGA".to_string(),
        );
        layout.layout(&mut panels);
        assert_eq!(panels.hazard.size, PanelSize::Half);
        assert_eq!(panels.component.size, PanelSize::Half);

        // Removing back to one restores full width
        panels.component.clear();
        layout.layout(&mut panels);
        assert_eq!(panels.hazard.size, PanelSize::Full);
    }

    #[test]
    fn test_maximize_override_and_reset() {
        let mut panels = visible_panel_set();
        panels.component.apply(
            extracted(&["fault"]),
            "Component Curves".to_string(),
            "componentCurves-PGA".to_string(),
        );
        let mut layout = PanelLayoutManager::new();
        layout.layout(&mut panels);

        layout.toggle_maximize(PanelId::Hazard);
        layout.layout(&mut panels);
        assert_eq!(panels.hazard.size, PanelSize::Full);
        assert_eq!(panels.component.size, PanelSize::Half);

        // Toggling again reverts
        layout.toggle_maximize(PanelId::Hazard);
        layout.layout(&mut panels);
        assert_eq!(panels.hazard.size, PanelSize::Half);

        // A change in the visible set resets the override
        layout.toggle_maximize(PanelId::Hazard);
        panels.component.clear();
        layout.layout(&mut panels);
        panels.component.apply(
            extracted(&["fault"]),
            "Component Curves".to_string(),
            "componentCurves-PGA".to_string(),
        );
        layout.layout(&mut panels);
        assert!(!layout.is_maximized(PanelId::Hazard));
        assert_eq!(panels.hazard.size, PanelSize::Half);
    }

    #[test]
    fn test_apply_clears_dangling_highlight() {
        let mut panel = Panel::new(PanelId::Hazard);
        panel.apply(
            extracted(&["pga", "sa1p0"]),
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );
        panel.highlighted = Some("sa1p0".to_string());

        panel.apply(
            extracted(&["pga"]),
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );
        assert_eq!(panel.highlighted, None);

        panel.highlighted = Some("pga".to_string());
        panel.apply(
            extracted(&["pga"]),
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );
        assert_eq!(panel.highlighted.as_deref(), Some("pga"));
    }
}
