//! Linked series selection across panels
//!
//! "Which series is highlighted" has a single source of truth: every input
//! that can change it (clicking a rendered curve, clicking its legend
//! entry, or changing the bound IMT form control) funnels through
//! [`LinkedSelectionController::select`]. The controller mutates the target
//! panel's highlight and reports whether a derived panel must be rebuilt
//! for the newly selected series, so the three input sources are idempotent
//! and mutually consistent by construction.

use crate::frontend::panel::Panel;
use crate::types::ValueId;

/// Where a selection request originated; recorded for diagnostics only,
/// never branched on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Click on a rendered curve
    Curve,
    /// Click on a legend entry
    Legend,
    /// Change of the bound form control
    Form,
}

/// What the derived (component) panel must do after a selection change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerivedUpdate {
    /// Re-extract and re-render the derived panel for this series
    Rebuild(ValueId),
    /// Hide the derived panel: nothing is selected
    Clear,
    /// The derived panel is unaffected
    None,
}

/// Result of one selection call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEffect {
    /// Whether the panel's highlight actually changed
    pub changed: bool,
    pub derived: DerivedUpdate,
}

/// Single entry point for all highlight changes
pub struct LinkedSelectionController;

impl LinkedSelectionController {
    /// Set `panel.highlighted` to `series_id` (`None` restores all series
    /// to the unemphasized state). `derives_component` is true when a
    /// derived component panel follows this panel's selection.
    ///
    /// A request naming a series the panel does not contain is ignored with
    /// a diagnostic rather than leaving a dangling highlight.
    pub fn select(
        panel: &mut Panel,
        derives_component: bool,
        series_id: Option<&str>,
        source: SelectionSource,
    ) -> SelectionEffect {
        if let Some(id) = series_id {
            if !panel.has_series(id) {
                tracing::warn!(series = %id, ?source, "selection names an unknown series");
                return SelectionEffect {
                    changed: false,
                    derived: DerivedUpdate::None,
                };
            }
        }

        let new_highlight = series_id.map(str::to_string);
        let changed = panel.highlighted != new_highlight;
        if changed {
            tracing::debug!(series = ?series_id, ?source, "highlight changed");
            panel.highlighted = new_highlight;
        }

        let derived = if derives_component {
            match &panel.highlighted {
                Some(id) => DerivedUpdate::Rebuild(id.clone()),
                None => DerivedUpdate::Clear,
            }
        } else {
            DerivedUpdate::None
        };

        SelectionEffect { changed, derived }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedPanel;
    use crate::frontend::panel::PanelId;
    use crate::types::SeriesDescriptor;

    fn hazard_panel() -> Panel {
        let mut panel = Panel::new(PanelId::Hazard);
        panel.apply(
            ExtractedPanel {
                series: vec![
                    SeriesDescriptor::new("PGA", "Peak Ground Acceleration", vec![[0.01, 0.5]]),
                    SeriesDescriptor::new("SA1P0", "1.00 s SA", vec![[0.01, 0.4]]),
                ],
                x_label: String::new(),
                y_label: String::new(),
            },
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );
        panel
    }

    #[test]
    fn test_all_sources_reach_the_same_state() {
        for source in [
            SelectionSource::Curve,
            SelectionSource::Legend,
            SelectionSource::Form,
        ] {
            let mut panel = hazard_panel();
            let effect =
                LinkedSelectionController::select(&mut panel, true, Some("SA1P0"), source);
            assert!(effect.changed);
            assert_eq!(panel.highlighted.as_deref(), Some("SA1P0"));
            assert_eq!(effect.derived, DerivedUpdate::Rebuild("SA1P0".to_string()));
        }
    }

    #[test]
    fn test_selection_is_idempotent() {
        let mut panel = hazard_panel();
        LinkedSelectionController::select(&mut panel, true, Some("PGA"), SelectionSource::Legend);
        let effect = LinkedSelectionController::select(
            &mut panel,
            true,
            Some("PGA"),
            SelectionSource::Curve,
        );
        assert!(!effect.changed);
        // The derived panel contract is unchanged either way
        assert_eq!(effect.derived, DerivedUpdate::Rebuild("PGA".to_string()));
        assert_eq!(panel.highlighted.as_deref(), Some("PGA"));
    }

    #[test]
    fn test_no_filter_restores_unemphasized_state() {
        let mut panel = hazard_panel();
        LinkedSelectionController::select(&mut panel, true, Some("PGA"), SelectionSource::Form);
        let effect =
            LinkedSelectionController::select(&mut panel, true, None, SelectionSource::Form);
        assert!(effect.changed);
        assert_eq!(panel.highlighted, None);
        assert_eq!(effect.derived, DerivedUpdate::Clear);
    }

    #[test]
    fn test_unknown_series_is_rejected() {
        let mut panel = hazard_panel();
        LinkedSelectionController::select(&mut panel, true, Some("PGA"), SelectionSource::Form);
        let effect = LinkedSelectionController::select(
            &mut panel,
            true,
            Some("SA9P9"),
            SelectionSource::Curve,
        );
        assert!(!effect.changed);
        assert_eq!(effect.derived, DerivedUpdate::None);
        assert_eq!(panel.highlighted.as_deref(), Some("PGA"));
    }

    #[test]
    fn test_panel_without_derived_dependency() {
        let mut panel = hazard_panel();
        let effect = LinkedSelectionController::select(
            &mut panel,
            false,
            Some("PGA"),
            SelectionSource::Legend,
        );
        assert!(effect.changed);
        assert_eq!(effect.derived, DerivedUpdate::None);
    }
}
