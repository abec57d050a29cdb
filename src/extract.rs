//! Series extraction from decoded hazard responses
//!
//! Turns decoded [`ResponseGroup`]s into the [`SeriesDescriptor`] lists a
//! plot panel consumes: the shared x vector zipped with each requested
//! curve's y vector, labeled by the echoed parameter identity. Extraction
//! is deterministic and total over its inputs: a requested filter value with
//! no matching entry is skipped with a diagnostic (an extraction gap), never
//! a fatal abort, and rendering proceeds with whatever was extracted.
//!
//! Points with |y| <= [`Y_EPSILON`] are dropped here, before rendering, to
//! avoid log-scale artifacts; the order of surviving points is untouched.

use crate::types::{SeriesDescriptor, ValueId, Y_EPSILON};
use crate::wire::{CurveEntry, ResponseGroup};

/// Series plus axis metadata for one panel render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedPanel {
    pub series: Vec<SeriesDescriptor>,
    pub x_label: String,
    pub y_label: String,
}

impl ExtractedPanel {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Stateless extraction of plottable series from curve responses
pub struct CurveDataExtractor;

impl CurveDataExtractor {
    /// Explorer primary panel: one Total series per requested IMT, taken
    /// from a single response group. Series ids are the echoed IMT ids.
    pub fn extract_totals(group: &ResponseGroup, imt_ids: &[ValueId]) -> ExtractedPanel {
        let mut panel = ExtractedPanel::default();
        for imt_id in imt_ids {
            let Some(entry) = group.entry_for_imt(imt_id) else {
                tracing::warn!(imt = %imt_id, "no response entry for requested IMT, skipping");
                continue;
            };
            let identity = entry.identity();
            Self::push_total(&mut panel, entry, &identity.imt.value, &identity.imt.display);
        }
        panel
    }

    /// Compare primary panel: one Total series per response group at the
    /// selected IMT. Series ids are the echoed edition ids, in group
    /// (request) order.
    pub fn extract_edition_totals(groups: &[ResponseGroup], imt_id: &str) -> ExtractedPanel {
        let mut panel = ExtractedPanel::default();
        for group in groups {
            let Some(entry) = group.entry_for_imt(imt_id) else {
                tracing::warn!(imt = %imt_id, "group has no entry for selected IMT, skipping");
                continue;
            };
            let identity = entry.identity();
            Self::push_total(
                &mut panel,
                entry,
                &identity.edition.value,
                &identity.edition.display,
            );
        }
        panel
    }

    /// Derived component panel: every non-Total component of the entry
    /// matching the selected IMT. Static groups yield no components, so the
    /// result is empty for them.
    pub fn extract_components(group: &ResponseGroup, imt_id: &str) -> ExtractedPanel {
        let mut panel = ExtractedPanel::default();
        let Some(entry) = group.entry_for_imt(imt_id) else {
            tracing::warn!(imt = %imt_id, "no response entry for selected IMT, skipping");
            return panel;
        };

        let identity = entry.identity();
        panel.x_label = identity.xlabel.clone();
        panel.y_label = identity.ylabel.clone();

        let x_values = entry.x_values();
        for (name, y_values) in entry.components() {
            let mut series =
                SeriesDescriptor::new(name.to_lowercase(), name, Self::zip(x_values, y_values));
            series.drop_small_values(Y_EPSILON);
            panel.series.push(series);
        }
        panel
    }

    fn push_total(panel: &mut ExtractedPanel, entry: CurveEntry<'_>, id: &str, label: &str) {
        let Some(y_values) = entry.total() else {
            tracing::warn!(id = %id, "entry has no Total curve, skipping");
            return;
        };
        if panel.series.is_empty() {
            let identity = entry.identity();
            panel.x_label = identity.xlabel.clone();
            panel.y_label = identity.ylabel.clone();
        }
        let mut series = SeriesDescriptor::new(id, label, Self::zip(entry.x_values(), y_values));
        series.drop_small_values(Y_EPSILON);
        panel.series.push(series);
    }

    fn zip(x_values: &[f64], y_values: &[f64]) -> Vec<[f64; 2]> {
        x_values
            .iter()
            .zip(y_values.iter())
            .map(|(&x, &y)| [x, y])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{
        DynamicComponent, DynamicEntry, DynamicMetadata, EntryIdentity, ParamRef, StaticCurve,
        StaticEntry, StaticMetadata,
    };

    fn identity(imt: (&str, &str), edition: (&str, &str)) -> EntryIdentity {
        EntryIdentity {
            edition: ParamRef {
                value: edition.0.to_string(),
                display: edition.1.to_string(),
            },
            region: ParamRef {
                value: "COUS".to_string(),
                display: "Conterminous US".to_string(),
            },
            imt: ParamRef {
                value: imt.0.to_string(),
                display: imt.1.to_string(),
            },
            vs30: ParamRef {
                value: "760".to_string(),
                display: "760 m/s".to_string(),
            },
            latitude: 34.05,
            longitude: -118.25,
            xlabel: "Ground Motion (g)".to_string(),
            ylabel: "Annual Frequency of Exceedence".to_string(),
        }
    }

    fn dynamic_entry(imt: (&str, &str), total: Vec<f64>) -> DynamicEntry {
        DynamicEntry {
            metadata: DynamicMetadata {
                identity: identity(imt, ("E2014", "USGS NSHM 2014")),
                xvalues: vec![0.005, 0.007, 0.0098],
            },
            data: vec![
                DynamicComponent {
                    component: "Fault".to_string(),
                    yvalues: vec![0.3, 0.2, 0.1],
                },
                DynamicComponent {
                    component: "Gridded".to_string(),
                    yvalues: vec![0.2, 1e-16, 0.05],
                },
                DynamicComponent {
                    component: "Total".to_string(),
                    yvalues: total,
                },
            ],
        }
    }

    fn dynamic_group() -> ResponseGroup {
        ResponseGroup::Dynamic {
            response: vec![
                dynamic_entry(("PGA", "Peak Ground Acceleration"), vec![0.5, 0.3, 0.15]),
                dynamic_entry(
                    ("SA1P0", "1.00 s Spectral Acceleration"),
                    vec![0.4, 0.25, 0.1],
                ),
            ],
        }
    }

    fn static_group() -> ResponseGroup {
        ResponseGroup::Static {
            response: vec![StaticEntry {
                metadata: StaticMetadata {
                    identity: identity(
                        ("PGA", "Peak Ground Acceleration"),
                        ("E2008", "USGS NSHM 2008"),
                    ),
                    xvals: vec![0.005, 0.007, 0.0098],
                },
                data: vec![StaticCurve {
                    yvals: vec![0.45, 0.28, 1e-15],
                }],
            }],
        }
    }

    #[test]
    fn test_extract_totals_per_imt() {
        let group = dynamic_group();
        let panel = CurveDataExtractor::extract_totals(
            &group,
            &["PGA".to_string(), "SA1P0".to_string()],
        );
        assert_eq!(panel.series.len(), 2);
        assert_eq!(panel.series[0].id, "PGA");
        assert_eq!(panel.series[0].label, "Peak Ground Acceleration");
        assert_eq!(panel.series[0].points, vec![
            [0.005, 0.5],
            [0.007, 0.3],
            [0.0098, 0.15]
        ]);
        assert_eq!(panel.x_label, "Ground Motion (g)");
    }

    #[test]
    fn test_extraction_gap_is_skipped() {
        let group = dynamic_group();
        let panel = CurveDataExtractor::extract_totals(
            &group,
            &["PGA".to_string(), "SA9P9".to_string(), "SA1P0".to_string()],
        );
        // Missing IMT is skipped, the rest survive in request order
        assert_eq!(panel.series.len(), 2);
        assert_eq!(panel.series[0].id, "PGA");
        assert_eq!(panel.series[1].id, "SA1P0");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let group = dynamic_group();
        let ids = vec!["SA1P0".to_string(), "PGA".to_string()];
        let first = CurveDataExtractor::extract_totals(&group, &ids);
        let second = CurveDataExtractor::extract_totals(&group, &ids);
        assert_eq!(first, second);
        assert_eq!(first.series[0].id, "SA1P0");
    }

    #[test]
    fn test_edition_totals_across_groups() {
        let groups = vec![dynamic_group(), static_group()];
        let panel = CurveDataExtractor::extract_edition_totals(&groups, "PGA");
        assert_eq!(panel.series.len(), 2);
        assert_eq!(panel.series[0].id, "E2014");
        assert_eq!(panel.series[1].id, "E2008");
        // Static total came from fixed index 0, with the small value dropped
        assert_eq!(panel.series[1].points, vec![[0.005, 0.45], [0.007, 0.28]]);
    }

    #[test]
    fn test_component_extraction_excludes_total() {
        let group = dynamic_group();
        let panel = CurveDataExtractor::extract_components(&group, "PGA");
        let ids: Vec<&str> = panel.series.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["fault", "gridded"]);
        assert_eq!(panel.series[0].label, "Fault");
        // The epsilon-sized Gridded point was dropped, order preserved
        assert_eq!(panel.series[1].points, vec![[0.005, 0.2], [0.0098, 0.05]]);
    }

    #[test]
    fn test_static_group_yields_no_components() {
        let group = static_group();
        let panel = CurveDataExtractor::extract_components(&group, "PGA");
        assert!(panel.is_empty());
    }
}
