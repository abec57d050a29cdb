//! Curve panel rendering using egui_plot
//!
//! Hazard curves live on log-log axes. egui_plot has no native log scale,
//! so series are plotted in log10 space with decade grid marks and
//! power-of-ten axis labels, and hover/click coordinates are mapped back
//! before display.
//!
//! The panel renders its own legend (the built-in egui_plot legend cannot
//! report clicks): every entry is clickable and, like a click on the curve
//! itself, funnels into the linked selection controller via
//! [`PanelEvent::Select`].

use crate::config::UiPreferences;
use crate::frontend::panel::{Panel, PanelSize};
use crate::frontend::selection::SelectionSource;
use crate::types::ValueId;
use egui::{Color32, RichText, Ui};
use egui_plot::{GridMark, Line, Plot, PlotPoints};

/// Fraction of the visible plot diagonal within which a click selects the
/// nearest curve
const PICK_RADIUS_FRACTION: f64 = 0.03;

/// d3's category10 palette, a good default for up to ten series
const PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

/// Events a rendered panel reports back to the view
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    /// A series (or "all") was picked via curve or legend
    Select {
        series: Option<ValueId>,
        source: SelectionSource,
    },
    /// The maximize toggle in the panel header was clicked
    ToggleMaximize,
    /// The export button in the panel header was clicked
    Export,
}

/// Color assigned to the series at `index`
pub fn series_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Render one panel (header, plot, legend); returns the events produced by
/// this frame's interactions
pub fn show_panel(ui: &mut Ui, panel: &Panel, prefs: &UiPreferences) -> Vec<PanelEvent> {
    let mut events = Vec::new();

    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.heading(&panel.title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let glyph = if panel.size == PanelSize::Full { "⤡" } else { "⤢" };
                if ui.small_button(glyph).on_hover_text("Resize panel").clicked() {
                    events.push(PanelEvent::ToggleMaximize);
                }
                if ui
                    .small_button("⬇")
                    .on_hover_text("Export panel data as CSV")
                    .clicked()
                {
                    events.push(PanelEvent::Export);
                }
            });
        });

        if let Some(clicked) = show_plot(ui, panel, prefs) {
            events.push(PanelEvent::Select {
                series: Some(clicked),
                source: SelectionSource::Curve,
            });
        }

        show_legend(ui, panel, &mut events);
    });

    events
}

fn show_plot(ui: &mut Ui, panel: &Panel, prefs: &UiPreferences) -> Option<ValueId> {
    let plot = Plot::new(("curve_panel", panel.id as u8))
        .allow_zoom([true, true])
        .allow_drag([true, true])
        .allow_scroll([false, false])
        .allow_boxed_zoom(true)
        .show_axes(true)
        .show_grid(prefs.show_grid)
        .x_axis_label(&panel.x_label)
        .y_axis_label(&panel.y_label)
        .x_grid_spacer(|input| log_grid_marks(input.bounds))
        .y_grid_spacer(|input| log_grid_marks(input.bounds))
        .x_axis_formatter(|mark, _range| pow10_label(mark.value))
        .y_axis_formatter(|mark, _range| pow10_label(mark.value))
        .label_formatter(|name, value| {
            if name.is_empty() {
                String::new()
            } else {
                format!(
                    "{name}\nx: {:.4}\ny: {:.3e}",
                    10f64.powf(value.x),
                    10f64.powf(value.y)
                )
            }
        })
        .height(320.0);

    let response = plot.show(ui, |plot_ui| {
        for (index, series) in panel.series.iter().enumerate() {
            let points: Vec<[f64; 2]> = series
                .points
                .iter()
                .filter(|p| p[0] > 0.0 && p[1] > 0.0)
                .map(|p| [p[0].log10(), p[1].log10()])
                .collect();
            if points.is_empty() {
                continue;
            }

            let emphasized = panel.highlighted.as_deref() == Some(series.id.as_str());
            let dimmed = panel.highlighted.is_some() && !emphasized;
            let mut color = series_color(index);
            if dimmed {
                color = color.gamma_multiply(0.35);
            }
            let width = if emphasized {
                prefs.selection_line_width
            } else {
                prefs.line_width
            };

            plot_ui.line(
                Line::new(series.label.clone(), PlotPoints::from(points))
                    .color(color)
                    .width(width),
            );
        }
    });

    if !response.response.clicked() {
        return None;
    }
    let pos = response.response.interact_pointer_pos()?;
    let pointer = response.transform.value_from_position(pos);
    let bounds = response.transform.bounds();
    let spans = [
        bounds.max()[0] - bounds.min()[0],
        bounds.max()[1] - bounds.min()[1],
    ];
    nearest_series(panel, [pointer.x, pointer.y], spans)
}

fn show_legend(ui: &mut Ui, panel: &Panel, events: &mut Vec<PanelEvent>) {
    ui.horizontal_wrapped(|ui| {
        for (index, series) in panel.series.iter().enumerate() {
            let selected = panel.highlighted.as_deref() == Some(series.id.as_str());
            let text = RichText::new(&series.label).color(series_color(index));
            if ui.selectable_label(selected, text).clicked() {
                events.push(PanelEvent::Select {
                    series: Some(series.id.clone()),
                    source: SelectionSource::Legend,
                });
            }
        }
        if panel.highlighted.is_some() && ui.small_button("Show all").clicked() {
            events.push(PanelEvent::Select {
                series: None,
                source: SelectionSource::Legend,
            });
        }
    });
}

/// The series closest to `pointer` (log-space plot coordinates), if within
/// the pick radius. Distances are normalized by the visible axis spans so
/// picking behaves the same at any zoom level.
fn nearest_series(panel: &Panel, pointer: [f64; 2], spans: [f64; 2]) -> Option<ValueId> {
    let (width, height) = (spans[0].max(f64::EPSILON), spans[1].max(f64::EPSILON));
    let mut best: Option<(f64, &ValueId)> = None;

    for series in &panel.series {
        for p in &series.points {
            if p[0] <= 0.0 || p[1] <= 0.0 {
                continue;
            }
            let dx = (p[0].log10() - pointer[0]) / width;
            let dy = (p[1].log10() - pointer[1]) / height;
            let dist = (dx * dx + dy * dy).sqrt();
            if best.map(|(d, _)| dist < d).unwrap_or(true) {
                best = Some((dist, &series.id));
            }
        }
    }

    match best {
        Some((dist, id)) if dist <= PICK_RADIUS_FRACTION => Some(id.clone()),
        _ => None,
    }
}

/// Label for a log10 grid mark; only integral decades are labelled
fn pow10_label(exponent: f64) -> String {
    let rounded = exponent.round();
    if (exponent - rounded).abs() > 1e-6 {
        return String::new();
    }
    let n = rounded as i32;
    if (-4..=4).contains(&n) {
        let value = 10f64.powi(n);
        if n < 0 {
            format!("{value:.*}", (-n) as usize)
        } else {
            format!("{value:.0}")
        }
    } else {
        format!("1e{n}")
    }
}

/// Decade grid marks (with 2x and 5x minor marks) for a log10 axis
fn log_grid_marks(bounds: (f64, f64)) -> Vec<GridMark> {
    let (min, max) = bounds;
    let mut marks = Vec::new();
    let start = min.floor() as i64 - 1;
    let end = max.ceil() as i64 + 1;

    for decade in start..=end {
        let base = decade as f64;
        if base >= min && base <= max {
            marks.push(GridMark {
                value: base,
                step_size: 1.0,
            });
        }
        for factor in [2.0f64, 5.0] {
            let value = base + factor.log10();
            if value >= min && value <= max {
                marks.push(GridMark {
                    value,
                    step_size: 0.25,
                });
            }
        }
    }
    marks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedPanel;
    use crate::frontend::panel::PanelId;
    use crate::types::SeriesDescriptor;

    #[test]
    fn test_pow10_labels() {
        assert_eq!(pow10_label(0.0), "1");
        assert_eq!(pow10_label(1.0), "10");
        assert_eq!(pow10_label(-2.0), "0.01");
        assert_eq!(pow10_label(-6.0), "1e-6");
        // Minor marks stay unlabelled
        assert_eq!(pow10_label(2.0f64.log10()), "");
    }

    #[test]
    fn test_log_grid_marks_cover_bounds() {
        let marks = log_grid_marks((-3.2, 0.5));
        assert!(marks.iter().all(|m| m.value >= -3.2 && m.value <= 0.5));
        // Every full decade inside the range is present
        for decade in [-3.0, -2.0, -1.0, 0.0] {
            assert!(marks.iter().any(|m| (m.value - decade).abs() < 1e-9));
        }
    }

    #[test]
    fn test_nearest_series_pick_and_miss() {
        let mut panel = Panel::new(PanelId::Hazard);
        panel.apply(
            ExtractedPanel {
                series: vec![
                    SeriesDescriptor::new("PGA", "PGA", vec![[0.01, 0.5], [0.1, 0.05]]),
                    SeriesDescriptor::new("SA1P0", "SA1P0", vec![[0.01, 0.05], [0.1, 0.005]]),
                ],
                x_label: String::new(),
                y_label: String::new(),
            },
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );

        // Directly on the first PGA point (log10(0.01), log10(0.5))
        let hit = nearest_series(&panel, [-2.0, 0.5f64.log10()], [4.0, 4.0]);
        assert_eq!(hit.as_deref(), Some("PGA"));

        // Closer to the SA1P0 curve
        let hit = nearest_series(&panel, [-2.0, 0.05f64.log10()], [4.0, 4.0]);
        assert_eq!(hit.as_deref(), Some("SA1P0"));

        // Far away from anything
        let hit = nearest_series(&panel, [3.0, 3.0], [4.0, 4.0]);
        assert_eq!(hit, None);
    }
}
