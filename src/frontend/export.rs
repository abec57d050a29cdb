//! CSV export of panel data
//!
//! Each export carries a small metadata preamble (application version, the
//! query that produced the data, export time) so a saved file can be traced
//! back to the exact request.

use crate::error::{HazVisError, Result, ResultExt};
use crate::frontend::panel::Panel;
use std::path::PathBuf;

/// Render a panel's series as CSV text with a commented metadata preamble
pub fn panel_to_csv(panel: &Panel, query: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# {} v{}\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str(&format!("# Exported: {}\n", chrono::Local::now().to_rfc3339()));
    if !query.is_empty() {
        out.push_str(&format!("# Query: {query}\n"));
    }
    out.push_str(&format!(
        "series,{},{}\n",
        csv_field(&panel.x_label),
        csv_field(&panel.y_label)
    ));

    for series in &panel.series {
        let label = csv_field(&series.label);
        for point in &series.points {
            out.push_str(&format!("{label},{},{:e}\n", point[0], point[1]));
        }
    }
    out
}

/// Ask for a destination and write the panel's CSV there. Returns the path
/// written, or `None` when the dialog was cancelled.
pub fn export_panel(panel: &Panel, query: &str) -> Result<Option<PathBuf>> {
    let Some(path) = rfd::FileDialog::new()
        .set_file_name(format!("{}.csv", panel.filename))
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return Ok(None);
    };

    write_export(&path, panel, query)?;
    Ok(Some(path))
}

/// Write a panel's CSV to `path`
pub fn write_export(path: &std::path::Path, panel: &Panel, query: &str) -> Result<()> {
    let csv = panel_to_csv(panel, query);
    std::fs::write(path, csv)
        .map_err(HazVisError::from)
        .with_context(|| format!("writing export to {}", path.display()))?;
    tracing::info!(path = %path.display(), "exported panel data");
    Ok(())
}

/// Quote a field when it contains CSV-significant characters
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedPanel;
    use crate::frontend::panel::PanelId;
    use crate::types::SeriesDescriptor;

    fn sample_panel() -> Panel {
        let mut panel = Panel::new(PanelId::Hazard);
        panel.apply(
            ExtractedPanel {
                series: vec![SeriesDescriptor::new(
                    "PGA",
                    "Peak Ground Acceleration",
                    vec![[0.01, 0.5], [0.1, 0.05]],
                )],
                x_label: "Ground Motion (g)".to_string(),
                y_label: "Annual Frequency of Exceedence".to_string(),
            },
            "Hazard Curves".to_string(),
            "hazardCurves".to_string(),
        );
        panel
    }

    #[test]
    fn test_csv_layout() {
        let csv = panel_to_csv(&sample_panel(), "edition=E2014&imt=PGA");
        let lines: Vec<&str> = csv.lines().collect();

        assert!(lines[0].starts_with("# hazvis-rs v"));
        assert!(lines[1].starts_with("# Exported: "));
        assert_eq!(lines[2], "# Query: edition=E2014&imt=PGA");
        assert_eq!(
            lines[3],
            "series,Ground Motion (g),Annual Frequency of Exceedence"
        );
        assert_eq!(lines[4], "Peak Ground Acceleration,0.01,5e-1");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_export_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hazardCurves.csv");
        write_export(&path, &sample_panel(), "edition=E2014").unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("# Query: edition=E2014"));
        assert!(written.contains("Peak Ground Acceleration,0.01,5e-1"));
    }

    #[test]
    fn test_write_export_reports_path_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("hazardCurves.csv");
        let err = write_export(&path, &sample_panel(), "").unwrap_err();
        assert!(err.to_string().contains("writing export to"));
    }

    #[test]
    fn test_empty_query_omitted() {
        let csv = panel_to_csv(&sample_panel(), "");
        assert!(!csv.contains("# Query:"));
    }
}
