//! Core data types for HazVis-RS
//!
//! This module contains the fundamental data structures used throughout
//! the application for representing model parameters, selections, and
//! plottable curve series.
//!
//! # Main Types
//!
//! - [`ParamKey`] - Enum of the user-selectable parameter axes
//! - [`Selection`] - The current choice of value ids per parameter
//! - [`SeriesDescriptor`] - One named (x, y) curve consumed by a plot panel
//! - [`HazardRequest`] - A single computation request sent to the service
//!
//! # Small-value filtering
//!
//! Hazard curves are rendered on log-log axes; annual frequencies of
//! exceedance below [`Y_EPSILON`] are dropped before rendering to avoid
//! log-scale artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Points with |y| at or below this threshold are dropped before rendering
pub const Y_EPSILON: f64 = 1e-14;

/// Stable identifier of one selectable parameter value (e.g. `"E2014"`,
/// `"COUS"`, `"PGA"`, `"760"`)
pub type ValueId = String;

/// One user-selectable axis of choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKey {
    /// Model edition (e.g. E2008, E2014)
    Edition,
    /// Geographic model region (e.g. COUS, WUS, AK)
    Region,
    /// Intensity-measure type (e.g. PGA, SA0P2)
    Imt,
    /// Site condition as a vs30 value in m/s
    Vs30,
}

impl ParamKey {
    /// All parameter keys in catalog order
    pub const ALL: [ParamKey; 4] = [
        ParamKey::Edition,
        ParamKey::Region,
        ParamKey::Imt,
        ParamKey::Vs30,
    ];

    /// The key as it appears in query strings and wire payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::Edition => "edition",
            ParamKey::Region => "region",
            ParamKey::Imt => "imt",
            ParamKey::Vs30 => "vs30",
        }
    }
}

impl std::fmt::Display for ParamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParamKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "edition" => Ok(ParamKey::Edition),
            "region" => Ok(ParamKey::Region),
            "imt" => Ok(ParamKey::Imt),
            "vs30" => Ok(ParamKey::Vs30),
            other => Err(format!("unknown parameter key: {other}")),
        }
    }
}

/// The current choice of value ids per parameter.
///
/// Single-select parameters hold at most one id; multi-select parameters
/// (edition in the compare flow) may hold several. An absent or empty entry
/// means the parameter is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    values: BTreeMap<ParamKey, Vec<ValueId>>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// All selected ids for a parameter (empty slice if unset)
    pub fn get(&self, key: ParamKey) -> &[ValueId] {
        self.values.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The single selected id for a parameter, if exactly one is set
    pub fn single(&self, key: ParamKey) -> Option<&str> {
        match self.get(key) {
            [one] => Some(one.as_str()),
            _ => None,
        }
    }

    /// Replace the selection for a parameter with a single id
    pub fn set_single(&mut self, key: ParamKey, id: impl Into<ValueId>) {
        self.values.insert(key, vec![id.into()]);
    }

    /// Replace the selection for a parameter with several ids
    pub fn set_many(&mut self, key: ParamKey, ids: Vec<ValueId>) {
        self.values.insert(key, ids);
    }

    /// Clear the selection for a parameter
    pub fn clear(&mut self, key: ParamKey) {
        self.values.remove(&key);
    }

    pub fn is_set(&self, key: ParamKey) -> bool {
        !self.get(key).is_empty()
    }

    pub fn contains(&self, key: ParamKey, id: &str) -> bool {
        self.get(key).iter().any(|v| v == id)
    }

    /// Iterate set parameters with their selected ids
    pub fn iter(&self) -> impl Iterator<Item = (ParamKey, &[ValueId])> {
        self.values.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

/// One named (x, y) curve consumed by a plot panel.
///
/// The `id` is stable across renders and is what selection state is keyed
/// on (an IMT id in the hazard panel, a lowercased component name in the
/// component panel).
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDescriptor {
    /// Stable id used for selection correlation
    pub id: ValueId,
    /// Display label shown in the legend
    pub label: String,
    /// Ordered (x, y) pairs
    pub points: Vec<[f64; 2]>,
}

impl SeriesDescriptor {
    pub fn new(id: impl Into<ValueId>, label: impl Into<String>, points: Vec<[f64; 2]>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            points,
        }
    }

    /// Drop points with |y| <= epsilon, preserving the order of the rest
    pub fn drop_small_values(&mut self, epsilon: f64) {
        self.points.retain(|p| p[1].abs() > epsilon);
    }
}

/// A single hazard computation request, one per edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardRequest {
    pub edition: ValueId,
    pub region: ValueId,
    pub latitude: f64,
    pub longitude: f64,
    pub vs30: ValueId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_key_round_trip() {
        for key in ParamKey::ALL {
            let parsed: ParamKey = key.as_str().parse().unwrap();
            assert_eq!(parsed, key);
        }
        assert!("magnitude".parse::<ParamKey>().is_err());
    }

    #[test]
    fn test_selection_single_vs_many() {
        let mut sel = Selection::new();
        assert!(!sel.is_set(ParamKey::Imt));

        sel.set_single(ParamKey::Imt, "PGA");
        assert_eq!(sel.single(ParamKey::Imt), Some("PGA"));

        sel.set_many(
            ParamKey::Edition,
            vec!["E2008".to_string(), "E2014".to_string()],
        );
        assert_eq!(sel.single(ParamKey::Edition), None);
        assert!(sel.contains(ParamKey::Edition, "E2008"));
        assert_eq!(sel.get(ParamKey::Edition).len(), 2);

        sel.clear(ParamKey::Edition);
        assert!(!sel.is_set(ParamKey::Edition));
    }

    #[test]
    fn test_drop_small_values_preserves_order() {
        let mut series = SeriesDescriptor::new(
            "PGA",
            "Peak Ground Acceleration",
            vec![[0.01, 0.5], [0.02, 1e-15], [0.05, 0.1], [0.1, 0.0], [0.2, 0.02]],
        );
        series.drop_small_values(Y_EPSILON);
        assert_eq!(series.points, vec![[0.01, 0.5], [0.05, 0.1], [0.2, 0.02]]);
    }
}
