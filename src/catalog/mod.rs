//! Parameter catalog module for HazVis-RS
//!
//! The catalog is the immutable description of the selectable model
//! parameters and their pairwise support constraints, as delivered by the
//! hazard service's usage document. It is fetched once at view construction
//! and replaced wholesale if parameters are reloaded.
//!
//! # Support constraints
//!
//! A [`ParameterValue`] may declare, per other parameter, the set of value
//! ids it is jointly valid with (e.g. an edition declares the regions it
//! covers). Declarations are pairwise only: they are **not** symmetric and
//! **not** transitive in the source data, and [`resolver`] never assumes
//! either. An absent declaration means "compatible with everything".
//!
//! # Submodules
//!
//! - [`resolver`] - legal-value computation and cascading selection repair

pub mod resolver;

pub use resolver::{DependencyResolver, FlowConfig, FlowKind, RepairPolicy, Resolution,
    SelectionMode};

use crate::error::{HazVisError, Result};
use crate::types::{ParamKey, ValueId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One selectable value of a parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// Stable id (e.g. "E2014", "COUS", "PGA", "760")
    pub value: ValueId,
    /// Display label (e.g. "Dynamic: Conterminous US 2014")
    pub display: String,
    /// Pairwise support constraints over other parameters; absent key means
    /// no constraint declared for that parameter
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub supports: BTreeMap<ParamKey, BTreeSet<ValueId>>,
    /// Geographic bounds, present on region values only
    #[serde(flatten, default)]
    pub bounds: Option<RegionBounds>,
}

impl ParameterValue {
    pub fn new(value: impl Into<ValueId>, display: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: display.into(),
            ..Default::default()
        }
    }

    /// Declare the ids of `key` this value is jointly valid with
    pub fn with_support<I, S>(mut self, key: ParamKey, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ValueId>,
    {
        self.supports
            .insert(key, ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_bounds(mut self, bounds: RegionBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Whether this value is compatible with `id` being selected for `key`.
    ///
    /// No declaration for `key` means compatible.
    pub fn supports_value(&self, key: ParamKey, id: &str) -> bool {
        match self.supports.get(&key) {
            Some(ids) => ids.contains(id),
            None => true,
        }
    }
}

/// Geographic bounds carried on region values; the site location must fall
/// inside the selected region's bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionBounds {
    pub minlatitude: f64,
    pub maxlatitude: f64,
    pub minlongitude: f64,
    pub maxlongitude: f64,
}

impl RegionBounds {
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.minlatitude
            && latitude <= self.maxlatitude
            && longitude >= self.minlongitude
            && longitude <= self.maxlongitude
    }
}

/// A named axis of choice with its ordered values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub key: ParamKey,
    pub values: Vec<ParameterValue>,
}

impl Parameter {
    pub fn value(&self, id: &str) -> Option<&ParameterValue> {
        self.values.iter().find(|v| v.value == id)
    }
}

/// Immutable description of every selectable parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterCatalog {
    parameters: BTreeMap<ParamKey, Parameter>,
}

impl ParameterCatalog {
    /// Build a catalog from parameters; each key may appear once
    pub fn new(parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            parameters: parameters.into_iter().map(|p| (p.key, p)).collect(),
        }
    }

    /// Decode a catalog from the service's usage document
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: UsageDocument = serde_json::from_str(json)
            .map_err(|e| HazVisError::CatalogLoad(format!("invalid usage document: {e}")))?;
        Ok(doc.into_catalog())
    }

    pub fn parameter(&self, key: ParamKey) -> Option<&Parameter> {
        self.parameters.get(&key)
    }

    /// Ordered values of a parameter (empty if the catalog lacks the key)
    pub fn values(&self, key: ParamKey) -> &[ParameterValue] {
        self.parameters
            .get(&key)
            .map(|p| p.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn value(&self, key: ParamKey, id: &str) -> Option<&ParameterValue> {
        self.parameters.get(&key).and_then(|p| p.value(id))
    }

    /// Display label for a value id, falling back to the id itself
    pub fn display(&self, key: ParamKey, id: &str) -> String {
        self.value(key, id)
            .map(|v| v.display.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Bounds of the given region value, if declared
    pub fn region_bounds(&self, region_id: &str) -> Option<RegionBounds> {
        self.value(ParamKey::Region, region_id)
            .and_then(|v| v.bounds)
    }
}

/// Wire shape of the service's usage document: a `parameters` object keyed
/// by parameter name, each entry carrying its ordered `values`
#[derive(Debug, Deserialize)]
struct UsageDocument {
    parameters: BTreeMap<ParamKey, UsageParameter>,
}

#[derive(Debug, Deserialize)]
struct UsageParameter {
    values: Vec<ParameterValue>,
}

impl UsageDocument {
    fn into_catalog(self) -> ParameterCatalog {
        ParameterCatalog::new(self.parameters.into_iter().map(|(key, p)| Parameter {
            key,
            values: p.values,
        }))
    }
}
