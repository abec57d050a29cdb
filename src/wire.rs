//! Wire model for hazard service payloads
//!
//! The hazard web services answer in two divergent shapes, produced by
//! different backends: "dynamic" responses name their vectors `xvalues` /
//! `yvalues` and tag every curve with a `component` name ("Total", "Fault",
//! "Gridded", ...), while "static" responses use `xvals` / `yvals` and carry
//! exactly one anonymous curve whose first entry is the total. This is a
//! real wire-format divergence, not an accident, and it is preserved here as
//! a single tagged-union decode step ([`ResponseGroup`]) with unified
//! accessors ([`CurveEntry`]) so nothing downstream branches on raw field
//! names.
//!
//! # Main Types
//!
//! - [`ResponseGroup`] - one service reply, tagged by `dataType`
//! - [`CurveEntry`] - borrowed view over one per-IMT record of a group
//! - [`CurveResponse`] - every group of one submission (one per edition)

use crate::error::{HazVisError, Result};
use crate::types::ValueId;
use serde::{Deserialize, Serialize};

/// Component name marking the total-hazard curve in dynamic responses
pub const TOTAL_COMPONENT: &str = "Total";

/// All response groups produced by one submission; the compare flow issues
/// one request per selected edition and aggregates the groups in request
/// order
pub type CurveResponse = Vec<ResponseGroup>;

/// Echoed parameter identity (`{"value": "PGA", "display": "Peak Ground
/// Acceleration"}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRef {
    pub value: ValueId,
    pub display: String,
}

/// Request identity and axis labels echoed on every entry, identical in
/// both wire shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryIdentity {
    pub edition: ParamRef,
    pub region: ParamRef,
    pub imt: ParamRef,
    pub vs30: ParamRef,
    pub latitude: f64,
    pub longitude: f64,
    pub xlabel: String,
    pub ylabel: String,
}

/// Dynamic-shape metadata: the shared x vector is named `xvalues`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicMetadata {
    #[serde(flatten)]
    pub identity: EntryIdentity,
    pub xvalues: Vec<f64>,
}

/// One named curve of a dynamic entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicComponent {
    pub component: String,
    pub yvalues: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntry {
    pub metadata: DynamicMetadata,
    pub data: Vec<DynamicComponent>,
}

/// Static-shape metadata: the shared x vector is named `xvals`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticMetadata {
    #[serde(flatten)]
    pub identity: EntryIdentity,
    pub xvals: Vec<f64>,
}

/// One anonymous curve of a static entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticCurve {
    pub yvals: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticEntry {
    pub metadata: StaticMetadata,
    pub data: Vec<StaticCurve>,
}

/// Data shape of a response group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShape {
    Dynamic,
    Static,
}

/// One service reply: a list of per-IMT records, tagged by wire shape.
///
/// Unknown envelope fields (`status`, `date`, `url`) are ignored here;
/// server-flagged errors are rejected by [`decode_group`] before this type
/// is decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "lowercase")]
pub enum ResponseGroup {
    Dynamic { response: Vec<DynamicEntry> },
    Static { response: Vec<StaticEntry> },
}

impl ResponseGroup {
    pub fn shape(&self) -> DataShape {
        match self {
            ResponseGroup::Dynamic { .. } => DataShape::Dynamic,
            ResponseGroup::Static { .. } => DataShape::Static,
        }
    }

    /// Iterate the group's entries behind the unified view
    pub fn entries(&self) -> Box<dyn Iterator<Item = CurveEntry<'_>> + '_> {
        match self {
            ResponseGroup::Dynamic { response } => {
                Box::new(response.iter().map(CurveEntry::Dynamic))
            }
            ResponseGroup::Static { response } => {
                Box::new(response.iter().map(CurveEntry::Static))
            }
        }
    }

    /// The entry whose echoed IMT matches `imt_id`, if present
    pub fn entry_for_imt(&self, imt_id: &str) -> Option<CurveEntry<'_>> {
        self.entries().find(|e| e.identity().imt.value == imt_id)
    }

    /// The first entry, used for axis labels shared across the group
    pub fn first_entry(&self) -> Option<CurveEntry<'_>> {
        self.entries().next()
    }
}

/// Borrowed view over one per-IMT record, hiding the field-naming
/// divergence between the two wire shapes
#[derive(Debug, Clone, Copy)]
pub enum CurveEntry<'a> {
    Dynamic(&'a DynamicEntry),
    Static(&'a StaticEntry),
}

impl<'a> CurveEntry<'a> {
    pub fn identity(&self) -> &'a EntryIdentity {
        match self {
            CurveEntry::Dynamic(e) => &e.metadata.identity,
            CurveEntry::Static(e) => &e.metadata.identity,
        }
    }

    /// The shared x vector (`xvalues` or `xvals`)
    pub fn x_values(&self) -> &'a [f64] {
        match self {
            CurveEntry::Dynamic(e) => &e.metadata.xvalues,
            CurveEntry::Static(e) => &e.metadata.xvals,
        }
    }

    /// The logical "Total" curve. Located by component name for the dynamic
    /// shape and by fixed index 0 for the static shape; both rules are
    /// declared by the respective services, not discovered.
    pub fn total(&self) -> Option<&'a [f64]> {
        match self {
            CurveEntry::Dynamic(e) => e
                .data
                .iter()
                .find(|c| c.component == TOTAL_COMPONENT)
                .map(|c| c.yvalues.as_slice()),
            CurveEntry::Static(e) => e.data.first().map(|c| c.yvals.as_slice()),
        }
    }

    /// Named non-Total components. Static entries have none.
    pub fn components(&self) -> Vec<(&'a str, &'a [f64])> {
        match self {
            CurveEntry::Dynamic(e) => e
                .data
                .iter()
                .filter(|c| c.component != TOTAL_COMPONENT)
                .map(|c| (c.component.as_str(), c.yvalues.as_slice()))
                .collect(),
            CurveEntry::Static(_) => Vec::new(),
        }
    }
}

/// Reply envelope probe, decoded before the full group to detect
/// server-flagged errors
#[derive(Debug, Deserialize)]
struct ReplyProbe {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Decode one service reply, surfacing a server-flagged error payload
/// (`"status": "error"`) verbatim as a [`HazVisError::Computation`]
pub fn decode_group(json: &str) -> Result<ResponseGroup> {
    let probe: ReplyProbe = serde_json::from_str(json)?;
    if probe.status.as_deref() == Some("error") {
        return Err(HazVisError::Computation(
            probe
                .message
                .unwrap_or_else(|| "service returned an unspecified error".to_string()),
        ));
    }
    Ok(serde_json::from_str(json)?)
}
