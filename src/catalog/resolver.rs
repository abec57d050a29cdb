//! Dependency resolution for cascading parameter menus
//!
//! Changing one parameter must recompute the legal values of every parameter
//! declared dependent on it, and repair selections that became illegal,
//! without ever leaving a control showing a stale illegal value. All of this
//! is pure: the resolver is a function of (catalog, flow config, prior
//! selection, changed key) to (new selection, new legal sets), so it is
//! testable without any UI.
//!
//! # Flows
//!
//! Which parameters depend on which, and how an illegal selection is
//! repaired, is declared per flow rather than inferred from call sites:
//!
//! - [`FlowKind::Explorer`] cascades `edition -> region -> {imt, vs30}`,
//!   single-select everywhere, repairing to the first legal value.
//! - [`FlowKind::Compare`] cascades `region -> edition -> {imt, vs30}`,
//!   with edition multi-select repairing to all legal values.
//!
//! # Legality
//!
//! A candidate value is legal iff it is mutually compatible with every
//! selected value of every other parameter, checking declared support in
//! both directions (candidate over the other parameter, and the other value
//! over the target). Support declarations are pairwise and unsymmetric;
//! an absent declaration constrains nothing.

use crate::catalog::{ParameterCatalog, ParameterValue};
use crate::types::{ParamKey, Selection, ValueId};
use std::collections::BTreeMap;

/// Which exploration screen the form is driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowKind {
    /// Single-edition model explorer
    #[default]
    Explorer,
    /// Multi-edition model comparison
    Compare,
}

/// Whether a parameter's control holds one value or several
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Single,
    Multi,
}

/// How an illegal dependent selection is repaired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairPolicy {
    /// Replace with the first currently-legal value
    FirstLegal,
    /// Replace with every currently-legal value (multi-select menus)
    AllLegal,
}

/// Declared behavior of one parameter within a flow
#[derive(Debug, Clone)]
pub struct ParamRule {
    pub key: ParamKey,
    pub mode: SelectionMode,
    pub repair: RepairPolicy,
    /// Parameters whose legal sets must be recomputed when this one changes,
    /// in cascade order
    pub dependents: Vec<ParamKey>,
}

/// Declared cascade order, per-parameter rules, and preferred defaults for
/// one flow
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub kind: FlowKind,
    /// Every parameter of the flow in cascade order
    pub cascade: Vec<ParamKey>,
    rules: BTreeMap<ParamKey, ParamRule>,
    /// Value preferred when a parameter is unset and the preference is legal
    defaults: BTreeMap<ParamKey, ValueId>,
}

impl FlowConfig {
    pub fn for_kind(kind: FlowKind) -> Self {
        match kind {
            FlowKind::Explorer => Self::explorer(),
            FlowKind::Compare => Self::compare(),
        }
    }

    /// Explorer flow: edition drives region, both drive imt and vs30
    pub fn explorer() -> Self {
        let rules = [
            ParamRule {
                key: ParamKey::Edition,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![ParamKey::Region, ParamKey::Imt, ParamKey::Vs30],
            },
            ParamRule {
                key: ParamKey::Region,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![ParamKey::Imt, ParamKey::Vs30],
            },
            ParamRule {
                key: ParamKey::Imt,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![],
            },
            ParamRule {
                key: ParamKey::Vs30,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![],
            },
        ];
        Self {
            kind: FlowKind::Explorer,
            cascade: vec![
                ParamKey::Edition,
                ParamKey::Region,
                ParamKey::Imt,
                ParamKey::Vs30,
            ],
            rules: rules.into_iter().map(|r| (r.key, r)).collect(),
            defaults: Self::default_values(),
        }
    }

    /// Compare flow: region drives the (multi-select) edition menu, which
    /// drives imt and vs30
    pub fn compare() -> Self {
        let rules = [
            ParamRule {
                key: ParamKey::Region,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![ParamKey::Edition, ParamKey::Imt, ParamKey::Vs30],
            },
            ParamRule {
                key: ParamKey::Edition,
                mode: SelectionMode::Multi,
                repair: RepairPolicy::AllLegal,
                dependents: vec![ParamKey::Imt, ParamKey::Vs30],
            },
            ParamRule {
                key: ParamKey::Imt,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![],
            },
            ParamRule {
                key: ParamKey::Vs30,
                mode: SelectionMode::Single,
                repair: RepairPolicy::FirstLegal,
                dependents: vec![],
            },
        ];
        Self {
            kind: FlowKind::Compare,
            cascade: vec![
                ParamKey::Region,
                ParamKey::Edition,
                ParamKey::Imt,
                ParamKey::Vs30,
            ],
            rules: rules.into_iter().map(|r| (r.key, r)).collect(),
            defaults: Self::default_values(),
        }
    }

    fn default_values() -> BTreeMap<ParamKey, ValueId> {
        [
            (ParamKey::Edition, "E2014".to_string()),
            (ParamKey::Region, "COUS".to_string()),
            (ParamKey::Imt, "PGA".to_string()),
            (ParamKey::Vs30, "760".to_string()),
        ]
        .into_iter()
        .collect()
    }

    pub fn rule(&self, key: ParamKey) -> &ParamRule {
        &self.rules[&key]
    }

    pub fn dependents_of(&self, key: ParamKey) -> &[ParamKey] {
        &self.rules[&key].dependents
    }

    fn preferred(&self, key: ParamKey) -> Option<&str> {
        self.defaults.get(&key).map(String::as_str)
    }
}

/// Result of a resolver pass: the repaired selection plus the legal value
/// ids recomputed for each visited parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub selection: Selection,
    /// Legal value ids per recomputed parameter, in catalog order. An empty
    /// vec means the control must be rendered disabled.
    pub legal: BTreeMap<ParamKey, Vec<ValueId>>,
}

/// Pure legal-value computation and cascading selection repair
pub struct DependencyResolver;

impl DependencyResolver {
    /// Legal values of `target` given the rest of the current selection.
    ///
    /// A candidate is excluded as soon as any selected value of any other
    /// parameter is incompatible with it in either declared direction.
    /// Selected ids that are absent from the catalog constrain nothing
    /// (they are repaired by their own cascade pass).
    pub fn legal_values<'a>(
        catalog: &'a ParameterCatalog,
        selection: &Selection,
        target: ParamKey,
    ) -> Vec<&'a ParameterValue> {
        catalog
            .values(target)
            .iter()
            .filter(|candidate| Self::is_legal(catalog, selection, target, candidate))
            .collect()
    }

    fn is_legal(
        catalog: &ParameterCatalog,
        selection: &Selection,
        target: ParamKey,
        candidate: &ParameterValue,
    ) -> bool {
        selection
            .iter()
            .filter(|(other_key, _)| *other_key != target)
            .all(|(other_key, ids)| {
                ids.iter().all(|id| {
                    let Some(other_value) = catalog.value(other_key, id) else {
                        return true;
                    };
                    candidate.supports_value(other_key, id)
                        && other_value.supports_value(target, &candidate.value)
                })
            })
    }

    /// Recompute legal sets for every parameter declared dependent on
    /// `changed`, in cascade order, repairing selections per each
    /// parameter's declared policy. Idempotent.
    pub fn resolve(
        catalog: &ParameterCatalog,
        flow: &FlowConfig,
        selection: &Selection,
        changed: ParamKey,
    ) -> Resolution {
        Self::run(catalog, flow, selection, flow.dependents_of(changed))
    }

    /// Recompute the full cascade from the top, used when the catalog is
    /// first loaded or the flow changes. Unset parameters adopt the flow's
    /// preferred default when that default is legal.
    pub fn resolve_all(
        catalog: &ParameterCatalog,
        flow: &FlowConfig,
        selection: &Selection,
    ) -> Resolution {
        Self::run(catalog, flow, selection, &flow.cascade)
    }

    fn run(
        catalog: &ParameterCatalog,
        flow: &FlowConfig,
        selection: &Selection,
        keys: &[ParamKey],
    ) -> Resolution {
        let mut selection = selection.clone();
        let mut legal = BTreeMap::new();

        // Each parameter's legal set is computed against only the
        // parameters above it in the cascade (plus any parameter outside
        // this pass). A still-pending downstream value must not veto an
        // upstream candidate; the downstream value is what gets repaired
        // when its own turn comes.
        let mut constraining = selection.clone();
        for &key in keys {
            constraining.clear(key);
        }

        for &key in keys {
            let legal_ids: Vec<ValueId> = Self::legal_values(catalog, &constraining, key)
                .into_iter()
                .map(|v| v.value.clone())
                .collect();

            Self::repair(flow, &mut selection, key, &legal_ids);
            constraining.set_many(key, selection.get(key).to_vec());
            legal.insert(key, legal_ids);
        }

        Resolution { selection, legal }
    }

    /// Repair the selection of `key` against its freshly computed legal set
    fn repair(flow: &FlowConfig, selection: &mut Selection, key: ParamKey, legal: &[ValueId]) {
        if legal.is_empty() {
            // Control is rendered disabled; never leave a stale value behind
            if selection.is_set(key) {
                tracing::warn!(param = %key, "no legal values remain, clearing selection");
                selection.clear(key);
            }
            return;
        }

        let still_legal: Vec<ValueId> = selection
            .get(key)
            .iter()
            .filter(|id| legal.contains(id))
            .cloned()
            .collect();

        if !still_legal.is_empty() {
            if still_legal.len() != selection.get(key).len() {
                tracing::debug!(param = %key, "dropping illegal ids from selection");
                selection.set_many(key, still_legal);
            }
            return;
        }

        let rule = flow.rule(key);
        let replacement = match rule.repair {
            RepairPolicy::AllLegal => legal.to_vec(),
            RepairPolicy::FirstLegal => {
                let preferred = flow
                    .preferred(key)
                    .filter(|p| legal.iter().any(|id| id == p))
                    .unwrap_or(&legal[0]);
                vec![preferred.to_string()]
            }
        };
        tracing::debug!(param = %key, ?replacement, "repairing selection");
        selection.set_many(key, replacement);
    }

    /// Whether every parameter of the flow is set and every selected id is
    /// inside its legal set given the rest of the selection. Gates submit.
    pub fn is_complete_and_legal(
        catalog: &ParameterCatalog,
        flow: &FlowConfig,
        selection: &Selection,
    ) -> bool {
        flow.cascade.iter().all(|&key| {
            let ids = selection.get(key);
            if ids.is_empty() {
                return false;
            }
            let legal = Self::legal_values(catalog, selection, key);
            ids.iter()
                .all(|id| legal.iter().any(|v| &v.value == id))
        })
    }
}
