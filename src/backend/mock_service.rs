//! Mock hazard service for demos and testing
//!
//! Provides a deterministic in-process [`HazardService`] so the application
//! runs without network access and the worker/view logic can be tested
//! against known data. The mock deliberately exercises both wire shapes:
//! the 2008 edition answers in the legacy "static" shape (anonymous curves,
//! `xvals`/`yvals`), the 2014 edition in the "dynamic" shape (named
//! components, `xvalues`/`yvalues`).
//!
//! Curves are synthetic but hazard-like: annual exceedance frequency decays
//! with ground motion following a power law whose amplitude varies smoothly
//! with the site location, so moving the site visibly changes the plots.

use crate::backend::service::HazardService;
use crate::catalog::{Parameter, ParameterCatalog, ParameterValue, RegionBounds};
use crate::error::{HazVisError, Result};
use crate::types::{HazardRequest, ParamKey};
use crate::wire::{
    DynamicComponent, DynamicEntry, DynamicMetadata, EntryIdentity, ParamRef, ResponseGroup,
    StaticCurve, StaticEntry, StaticMetadata, TOTAL_COMPONENT,
};

/// Standard NSHM ground-motion sampling points in units of g
const X_VALUES: [f64; 19] = [
    0.0025, 0.0045, 0.0075, 0.0113, 0.0169, 0.0253, 0.0380, 0.0570, 0.0854, 0.128, 0.192, 0.288,
    0.432, 0.649, 0.973, 1.46, 2.19, 3.28, 4.92,
];

const X_LABEL: &str = "Ground Motion (g)";
const Y_LABEL: &str = "Annual Frequency of Exceedence";

/// (id, display, decay exponent) per supported IMT
const IMTS: [(&str, &str, f64); 3] = [
    ("PGA", "Peak Ground Acceleration", 1.9),
    ("SA0P2", "0.20 Second Spectral Acceleration", 1.6),
    ("SA1P0", "1.00 Second Spectral Acceleration", 2.3),
];

/// Deterministic in-process hazard service
#[derive(Debug, Default)]
pub struct MockHazardService;

impl MockHazardService {
    pub fn new() -> Self {
        Self
    }

    fn catalog() -> ParameterCatalog {
        let editions = vec![
            ParameterValue::new("E2008", "USGS NSHM 2008 (static)")
                .with_support(ParamKey::Region, ["COUS", "WUS", "CEUS"])
                .with_support(ParamKey::Imt, ["PGA", "SA0P2", "SA1P0"])
                .with_support(ParamKey::Vs30, ["760"]),
            ParameterValue::new("E2014", "USGS NSHM 2014 (dynamic)")
                .with_support(ParamKey::Region, ["COUS", "WUS", "AK"])
                .with_support(ParamKey::Imt, ["PGA", "SA0P2", "SA1P0"])
                .with_support(ParamKey::Vs30, ["259", "360", "537", "760"]),
        ];

        let regions = vec![
            ParameterValue::new("COUS", "Conterminous US").with_bounds(RegionBounds {
                minlatitude: 24.6,
                maxlatitude: 50.0,
                minlongitude: -125.0,
                maxlongitude: -65.0,
            }),
            ParameterValue::new("WUS", "Western US").with_bounds(RegionBounds {
                minlatitude: 24.6,
                maxlatitude: 50.0,
                minlongitude: -125.0,
                maxlongitude: -100.0,
            }),
            ParameterValue::new("CEUS", "Central & Eastern US").with_bounds(RegionBounds {
                minlatitude: 24.6,
                maxlatitude: 50.0,
                minlongitude: -115.0,
                maxlongitude: -65.0,
            }),
            ParameterValue::new("AK", "Alaska").with_bounds(RegionBounds {
                minlatitude: 48.0,
                maxlatitude: 72.0,
                minlongitude: -200.0,
                maxlongitude: -125.0,
            }),
        ];

        let imts = IMTS
            .iter()
            .map(|(id, display, _)| ParameterValue::new(*id, *display))
            .collect();

        let vs30s = vec![
            ParameterValue::new("259", "259 m/s (soft rock)"),
            ParameterValue::new("360", "360 m/s (stiff soil)"),
            ParameterValue::new("537", "537 m/s (rock/soil boundary)"),
            ParameterValue::new("760", "760 m/s (B/C boundary)"),
        ];

        ParameterCatalog::new([
            Parameter {
                key: ParamKey::Edition,
                values: editions,
            },
            Parameter {
                key: ParamKey::Region,
                values: regions,
            },
            Parameter {
                key: ParamKey::Imt,
                values: imts,
            },
            Parameter {
                key: ParamKey::Vs30,
                values: vs30s,
            },
        ])
    }

    /// Total hazard curve: power-law decay in ground motion, with an
    /// amplitude that varies smoothly with site location and vs30
    fn total_curve(request: &HazardRequest, exponent: f64) -> Vec<f64> {
        let vs30: f64 = request.vs30.parse().unwrap_or(760.0);
        let site = 0.6
            + 0.4 * (request.latitude.to_radians() * 3.0).sin().abs()
            + 0.2 * (request.longitude.to_radians() * 2.0).cos().abs();
        let amp = 0.08 * site * (760.0 / vs30).sqrt();
        X_VALUES
            .iter()
            .map(|&x| amp * (x / 0.01).powf(-exponent))
            .collect()
    }

    fn identity(request: &HazardRequest, imt: (&str, &str)) -> EntryIdentity {
        let catalog = Self::catalog();
        EntryIdentity {
            edition: ParamRef {
                value: request.edition.clone(),
                display: catalog.display(ParamKey::Edition, &request.edition),
            },
            region: ParamRef {
                value: request.region.clone(),
                display: catalog.display(ParamKey::Region, &request.region),
            },
            imt: ParamRef {
                value: imt.0.to_string(),
                display: imt.1.to_string(),
            },
            vs30: ParamRef {
                value: request.vs30.clone(),
                display: catalog.display(ParamKey::Vs30, &request.vs30),
            },
            latitude: request.latitude,
            longitude: request.longitude,
            xlabel: X_LABEL.to_string(),
            ylabel: Y_LABEL.to_string(),
        }
    }

    fn dynamic_group(request: &HazardRequest) -> ResponseGroup {
        let response = IMTS
            .iter()
            .map(|&(id, display, exponent)| {
                let total = Self::total_curve(request, exponent);
                let fault: Vec<f64> = total.iter().map(|y| y * 0.55).collect();
                let gridded: Vec<f64> = total.iter().map(|y| y * 0.45).collect();
                DynamicEntry {
                    metadata: DynamicMetadata {
                        identity: Self::identity(request, (id, display)),
                        xvalues: X_VALUES.to_vec(),
                    },
                    data: vec![
                        DynamicComponent {
                            component: "Fault".to_string(),
                            yvalues: fault,
                        },
                        DynamicComponent {
                            component: "Gridded".to_string(),
                            yvalues: gridded,
                        },
                        DynamicComponent {
                            component: TOTAL_COMPONENT.to_string(),
                            yvalues: total,
                        },
                    ],
                }
            })
            .collect();
        ResponseGroup::Dynamic { response }
    }

    fn static_group(request: &HazardRequest) -> ResponseGroup {
        let response = IMTS
            .iter()
            .map(|&(id, display, exponent)| StaticEntry {
                metadata: StaticMetadata {
                    identity: Self::identity(request, (id, display)),
                    xvals: X_VALUES.to_vec(),
                },
                data: vec![StaticCurve {
                    // Legacy grids run slightly lower than the dynamic model
                    yvals: Self::total_curve(request, exponent)
                        .into_iter()
                        .map(|y| y * 0.9)
                        .collect(),
                }],
            })
            .collect();
        ResponseGroup::Static { response }
    }
}

impl HazardService for MockHazardService {
    fn fetch_parameters(&mut self) -> Result<ParameterCatalog> {
        Ok(Self::catalog())
    }

    fn compute_hazard(&mut self, request: &HazardRequest) -> Result<ResponseGroup> {
        match request.edition.as_str() {
            "E2008" => Ok(Self::static_group(request)),
            "E2014" => Ok(Self::dynamic_group(request)),
            other => Err(HazVisError::Computation(format!(
                "unknown edition: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::DataShape;

    fn request(edition: &str) -> HazardRequest {
        HazardRequest {
            edition: edition.to_string(),
            region: "COUS".to_string(),
            latitude: 34.05,
            longitude: -118.25,
            vs30: "760".to_string(),
        }
    }

    #[test]
    fn test_editions_answer_in_their_wire_shape() {
        let mut service = MockHazardService::new();
        let dynamic = service.compute_hazard(&request("E2014")).unwrap();
        assert_eq!(dynamic.shape(), DataShape::Dynamic);
        let stat = service.compute_hazard(&request("E2008")).unwrap();
        assert_eq!(stat.shape(), DataShape::Static);
    }

    #[test]
    fn test_curves_are_deterministic_and_decreasing() {
        let mut service = MockHazardService::new();
        let a = service.compute_hazard(&request("E2014")).unwrap();
        let b = service.compute_hazard(&request("E2014")).unwrap();
        assert_eq!(a, b);

        let entry = a.entry_for_imt("PGA").unwrap();
        let total = entry.total().unwrap();
        assert!(total.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(total.len(), entry.x_values().len());
    }

    #[test]
    fn test_unknown_edition_is_a_computation_error() {
        let mut service = MockHazardService::new();
        let err = service.compute_hazard(&request("E1899")).unwrap_err();
        assert!(matches!(err, HazVisError::Computation(_)));
    }

    #[test]
    fn test_catalog_supports_are_mutual() {
        let mut service = MockHazardService::new();
        let catalog = service.fetch_parameters().unwrap();
        let e2008 = catalog.value(ParamKey::Edition, "E2008").unwrap();
        assert!(e2008.supports_value(ParamKey::Region, "COUS"));
        assert!(!e2008.supports_value(ParamKey::Region, "AK"));
        assert!(catalog.region_bounds("AK").unwrap().contains(61.0, -150.0));
    }
}
