//! Hazard service interface and HTTP implementation
//!
//! The remote hazard computation is an opaque collaborator behind the
//! [`HazardService`] trait, so the worker and the UI are testable against
//! the mock implementation and the real web services interchangeably.

use crate::catalog::ParameterCatalog;
use crate::error::{HazVisError, Result};
use crate::types::HazardRequest;
use crate::wire::{self, ResponseGroup};
use std::time::Duration;

/// IMT path segment requesting every supported intensity-measure type
const IMT_ANY: &str = "any";

/// The opaque remote hazard service: a one-shot parameter fetch plus a
/// per-request curve computation
pub trait HazardService: Send {
    /// Fetch the parameter usage document (once, at view construction)
    fn fetch_parameters(&mut self) -> Result<ParameterCatalog>;

    /// Compute hazard curves for one edition/region/site/vs30 tuple; the
    /// reply carries entries for every supported IMT
    fn compute_hazard(&mut self, request: &HazardRequest) -> Result<ResponseGroup>;
}

/// Blocking HTTP-JSON client against the hazard web services.
///
/// Endpoints follow the service's path layout:
/// `GET {base}/hazard` for the usage document and
/// `GET {base}/hazard/{edition}/{region}/{longitude}/{latitude}/any/{vs30}`
/// for a computation.
pub struct HttpHazardService {
    base_url: String,
    timeout: Duration,
}

impl HttpHazardService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn get(&self, url: &str) -> Result<String> {
        tracing::debug!(%url, "hazard service request");
        let response = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .map_err(|err| HazVisError::Computation(err.to_string()))?;
        response
            .into_string()
            .map_err(|err| HazVisError::Computation(format!("failed to read reply: {err}")))
    }
}

impl HazardService for HttpHazardService {
    fn fetch_parameters(&mut self) -> Result<ParameterCatalog> {
        let url = format!("{}/hazard", self.base_url);
        let body = self
            .get(&url)
            .map_err(|err| HazVisError::CatalogLoad(err.to_string()))?;
        ParameterCatalog::from_json(&body)
    }

    fn compute_hazard(&mut self, request: &HazardRequest) -> Result<ResponseGroup> {
        let url = format!(
            "{}/hazard/{}/{}/{}/{}/{}/{}",
            self.base_url,
            request.edition,
            request.region,
            request.longitude,
            request.latitude,
            IMT_ANY,
            request.vs30,
        );
        let body = self.get(&url)?;
        wire::decode_group(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let service = HttpHazardService::new("https://example.invalid/ws//");
        assert_eq!(service.base_url, "https://example.invalid/ws");
    }
}
