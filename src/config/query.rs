//! Deep-link query strings
//!
//! The active selection is externally observable as a shareable query
//! string (`edition=E2014&region=COUS&imt=PGA&vs30=760&latitude=34.05&
//! longitude=-118.25`). The same format is accepted on the command line and
//! restored from the saved session; a complete, legal decoded selection
//! triggers an automatic computation on startup.
//!
//! Multi-select parameters repeat their key (`edition=E2008&edition=E2014`).

use crate::error::{HazVisError, Result};
use crate::types::{ParamKey, Selection};

/// A decoded deep link: parameter selection plus optional site coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeepLink {
    pub selection: Selection,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DeepLink {
    pub fn is_empty(&self) -> bool {
        self.selection.iter().next().is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

/// Encode a selection and site location as a query string, parameters in
/// catalog order, coordinates last
pub fn encode(selection: &Selection, latitude: Option<f64>, longitude: Option<f64>) -> String {
    let mut parts = Vec::new();
    for key in ParamKey::ALL {
        for id in selection.get(key) {
            parts.push(format!("{key}={id}"));
        }
    }
    if let Some(lat) = latitude {
        parts.push(format!("latitude={lat}"));
    }
    if let Some(lon) = longitude {
        parts.push(format!("longitude={lon}"));
    }
    parts.join("&")
}

/// Decode a query string, tolerating a leading `?`. Unknown keys and
/// malformed pairs are rejected rather than silently dropped.
pub fn decode(query: &str) -> Result<DeepLink> {
    let query = query.trim().trim_start_matches('?');
    let mut link = DeepLink::default();
    if query.is_empty() {
        return Ok(link);
    }

    for pair in query.split('&') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| HazVisError::Query(format!("malformed pair: {pair}")))?;
        if value.is_empty() {
            return Err(HazVisError::Query(format!("empty value for {key}")));
        }
        match key {
            "latitude" => {
                link.latitude = Some(parse_coordinate(key, value)?);
            }
            "longitude" => {
                link.longitude = Some(parse_coordinate(key, value)?);
            }
            _ => {
                let param: ParamKey = key.parse().map_err(HazVisError::Query)?;
                let mut ids = link.selection.get(param).to_vec();
                ids.push(value.to_string());
                link.selection.set_many(param, ids);
            }
        }
    }
    Ok(link)
}

fn parse_coordinate(key: &str, value: &str) -> Result<f64> {
    value
        .parse()
        .map_err(|_| HazVisError::Query(format!("invalid {key}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        let mut selection = Selection::new();
        selection.set_single(ParamKey::Edition, "E2014");
        selection.set_single(ParamKey::Region, "COUS");
        selection.set_single(ParamKey::Imt, "PGA");
        selection.set_single(ParamKey::Vs30, "760");

        let query = encode(&selection, Some(34.05), Some(-118.25));
        assert_eq!(
            query,
            "edition=E2014&region=COUS&imt=PGA&vs30=760&latitude=34.05&longitude=-118.25"
        );

        let link = decode(&query).unwrap();
        assert_eq!(link.selection, selection);
        assert_eq!(link.latitude, Some(34.05));
        assert_eq!(link.longitude, Some(-118.25));
    }

    #[test]
    fn test_multi_select_repeats_key() {
        let mut selection = Selection::new();
        selection.set_many(
            ParamKey::Edition,
            vec!["E2008".to_string(), "E2014".to_string()],
        );
        let query = encode(&selection, None, None);
        assert_eq!(query, "edition=E2008&edition=E2014");

        let link = decode(&query).unwrap();
        assert_eq!(link.selection.get(ParamKey::Edition).len(), 2);
    }

    #[test]
    fn test_leading_question_mark_and_empty() {
        let link = decode("?region=AK").unwrap();
        assert_eq!(link.selection.single(ParamKey::Region), Some("AK"));
        assert!(decode("").unwrap().is_empty());
        assert!(decode("?").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_unknown_and_malformed() {
        assert!(matches!(
            decode("magnitude=5").unwrap_err(),
            HazVisError::Query(_)
        ));
        assert!(decode("edition").is_err());
        assert!(decode("latitude=north").is_err());
        assert!(decode("imt=").is_err());
    }
}
