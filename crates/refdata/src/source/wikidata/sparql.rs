//! SPARQL queries and result parsing for the Wikidata source.
//!
//! Everything here is pure; the client only sends the queries and hands the
//! decoded payload back to the parsers.

use std::collections::HashMap;

use serde::Deserialize;

use refdata_core::places::{Country, Place};

/// Decoded `application/sparql-results+json` payload.
#[derive(Debug, Deserialize)]
pub struct SparqlResponse {
    pub results: SparqlResults,
}

#[derive(Debug, Deserialize)]
pub struct SparqlResults {
    pub bindings: Vec<HashMap<String, Binding>>,
}

/// A single bound value in a result row.
#[derive(Debug, Deserialize)]
pub struct Binding {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Binding {
    fn is_iri(&self) -> bool {
        self.kind == "uri"
    }
}

/// Returns true for a well-formed item identifier such as `Q142`.
pub fn is_qid(value: &str) -> bool {
    value
        .strip_prefix('Q')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Returns true for a value usable as an ISO 3166-1 code literal.
pub fn is_country_code(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Extracts the item identifier from an entity IRI.
fn entity_id(iri: &str) -> &str {
    iri.rsplit('/').next().unwrap_or(iri)
}

pub fn country_by_qid_query(qid: &str) -> String {
    format!(
        r#"SELECT ?alpha3 ?label WHERE {{
  VALUES ?country {{ wd:{qid} }}
  OPTIONAL {{ ?country wdt:P298 ?alpha3 }}
  OPTIONAL {{
    ?country rdfs:label ?label
    FILTER(LANG(?label) IN ("en", "mul"))
  }}
}}"#
    )
}

pub fn country_by_code_query(code: &str) -> String {
    format!(
        r#"SELECT DISTINCT ?country ?countryLabel WHERE {{
  VALUES ?code {{ "{code}" }}
  ?country p:P298 ?statement0.
  ?statement0 ps:P298 ?code.
  ?country p:P31 ?statement1.
  ?statement1 (ps:P31/(wdt:P279*)) wd:Q6256.
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "mul,en". }}
}}"#
    )
}

pub fn place_by_qid_query(qid: &str) -> String {
    format!(
        r#"SELECT ?country ?placeLabel WHERE {{
  VALUES ?place {{ wd:{qid} }}
  ?place wdt:P17 ?country.
  SERVICE wikibase:label {{ bd:serviceParam wikibase:language "[AUTO_LANGUAGE],en". }}
}}"#
    )
}

/// Builds a country from the first row of a by-QID query.
///
/// The `VALUES` clause yields a row even for unknown items; a row with
/// neither a code nor a label is treated as not found.
pub fn parse_country_by_qid(qid: &str, response: &SparqlResponse) -> Option<Country> {
    let row = response.results.bindings.first()?;
    let code = row.get("alpha3").map(|b| b.value.as_str());
    let label = row.get("label").map(|b| b.value.as_str());
    if code.is_none() && label.is_none() {
        return None;
    }
    Some(Country::new(qid, code, label.unwrap_or(qid)))
}

/// Builds a country from the first row of a by-code query.
pub fn parse_country_by_code(code: &str, response: &SparqlResponse) -> Option<Country> {
    response.results.bindings.iter().find_map(|row| {
        let country = row.get("country").filter(|b| b.is_iri())?;
        let qid = entity_id(&country.value);
        let label = row
            .get("countryLabel")
            .map(|b| b.value.as_str())
            .unwrap_or(qid);
        Some(Country::new(qid, Some(code), label))
    })
}

/// Builds a place from the first row whose country is an entity.
///
/// Places whose country is unknown or a blank value, such as "at sea",
/// have no usable country and are reported as not found.
pub fn parse_place(qid: &str, response: &SparqlResponse) -> Option<Place> {
    response.results.bindings.iter().find_map(|row| {
        let country = row.get("country").filter(|b| b.is_iri())?;
        let label = row
            .get("placeLabel")
            .map(|b| b.value.as_str())
            .unwrap_or(qid);
        Some(Place::new(qid, entity_id(&country.value), label))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> SparqlResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_is_qid() {
        assert!(is_qid("Q142"));
        assert!(!is_qid("Q"));
        assert!(!is_qid("P17"));
        assert!(!is_qid("Q1 }"));
        assert!(!is_qid(""));
    }

    #[test]
    fn test_is_country_code() {
        assert!(is_country_code("FRA"));
        assert!(!is_country_code("FR\""));
        assert!(!is_country_code(""));
    }

    #[test]
    fn test_queries_embed_keys() {
        assert!(country_by_qid_query("Q142").contains("wd:Q142"));
        assert!(country_by_code_query("FRA").contains("\"FRA\""));
        assert!(country_by_code_query("FRA").contains("wd:Q6256"));
        assert!(place_by_qid_query("Q90").contains("wdt:P17"));
    }

    #[test]
    fn test_parse_country_by_qid() {
        let payload = response(
            r#"{"head":{"vars":["alpha3","label"]},"results":{"bindings":[
                {"alpha3":{"type":"literal","value":"FRA"},
                 "label":{"xml:lang":"en","type":"literal","value":"France"}}
            ]}}"#,
        );

        let country = parse_country_by_qid("Q142", &payload).unwrap();

        assert_eq!(country, Country::new("Q142", Some("FRA"), "France"));
    }

    #[test]
    fn test_parse_country_label_falls_back_to_qid() {
        let payload = response(
            r#"{"results":{"bindings":[{"alpha3":{"type":"literal","value":"XKX"}}]}}"#,
        );

        let country = parse_country_by_qid("Q1246", &payload).unwrap();

        assert_eq!(country.label, "Q1246");
        assert_eq!(country.code.as_deref(), Some("XKX"));
    }

    #[test]
    fn test_parse_country_unknown_item() {
        assert_eq!(parse_country_by_qid("Q0", &response(r#"{"results":{"bindings":[{}]}}"#)), None);
        assert_eq!(parse_country_by_qid("Q0", &response(r#"{"results":{"bindings":[]}}"#)), None);
    }

    #[test]
    fn test_parse_country_by_code() {
        let payload = response(
            r#"{"results":{"bindings":[
                {"country":{"type":"uri","value":"http://www.wikidata.org/entity/Q55"},
                 "countryLabel":{"type":"literal","value":"Netherlands"}}
            ]}}"#,
        );

        let country = parse_country_by_code("NLD", &payload).unwrap();

        assert_eq!(country, Country::new("Q55", Some("NLD"), "Netherlands"));
    }

    #[test]
    fn test_parse_place() {
        let payload = response(
            r#"{"results":{"bindings":[
                {"country":{"type":"uri","value":"http://www.wikidata.org/entity/Q142"},
                 "placeLabel":{"type":"literal","value":"Paris"}}
            ]}}"#,
        );

        assert_eq!(
            parse_place("Q90", &payload),
            Some(Place::new("Q90", "Q142", "Paris"))
        );
    }

    #[test]
    fn test_parse_place_without_country_entity() {
        let payload = response(
            r#"{"results":{"bindings":[
                {"country":{"type":"bnode","value":"t123"},
                 "placeLabel":{"type":"literal","value":"at sea"}}
            ]}}"#,
        );

        assert_eq!(parse_place("Q16", &payload), None);
    }
}
