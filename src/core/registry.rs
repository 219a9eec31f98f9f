//! Fund registry: identifier lookup and grouped listing

use super::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Group used for funds whose scheme name is blank.
pub const OTHER_GROUP: &str = "OTHER";

/// A fund that can be fetched from the NAV source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundMeta {
    pub identifier: String,
    pub scheme_name: String,
    pub source_code: String,
}

/// Lookup views over the set of fetchable funds.
#[derive(Debug, Clone, Default)]
pub struct RegistryIndex {
    by_identifier: HashMap<String, FundMeta>,
    groups: BTreeMap<String, Vec<FundMeta>>,
}

#[derive(Debug, Deserialize)]
struct RegistryEntry {
    scheme: Option<String>,
    amfi: Option<SourceCode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SourceCode {
    Number(serde_json::Number),
    Text(String),
}

impl SourceCode {
    fn into_code(self) -> Option<String> {
        let code = match self {
            SourceCode::Number(n) if n.as_f64() == Some(0.0) => return None,
            SourceCode::Number(n) => n.to_string(),
            SourceCode::Text(s) => s.trim().to_string(),
        };
        (!code.is_empty()).then_some(code)
    }
}

/// Derives the pseudo-group of a fund: the uppercased first word of its name.
pub fn group_key(scheme_name: &str) -> String {
    scheme_name
        .split_whitespace()
        .next()
        .map_or_else(|| OTHER_GROUP.to_string(), str::to_uppercase)
}

impl RegistryIndex {
    /// Builds the index from a JSON object of `identifier -> {scheme, amfi}`.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| PipelineError::RegistryUnavailable(format!("malformed registry: {e}")))?;
        Ok(Self::from_entries(raw))
    }

    fn from_entries(raw: HashMap<String, serde_json::Value>) -> Self {
        let mut index = Self::default();

        for (identifier, value) in raw {
            let entry: RegistryEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping {identifier}: malformed entry ({e})");
                    continue;
                }
            };
            let Some(source_code) = entry.amfi.and_then(SourceCode::into_code) else {
                debug!("Skipping {identifier}: no source code");
                continue;
            };
            let scheme_name = entry.scheme.unwrap_or_else(|| identifier.clone());
            let fund = FundMeta {
                identifier: identifier.clone(),
                scheme_name,
                source_code,
            };

            index
                .groups
                .entry(group_key(&fund.scheme_name))
                .or_default()
                .push(fund.clone());
            index.by_identifier.insert(identifier, fund);
        }

        for funds in index.groups.values_mut() {
            funds.sort_by(|a, b| {
                a.scheme_name
                    .cmp(&b.scheme_name)
                    .then_with(|| a.identifier.cmp(&b.identifier))
            });
        }
        index
    }

    pub fn get(&self, identifier: &str) -> Option<&FundMeta> {
        self.by_identifier.get(identifier)
    }

    /// Funds in `group`, sorted by scheme name.
    pub fn group(&self, group: &str) -> Option<&[FundMeta]> {
        self.groups.get(group).map(Vec::as_slice)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &[FundMeta])> {
        self.groups
            .iter()
            .map(|(name, funds)| (name.as_str(), funds.as_slice()))
    }

    /// Funds whose scheme name contains every term of `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&FundMeta> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        self.groups
            .values()
            .flatten()
            .filter(|fund| {
                let name = fund.scheme_name.to_lowercase();
                terms.iter().all(|term| name.contains(term.as_str()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_identifier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identifier.is_empty()
    }
}

/// Loads the registry from `path`.
///
/// Never fails hard: a missing or malformed file yields an empty index plus
/// the error, so callers can show an empty state instead of aborting.
pub fn load<P: AsRef<Path>>(path: P) -> (RegistryIndex, Option<PipelineError>) {
    let path = path.as_ref();
    let result = fs::read_to_string(path)
        .map_err(|e| {
            PipelineError::RegistryUnavailable(format!("cannot read {}: {e}", path.display()))
        })
        .and_then(|json| RegistryIndex::from_json_str(&json));

    match result {
        Ok(index) => {
            info!(
                funds = index.len(),
                groups = index.groups.len(),
                "Loaded fund registry from {}",
                path.display()
            );
            (index, None)
        }
        Err(e) => {
            warn!(error = %e, "Fund registry not loaded");
            (RegistryIndex::default(), Some(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const REGISTRY_JSON: &str = r#"{
        "INF000A": {"scheme": "Alpha Growth Fund", "amfi": "100"},
        "INF000B": {"scheme": "Alpha Bluechip Fund", "amfi": 101},
        "INF000C": {"scheme": "beta Value Fund", "amfi": "102"},
        "INF000D": {"scheme": "Gamma Fund"},
        "INF000E": {"scheme": "Delta Fund", "amfi": ""},
        "INF000F": {"amfi": "105"},
        "INF000G": {"scheme": "", "amfi": "106"},
        "INF000H": {"scheme": "Alpha Arbitrage Fund", "amfi": null}
    }"#;

    #[test]
    fn test_single_entry_registry() {
        let index = RegistryIndex::from_json_str(
            r#"{"INF000A": {"scheme": "Alpha Growth Fund", "amfi": "100"}}"#,
        )
        .unwrap();

        let fund = index.get("INF000A").unwrap();
        assert_eq!(fund.scheme_name, "Alpha Growth Fund");
        assert_eq!(fund.source_code, "100");

        let group = index.group("ALPHA").unwrap();
        assert_eq!(group, &[fund.clone()]);
    }

    #[test]
    fn test_entries_without_source_code_are_excluded() {
        let index = RegistryIndex::from_json_str(REGISTRY_JSON).unwrap();

        assert_eq!(index.len(), 5);
        assert!(index.get("INF000D").is_none());
        assert!(index.get("INF000E").is_none());
        assert!(index.get("INF000H").is_none());

        let grouped: usize = index.groups().map(|(_, funds)| funds.len()).sum();
        assert_eq!(grouped, index.len());
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let index = RegistryIndex::from_json_str(
            r#"{
                "INF000A": {"scheme": "Alpha Growth Fund", "amfi": "100"},
                "INF000Z": {"scheme": "Zeta Fund", "amfi": false},
                "INF000Y": {"scheme": "Yield Fund", "amfi": {}},
                "INF000X": {"scheme": 42, "amfi": "103"},
                "INF000W": [1, 2]
            }"#,
        )
        .unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get("INF000A").unwrap().source_code, "100");
        assert!(index.get("INF000Z").is_none());
        assert!(index.group("ZETA").is_none());
    }

    #[test]
    fn test_zero_source_code_is_missing() {
        let index = RegistryIndex::from_json_str(
            r#"{
                "INF000A": {"scheme": "Alpha Growth Fund", "amfi": 0},
                "INF000B": {"scheme": "Alpha Bluechip Fund", "amfi": 0.0},
                "INF000C": {"scheme": "Beta Value Fund", "amfi": 200}
            }"#,
        )
        .unwrap();

        assert_eq!(index.len(), 1);
        assert!(index.get("INF000A").is_none());
        assert!(index.get("INF000B").is_none());
        assert!(index.group("ALPHA").is_none());
    }

    #[test]
    fn test_numeric_source_code_is_coerced() {
        let index = RegistryIndex::from_json_str(REGISTRY_JSON).unwrap();
        assert_eq!(index.get("INF000B").unwrap().source_code, "101");
    }

    #[test]
    fn test_scheme_name_falls_back_to_identifier() {
        let index = RegistryIndex::from_json_str(REGISTRY_JSON).unwrap();

        let fund = index.get("INF000F").unwrap();
        assert_eq!(fund.scheme_name, "INF000F");
        assert!(index.group("INF000F").is_some());
    }

    #[test]
    fn test_blank_scheme_name_goes_to_other_group() {
        let index = RegistryIndex::from_json_str(REGISTRY_JSON).unwrap();

        let other = index.group(OTHER_GROUP).unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].identifier, "INF000G");
    }

    #[test]
    fn test_groups_are_uppercased_and_sorted_by_label() {
        let index = RegistryIndex::from_json_str(REGISTRY_JSON).unwrap();

        let names: Vec<&str> = index.group_names().collect();
        assert_eq!(names, vec!["ALPHA", "BETA", "INF000F", "OTHER"]);

        let alpha: Vec<&str> = index
            .group("ALPHA")
            .unwrap()
            .iter()
            .map(|f| f.scheme_name.as_str())
            .collect();
        assert_eq!(alpha, vec!["Alpha Bluechip Fund", "Alpha Growth Fund"]);
    }

    #[test]
    fn test_group_key() {
        assert_eq!(group_key("Alpha Growth Fund"), "ALPHA");
        assert_eq!(group_key("  axis   bank"), "AXIS");
        assert_eq!(group_key(""), OTHER_GROUP);
        assert_eq!(group_key("   "), OTHER_GROUP);
    }

    #[test]
    fn test_search_matches_all_terms_case_insensitively() {
        let index = RegistryIndex::from_json_str(REGISTRY_JSON).unwrap();

        let hits: Vec<&str> = index
            .search("alpha FUND")
            .iter()
            .map(|f| f.identifier.as_str())
            .collect();
        assert_eq!(hits, vec!["INF000B", "INF000A"]);

        assert_eq!(index.search("value").len(), 1);
        assert!(index.search("alpha value").is_empty());
    }

    #[test]
    fn test_malformed_registry_is_unavailable() {
        let err = RegistryIndex::from_json_str(r#"["not", "an", "object"]"#).unwrap_err();
        assert!(matches!(err, PipelineError::RegistryUnavailable(_)));
    }

    #[test]
    fn test_load_missing_file_returns_empty_index_and_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let (index, err) = load(dir.path().join("missing.json"));

        assert!(index.is_empty());
        assert!(matches!(err, Some(PipelineError::RegistryUnavailable(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REGISTRY_JSON.as_bytes()).unwrap();

        let (index, err) = load(file.path());
        assert!(err.is_none());
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_load_corrupt_file_returns_empty_index_and_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let (index, err) = load(file.path());
        assert!(index.is_empty());
        assert!(err.is_some());
    }
}
