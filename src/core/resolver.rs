//! Turns the user's selection into an ordered list of fetch targets

use super::registry::{FundMeta, RegistryIndex};
use serde::Serialize;

pub const DEFAULT_GUEST_LABEL: &str = "Benchmark";

/// A series to fetch and plot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchTarget {
    pub code: String,
    pub label: String,
    pub is_guest: bool,
}

/// The running list of funds a user has picked for comparison.
///
/// Scoped to one session; front ends serving several users keep one per user.
#[derive(Debug, Clone, Default)]
pub struct ComparisonSession {
    basket: Vec<FundMeta>,
}

impl ComparisonSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `fund` unless it is already in the basket. Returns whether it was added.
    pub fn add(&mut self, fund: FundMeta) -> bool {
        if self.basket.contains(&fund) {
            return false;
        }
        self.basket.push(fund);
        true
    }

    /// Removes the fund with `identifier`. Returns whether anything was removed.
    pub fn remove(&mut self, identifier: &str) -> bool {
        let before = self.basket.len();
        self.basket.retain(|fund| fund.identifier != identifier);
        self.basket.len() != before
    }

    pub fn clear(&mut self) {
        self.basket.clear();
    }

    pub fn basket(&self) -> &[FundMeta] {
        &self.basket
    }

    pub fn is_empty(&self) -> bool {
        self.basket.is_empty()
    }
}

/// Builds fetch targets: basket funds in order, then the guest if one was given.
///
/// A guest input matching a registry identifier is replaced by that fund's
/// source code; anything else is taken to be a source code already. Basket
/// and guest are not de-duplicated against each other.
pub fn resolve(
    basket: &[FundMeta],
    registry: &RegistryIndex,
    guest_input: Option<&str>,
    guest_label: &str,
) -> Vec<FetchTarget> {
    let mut targets: Vec<FetchTarget> = basket
        .iter()
        .map(|fund| FetchTarget {
            code: fund.source_code.clone(),
            label: fund.scheme_name.clone(),
            is_guest: false,
        })
        .collect();

    let guest = guest_input
        .map(|input| input.trim().to_uppercase())
        .filter(|input| !input.is_empty());
    if let Some(input) = guest {
        let code = registry
            .get(&input)
            .map_or(input, |fund| fund.source_code.clone());
        let label = match guest_label.trim() {
            "" => DEFAULT_GUEST_LABEL,
            label => label,
        };
        targets.push(FetchTarget {
            code,
            label: label.to_string(),
            is_guest: true,
        });
    }

    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegistryIndex {
        RegistryIndex::from_json_str(
            r#"{
                "INF000A": {"scheme": "Alpha Growth Fund", "amfi": "100"},
                "INF000B": {"scheme": "Beta Value Fund", "amfi": "200"},
                "INF000C": {"scheme": "Gamma Debt Fund", "amfi": "300"}
            }"#,
        )
        .unwrap()
    }

    fn fund(registry: &RegistryIndex, id: &str) -> FundMeta {
        registry.get(id).unwrap().clone()
    }

    #[test]
    fn test_empty_selection_yields_no_targets() {
        assert!(resolve(&[], &registry(), Some(""), DEFAULT_GUEST_LABEL).is_empty());
        assert!(resolve(&[], &registry(), None, DEFAULT_GUEST_LABEL).is_empty());
        assert!(resolve(&[], &registry(), Some("   "), DEFAULT_GUEST_LABEL).is_empty());
    }

    #[test]
    fn test_basket_order_is_preserved() {
        let reg = registry();
        let basket = vec![fund(&reg, "INF000C"), fund(&reg, "INF000A"), fund(&reg, "INF000B")];

        let targets = resolve(&basket, &reg, None, DEFAULT_GUEST_LABEL);
        let codes: Vec<&str> = targets.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["300", "100", "200"]);
        assert_eq!(targets[0].label, "Gamma Debt Fund");
        assert!(targets.iter().all(|t| !t.is_guest));
    }

    #[test]
    fn test_guest_identifier_resolves_to_source_code() {
        let reg = registry();
        let targets = resolve(&[], &reg, Some("  inf000b "), "My Benchmark");

        assert_eq!(
            targets,
            vec![FetchTarget {
                code: "200".to_string(),
                label: "My Benchmark".to_string(),
                is_guest: true,
            }]
        );
    }

    #[test]
    fn test_unknown_guest_is_used_verbatim() {
        let targets = resolve(&[], &registry(), Some(" 120503 "), DEFAULT_GUEST_LABEL);

        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].code, "120503");
        assert_eq!(targets[0].label, DEFAULT_GUEST_LABEL);
    }

    #[test]
    fn test_blank_guest_label_defaults_to_benchmark() {
        let targets = resolve(&[], &registry(), Some("120503"), "  ");
        assert_eq!(targets[0].label, DEFAULT_GUEST_LABEL);
    }

    #[test]
    fn test_guest_is_appended_after_basket_without_dedup() {
        let reg = registry();
        let basket = vec![fund(&reg, "INF000A"), fund(&reg, "INF000B")];

        let targets = resolve(&basket, &reg, Some("INF000A"), "Again");
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[0].code, "100");
        assert_eq!(targets[2].code, "100");
        assert!(targets[2].is_guest);
        assert_eq!(targets.iter().filter(|t| t.is_guest).count(), 1);
    }

    #[test]
    fn test_session_add_remove_clear() {
        let reg = registry();
        let mut session = ComparisonSession::new();

        assert!(session.add(fund(&reg, "INF000A")));
        assert!(session.add(fund(&reg, "INF000B")));
        assert!(!session.add(fund(&reg, "INF000A")));
        assert_eq!(session.basket().len(), 2);

        assert!(session.remove("INF000A"));
        assert!(!session.remove("INF000A"));
        assert_eq!(session.basket()[0].identifier, "INF000B");

        session.clear();
        assert!(session.is_empty());
    }
}
