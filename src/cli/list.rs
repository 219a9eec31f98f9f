use super::ui;
use crate::core::config::AppConfig;
use crate::core::registry::{self, FundMeta, RegistryIndex, group_key};
use anyhow::{Result, bail};
use comfy_table::Cell;
use std::collections::BTreeMap;

pub fn run(config: &AppConfig, group: Option<&str>, search: Option<&str>) -> Result<()> {
    let registry_path = config.registry_path();
    let (registry, registry_error) = registry::load(&registry_path);
    if let Some(e) = registry_error {
        bail!(
            "{e}. Please ensure {} contains the fund registry.",
            registry_path.display()
        );
    }

    let listing = select(&registry, group, search)?;
    if listing.is_empty() {
        println!("No funds match the given filters.");
        return Ok(());
    }

    for (name, funds) in &listing {
        println!("\n{}", ui::style_text(name, ui::StyleType::Title));

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Identifier"),
            ui::header_cell("Scheme"),
            ui::header_cell("Code"),
        ]);
        for fund in funds {
            table.add_row(vec![
                Cell::new(&fund.identifier),
                Cell::new(&fund.scheme_name),
                Cell::new(&fund.source_code),
            ]);
        }
        println!("{table}");
    }
    Ok(())
}

/// Funds to list, grouped and ordered like the registry's grouped view.
fn select<'a>(
    registry: &'a RegistryIndex,
    group: Option<&str>,
    search: Option<&str>,
) -> Result<BTreeMap<String, Vec<&'a FundMeta>>> {
    let group = group.map(str::to_uppercase);
    if let Some(name) = group.as_deref().filter(|name| registry.group(name).is_none()) {
        let known: Vec<&str> = registry.group_names().collect();
        bail!("Unknown group {name}. Known groups: {}", known.join(", "));
    }

    let candidates: Vec<&FundMeta> = match search {
        Some(query) => registry.search(query),
        None => registry.groups().flat_map(|(_, funds)| funds).collect(),
    };

    let mut listing: BTreeMap<String, Vec<&FundMeta>> = BTreeMap::new();
    for fund in candidates {
        let key = group_key(&fund.scheme_name);
        if group.as_ref().is_none_or(|wanted| *wanted == key) {
            listing.entry(key).or_default().push(fund);
        }
    }
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RegistryIndex {
        RegistryIndex::from_json_str(
            r#"{
                "INF000A": {"scheme": "Alpha Growth Fund - Direct", "amfi": "100"},
                "INF000B": {"scheme": "Alpha Bluechip Fund - Regular", "amfi": "101"},
                "INF000C": {"scheme": "Beta Growth Fund - Direct", "amfi": "200"}
            }"#,
        )
        .unwrap()
    }

    fn ids(listing: &BTreeMap<String, Vec<&FundMeta>>, group: &str) -> Vec<String> {
        listing[group].iter().map(|f| f.identifier.clone()).collect()
    }

    #[test]
    fn test_select_all_groups() {
        let registry = registry();
        let listing = select(&registry, None, None).unwrap();

        assert_eq!(listing.keys().collect::<Vec<_>>(), vec!["ALPHA", "BETA"]);
        assert_eq!(ids(&listing, "ALPHA"), vec!["INF000B", "INF000A"]);
    }

    #[test]
    fn test_select_single_group_is_case_insensitive() {
        let registry = registry();
        let listing = select(&registry, Some("beta"), None).unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(ids(&listing, "BETA"), vec!["INF000C"]);
    }

    #[test]
    fn test_select_with_search() {
        let registry = registry();

        let listing = select(&registry, None, Some("growth direct")).unwrap();
        assert_eq!(ids(&listing, "ALPHA"), vec!["INF000A"]);
        assert_eq!(ids(&listing, "BETA"), vec!["INF000C"]);

        let listing = select(&registry, Some("ALPHA"), Some("growth")).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(ids(&listing, "ALPHA"), vec!["INF000A"]);
    }

    #[test]
    fn test_select_unknown_group() {
        let err = select(&registry(), Some("gamma"), None).unwrap_err();
        assert_eq!(err.to_string(), "Unknown group GAMMA. Known groups: ALPHA, BETA");
    }
}
