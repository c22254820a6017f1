//! `vsc registry`: list extensions hosted on GitHub releases.

use colored::Colorize;
use serde::Serialize;
use vsc_extensions::{NonMarketplaceRegistry, Platform};

use crate::context::AppContext;
use crate::error::Result;

/// One registry entry with its asset for the current platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistryEntry {
    pub unique_id: &'static str,
    pub owner: &'static str,
    pub repo: &'static str,
    pub asset: &'static str,
}

pub fn registry_entries(registry: &NonMarketplaceRegistry, platform: Platform) -> Vec<RegistryEntry> {
    registry
        .iter()
        .map(|(unique_id, source)| RegistryEntry {
            unique_id,
            owner: source.owner,
            repo: source.repo,
            asset: source.asset_for(platform),
        })
        .collect()
}

/// Handle `vsc registry [--json]`
pub fn handle_registry(ctx: &AppContext, json: bool) -> Result<()> {
    let platform = ctx.asset_platform()?;
    let entries = registry_entries(NonMarketplaceRegistry::builtin(), platform);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!(
        "{} GitHub-hosted extensions ({}):",
        "=>".blue().bold(),
        platform.to_string().yellow()
    );
    for entry in &entries {
        println!(
            "   {} {} {}",
            entry.unique_id.cyan(),
            format!("{}/{}", entry.owner, entry.repo).dimmed(),
            entry.asset
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_entries_follow_platform() {
        let entries = registry_entries(NonMarketplaceRegistry::builtin(), Platform::Linux32);
        assert_eq!(
            entries,
            vec![RegistryEntry {
                unique_id: "ms-vscode.cpptools",
                owner: "Microsoft",
                repo: "vscode-cpptools",
                asset: "cpptools-linux32.vsix",
            }]
        );
    }

    #[test]
    fn test_empty_registry() {
        assert!(registry_entries(&NonMarketplaceRegistry::default(), Platform::Darwin).is_empty());
    }
}
