//! `vsc info`: show what an extension resolves to.

use colored::Colorize;
use vsc_extensions::{Extension, ExtensionId, resolve};
use vsc_tunnel::Channel;

use crate::context::AppContext;
use crate::error::Result;

/// Resolve `id` with the context's defaults.
pub fn lookup(channel: &dyn Channel, ctx: &AppContext, id: &str) -> Result<Extension> {
    let unique_id = ExtensionId::parse(id)?;
    let options = ctx.resolve_options(None, None);
    Ok(resolve(&unique_id, channel, &options)?)
}

/// Label/value rows describing `ext`. Absent values are skipped.
pub fn info_rows(ext: &Extension) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Id", ext.unique_id().to_string()),
        ("Source", format!("{:?}", ext.source_type())),
    ];

    match ext {
        Extension::Marketplace(m) => {
            if let Some(name) = &m.display_name {
                rows.push(("Name", name.clone()));
            }
            rows.push(("Publisher", m.publisher_name.clone()));
            rows.push(("Version", m.version.clone()));
            if let Some(description) = &m.description {
                rows.push(("Description", description.clone()));
            }
            if let Some(installs) = m.install_count() {
                rows.push(("Installs", installs.to_string()));
            }
            if let Some(engine) = &m.code_engine {
                rows.push(("Engine", engine.clone()));
            }
            if let Some(pack) = m.extension_pack.as_ref().filter(|p| !p.is_empty()) {
                rows.push(("Extension pack", pack.join(", ")));
            }
            if let Some(deps) = m.extension_dependencies.as_ref().filter(|d| !d.is_empty()) {
                rows.push(("Dependencies", deps.join(", ")));
            }
        }
        Extension::GitHub(g) => {
            rows.push(("Repository", format!("{}/{}", g.owner(), g.repo())));
            rows.push(("Release", g.release().to_string()));
            rows.push(("Asset", g.asset_name().to_string()));
        }
    }

    rows.push((
        "Download",
        ext.download_url().unwrap_or("(unresolved)").to_string(),
    ));
    rows
}

/// Handle `vsc info <id> [--json]`
pub fn handle_info(channel: &dyn Channel, ctx: &AppContext, id: &str, json: bool) -> Result<()> {
    let ext = lookup(channel, ctx, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ext)?);
        return Ok(());
    }

    let rows = info_rows(&ext);
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    for (label, value) in rows {
        println!("{}  {}", format!("{label:>width$}").bold(), value);
    }
    Ok(())
}
