use std::{path::PathBuf, sync::Arc};

use addon_config::config::Config;
use addon_core::{capability::Capabilities, AddOnResult};
use addon_events::EventSinkHandle;
use addon_operations::{add::add_preselected_addon_products, profile::export_profile, AddOnContext};
use nu_ansi_term::Color::{Green, Red};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::{
    events::TerminalSink,
    parse::sources,
    simulate::{LocalFiles, SimulatedInstaller, SimulatedPackageManager, TerminalPrompt},
    utils::{display_or_dash, Colored},
};

pub fn create_context(config: Config, assume_yes: bool) -> AddOnContext {
    let package_manager = Arc::new(SimulatedPackageManager::default());
    let capabilities = Capabilities::new(
        package_manager.clone(),
        Arc::new(TerminalPrompt::new(assume_yes)),
        Arc::new(SimulatedInstaller),
        Arc::new(LocalFiles::new(package_manager)),
    );
    let events: EventSinkHandle = Arc::new(TerminalSink);
    AddOnContext::new(config, capabilities, events)
}

pub fn export_lists(
    config: Config,
    files: &[PathBuf],
    kind: Option<&str>,
    assume_yes: bool,
    json: bool,
) -> AddOnResult<()> {
    let ctx = create_context(config, assume_yes);
    let sources = sources(files, kind);
    let report = add_preselected_addon_products(&ctx, Some(&sources))?;
    let profile = export_profile(&ctx)?;

    if json {
        info!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "report": report,
                "profile": profile,
            }))?
        );
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["Status", "Repository", "Product", "Detail"]);
    for integrated in &report.integrated {
        builder.push_record([
            format!("{}", Colored(Green, "integrated")),
            integrated.repo_id.to_string(),
            display_or_dash(Some(&integrated.product).filter(|p| !p.is_empty())),
            integrated.media_url.clone(),
        ]);
    }
    for failed in &report.failed {
        builder.push_record([
            format!("{}", Colored(Red, "failed")),
            "-".to_string(),
            display_or_dash(failed.name.as_deref()),
            failed.error.clone(),
        ]);
    }
    let table = builder
        .build()
        .with(Panel::header("Add-on Integration"))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
    if !report.selected_products.is_empty() {
        info!("Selected products: {}", report.selected_products.join(", "));
    }
    info!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}
