use std::{
    fs,
    path::{Path, PathBuf},
};

use addon_core::{
    descriptor::{read_source, DescriptorSource, SourceKind},
    error::ErrorContext,
    profile::import_json,
    types::AddOnDescriptor,
    AddOnResult,
};
use addon_utils::url::redact_credentials;
use nu_ansi_term::Color::{Blue, Cyan, Green};
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;

use crate::utils::{display_or_dash, Colored};

/// Builds descriptor sources, using `kind` for all files when given.
pub fn sources(files: &[PathBuf], kind: Option<&str>) -> Vec<DescriptorSource> {
    files
        .iter()
        .map(|file| {
            match kind {
                Some(kind) => {
                    let kind: SourceKind = kind.parse().unwrap_or(SourceKind::Plain);
                    DescriptorSource::new(file, kind)
                }
                None => DescriptorSource::from_path(file),
            }
        })
        .collect()
}

pub fn parse_lists(files: &[PathBuf], kind: Option<&str>, json: bool) -> AddOnResult<()> {
    let mut descriptors = Vec::new();
    for source in sources(files, kind) {
        descriptors.extend(read_source(&source)?);
    }
    display_descriptors("Add-on Lists", &descriptors, json)
}

pub fn import_profile(profile: &Path, json: bool) -> AddOnResult<()> {
    let content = fs::read_to_string(profile)
        .with_context(|| format!("reading profile {}", profile.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let descriptors = import_json(value)?;
    display_descriptors("Profile Add-ons", &descriptors, json)
}

fn display_descriptors(title: &str, descriptors: &[AddOnDescriptor], json: bool) -> AddOnResult<()> {
    if json {
        info!("{}", serde_json::to_string_pretty(descriptors)?);
        return Ok(());
    }

    if descriptors.is_empty() {
        info!("No add-ons found");
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.push_record(["URL", "Path", "Priority", "Name", "Products", "License"]);
    for descriptor in descriptors {
        builder.push_record([
            format!("{}", Colored(Blue, redact_credentials(&descriptor.url))),
            descriptor.product_dir.clone(),
            if descriptor.priority < 0 {
                "-".to_string()
            } else {
                descriptor.priority.to_string()
            },
            format!("{}", Colored(Cyan, display_or_dash(descriptor.display_name()))),
            display_or_dash(descriptor.install_products.as_ref().map(|p| p.join(", "))),
            display_or_dash(descriptor.confirm_license),
        ]);
    }

    let table = builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();
    info!("\n{table}");
    info!("Total: {} add-ons", Colored(Green, descriptors.len()));
    Ok(())
}
