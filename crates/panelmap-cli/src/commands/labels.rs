//! Labels command implementation

use super::load_data;
use crate::cli::{Cli, LabelsArgs};
use crate::config_loader::load_config;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::LabelsOutput;
use anyhow::{Context, Result};
use panelmap_core::models::{feature_collection, SiteFeature};
use panelmap_tracker::pipeline::COMPUTED_ANGLE_PROPERTY;
use panelmap_tracker::reposition_labels;
use std::fs;

pub async fn execute(cli: &Cli, args: &LabelsArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli, None)?;
    let data = load_data(&config).await?;

    if data.labels.is_none() && data.tables.is_none() {
        let tried: Vec<String> = data.failures.iter().map(ToString::to_string).collect();
        return Err(errors::no_data(&config.data_dir.value, &tried).into());
    }
    for failure in &data.failures {
        output.warning(failure);
    }

    // Lines come from the table layer, labels from the label layer
    let features: Vec<SiteFeature> = [data.tables.as_ref(), data.labels.as_ref()]
        .into_iter()
        .flatten()
        .flat_map(|collection| collection.features.iter().map(SiteFeature::from_geojson))
        .collect();

    let repositioned = reposition_labels(&features, &config.panel_layers.value);
    let moved = repositioned
        .iter()
        .filter(|feature| feature.properties.contains_key(COMPUTED_ANGLE_PROPERTY))
        .count();
    let collection =
        feature_collection(repositioned.iter().map(SiteFeature::to_geojson).collect());

    match &args.out {
        Some(path) => {
            let content = serde_json::to_string_pretty(&collection)?;
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

            if output.is_json() {
                output.result(LabelsOutput {
                    features: repositioned.len(),
                    repositioned: moved,
                    path: path.display().to_string(),
                })?;
            } else {
                output.success(format!(
                    "Repositioned {} of {} features, wrote {}",
                    moved,
                    repositioned.len(),
                    path.display()
                ));
            }
        }
        None => output.document(&collection)?,
    }
    Ok(())
}
