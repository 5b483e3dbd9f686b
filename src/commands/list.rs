use anyhow::Result;
use serde::Serialize;

use crate::scenarios::{ScenarioFilter, Suite, Tag};
use crate::types::OutputFormat;

#[derive(Debug, Serialize)]
pub struct ScenarioEntry {
    pub name: String,
    pub title: String,
    pub suite: Suite,
    pub tags: Vec<Tag>,
}

pub fn entries(filter: &ScenarioFilter) -> Vec<ScenarioEntry> {
    filter
        .select()
        .into_iter()
        .map(|id| ScenarioEntry {
            name: id.name(),
            title: id.title(),
            suite: id.suite(),
            tags: id.tags().to_vec(),
        })
        .collect()
}

pub async fn handle_list(filter: ScenarioFilter, format: OutputFormat) -> Result<()> {
    let entries = entries(&filter);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Simple => {
            for entry in &entries {
                let tags: Vec<String> = entry.tags.iter().map(|t| t.to_string()).collect();
                println!("{:<42} {} {}", entry.name, entry.title, tags.join(" "));
            }
            println!("{} scenarios", entries.len());
        }
    }
    Ok(())
}
