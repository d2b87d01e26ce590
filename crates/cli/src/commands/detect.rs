// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use mipsvm_state::{detect_version, is_binary_container, StateError, StateVersion};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
pub struct DetectRow {
    pub path: PathBuf,
    pub classification: &'static str,
    pub version: Option<StateVersion>,
    pub tag: Option<u32>,
    pub error: Option<String>,
}

fn describe(err: &StateError) -> &'static str {
    if err.is_environmental() {
        "ENV"
    } else if err.is_format() {
        "FORMAT"
    } else {
        "ERROR"
    }
}

pub fn report(paths: &[PathBuf]) -> Vec<DetectRow> {
    paths
        .iter()
        .map(|path| {
            let classification = if is_binary_container(path) { "binary" } else { "textual" };
            match detect_version(path) {
                Ok(v) => DetectRow {
                    path: path.clone(),
                    classification,
                    version: Some(v),
                    tag: Some(v.as_u32()),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), kind = describe(&e), "detection failed: {e}");
                    DetectRow {
                        path: path.clone(),
                        classification,
                        version: None,
                        tag: match e {
                            StateError::UnknownVersion(u) => Some(u),
                            _ => None,
                        },
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

pub fn run(paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let rows = report(paths);
    let failed = rows.iter().filter(|r| r.error.is_some()).count();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["File", "Kind", "Version", "Details"]);

        for row in &rows {
            let version = match (row.version, row.tag) {
                (Some(v), _) => format!("{} ({})", v, v.as_u32()),
                (None, Some(tag)) => format!("? ({tag})"),
                (None, None) => "-".to_string(),
            };
            table.add_row(vec![
                row.path.display().to_string(),
                row.classification.to_string(),
                version,
                row.error.clone().unwrap_or_default(),
            ]);
        }

        println!("\nState Version Report\n");
        println!("{table}\n");
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} file(s) could not be detected", rows.len());
    }
    Ok(())
}
