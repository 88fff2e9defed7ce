//! CLI `import` command: load an export or backup document.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::config::RecallConfig;
use crate::memory::transfer::{self, ImportOptions, MergeMode};

/// Import memories and categories from a JSON file.
///
/// Invalid JSON or a failed validation aborts before anything is written.
/// Per-memory failures are counted and reported at the end.
pub fn import(
    config: &RecallConfig,
    file: &Path,
    merge_mode: MergeMode,
    preserve_ids: bool,
    validate: bool,
) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let conn = super::open_store(config)?;
    let options = ImportOptions {
        merge_mode,
        preserve_ids,
        validate,
    };

    let total = count_memories(&json);
    println!("Importing {total} memories from {}...", file.display());

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .context("invalid progress template")?
            .progress_chars("##-"),
    );

    let result = transfer::import_with_progress(&conn, &json, &options, |done| {
        pb.set_position(done as u64)
    });
    pb.finish_and_clear();
    let report = result.context("import aborted; nothing was written")?;

    println!("Import complete:");
    println!("  Memories imported:  {}", report.imported);
    println!("  Memories skipped:   {} (already exist)", report.skipped);
    if report.errors > 0 {
        println!("  Errors:             {} (see log)", report.errors);
    }
    println!("  Categories created: {}", report.categories_created);

    Ok(())
}

/// Length of the `memories` array, for sizing the progress bar only.
fn count_memories(json: &str) -> usize {
    serde_json::from_str::<serde_json::Value>(json)
        .ok()
        .and_then(|v| v.get("memories").and_then(|m| m.as_array()).map(Vec::len))
        .unwrap_or(0)
}
