//! CLI `export` and `backup` commands.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, Utc};
use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::RecallConfig;
use crate::memory::search::parse_date_bound;
use crate::memory::transfer::{self, ExportDocument, ExportOptions, ExportRange};
use crate::memory::types::parse_tag_list;

#[derive(Debug, Default, Args)]
pub struct ExportArgs {
    /// all, last30, last90 or custom (with --start/--end)
    #[arg(long, default_value = "all")]
    pub range: String,
    /// Custom range start (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start: Option<String>,
    /// Custom range end, inclusive
    #[arg(long)]
    pub end: Option<String>,
    /// Comma-separated category names to keep
    #[arg(long)]
    pub categories: Option<String>,
    /// Comma-separated tags; memories with any of them are kept
    #[arg(long)]
    pub tags: Option<String>,
    /// Leave out ids and timestamps
    #[arg(long)]
    pub no_metadata: bool,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    fn to_options(&self) -> Result<ExportOptions> {
        let custom = || -> Result<ExportRange> {
            let start = self
                .start
                .as_deref()
                .map(|s| parse_date_bound(s, &Local, false))
                .transpose()
                .map_err(|e| anyhow!(e))?;
            let end = self
                .end
                .as_deref()
                .map(|e| parse_date_bound(e, &Local, true))
                .transpose()
                .map_err(|e| anyhow!(e))?;
            Ok(ExportRange::Custom { start, end })
        };

        let range = if self.start.is_some() || self.end.is_some() {
            custom()?
        } else {
            match self.range.trim().to_ascii_lowercase().as_str() {
                "" | "all" => ExportRange::All,
                "last30" => ExportRange::Last30,
                "last90" => ExportRange::Last90,
                "custom" => custom()?,
                other => bail!("unknown export range: {other} (expected all, last30, last90, custom)"),
            }
        };

        Ok(ExportOptions {
            range,
            categories: self
                .categories
                .as_deref()
                .map(|c| {
                    c.split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            tags: self.tags.as_deref().map(parse_tag_list).unwrap_or_default(),
            include_metadata: !self.no_metadata,
        })
    }
}

/// Export memories as JSON to stdout or a file.
pub fn export(config: &RecallConfig, args: &ExportArgs) -> Result<()> {
    let options = args.to_options()?;
    let conn = super::open_store(config)?;
    let document = transfer::export(&conn, &options, Utc::now())?;
    write_document(&document, args.output.as_deref())
}

/// Full backup of every memory and category.
pub fn backup(config: &RecallConfig, output: Option<&Path>) -> Result<()> {
    let conn = super::open_store(config)?;
    let document = transfer::backup(&conn, Utc::now())?;
    write_document(&document, output)
}

fn write_document(document: &ExportDocument, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write export file: {}", path.display()))?;
            eprintln!(
                "Exported {} memories to {}.",
                document.metadata.total_memories,
                path.display()
            );
        }
        None => {
            println!("{json}");
            eprintln!("Exported {} memories.", document.metadata.total_memories);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_export_everything() {
        let options = ExportArgs::default().to_options().unwrap();
        assert_eq!(options, ExportOptions::default());
    }

    #[test]
    fn test_bounds_imply_custom_range() {
        let args = ExportArgs {
            start: Some("2024-01-01T00:00:00Z".into()),
            categories: Some("Work, Ideas,".into()),
            no_metadata: true,
            ..Default::default()
        };
        let options = args.to_options().unwrap();
        assert!(matches!(
            options.range,
            ExportRange::Custom { start: Some(_), end: None }
        ));
        assert_eq!(options.categories, vec!["Work", "Ideas"]);
        assert!(!options.include_metadata);
    }

    #[test]
    fn test_unknown_range_rejected() {
        let args = ExportArgs {
            range: "forever".into(),
            ..Default::default()
        };
        assert!(args.to_options().is_err());
    }
}
