//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use crate::ai;
use crate::config::RecallConfig;
use crate::db;

/// Run database diagnostics and print a health report. With `test_ai`, also
/// send a one-line prompt to the configured provider.
pub async fn doctor(config: &RecallConfig, test_ai: bool) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run any command (e.g. `recallrift seed`) to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    println!("RecallRift Health Report");
    println!("========================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Row counts:");
    println!("  Memories:        {}", report.memory_count);
    println!("  Categories:      {}", report.category_count);
    println!("  Settings:        {}", report.setting_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore a copy of the database file from backup.");
        println!("  2. Or export from a good copy and reimport:");
        println!("     recallrift backup > backup.json");
        println!("     recallrift reset && recallrift import backup.json");
    }

    println!();
    println!("AI provider:       {} ({})", config.ai.provider, config.ai.model);
    let key = ai::resolve_api_key(&config.ai, &conn)?;
    println!(
        "API key:           {}",
        if key.is_some() { "configured" } else { "not set" }
    );

    if test_ai {
        let gateway = crate::server::build_gateway(config, &conn)?;
        match gateway.test_connection().await {
            Ok(reply) => println!("Connection test:   OK ({})", reply.trim()),
            Err(e) => println!("Connection test:   FAILED ({e})"),
        }
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
