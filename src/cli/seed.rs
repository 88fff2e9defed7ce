//! CLI `seed` command: load demo data into an empty store.

use anyhow::Result;

use crate::config::RecallConfig;
use crate::memory::seed;

pub fn seed(config: &RecallConfig) -> Result<()> {
    let conn = super::open_store(config)?;
    let report = seed::seed_demo_data(&conn)?;

    if report.memories == 0 {
        println!("Store already has memories; nothing seeded.");
    } else {
        println!(
            "Seeded {} memories and {} categories.",
            report.memories, report.categories
        );
    }
    Ok(())
}
