//! CLI `setting get|set` commands.

use anyhow::Result;

use crate::config::RecallConfig;
use crate::memory::settings;

/// Print one setting, or all of them when `key` is `None`. The AI key is
/// masked.
pub fn get(config: &RecallConfig, key: Option<&str>) -> Result<()> {
    let conn = super::open_store(config)?;
    match key {
        Some(key) => match settings::get_setting(&conn, key)? {
            Some(value) => println!("{}", display_value(key, &value)),
            None => println!("(not set)"),
        },
        None => {
            let all = settings::list_settings(&conn)?;
            if all.is_empty() {
                println!("No settings stored.");
            }
            for setting in all {
                println!("{} = {}", setting.key, display_value(&setting.key, &setting.value));
            }
        }
    }
    Ok(())
}

/// Store a setting. An empty value deletes it.
pub fn set(config: &RecallConfig, key: &str, value: &str) -> Result<()> {
    let conn = super::open_store(config)?;
    if value.is_empty() {
        let removed = settings::delete_setting(&conn, key)?;
        println!("{}", if removed { "Setting removed." } else { "Setting was not set." });
    } else {
        settings::set_setting(&conn, key, value)?;
        println!("Saved {key}.");
    }
    Ok(())
}

fn display_value(key: &str, value: &str) -> String {
    if key != settings::AI_API_KEY {
        return value.to_string();
    }
    let tail: String = value.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("****{tail}")
}
