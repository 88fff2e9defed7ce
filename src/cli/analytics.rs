//! CLI `analytics` command: render the analytics snapshot in the terminal.

use anyhow::Result;
use chrono::Local;

use crate::config::RecallConfig;
use crate::memory::analytics::{self, AnalyticsSnapshot, Goal};
use crate::memory::store;

const BAR_WIDTH: usize = 30;

pub fn analytics(config: &RecallConfig, json: bool) -> Result<()> {
    let conn = super::open_store(config)?;
    let memories = store::list_memories(&conn)?;
    let snapshot = analytics::aggregate(&memories, &Local::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(s: &AnalyticsSnapshot) {
    println!("Memory Analytics");
    println!("{}", "=".repeat(40));
    println!("  Total memories:      {}", s.total);
    println!("  Today:               {}", s.today);
    println!("  Last 7 days:         {}", s.last_7_days);
    println!("  Last 30 days:        {}", s.last_30_days);
    println!("  Favorites:           {}", s.favorites);
    println!("  Streak:              {} day(s)", s.streak_days);
    println!("  Productivity score:  {}/100", s.productivity_score);
    println!("  Average per week:    {:.1}", s.average_per_week);
    println!("  Average per day:     {:.1}", s.average_daily);
    println!();

    println!("Goals:");
    print_goal("daily", &s.goals.daily);
    print_goal("weekly", &s.goals.weekly);
    print_goal("monthly", &s.goals.monthly);
    println!();

    println!("Last 7 days:");
    let max = s.weekly_activity.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &s.weekly_activity {
        println!("  {}  {:<width$} {}", bucket.label, bar(bucket.count, max), bucket.count, width = BAR_WIDTH);
    }
    println!();

    println!("Monthly growth:");
    let max = s.monthly_growth.iter().map(|b| b.count).max().unwrap_or(0);
    for bucket in &s.monthly_growth {
        println!("  {}  {:<width$} {}", bucket.label, bar(bucket.count, max), bucket.count, width = BAR_WIDTH);
    }
    println!();

    println!("Weekly trends:");
    for week in &s.weekly_trends {
        println!("  {:<8} {}", week.label, week.count);
    }

    if !s.top_tags.is_empty() {
        println!();
        println!("Top tags:");
        for t in &s.top_tags {
            println!("  {:<20} {}", t.tag, t.count);
        }
    }
    if !s.top_categories.is_empty() {
        println!();
        println!("Top categories:");
        for c in &s.top_categories {
            println!("  {:<20} {}", c.category, c.count);
        }
    }
    if !s.peak_hours.is_empty() {
        println!();
        println!("Peak hours:");
        for h in &s.peak_hours {
            println!("  {:02}:00  {}", h.hour, h.count);
        }
    }
}

fn print_goal(name: &str, goal: &Goal) {
    println!(
        "  {:<8} {:>3}/{:<3} {:>3}%",
        name, goal.current, goal.target, goal.progress
    );
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat(count * BAR_WIDTH / max)
}
