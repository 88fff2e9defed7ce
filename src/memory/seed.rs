//! Demo data for a fresh store.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

use super::types::NewMemory;
use super::{categories, store};

const DEMO_CATEGORIES: &[(&str, &str)] = &[
    ("Ideas", "#3B82F6"),
    ("Work", "#EF4444"),
    ("Personal", "#10B981"),
    ("Learning", "#F59E0B"),
    ("Random Thoughts", "#8B5CF6"),
];

struct DemoMemory {
    title: &'static str,
    content: &'static str,
    category: &'static str,
    tags: [&'static str; 3],
}

const DEMO_MEMORIES: &[DemoMemory] = &[
    DemoMemory {
        title: "App Idea: Local-First Note Taking",
        content: "Been thinking about building a note-taking app that works entirely offline. \
                  Users are getting tired of cloud-dependent apps. The key would be to make sync \
                  optional and ensure the app works perfectly without internet.",
        category: "Ideas",
        tags: ["app-development", "offline-first", "productivity"],
    },
    DemoMemory {
        title: "Meeting Notes: Q1 Planning",
        content: "Discussed quarterly goals with the team. Focus areas: 1) User acquisition - \
                  target 10k new users, 2) Feature development - complete mobile app, \
                  3) Performance optimization - reduce load times by 30%.",
        category: "Work",
        tags: ["meetings", "planning", "q1-goals"],
    },
    DemoMemory {
        title: "Book Insight: Atomic Habits",
        content: "James Clear's concept of \"1% better every day\" is powerful. Small improvements \
                  compound over time. The key is systems over goals - focus on the process, not \
                  the outcome.",
        category: "Learning",
        tags: ["books", "productivity", "habits"],
    },
    DemoMemory {
        title: "Weekend Project Ideas",
        content: "Some coding projects to try: 1) Build a personal dashboard with weather, news, \
                  and calendar, 2) Create a simple expense tracker, 3) Make a pomodoro timer \
                  with custom sounds.",
        category: "Personal",
        tags: ["projects", "coding", "weekend"],
    },
    DemoMemory {
        title: "React Performance Optimization",
        content: "Key techniques learned: 1) Use React.memo for expensive components, \
                  2) Implement useMemo and useCallback for heavy computations, 3) Code splitting \
                  with React.lazy, 4) Virtual scrolling for large lists.",
        category: "Learning",
        tags: ["react", "performance", "optimization"],
    },
    DemoMemory {
        title: "Shower Thought: Time Perception",
        content: "Why does time feel faster as we age? Maybe it's because each year becomes a \
                  smaller fraction of our total life experience. A year to a 10-year-old is 10% \
                  of their life, but to a 50-year-old, it's only 2%.",
        category: "Random Thoughts",
        tags: ["philosophy", "time", "perception"],
    },
    DemoMemory {
        title: "Design System Ideas",
        content: "For the new project, consider using: 1) Tailwind CSS for utility-first \
                  styling, 2) Radix UI for accessible components, 3) Framer Motion for \
                  animations, 4) Storybook for component documentation.",
        category: "Work",
        tags: ["design", "frontend", "tools"],
    },
    DemoMemory {
        title: "Travel Planning: Japan Trip",
        content: "Must-visit places: Tokyo (Shibuya, Harajuku), Kyoto (temples, bamboo forest), \
                  Osaka (food scene). Duration: 2 weeks. Best time: Spring for cherry blossoms or \
                  fall for colors.",
        category: "Personal",
        tags: ["travel", "japan", "planning"],
    },
];

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub memories: usize,
}

/// Insert demo categories and memories when the store has no memories.
/// Demo categories whose name already exists are not duplicated.
pub fn seed_demo_data(conn: &Connection) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    if store::count_memories(conn)? > 0 {
        tracing::info!("memories already present, skipping demo seed");
        return Ok(report);
    }

    for (name, color) in DEMO_CATEGORIES {
        if categories::get_category_by_name(conn, name)?.is_none() {
            categories::create_category(conn, name, Some(color))?;
            report.categories += 1;
        }
    }

    for demo in DEMO_MEMORIES {
        let new = NewMemory::new(demo.title, demo.content)
            .with_category(demo.category)
            .with_tags(demo.tags);
        store::create_memory(conn, &new)?;
        report.memories += 1;
    }

    tracing::info!(
        categories = report.categories,
        memories = report.memories,
        "demo data seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_seed_fills_empty_store_once() {
        let conn = db::open_memory_database().unwrap();
        let report = seed_demo_data(&conn).unwrap();
        assert_eq!(report, SeedReport { categories: 5, memories: 8 });

        let again = seed_demo_data(&conn).unwrap();
        assert_eq!(again, SeedReport::default());
        assert_eq!(store::count_memories(&conn).unwrap(), 8);
    }

    #[test]
    fn test_seed_skips_existing_category_names() {
        let conn = db::open_memory_database().unwrap();
        categories::create_category(&conn, "Work", None).unwrap();
        let report = seed_demo_data(&conn).unwrap();
        assert_eq!(report.categories, 4);
        assert_eq!(categories::list_categories(&conn).unwrap().len(), 5);
    }
}
