//! Built-in memory templates.
//!
//! A template is a title pattern, a structured body, and default tags and
//! category. `{date}` and `{title}` placeholders are filled by
//! [`instantiate`].

use chrono::NaiveDate;
use serde::Serialize;

use super::types::NewMemory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub tags: &'static [&'static str],
}

pub const TEMPLATES: &[Template] = &[
    Template {
        id: "daily-reflection",
        name: "Daily Reflection",
        description: "Capture your daily thoughts and learnings",
        category: "Personal",
        title: "Daily Reflection - {date}",
        body: "What went well today:\n- \n\n\
               What could have been better:\n- \n\n\
               Key learnings:\n- \n\n\
               Tomorrow's priorities:\n- ",
        tags: &["daily", "reflection", "personal"],
    },
    Template {
        id: "idea-capture",
        name: "Idea Capture",
        description: "Record sudden insights and creative thoughts",
        category: "Ideas",
        title: "Idea: {title}",
        body: "💡 The Idea:\n\n\n\
               🎯 Why it matters:\n\n\n\
               📋 Next steps:\n- \n\n\
               🔗 Related thoughts:\n- ",
        tags: &["idea", "creative", "innovation"],
    },
    Template {
        id: "meeting-notes",
        name: "Meeting Notes",
        description: "Structured format for meeting documentation",
        category: "Work",
        title: "Meeting: {title}",
        body: "📅 Date: {date}\n👥 Attendees: \n\n\
               🎯 Objectives:\n- \n\n\
               📋 Key Discussion Points:\n- \n\n\
               ✅ Action Items:\n- [ ] \n\n\
               🔄 Follow-up:\n- ",
        tags: &["meeting", "work", "notes"],
    },
    Template {
        id: "goal-setting",
        name: "Goal Setting",
        description: "Define and track your objectives",
        category: "Goals",
        title: "Goal: {title}",
        body: "🎯 Goal Statement:\n\n\n\
               📊 Success Metrics:\n- \n\n\
               ⏰ Timeline:\n- Start: \n- Milestones: \n- End: \n\n\
               💪 Action Plan:\n- [ ] \n\n\
               🚧 Potential Obstacles:\n- \n\n\
               🎉 Why this matters:\n",
        tags: &["goal", "planning", "productivity"],
    },
    Template {
        id: "learning-notes",
        name: "Learning Notes",
        description: "Capture knowledge and insights from learning",
        category: "Learning",
        title: "Learning: {title}",
        body: "📚 Source: \n\n\
               🔑 Key Concepts:\n- \n\n\
               💡 Personal Insights:\n- \n\n\
               🎯 Applications:\n- \n\n\
               📝 Questions to explore:\n- \n\n\
               🔗 Related topics:\n- ",
        tags: &["learning", "knowledge", "education"],
    },
    Template {
        id: "project-planning",
        name: "Project Planning",
        description: "Structure your project ideas and plans",
        category: "Projects",
        title: "Project: {title}",
        body: "📋 Project Overview:\n\n\n\
               🎯 Objectives:\n- \n\n\
               📊 Requirements:\n- \n\n\
               📅 Timeline:\n- Phase 1: \n- Phase 2: \n- Phase 3: \n\n\
               👥 Resources Needed:\n- \n\n\
               🚀 Success Criteria:\n- ",
        tags: &["project", "planning", "work"],
    },
];

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Fill placeholders and build a memory ready for the store. An empty
/// `title` leaves the pattern's prefix, trimmed.
pub fn instantiate(template: &Template, title: &str, date: NaiveDate) -> NewMemory {
    let date = date.format("%Y-%m-%d").to_string();
    let fill = |text: &str| text.replace("{date}", &date).replace("{title}", title.trim());

    NewMemory::new(fill(template.title).trim_end(), fill(template.body))
        .with_category(template.category)
        .with_tags(template.tags.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn all_templates_produce_valid_memories() {
        assert_eq!(TEMPLATES.len(), 6);
        for template in TEMPLATES {
            let memory = instantiate(template, "Something", date());
            assert!(memory.validate().is_ok(), "{} is invalid", template.id);
            assert!(!memory.title.contains('{'));
            assert!(!memory.content.contains("{date}"));
        }
    }

    #[test]
    fn daily_reflection_uses_date() {
        let t = find_template("daily-reflection").unwrap();
        let memory = instantiate(t, "", date());
        assert_eq!(memory.title, "Daily Reflection - 2024-06-01");
        assert_eq!(memory.category.as_deref(), Some("Personal"));
        assert_eq!(memory.tags, vec!["daily", "reflection", "personal"]);
    }

    #[test]
    fn meeting_notes_fill_title_and_body_date() {
        let t = find_template("meeting-notes").unwrap();
        let memory = instantiate(t, " Roadmap sync ", date());
        assert_eq!(memory.title, "Meeting: Roadmap sync");
        assert!(memory.content.starts_with("📅 Date: 2024-06-01"));
    }

    #[test]
    fn unknown_template_is_none() {
        assert!(find_template("nope").is_none());
    }
}
