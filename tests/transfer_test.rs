mod helpers;

use helpers::{fixed_now, insert, memory_days_ago, test_db};
use recallrift::memory::transfer::{self, ExportOptions, ImportOptions, MergeMode, TransferError};
use recallrift::memory::{categories, store};

fn populate(conn: &rusqlite::Connection) {
    let now = fixed_now();
    let mut work = memory_days_ago("Sprint review", now, 2);
    work.category = Some("Work".into());
    work.tags = vec!["sprint".into(), "team".into()];
    work.is_favorite = true;
    insert(conn, work);

    let mut idea = memory_days_ago("App idea", now, 5);
    idea.tags = vec!["idea".into()];
    insert(conn, idea);

    insert(conn, memory_days_ago("Plain note", now, 9));
    categories::create_category(conn, "Work", Some("#10B981")).unwrap();
}

#[test]
fn export_then_import_into_empty_store_round_trips() {
    let source = test_db();
    populate(&source);

    let document = transfer::export(&source, &ExportOptions::default(), fixed_now()).unwrap();
    assert_eq!(document.metadata.total_memories, 3);
    let json = serde_json::to_string(&document).unwrap();

    let target = test_db();
    let report = transfer::import(&target, &json, &ImportOptions::default()).unwrap();
    assert_eq!(report.total, 3);
    assert_eq!(report.imported, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.errors, 0);
    assert_eq!(report.categories_created, 1);

    let before = store::list_memories(&source).unwrap();
    let after = store::list_memories(&target).unwrap();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.content, b.content);
        assert_eq!(a.category, b.category);
        assert_eq!(a.tags, b.tags);
        assert_eq!(a.is_favorite, b.is_favorite);
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(a.updated_at, b.updated_at);
    }

    let work = categories::get_category_by_name(&target, "Work").unwrap().unwrap();
    assert_eq!(work.color, "#10B981");
}

#[test]
fn backup_reimport_with_preserved_ids_is_idempotent() {
    let conn = test_db();
    populate(&conn);
    let json = serde_json::to_string(&transfer::backup(&conn, fixed_now()).unwrap()).unwrap();

    let target = test_db();
    let options = ImportOptions {
        preserve_ids: true,
        ..Default::default()
    };
    let first = transfer::import(&target, &json, &options).unwrap();
    assert_eq!(first.imported, 3);

    let second = transfer::import(&target, &json, &options).unwrap();
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(second.categories_created, 0);
    assert_eq!(store::count_memories(&target).unwrap(), 3);
}

#[test]
fn validation_failure_writes_nothing() {
    let conn = test_db();
    let json = r##"{
        "memories": [
            { "title": "Good", "content": "fine", "createdAt": "2024-05-01T10:00:00Z" },
            { "title": "Bad", "content": "", "createdAt": "2024-05-01T10:00:00Z" }
        ],
        "categories": [ { "name": "Work", "color": "#fff" } ]
    }"##;

    let err = transfer::import(&conn, json, &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, TransferError::Validation(_)));
    assert_eq!(store::count_memories(&conn).unwrap(), 0);
    assert!(categories::list_categories(&conn).unwrap().is_empty());
}

#[test]
fn malformed_json_is_rejected() {
    let conn = test_db();
    let err = transfer::import(&conn, "{ not json", &ImportOptions::default()).unwrap_err();
    assert!(matches!(err, TransferError::InvalidJson(_)));
}

#[test]
fn merge_mode_updates_existing_records() {
    let conn = test_db();
    populate(&conn);
    let mut doc = serde_json::to_value(transfer::backup(&conn, fixed_now()).unwrap()).unwrap();

    // Make the first exported memory newer, with an extra tag.
    let first = &mut doc["memories"][0];
    first["content"] = "edited elsewhere".into();
    first["tags"] = serde_json::json!(["fresh"]);
    first["updatedAt"] = "2030-01-01T00:00:00Z".into();
    let id = first["id"].as_str().unwrap().to_string();

    let options = ImportOptions {
        merge_mode: MergeMode::Merge,
        ..Default::default()
    };
    let report = transfer::import(&conn, &doc.to_string(), &options).unwrap();
    assert_eq!(report.imported, 3);

    let merged = store::get_memory(&conn, &id).unwrap().unwrap();
    assert_eq!(merged.content, "edited elsewhere");
    assert!(merged.has_tag("fresh"));
    assert!(merged.has_tag("sprint"));
    assert!(merged.is_favorite);
    assert_eq!(store::count_memories(&conn).unwrap(), 3);
}
