use clippoo_seed::db::Database;
use clippoo_seed::report::{preview, RecentEntry, SeedReport};
use clippoo_seed::Seeder;

fn row(id: i64, text: &str) -> RecentEntry {
    RecentEntry {
        id,
        preview: preview(text, 30),
        is_default: false,
        timestamp: "2026-10-15 12:00:00".to_string(),
    }
}

fn report(recent: Vec<RecentEntry>) -> SeedReport {
    SeedReport {
        inserted: 0,
        refreshed: 0,
        total_count: 42,
        recent,
        recent_limit: 10,
        preview_width: 30,
    }
}

#[test]
fn test_preview_counts_characters() {
    assert_eq!(preview("short", 30), "short");
    assert_eq!(preview("abcdef", 3), "abc");
    let crabs = "🦀".repeat(40);
    assert_eq!(preview(&crabs, 30).chars().count(), 30);
    assert_eq!(preview("", 30), "");
}

#[test]
fn test_table_layout() {
    let out = report(vec![row(7, "short"), row(123, &"x".repeat(50))]).to_string();
    let lines: Vec<_> = out.lines().collect();

    assert_eq!(lines[0], "Total entries: 42");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "Latest 10 entries:");
    assert_eq!(
        lines[3],
        format!("ID:   7 | {:<30} | 2026-10-15 12:00:00", "short")
    );
    assert_eq!(
        lines[4],
        format!("ID: 123 | {} | 2026-10-15 12:00:00", "x".repeat(30))
    );
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_wide_ids_are_not_truncated() {
    let out = report(vec![row(12345, "a")]).to_string();
    assert!(out.contains("ID: 12345 | a"), "{out}");
}

#[test]
fn test_json_report() {
    let db = Database::open_in_memory().unwrap();
    let report = Seeder::new(&db)
        .seed(&["first".to_string(), "second".to_string()])
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["total_count"], 2);
    assert_eq!(value["inserted"], 2);
    assert_eq!(value["recent"][0]["preview"], "second");
    assert_eq!(value["recent"][1]["is_default"], true);
    assert!(value.get("preview_width").is_none());
}
