use super::*;

fn row(label: &str, value: &str, badge: &str, bg: &str) -> StageRow {
    StageRow {
        label: label.to_string(),
        value: value.to_string(),
        badge_class: badge.to_string(),
        background: bg.to_string(),
    }
}

#[test]
fn collect_trims_and_applies_defaults() {
    let stages = collect(&[row("  QA ", " qa", "  ", "")]);
    assert_eq!(
        stages,
        vec![Stage {
            label: "QA".to_string(),
            value: "qa".to_string(),
            badge_class: DEFAULT_BADGE_CLASS.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
        }]
    );
}

#[test]
fn collect_drops_rows_missing_label_or_value() {
    let rows = [
        row("", "x", "b", "#000000"),
        row("x", "   ", "b", "#000000"),
        row("  ", "", "", ""),
        row("Dev", "dev", "badge-info", "#10b981"),
    ];
    let stages = collect(&rows);
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].value, "dev");
}

#[test]
fn collect_keeps_display_order() {
    let mut rows = StageRows::new(vec![
        row("A", "a", "", ""),
        row("B", "b", "", ""),
        row("C", "c", "", ""),
    ]);
    assert!(rows.move_up(2));
    assert!(rows.move_down(0));
    let labels: Vec<String> = rows.collect().into_iter().map(|s| s.label).collect();
    assert_eq!(labels, ["C", "A", "B"]);
}

#[test]
fn moves_at_the_edges_are_rejected() {
    let mut rows = StageRows::new(vec![row("A", "a", "", ""), row("B", "b", "", "")]);
    assert!(!rows.move_up(0));
    assert!(!rows.move_down(1));
    assert!(!rows.move_down(7));
    assert_eq!(rows.as_slice()[0].label, "A");
}

#[test]
fn blank_rows_are_excluded_until_filled_in() {
    let mut rows = StageRows::default();
    let idx = rows.push_blank();
    assert!(rows.collect().is_empty());

    let r = rows.get_mut(idx).expect("row");
    *r.field_mut(StageField::Label) = "Prod".to_string();
    *r.field_mut(StageField::Value) = "prod".to_string();
    let stages = rows.collect();
    assert_eq!(stages.len(), 1);
    assert_eq!(stages[0].background, DEFAULT_BACKGROUND);
}

#[test]
fn loaded_stage_fills_missing_fields() {
    let row = StageRow::from_json(&serde_json::json!({"label": "QA"}));
    assert_eq!(row.label, "QA");
    assert_eq!(row.value, "");
    assert_eq!(row.badge_class, "");
    assert_eq!(row.background, DEFAULT_BACKGROUND);
}

#[test]
fn stage_serializes_with_camel_case_keys() {
    let stage = row("QA", "qa", "badge-info", "#3b82f6")
        .to_stage()
        .expect("stage");
    let v = serde_json::to_value(&stage).expect("serialize");
    assert_eq!(
        v,
        serde_json::json!({
            "label": "QA",
            "value": "qa",
            "badgeClass": "badge-info",
            "background": "#3b82f6"
        })
    );
}
