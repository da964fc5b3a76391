//! Behavioral tests for the grid engine public surface.

use telegrid_core::{CellValue, GridEngine};

fn num(engine: &GridEngine, id: &str) -> f64 {
    match engine.cell_value(id).unwrap() {
        CellValue::Number(n) => n,
        other => panic!("expected a number in {}, got {:?}", id, other),
    }
}

#[test]
fn test_set_then_get_matches_direct_evaluation() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "2").unwrap();
    engine.set_cell_formula("A2", "3").unwrap();
    engine.set_cell_formula("B1", "=A1*A2+1").unwrap();
    assert_eq!(num(&engine, "B1"), 7.0);

    // Re-saving under unchanged dependencies is idempotent.
    engine.set_cell_formula("B1", "=A1*A2+1").unwrap();
    assert_eq!(num(&engine, "B1"), 7.0);
}

#[test]
fn test_formula_text_round_trip() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("B2", "  =A1+1  ").unwrap();
    assert_eq!(engine.cell_formula("B2").unwrap().as_deref(), Some("=A1+1"));

    engine.set_cell_formula("B2", "   ").unwrap();
    assert_eq!(engine.cell_formula("B2").unwrap(), None);
    assert_eq!(engine.cell_value("B2").unwrap(), CellValue::Empty);
}

#[test]
fn test_direct_dependents_refresh_immediately() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("B1", "=A1+1").unwrap();
    assert_eq!(engine.cell_value("B1").unwrap(), CellValue::Empty);

    engine.set_cell_formula("A1", "5").unwrap();
    assert_eq!(num(&engine, "B1"), 6.0);
}

#[test]
fn test_second_hop_stays_stale_until_resaved() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "5").unwrap();
    engine.set_cell_formula("B1", "=A1+1").unwrap();
    engine.set_cell_formula("C1", "=B1+1").unwrap();
    assert_eq!(num(&engine, "B1"), 6.0);
    assert_eq!(num(&engine, "C1"), 7.0);

    engine.set_cell_formula("A1", "6").unwrap();
    assert_eq!(num(&engine, "B1"), 7.0);
    // Propagation is one hop: C1 still holds the value computed from the old
    // B1 until it is itself re-saved.
    assert_eq!(num(&engine, "C1"), 7.0);

    engine.set_cell_formula("C1", "=B1+1").unwrap();
    assert_eq!(num(&engine, "C1"), 8.0);
}

#[test]
fn test_live_binding_lifecycle_and_reassignment_race() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("D4", "=LIVE('metric_x')").unwrap();
    assert!(engine.registry().contains("metric_x"));
    assert_eq!(engine.cell_value("D4").unwrap(), CellValue::Empty);

    engine.handle_channel_message(
        r#"{"type":"metrics:update","payload":{"name":"metric_x","value":42}}"#,
    );
    assert_eq!(num(&engine, "D4"), 42.0);

    // Reassigned to a plain formula: a later push for the old metric must
    // leave the cell untouched.
    engine.set_cell_formula("D4", "=1+1").unwrap();
    engine.handle_channel_message(
        r#"{"type":"metrics:update","payload":{"name":"metric_x","value":99}}"#,
    );
    assert_eq!(num(&engine, "D4"), 2.0);
}

#[test]
fn test_sandbox_rejects_foreign_identifiers() {
    let mut engine = GridEngine::new();
    for (id, formula) in [
        ("A1", "=process(1)"),
        ("A2", "=globalThis"),
        ("A3", "=Math"),
        ("A4", "=SIN(1)"),
        ("A5", "=foo_bar+1"),
    ] {
        engine.set_cell_formula(id, formula).unwrap();
        assert!(
            engine.cell_value(id).unwrap().is_error(),
            "{} must evaluate to an error",
            formula
        );
    }
}

#[test]
fn test_trailing_operator_faults_in_cell() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "5").unwrap();
    // Must not raise out of set_cell_formula.
    engine.set_cell_formula("B1", "=A1+").unwrap();
    assert!(engine.cell_value("B1").unwrap().is_error());
}

#[test]
fn test_missing_dependency_yields_empty_not_error() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("B1", "=Z99+1").unwrap();
    assert_eq!(engine.cell_value("B1").unwrap(), CellValue::Empty);

    // Filling the precedent refreshes the dependent on that edit.
    engine.set_cell_formula("Z99", "4").unwrap();
    assert_eq!(num(&engine, "B1"), 5.0);
}

#[test]
fn test_deleting_precedent_empties_dependent() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "5").unwrap();
    engine.set_cell_formula("B1", "=A1+1").unwrap();
    assert_eq!(num(&engine, "B1"), 6.0);

    engine.set_cell_formula("A1", "").unwrap();
    assert_eq!(engine.cell_value("B1").unwrap(), CellValue::Empty);
}

#[test]
fn test_one_fault_never_blocks_other_cells() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "=nonsense").unwrap();
    engine.set_cell_formula("B1", "=2+2").unwrap();
    assert!(engine.cell_value("A1").unwrap().is_error());
    assert_eq!(num(&engine, "B1"), 4.0);
}

#[test]
fn test_mutually_referential_cells_read_committed_scalars() {
    let mut engine = GridEngine::new();
    // No cycle detection and none needed: each save reads the other's
    // already-committed value.
    engine.set_cell_formula("A1", "=B1+1").unwrap();
    assert_eq!(engine.cell_value("A1").unwrap(), CellValue::Empty);

    engine.set_cell_formula("B1", "=A1+1").unwrap();
    // B1 saw A1's empty value; A1 was refreshed as a dependent of B1 and
    // still reads empty through B1.
    assert_eq!(engine.cell_value("B1").unwrap(), CellValue::Empty);
    assert_eq!(engine.cell_value("A1").unwrap(), CellValue::Empty);
}

#[test]
fn test_disposal_drops_subscriptions_and_rejects_edits() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "=LIVE('m')").unwrap();
    assert!(!engine.registry().is_empty());

    engine.dispose();
    assert!(engine.is_disposed());
    assert!(engine.registry().is_empty());
    assert!(engine.set_cell_formula("A1", "1").is_err());

    engine.handle_channel_message(r#"{"type":"metrics:update","payload":{"name":"m","value":1}}"#);
    assert_eq!(engine.cell_value("A1").unwrap(), CellValue::Empty);
}

#[test]
fn test_push_ignores_dependents_of_live_cells() {
    let mut engine = GridEngine::new();
    engine.set_cell_formula("A1", "=LIVE('m')").unwrap();
    engine.handle_metric_push("m", 10.0);
    engine.set_cell_formula("B1", "=A1*2").unwrap();
    assert_eq!(num(&engine, "B1"), 20.0);

    // A push refreshes the live cell only; readers of it stay stale until
    // re-saved.
    engine.handle_metric_push("m", 50.0);
    assert_eq!(num(&engine, "A1"), 50.0);
    assert_eq!(num(&engine, "B1"), 20.0);

    engine.set_cell_formula("B1", "=A1*2").unwrap();
    assert_eq!(num(&engine, "B1"), 100.0);
}
