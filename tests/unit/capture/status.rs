use super::*;

#[test]
fn messages() {
    assert_eq!(Status::Scanning.message(), "Scanning marker...");
    assert_eq!(Status::Processing.message(), "Processing your drawing...");
    assert_eq!(Status::Error("boom".into()).message(), "Error: boom");
    assert_eq!(Status::Idle.message(), IDLE_HINT);
}

#[test]
fn terminal_states_revert_after_delay() {
    let mut board = StatusBoard::new(Duration::from_millis(3000));
    let t0 = Instant::now();
    board.set_at_instant(Status::Success("Drawing added successfully!".into()), t0);

    let before = board.current_at(t0 + Duration::from_millis(2999));
    assert!(matches!(before, Status::Success(_)));
    let after = board.current_at(t0 + Duration::from_millis(3000));
    assert_eq!(after, Status::Idle);
}

#[test]
fn in_progress_states_do_not_revert() {
    let mut board = StatusBoard::new(Duration::from_millis(10));
    let t0 = Instant::now();
    board.set_at_instant(Status::Processing, t0);
    let later = board.current_at(t0 + Duration::from_secs(60));
    assert_eq!(later, Status::Processing);
}

#[test]
fn serializes_with_state_tag() {
    let json = serde_json::to_value(Status::Error("x".into())).unwrap();
    assert_eq!(json, serde_json::json!({"state": "error", "message": "x"}));
}
