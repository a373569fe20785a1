//! Tests for move submission, refresh sequencing and the automated reply.

mod common;

use chess_client::{Move, PlayerAssignment, TurnIndicator};

use common::{config_for, controller, opened, pump_until, settle, sq, Call, FakeService};

#[tokio::test]
async fn test_accepted_move_refreshes_once() {
    let fake = FakeService::new();
    fake.apply_submissions();
    let mut c = controller(&fake, &config_for(PlayerAssignment::Both));
    opened(&mut c).await;
    let baseline = fake.snapshot_calls();

    c.begin_drag(sq(6, 4));
    c.drop_on(sq(4, 4));
    c.end_drag();
    pump_until(&mut c, |c| c.view_model().snapshots_applied() >= 2).await;
    settle().await;
    c.process_pending();

    assert_eq!(fake.snapshot_calls(), baseline + 1);
    assert_eq!(c.view_model().turn(), TurnIndicator::Black);
    assert_eq!(c.view_model().history().len(), 1);
    assert_eq!(
        c.view_model().last_move().map(|r| r.mv()),
        Some(Move::new(sq(6, 4), sq(4, 4)))
    );
    assert_eq!(fake.count(|call| *call == Call::AutoReply), 0);
}

#[tokio::test]
async fn test_rejected_move_leaves_board_and_notifies() {
    let fake = FakeService::new();
    fake.reject_moves("Not your turn");
    let mut c = controller(&fake, &config_for(PlayerAssignment::White));
    opened(&mut c).await;
    let before = c.view_model().board().clone();
    let baseline = fake.snapshot_calls();

    c.begin_drag(sq(6, 4));
    c.drop_on(sq(4, 4));
    c.end_drag();
    pump_until(&mut c, |c| c.notification().is_some()).await;
    settle().await;
    c.process_pending();

    assert_eq!(c.view_model().board(), &before);
    assert_eq!(fake.snapshot_calls(), baseline);
    let notification = c.dismiss_notification().expect("notified");
    assert!(notification.title.contains("e2-e4"));
    assert_eq!(notification.message, "Server rejected request: Not your turn");
    assert!(c.notification().is_none());
}

#[tokio::test]
async fn test_auto_respond_requests_reply_after_refresh() {
    let fake = FakeService::new();
    fake.apply_submissions();
    let config = config_for(PlayerAssignment::White).with_auto_respond(true);
    let mut c = controller(&fake, &config);
    opened(&mut c).await;
    let baseline = fake.snapshot_calls();

    c.begin_drag(sq(6, 4));
    c.drop_on(sq(4, 4));
    c.end_drag();
    pump_until(&mut c, |c| c.view_model().snapshots_applied() >= 3).await;

    let calls = fake.calls();
    let submit = calls
        .iter()
        .position(|call| matches!(call, Call::Submit(..)))
        .expect("submitted");
    let reply = calls
        .iter()
        .position(|call| *call == Call::AutoReply)
        .expect("auto reply requested");
    let refresh_between = calls[submit..reply]
        .iter()
        .filter(|call| **call == Call::Snapshot)
        .count();
    assert_eq!(refresh_between, 1);
    assert_eq!(fake.snapshot_calls(), baseline + 2);
    assert!(!c.submission().is_busy());
}

#[tokio::test]
async fn test_auto_reply_failure_clears_busy_and_notifies() {
    let fake = FakeService::new();
    fake.fail_auto_reply("Engine crashed");
    let config = config_for(PlayerAssignment::White).with_auto_respond(true);
    let mut c = controller(&fake, &config);
    opened(&mut c).await;

    c.begin_drag(sq(6, 4));
    c.drop_on(sq(4, 4));
    c.end_drag();
    pump_until(&mut c, |_| fake.count(|call| *call == Call::AutoReply) == 1).await;
    pump_until(&mut c, |c| c.notification().is_some()).await;

    assert!(!c.submission().is_busy());
    assert!(c
        .notification()
        .expect("notified")
        .message
        .contains("Engine crashed"));
}

#[tokio::test]
async fn test_auto_reply_waits_even_when_refresh_fails() {
    let fake = FakeService::new();
    let config = config_for(PlayerAssignment::White).with_auto_respond(true);
    let mut c = controller(&fake, &config);
    opened(&mut c).await;
    fake.fail_next_snapshot("connection reset");

    c.begin_drag(sq(6, 4));
    c.drop_on(sq(4, 4));
    c.end_drag();
    pump_until(&mut c, |c| c.view_model().snapshots_applied() >= 2).await;

    assert_eq!(fake.count(|call| *call == Call::AutoReply), 1);
    let titles: Vec<_> = c.notifications().map(|n| n.title.clone()).collect();
    assert_eq!(titles, vec!["Could not refresh the board".to_string()]);
}

#[tokio::test]
async fn test_toggle_auto_respond() {
    let fake = FakeService::new();
    let mut c = controller(&fake, &config_for(PlayerAssignment::Both));
    assert!(!c.submission().auto_respond());
    assert!(c.toggle_auto_respond());
    assert!(c.submission().auto_respond());
    assert!(!c.toggle_auto_respond());
}
