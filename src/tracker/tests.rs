//! State machine tests for the session tracker
//!
//! Timer tests run on a paused tokio clock so inactivity windows elapse instantly
//! and deterministically.

use super::*;
use crate::codec::{encode_command, encode_data};
use crate::types::SessionEvent;
use std::time::Duration;

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<SessionEvent>>>);

impl Recorder {
    fn events(&self) -> Vec<SessionEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl SessionListener for Recorder {
    fn on_session_start(&self, session_id: u8) {
        self.0.lock().unwrap().push(SessionEvent::Started { session_id });
    }

    fn on_session_end(&self, session_id: u8, reason: EndReason) {
        self.0.lock().unwrap().push(SessionEvent::Ended { session_id, reason });
    }

    fn on_session_interrupt(&self, session_id: u8) {
        self.0.lock().unwrap().push(SessionEvent::Interrupted { session_id });
    }
}

fn tracker() -> (Arc<SessionTracker>, Recorder) {
    let _ = tracing_subscriber::fmt::try_init();
    let recorder = Recorder::default();
    let tracker = SessionTracker::new(recorder.clone(), &SessionConfig::default())
        .expect("tracker inside runtime");
    (tracker, recorder)
}

fn data(session_id: u8) -> DecodedFrame {
    DecodedFrame::Data { session_id, sentence_id: 0, base_pts: 0 }
}

fn command(session_id: u8, cmd_type: CommandType) -> DecodedFrame {
    DecodedFrame::Command { session_id, cmd_type, session_dur_packs: 0, base_pts: 0 }
}

fn started(session_id: u8) -> SessionEvent {
    SessionEvent::Started { session_id }
}

fn ended(session_id: u8, reason: EndReason) -> SessionEvent {
    SessionEvent::Ended { session_id, reason }
}

#[tokio::test(start_paused = true)]
async fn session_transition_emits_each_event_once() {
    let (tracker, recorder) = tracker();

    for session_id in [1, 1, 1, 2, 2] {
        tracker.process(data(session_id));
    }

    assert_eq!(recorder.events(), vec![started(1), ended(1, EndReason::Boundary), started(2)]);
    assert_eq!(tracker.phase(), TrackerPhase::Active(2));
    assert_eq!(tracker.state().last_ended_session_id, Some(1));
}

#[tokio::test(start_paused = true)]
async fn end_command_burst_collapses_to_one_event() {
    let (tracker, recorder) = tracker();

    for _ in 0..10 {
        tracker.process(command(7, CommandType::SessionEnd));
    }

    assert_eq!(recorder.events(), vec![started(7), ended(7, EndReason::Command)]);
    let stats = tracker.stats();
    assert_eq!(stats.duplicate_commands, 9);
    assert_eq!(stats.ended_by_command, 1);

    // The re-armed timer from the duplicates must not produce a second end
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(recorder.events().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn interrupt_suppresses_later_end_and_timeout() {
    let (tracker, recorder) = tracker();

    tracker.process(data(3));
    for _ in 0..10 {
        tracker.process(command(3, CommandType::SessionInterrupt));
    }
    for _ in 0..10 {
        tracker.process(command(3, CommandType::SessionEnd));
    }
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracker.on_timeout(3);

    assert_eq!(recorder.events(), vec![started(3), SessionEvent::Interrupted { session_id: 3 }]);
    assert_eq!(tracker.state().last_interrupt_command_session_id, Some(3));
    assert_eq!(tracker.state().last_end_command_session_id, Some(3));
}

#[tokio::test(start_paused = true)]
async fn end_then_interrupt_reports_both() {
    let (tracker, recorder) = tracker();

    tracker.process(command(4, CommandType::SessionEnd));
    tracker.process(command(4, CommandType::SessionInterrupt));

    assert_eq!(
        recorder.events(),
        vec![
            started(4),
            ended(4, EndReason::Command),
            SessionEvent::Interrupted { session_id: 4 }
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn silence_ends_session_once() {
    let (tracker, recorder) = tracker();

    tracker.process(data(5));
    tracker.process(data(5));
    assert!(tracker.timer_pending());

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(recorder.events(), vec![started(5)]);

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(recorder.events(), vec![started(5), ended(5, EndReason::Timeout)]);
    assert!(!tracker.timer_pending());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(recorder.events().len(), 2);
    assert_eq!(tracker.stats().ended_by_timeout, 1);
}

#[tokio::test(start_paused = true)]
async fn traffic_slides_the_window() {
    let (tracker, recorder) = tracker();

    for _ in 0..5 {
        tracker.process(data(6));
        tokio::time::sleep(Duration::from_millis(400)).await;
    }
    assert_eq!(recorder.events(), vec![started(6)]);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(recorder.events(), vec![started(6), ended(6, EndReason::Timeout)]);
}

#[tokio::test(start_paused = true)]
async fn timeout_never_fires_against_the_next_session() {
    let (tracker, recorder) = tracker();

    tracker.process(data(1));
    tokio::time::sleep(Duration::from_millis(300)).await;
    tracker.process(data(2));
    tokio::time::sleep(Duration::from_millis(300)).await;
    // Session 1's original deadline has passed; session 2 is still within its window
    assert_eq!(recorder.events(), vec![started(1), ended(1, EndReason::Boundary), started(2)]);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(
        recorder.events(),
        vec![started(1), ended(1, EndReason::Boundary), started(2), ended(2, EndReason::Timeout)]
    );
}

#[tokio::test(start_paused = true)]
async fn fire_racing_a_rearm_is_discarded() {
    let (tracker, recorder) = tracker();

    tracker.process(data(1));
    let old_epoch = tracker.lock().timer.armed_epoch().expect("timer armed for session 1");

    tracker.process(data(2));
    // Sleep for the old epoch completed before the rearm cancelled it
    tracker.timer_fired(1, old_epoch);

    assert_eq!(recorder.events(), vec![started(1), ended(1, EndReason::Boundary), started(2)]);
    assert_eq!(tracker.stats().stale_timer_fires, 1);
    assert_eq!(tracker.stats().ended_by_timeout, 0);
    assert!(tracker.timer_pending());

    // Same session rearmed: an old fire still must not end it early
    let second_epoch = tracker.lock().timer.armed_epoch().expect("timer armed for session 2");
    tracker.process(data(2));
    tracker.timer_fired(2, second_epoch);
    assert_eq!(recorder.events().len(), 3);
    assert_eq!(tracker.stats().stale_timer_fires, 2);

    tokio::time::sleep(Duration::from_millis(501)).await;
    assert_eq!(recorder.events().last(), Some(&ended(2, EndReason::Timeout)));
}

#[tokio::test(start_paused = true)]
async fn manual_timeout_only_hits_the_active_session() {
    let (tracker, recorder) = tracker();

    tracker.on_timeout(9);
    assert!(recorder.events().is_empty());

    tracker.process(data(9));
    tracker.on_timeout(8);
    assert_eq!(recorder.events(), vec![started(9)]);

    tracker.on_timeout(9);
    tracker.on_timeout(9);
    assert_eq!(recorder.events(), vec![started(9), ended(9, EndReason::Timeout)]);
    assert!(!tracker.timer_pending());
}

#[tokio::test(start_paused = true)]
async fn end_command_after_timeout_is_silent() {
    let (tracker, recorder) = tracker();

    tracker.process(data(2));
    tokio::time::sleep(Duration::from_millis(600)).await;
    for _ in 0..10 {
        tracker.process(command(2, CommandType::SessionEnd));
    }

    assert_eq!(recorder.events(), vec![started(2), ended(2, EndReason::Timeout)]);
}

#[tokio::test(start_paused = true)]
async fn traffic_after_timeout_does_not_restart_session() {
    let (tracker, recorder) = tracker();

    tracker.process(data(2));
    tokio::time::sleep(Duration::from_millis(600)).await;
    tracker.process(data(2));
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert_eq!(recorder.events(), vec![started(2), ended(2, EndReason::Timeout)]);
    assert_eq!(tracker.phase(), TrackerPhase::Active(2));
}

#[tokio::test(start_paused = true)]
async fn boundary_after_command_end_is_not_repeated() {
    let (tracker, recorder) = tracker();

    tracker.process(data(1));
    tracker.process(command(1, CommandType::SessionEnd));
    tracker.process(data(2));

    assert_eq!(recorder.events(), vec![started(1), ended(1, EndReason::Command), started(2)]);
}

#[tokio::test(start_paused = true)]
async fn unknown_commands_only_keep_the_session_alive() {
    let (tracker, recorder) = tracker();

    tracker.process(command(3, CommandType::Reserved(0)));
    tracker.process(command(3, CommandType::Reserved(17)));

    assert_eq!(recorder.events(), vec![started(3)]);
    assert_eq!(tracker.stats().unknown_commands, 2);
    assert!(tracker.timer_pending());
}

#[tokio::test(start_paused = true)]
async fn raw_stamps_are_filtered() {
    let (tracker, recorder) = tracker();

    tracker.process_frame(0);
    // Non-zero but missing the origin marker
    tracker.process_frame(0x64);
    // Right origin, unsupported version
    tracker.process_frame(0x4800_0000_0000_0064);
    assert!(recorder.events().is_empty());

    tracker.process_frame(encode_data(5, 0, 100));
    tracker.process_frame(encode_command(5, CommandType::SessionEnd, 200, 100));

    assert_eq!(recorder.events(), vec![started(5), ended(5, EndReason::Command)]);
    let stats = tracker.stats();
    assert_eq!(stats.sentinel_frames, 1);
    assert_eq!(stats.foreign_frames, 2);
    assert_eq!(stats.frames_processed, 2);
}

#[tokio::test(start_paused = true)]
async fn late_frames_are_counted() {
    let (tracker, _recorder) = tracker();

    tracker.process_frame(encode_data(1, 0, 100));
    tracker.process_frame(encode_data(1, 1, 120));
    tracker.process_frame(encode_data(1, 2, 110));
    tracker.process_frame(encode_data(1, 3, 120));

    assert_eq!(tracker.stats().late_frames, 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_resets_and_is_idempotent() {
    let (tracker, recorder) = tracker();

    tracker.shutdown();
    tracker.process(data(4));
    tracker.process(command(4, CommandType::SessionEnd));
    tracker.shutdown();
    tracker.shutdown();

    assert_eq!(tracker.state(), SessionState::default());
    assert!(!tracker.timer_pending());

    // Dedupe memory is gone: the same session starts and ends again
    tracker.process(command(4, CommandType::SessionEnd));
    assert_eq!(
        recorder.events(),
        vec![started(4), ended(4, EndReason::Command), started(4), ended(4, EndReason::Command)]
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_timer() {
    let (tracker, recorder) = tracker();

    tracker.process(data(1));
    tracker.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(recorder.events(), vec![started(1)]);
}

#[tokio::test(start_paused = true)]
async fn dropped_tracker_timer_is_harmless() {
    let (tracker, recorder) = tracker();

    tracker.process(data(1));
    drop(tracker);
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(recorder.events(), vec![started(1)]);
}

#[test]
fn construction_requires_runtime() {
    let err = SessionTracker::new(Recorder::default(), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, SessionError::NoRuntime));
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    let config = SessionConfig { burst_size: 0, ..SessionConfig::default() };
    let err = SessionTracker::new(Recorder::default(), &config).unwrap_err();
    assert!(matches!(err, SessionError::Config { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn frames_from_foreign_threads() {
    let recorder = Recorder::default();
    let config = SessionConfig { inactivity_timeout_ms: 50, ..SessionConfig::default() };
    let tracker = SessionTracker::new(recorder.clone(), &config).unwrap();

    let worker = {
        let tracker = tracker.clone();
        std::thread::spawn(move || {
            for sentence in 0..20u16 {
                tracker.process_frame(encode_data(11, sentence, sentence * 20));
            }
        })
    };
    worker.join().unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(recorder.events(), vec![started(11), ended(11, EndReason::Timeout)]);
}
