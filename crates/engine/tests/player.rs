//! Frame loop behaviour of `Player`, on a paused tokio clock.

use cuesync_cues::demo;
use cuesync_engine::{EngineConfig, PlaybackPhase, Player, SyncEngine};
use cuesync_offset::OffsetStore;
use cuesync_transport::{ManualTransport, Transport};
use std::sync::Arc;
use std::time::Duration;

fn zero_offset() -> Arc<OffsetStore> {
    let store = Arc::new(OffsetStore::in_memory());
    store.reset_to_zero();
    store
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        frame_interval_ms: 5,
        ..EngineConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_player_ticks_while_playing() {
    let engine = SyncEngine::with_config(
        demo::charger_support_call(),
        zero_offset(),
        Some(ManualTransport::with_duration(demo::CHARGER_CALL_DURATION)),
        fast_config(),
    );
    let mut player = Player::new(engine);
    player.start();
    assert!(player.is_ticking());

    player.with_transport(|t| t.advance(7.0));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = player.snapshot();
    assert_eq!(snapshot.phase, PlaybackPhase::CueActive);
    assert_eq!(snapshot.active_cue_id(), Some("1"));
}

#[tokio::test(start_paused = true)]
async fn test_pause_stops_ticking() {
    let engine = SyncEngine::with_config(
        demo::charger_support_call(),
        zero_offset(),
        Some(ManualTransport::with_duration(demo::CHARGER_CALL_DURATION)),
        fast_config(),
    );
    let mut player = Player::new(engine);
    player.start();
    player.toggle_play_pause();
    assert!(!player.is_ticking());
    assert!(!player.is_running());

    player.toggle_play_pause();
    assert!(player.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_ticker_stops_on_completion() {
    let engine = SyncEngine::with_config(
        demo::charger_support_call(),
        zero_offset(),
        Some(ManualTransport::with_duration(demo::CHARGER_CALL_DURATION)),
        fast_config(),
    );
    let mut player = Player::new(engine);
    player.start();
    player.with_transport(|t| t.finish());
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(player.snapshot().is_complete);
    assert!(!player.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_pending_frames() {
    let engine = SyncEngine::with_config(
        demo::charger_support_call(),
        zero_offset(),
        Some(ManualTransport::with_duration(demo::CHARGER_CALL_DURATION)),
        fast_config(),
    );
    let mut player = Player::new(engine);
    player.start();
    player.with_transport(|t| t.advance(20.0));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(player.snapshot().effective_time > 0.0);
    assert!(!player.snapshot().transcript.is_empty());

    player.reset();
    assert!(!player.is_ticking());
    tokio::time::sleep(Duration::from_millis(60)).await;

    let snapshot = player.snapshot();
    assert_eq!(snapshot.phase, PlaybackPhase::Idle);
    assert!(!snapshot.has_started);
    assert_eq!(snapshot.effective_time, 0.0);
    assert!(snapshot.transcript.is_empty());
    assert_eq!(player.with_transport(|t| t.current_time()), Some(0.0));
}

#[tokio::test(start_paused = true)]
async fn test_advance_from_player_completes_and_stops() {
    let engine = SyncEngine::with_config(
        demo::charger_support_call(),
        zero_offset(),
        Some(ManualTransport::with_duration(demo::CHARGER_CALL_DURATION)),
        fast_config(),
    );
    let mut player = Player::new(engine);
    player.start();
    player.seek_to_cue(12);
    player.advance_to_next_cue();

    assert!(player.snapshot().is_complete);
    assert!(!player.is_ticking());
}
