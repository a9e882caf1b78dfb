//! Integration tests for the tone scheduler driven through its handle.

use super::audio_mock::{spawn_scheduler, MockOutput, MockProbe, ProbeAnswer};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tournament_buzzer::alarm::{AfterBlowDelay, AlarmEvent, RequestOutcome, SchedulerState};
use tournament_buzzer::audio::{OutputRoute, ToneCatalog, ToneId};

/// Drain events up to and including the cycle completion.
async fn events_until_complete(rx: &mut broadcast::Receiver<AlarmEvent>) -> Vec<AlarmEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx.recv().await.unwrap();
        let done = matches!(event, AlarmEvent::CycleCompleted { .. });
        events.push(event);
        if done {
            return events;
        }
    }
}

/// First tone after 500ms with no accessory: primary route, 500 + 800ms cycle.
#[tokio::test(start_paused = true)]
async fn test_first_tone_half_second_delay() {
    let output = MockOutput::new();
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), output.clone());
    let mut state = scheduler.subscribe_state();
    let start = Instant::now();

    let outcome = scheduler
        .request(ToneId::First, AfterBlowDelay::Ms500)
        .await
        .unwrap();
    assert_eq!(outcome, RequestOutcome::Accepted);
    assert_eq!(scheduler.state(), SchedulerState::Delaying);

    state
        .wait_for(|s| *s == SchedulerState::Sounding)
        .await
        .unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(500));

    scheduler.wait_idle().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(500 + 800));

    let emissions = output.emissions();
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].route, OutputRoute::PrimaryAlarmOutput);
    assert_eq!(
        emissions[0].profile,
        ToneCatalog::standard().resolve(ToneId::First)
    );
    assert_eq!(emissions[0].at - start, Duration::from_millis(500));
}

/// Each tone sounds for exactly its catalog duration.
#[tokio::test(start_paused = true)]
async fn test_sounding_lasts_profile_duration() {
    let catalog = ToneCatalog::standard();

    for tone in ToneId::ALL {
        let scheduler =
            spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), MockOutput::new());
        let mut state = scheduler.subscribe_state();

        scheduler
            .request(tone, AfterBlowDelay::Ms200)
            .await
            .unwrap();
        state
            .wait_for(|s| *s == SchedulerState::Sounding)
            .await
            .unwrap();

        let sounding = Instant::now();
        scheduler.wait_idle().await.unwrap();
        assert_eq!(sounding.elapsed(), catalog.resolve(tone).duration(), "{tone}");
    }
}

/// Second tone with no delay, requested twice: one cycle only.
#[tokio::test(start_paused = true)]
async fn test_double_request_is_dropped() {
    let output = MockOutput::new();
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), output.clone());
    let mut events = scheduler.subscribe_events();

    let first = scheduler.request(ToneId::Second, AfterBlowDelay::None);
    let second = scheduler.request(ToneId::Second, AfterBlowDelay::None);
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.unwrap(), RequestOutcome::Accepted);
    assert_eq!(second.unwrap(), RequestOutcome::Dropped);

    let seen = events_until_complete(&mut events).await;
    let armed = seen
        .iter()
        .filter(|e| matches!(e, AlarmEvent::CycleArmed { .. }))
        .count();
    let dropped = seen
        .iter()
        .filter(|e| matches!(e, AlarmEvent::RequestDropped { .. }))
        .count();
    assert_eq!(armed, 1);
    assert_eq!(dropped, 1);

    scheduler.wait_idle().await.unwrap();
    assert_eq!(output.emissions().len(), 1);
}

/// A zero delay still passes through Delaying.
#[tokio::test(start_paused = true)]
async fn test_zero_delay_traverses_delaying() {
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), MockOutput::new());
    let mut events = scheduler.subscribe_events();

    let outcome = scheduler
        .request(ToneId::First, AfterBlowDelay::None)
        .await
        .unwrap();
    assert_eq!(outcome, RequestOutcome::Accepted);
    assert!(scheduler.is_busy());

    let seen = events_until_complete(&mut events).await;
    assert!(matches!(
        seen[0],
        AlarmEvent::CycleArmed {
            delay: AfterBlowDelay::None,
            ..
        }
    ));
    assert!(matches!(seen[1], AlarmEvent::ToneStarted { .. }));

    scheduler.wait_idle().await.unwrap();
}

/// Requests while sounding change nothing.
#[tokio::test(start_paused = true)]
async fn test_request_while_sounding_has_no_effect() {
    let output = MockOutput::new();
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), output.clone());
    let mut state = scheduler.subscribe_state();
    let start = Instant::now();

    scheduler
        .request(ToneId::Third, AfterBlowDelay::Ms100)
        .await
        .unwrap();
    state
        .wait_for(|s| *s == SchedulerState::Sounding)
        .await
        .unwrap();

    let outcome = scheduler
        .request(ToneId::First, AfterBlowDelay::None)
        .await
        .unwrap();
    assert_eq!(outcome, RequestOutcome::Dropped);
    assert_eq!(scheduler.state(), SchedulerState::Sounding);

    scheduler.wait_idle().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(100 + 1500));
    assert_eq!(output.emissions().len(), 1);
}

/// Playback failure still returns the scheduler to idle on time.
#[tokio::test(start_paused = true)]
async fn test_playback_failure_reaches_idle() {
    let output = MockOutput::failing();
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), output.clone());
    let mut events = scheduler.subscribe_events();
    let start = Instant::now();

    scheduler
        .request(ToneId::Fourth, AfterBlowDelay::Ms300)
        .await
        .unwrap();

    let seen = events_until_complete(&mut events).await;
    assert!(seen
        .iter()
        .any(|e| matches!(e, AlarmEvent::PlaybackFailed { tone: ToneId::Fourth, .. })));
    assert!(!seen
        .iter()
        .any(|e| matches!(e, AlarmEvent::ToneStarted { .. })));

    scheduler.wait_idle().await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_millis(300 + 2500));
    assert_eq!(output.emissions().len(), 1);

    // Scheduler is usable again
    let outcome = scheduler
        .request(ToneId::First, AfterBlowDelay::None)
        .await
        .unwrap();
    assert_eq!(outcome, RequestOutcome::Accepted);
}

/// Consecutive cycles each pick their route afresh.
#[tokio::test(start_paused = true)]
async fn test_route_recomputed_per_cycle() {
    let probe = MockProbe::new(ProbeAnswer::Connected);
    let output = MockOutput::new();
    let scheduler = spawn_scheduler(probe.clone(), output.clone());

    scheduler
        .request(ToneId::First, AfterBlowDelay::None)
        .await
        .unwrap();
    scheduler.wait_idle().await.unwrap();

    probe.set(ProbeAnswer::Disconnected);
    scheduler
        .request(ToneId::First, AfterBlowDelay::None)
        .await
        .unwrap();
    scheduler.wait_idle().await.unwrap();

    let routes: Vec<OutputRoute> = output.emissions().iter().map(|e| e.route).collect();
    assert_eq!(
        routes,
        vec![OutputRoute::AlternateOutput, OutputRoute::PrimaryAlarmOutput]
    );
    assert_eq!(probe.calls(), 2);
}

/// Dropped requests do not consult the route selector.
#[tokio::test(start_paused = true)]
async fn test_dropped_request_skips_route_selection() {
    let probe = MockProbe::new(ProbeAnswer::Disconnected);
    let scheduler = spawn_scheduler(probe.clone(), MockOutput::new());

    scheduler
        .request(ToneId::First, AfterBlowDelay::Ms1000)
        .await
        .unwrap();
    scheduler
        .request(ToneId::First, AfterBlowDelay::Ms1000)
        .await
        .unwrap();

    assert_eq!(probe.calls(), 1);
    scheduler.wait_idle().await.unwrap();
}
