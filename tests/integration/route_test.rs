//! Integration tests for route selection through the scheduler.

use super::audio_mock::{spawn_scheduler, MockOutput, MockProbe, ProbeAnswer};
use std::time::Duration;
use tournament_buzzer::alarm::AfterBlowDelay;
use tournament_buzzer::audio::{OutputRoute, RouteSelector, ToneId};

#[tokio::test]
async fn test_selector_follows_probe() {
    let probe = MockProbe::new(ProbeAnswer::Connected);
    let selector = RouteSelector::new(probe.clone(), Duration::from_millis(250));

    assert_eq!(selector.select_route().await, OutputRoute::AlternateOutput);

    probe.set(ProbeAnswer::Disconnected);
    assert_eq!(selector.select_route().await, OutputRoute::PrimaryAlarmOutput);

    probe.set(ProbeAnswer::PermissionDenied);
    assert_eq!(selector.select_route().await, OutputRoute::PrimaryAlarmOutput);

    probe.set(ProbeAnswer::NoAdapter);
    assert_eq!(selector.select_route().await, OutputRoute::PrimaryAlarmOutput);

    assert_eq!(probe.calls(), 4);
}

/// Missing permission never blocks the tone.
#[tokio::test(start_paused = true)]
async fn test_permission_denied_still_plays_on_primary() {
    let output = MockOutput::new();
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::PermissionDenied), output.clone());

    scheduler
        .request(ToneId::Second, AfterBlowDelay::Ms100)
        .await
        .unwrap();
    scheduler.wait_idle().await.unwrap();

    let emissions = output.emissions();
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].route, OutputRoute::PrimaryAlarmOutput);
}

#[tokio::test(start_paused = true)]
async fn test_connected_accessory_gets_tone() {
    let output = MockOutput::new();
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Connected), output.clone());

    scheduler
        .request(ToneId::Third, AfterBlowDelay::None)
        .await
        .unwrap();
    scheduler.wait_idle().await.unwrap();

    assert_eq!(output.emissions()[0].route, OutputRoute::AlternateOutput);
}
