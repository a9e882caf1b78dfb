//! Integration tests for the buzzer controller.

use super::audio_mock::{spawn_scheduler, MockOutput, MockProbe, ProbeAnswer};
use tournament_buzzer::alarm::{AfterBlowDelay, AlarmConfig, ProgressSimulator, RequestOutcome};
use tournament_buzzer::audio::{ToneCatalog, ToneId};
use tournament_buzzer::input::{
    Buzzer, Handled, KeyAction, KeyHandler, TriggerKey, BUSY_LABEL, READY_LABEL,
};

fn buzzer(output: MockOutput) -> Buzzer {
    let scheduler = spawn_scheduler(MockProbe::new(ProbeAnswer::Disconnected), output);
    Buzzer::new(scheduler, ProgressSimulator::default(), &AlarmConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_defaults_from_config() {
    let buzzer = buzzer(MockOutput::new());
    assert_eq!(buzzer.tone(), ToneId::First);
    assert_eq!(buzzer.delay(), AfterBlowDelay::Ms500);
    assert_eq!(buzzer.button_label(), READY_LABEL);
}

/// Accepted trigger starts a countdown over the same delay.
#[tokio::test(start_paused = true)]
async fn test_trigger_starts_matching_progress() {
    let buzzer = buzzer(MockOutput::new());

    let fired = buzzer.trigger(TriggerKey::Button).await.unwrap();
    assert_eq!(fired.outcome, RequestOutcome::Accepted);
    assert!(buzzer.is_busy());
    assert_eq!(buzzer.button_label(), BUSY_LABEL);

    let mut progress = fired.progress.unwrap();
    let mut last = None;
    while let Some(tick) = progress.next().await {
        assert_eq!(tick.total_ms, 500);
        last = Some(tick);
    }
    let last = last.unwrap();
    assert_eq!(last.fraction, 1.0);
    assert!(!last.running);

    buzzer.scheduler().wait_idle().await.unwrap();
    assert_eq!(buzzer.button_label(), READY_LABEL);
}

/// A dropped trigger leaves the running countdown alone.
#[tokio::test(start_paused = true)]
async fn test_dropped_trigger_has_no_progress() {
    let output = MockOutput::new();
    let buzzer = buzzer(output.clone());

    let first = buzzer.trigger(TriggerKey::VolumeUp).await.unwrap();
    let second = buzzer.trigger(TriggerKey::Camera).await.unwrap();

    assert_eq!(second.outcome, RequestOutcome::Dropped);
    assert!(second.progress.is_none());

    let progress = first.progress.unwrap();
    assert!(!progress.is_superseded());

    buzzer.scheduler().wait_idle().await.unwrap();
    assert_eq!(output.emissions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_selection_applies_to_next_trigger() {
    let output = MockOutput::new();
    let mut buzzer = buzzer(output.clone());
    let keys = KeyHandler::new();

    let action = keys.handle("t4").unwrap();
    assert!(matches!(
        buzzer.handle(action).await.unwrap(),
        Handled::ToneSelected(ToneId::Fourth)
    ));
    buzzer.handle(KeyAction::SelectDelay(AfterBlowDelay::None)).await.unwrap();
    buzzer.handle(KeyAction::NextDelay).await.unwrap();
    assert_eq!(buzzer.delay(), AfterBlowDelay::Ms100);

    let handled = buzzer.handle(keys.handle("").unwrap()).await.unwrap();
    let Handled::Fired(fired) = handled else {
        panic!("expected trigger");
    };
    assert_eq!(fired.outcome, RequestOutcome::Accepted);
    assert_eq!(fired.progress.unwrap().next().await.unwrap().total_ms, 100);

    buzzer.scheduler().wait_idle().await.unwrap();
    assert_eq!(
        output.emissions()[0].profile,
        ToneCatalog::standard().resolve(ToneId::Fourth)
    );
}

#[tokio::test(start_paused = true)]
async fn test_quit_and_help_pass_through() {
    let mut buzzer = buzzer(MockOutput::new());
    assert!(matches!(
        buzzer.handle(KeyAction::Quit).await.unwrap(),
        Handled::Quit
    ));
    assert!(matches!(
        buzzer.handle(KeyAction::ShowHelp).await.unwrap(),
        Handled::ShowHelp
    ));
}
