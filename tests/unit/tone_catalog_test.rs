//! Unit tests for the tone catalog.

use tournament_buzzer::audio::{ToneCatalog, ToneId, Waveform};

/// Every tone resolves to its own waveform.
#[test]
fn test_each_tone_has_distinct_waveform() {
    let catalog = ToneCatalog::standard();
    let waveforms: Vec<Waveform> = ToneId::ALL
        .iter()
        .map(|tone| catalog.resolve(*tone).waveform)
        .collect();

    for (i, a) in waveforms.iter().enumerate() {
        for b in &waveforms[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

/// Durations match the alert tones they are modeled on.
#[test]
fn test_standard_durations() {
    let catalog = ToneCatalog::standard();
    let durations: Vec<u64> = ToneId::ALL
        .iter()
        .map(|tone| catalog.resolve(*tone).duration_ms)
        .collect();
    assert_eq!(durations, vec![800, 800, 1500, 2500]);
    assert_eq!(catalog.longest().as_millis(), 2500);
}

/// Rendered segments cover the profile duration exactly.
#[test]
fn test_render_fills_profile_duration() {
    let catalog = ToneCatalog::standard();
    for tone in ToneId::ALL {
        let profile = catalog.resolve(tone);
        let total: u64 = profile
            .waveform
            .render(profile.duration_ms)
            .iter()
            .map(|s| s.duration_ms)
            .sum();
        assert_eq!(total, profile.duration_ms, "{tone}");
    }
}

#[test]
fn test_tone_names_parse() {
    assert_eq!("first".parse::<ToneId>().unwrap(), ToneId::First);
    assert_eq!("Fourth".parse::<ToneId>().unwrap(), ToneId::Fourth);
    assert_eq!("2".parse::<ToneId>().unwrap(), ToneId::Second);
    assert!("fifth".parse::<ToneId>().is_err());
}
