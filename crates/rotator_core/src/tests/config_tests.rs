use super::*;

use shared::domain::WordIndex;

#[test]
fn defaults_match_documented_timings() {
    let config = RotatorConfig::default();
    assert_eq!(config.words, DEFAULT_WORDS.to_vec());
    assert_eq!(config.mode, Mode::Wheel);
    assert_eq!(config.timing_mode, TimingMode::Pause);
    assert_eq!(config.first_word_interval_ms, 3000);
    assert_eq!(config.other_word_interval_ms, 500);
    assert_eq!(config.last_word_interval_ms, None);
    assert_eq!(
        config.cascade_timing(),
        CascadeTiming {
            cascade_delay: Duration::from_millis(40),
            flip_speed: Duration::from_millis(35),
        }
    );
}

#[test]
fn last_interval_defaults_to_other_interval() {
    let config = RotatorConfig {
        other_word_interval_ms: 750,
        ..RotatorConfig::default()
    };
    let intervals = config.intervals();
    assert_eq!(
        intervals.interval_for(WordIndex(4), 5),
        Duration::from_millis(750)
    );
}

#[test]
fn partial_toml_keeps_defaults_for_missing_fields() {
    let config: RotatorConfig = toml::from_str(
        r#"
        words = ["cat", "dog"]
        mode = "flip"
        timing_mode = "fixed"
        last_word_interval_ms = 1200
        "#,
    )
    .expect("toml");

    assert_eq!(config.words, vec!["cat".to_string(), "dog".to_string()]);
    assert_eq!(config.mode, Mode::Flip);
    assert_eq!(config.timing_mode, TimingMode::Fixed);
    assert_eq!(config.last_word_interval_ms, Some(1200));
    assert_eq!(config.first_word_interval_ms, 3000);
    assert_eq!(config.flip_speed_ms, 35);
}

#[test]
fn unknown_mode_is_rejected_by_deserializer() {
    let result = toml::from_str::<RotatorConfig>(r#"mode = "spin""#);
    assert!(result.is_err());
}

#[test]
fn validate_rejects_zero_flip_speed_only() {
    let zero_flip = RotatorConfig {
        flip_speed_ms: 0,
        ..RotatorConfig::default()
    };
    assert_eq!(zero_flip.validate(), Err(RotatorError::ZeroFlipSpeed));

    let zero_intervals = RotatorConfig {
        first_word_interval_ms: 0,
        other_word_interval_ms: 0,
        last_word_interval_ms: Some(0),
        cascade_delay_ms: 0,
        ..RotatorConfig::default()
    };
    assert_eq!(zero_intervals.validate(), Ok(()));
}

#[test]
fn zero_intervals_fall_back_to_defaults() {
    let config = RotatorConfig {
        first_word_interval_ms: 0,
        other_word_interval_ms: 0,
        last_word_interval_ms: Some(0),
        ..RotatorConfig::default()
    };
    let intervals = config.intervals();
    assert_eq!(intervals.first, Duration::from_millis(3000));
    assert_eq!(intervals.other, Duration::from_millis(500));
    assert_eq!(intervals.last, None);
    assert_eq!(
        intervals.interval_for(WordIndex(4), 5),
        Duration::from_millis(500)
    );
}
