use super::*;

#[test]
fn mp3_bit_rate_must_be_standard() {
    MP3_SCHEMA.create([(FIELD_BIT_RATE, 192)]).unwrap();
    let err = MP3_SCHEMA.create([(FIELD_BIT_RATE, 100)]).unwrap_err();
    assert!(matches!(err, PeakformError::NotAllowed { .. }));
    MP3_SCHEMA.validate(&Settings::new()).unwrap();
}

#[test]
fn ogg_schema_accepts_nothing() {
    OGG_SCHEMA.validate(&Settings::new()).unwrap();
    let err = OGG_SCHEMA.create([(FIELD_BIT_RATE, 192)]).unwrap_err();
    assert!(matches!(err, PeakformError::UnknownField { .. }));
}

#[test]
fn waveform_dimensions_must_be_positive() {
    let err = WAVEFORM_SCHEMA.create([(FIELD_WIDTH, 0)]).unwrap_err();
    assert!(matches!(err, PeakformError::BelowMinimum { .. }));
    let err = WAVEFORM_SCHEMA.create([(FIELD_HEIGHT, -5)]).unwrap_err();
    assert!(matches!(err, PeakformError::BelowMinimum { .. }));
}

#[test]
fn waveform_dimensions_are_bounded() {
    let edge = i64::from(MAX_RASTER_DIMENSION);
    WAVEFORM_SCHEMA
        .create([(FIELD_WIDTH, edge), (FIELD_HEIGHT, edge)])
        .unwrap();
    let err = WAVEFORM_SCHEMA.create([(FIELD_WIDTH, edge + 1)]).unwrap_err();
    assert!(matches!(err, PeakformError::AboveMaximum { .. }));

    let s: Settings = [(FIELD_WIDTH, 100_000), (FIELD_HEIGHT, 100_000)]
        .into_iter()
        .collect();
    let err = WaveformOptions::from_settings(&s).unwrap_err();
    assert!(err.is_settings_error());
}

#[test]
fn colour_translation_table() {
    assert_eq!(
        "black-on-white".parse::<ColourScheme>().unwrap().pixels(),
        (Bilevel::new(1).unwrap(), Bilevel::new(0).unwrap())
    );
    assert_eq!(
        "white-on-black".parse::<ColourScheme>().unwrap().pixels(),
        (Bilevel::new(0).unwrap(), Bilevel::new(1).unwrap())
    );
    for bad in ["red", "", "Black-On-White"] {
        let err = bad.parse::<ColourScheme>().unwrap_err();
        assert!(matches!(err, PeakformError::UnknownColour(ref c) if c == bad));
    }
}

#[test]
fn translate_colour_removes_the_key() {
    let mut s: Settings = [(FIELD_COLOUR, SettingValue::from("white-on-black"))]
        .into_iter()
        .collect();
    let pixels = translate_colour(&mut s).unwrap();
    assert_eq!(pixels, Some((Bilevel::BLACK, Bilevel::WHITE)));
    assert!(!s.contains_key(FIELD_COLOUR));
    assert_eq!(translate_colour(&mut s).unwrap(), None);

    let mut s: Settings = [(FIELD_COLOUR, SettingValue::from(3))].into_iter().collect();
    assert!(matches!(
        translate_colour(&mut s),
        Err(PeakformError::UnknownColour(_))
    ));
}

#[test]
fn waveform_options_apply_defaults() {
    let opts = WaveformOptions::from_settings(&Settings::new()).unwrap();
    assert_eq!(opts, WaveformOptions::default());
    assert_eq!(opts.width, DEFAULT_WAVEFORM_WIDTH);
    assert_eq!(opts.height, DEFAULT_WAVEFORM_HEIGHT);
    assert_eq!(opts.background, Bilevel::WHITE);
    assert_eq!(opts.foreground, Bilevel::BLACK);
    assert_eq!(opts.channel, ChannelSelect::Left);
}

#[test]
fn waveform_options_from_settings() {
    let s: Settings = [
        (FIELD_WIDTH, SettingValue::from(100)),
        (FIELD_HEIGHT, SettingValue::from("50")),
        (FIELD_COLOUR, SettingValue::from("white-on-black")),
        (FIELD_CHANNEL, SettingValue::from("mix")),
    ]
    .into_iter()
    .collect();
    let opts = WaveformOptions::from_settings(&s).unwrap();
    assert_eq!(opts.width, 100);
    assert_eq!(opts.height, 50);
    assert_eq!(opts.background, Bilevel::BLACK);
    assert_eq!(opts.foreground, Bilevel::WHITE);
    assert_eq!(opts.channel, ChannelSelect::Mix);
    // caller's mapping keeps its colour key
    assert!(s.contains_key(FIELD_COLOUR));
}

#[test]
fn waveform_options_reject_bad_settings() {
    let s: Settings = [(FIELD_COLOUR, SettingValue::from("red"))].into_iter().collect();
    assert!(matches!(
        WaveformOptions::from_settings(&s),
        Err(PeakformError::NotAllowed { .. })
    ));

    let s: Settings = [(FIELD_WIDTH, SettingValue::from(i64::from(u32::MAX) + 1))]
        .into_iter()
        .collect();
    assert!(matches!(
        WaveformOptions::from_settings(&s),
        Err(PeakformError::AboveMaximum { .. })
    ));
}
