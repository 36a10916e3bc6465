//! Test intent: verifies the signal state machine, its collaborators and
//! mask application through the public API.
use sigframe::{
    AudioDecoder, AudioSignal, DecodedAudio, ErrorKind, LoadOptions, RealMask, Resampler,
    Result, SampleBuffer, SignalConfig, SignalError, SignalSource, SignalState, StftParams,
    StoreMode, WindowType,
};
use std::path::Path;

struct FakeDecoder {
    rows: Vec<Vec<f64>>,
    sample_rate: u32,
}

impl AudioDecoder for FakeDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        if path.extension().and_then(|e| e.to_str()) != Some("wav") {
            return Err(SignalError::External(format!(
                "unsupported file {}",
                path.display()
            )));
        }
        Ok(DecodedAudio {
            rows: self.rows.clone(),
            sample_rate: self.sample_rate,
        })
    }
}

/// Keeps every other sample; only supports halving the rate.
struct Decimator;

impl Resampler for Decimator {
    fn resample(&self, channel: &[f64], from_rate: u32, to_rate: u32) -> Result<Vec<f64>> {
        if from_rate != 2 * to_rate {
            return Err(SignalError::External("only halving is supported".into()));
        }
        Ok(channel.iter().step_by(2).copied().collect())
    }
}

fn config() -> SignalConfig {
    SignalConfig::default().with_stft(StftParams::new(64, 16, WindowType::Hann).unwrap())
}

fn tone(len: usize) -> SampleBuffer {
    let samples = (0..len).map(|i| (i as f64 * 0.05).sin()).collect();
    SampleBuffer::from_mono(samples, 8_000).unwrap()
}

#[test]
fn decoded_file_is_transposed_and_named() {
    let _ = env_logger::builder().is_test(true).try_init();
    // 5 frames of stereo, delivered sample-major.
    let decoder = FakeDecoder {
        rows: (0..5).map(|i| vec![i as f64 * 0.1, -(i as f64) * 0.1]).collect(),
        sample_rate: 16_000,
    };
    let signal = AudioSignal::load(
        SignalSource::FromFile("/music/mix.wav".into()),
        SignalConfig::default(),
        &decoder,
    )
    .unwrap();
    assert_eq!(signal.state(), SignalState::TimeDomain);
    assert_eq!(signal.num_channels(), 2);
    assert_eq!(signal.len(), 5);
    assert_eq!(signal.sample_rate(), 16_000);
    assert_eq!(signal.file_name(), Some("mix.wav"));

    let err = AudioSignal::load(
        SignalSource::FromFile("/music/mix.flac".into()),
        SignalConfig::default(),
        &decoder,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::External);
}

#[test]
fn spectrum_only_signal() {
    let source = AudioSignal::new(SignalSource::FromSamples(tone(400)), config()).unwrap();
    let spec = source.clone().stft(StoreMode::Discard).unwrap();

    let mut signal = AudioSignal::new(SignalSource::FromSpectrum(spec.clone()), config()).unwrap();
    assert_eq!(signal.state(), SignalState::FrequencyDomain);
    assert_eq!(signal.num_channels(), 1);
    assert_eq!(signal.sample_rate(), 44_100);
    assert!(signal.get_channel(0).is_err());

    // No source length is known, so the natural length comes back.
    let out = signal.istft(StoreMode::Discard, None).unwrap();
    assert!(out.len() >= 400);
    let cut = signal.istft(StoreMode::Store, Some(400)).unwrap();
    assert_eq!(cut.len(), 400);
    assert_eq!(signal.state(), SignalState::Both);
}

#[test]
fn discard_never_changes_state() {
    let mut signal = AudioSignal::new(SignalSource::FromSamples(tone(300)), config()).unwrap();
    let before = signal.clone();
    signal.stft(StoreMode::Discard).unwrap();
    assert!(signal.equals(&before));
}

#[test]
fn low_pass_mask_keeps_low_tone() {
    let params = StftParams::new(256, 64, WindowType::Hann).unwrap();
    let config = SignalConfig::default().with_stft(params);
    let rate = 8_000.0;
    let low: Vec<f64> = (0..4000)
        .map(|i| (2.0 * std::f64::consts::PI * 250.0 * i as f64 / rate).sin())
        .collect();
    let high: Vec<f64> = (0..4000)
        .map(|i| 0.5 * (2.0 * std::f64::consts::PI * 3000.0 * i as f64 / rate).sin())
        .collect();
    let mix: Vec<f64> = low.iter().zip(&high).map(|(a, b)| a + b).collect();
    let buffer = SampleBuffer::from_mono(mix, 8_000).unwrap();
    let mut signal = AudioSignal::new(SignalSource::FromSamples(buffer), config).unwrap();
    signal.stft(StoreMode::Store).unwrap();

    let cutoff = signal.closest_frequency_bin(1_000.0).unwrap();
    let shape = signal.spectrum_shape().unwrap();
    let mask = RealMask::binary(shape, |b, _, _| b < cutoff).unwrap();
    let mut filtered = signal.apply_mask(&mask).unwrap();
    assert_eq!(filtered.state(), SignalState::FrequencyDomain);
    assert_eq!(signal.state(), SignalState::Both);

    let out = filtered.istft(StoreMode::Replace, None).unwrap();
    assert_eq!(out.len(), 4000);
    // Ignore the edges, where the tone is only partly covered by frames.
    let err = out.channel(0).unwrap()[512..3488]
        .iter()
        .zip(&low[512..3488])
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    assert!(err < 0.05, "residual {}", err);
}

#[test]
fn mask_shape_must_match() {
    let mut signal = AudioSignal::new(SignalSource::FromSamples(tone(300)), config()).unwrap();
    let spec = signal.stft(StoreMode::Store).unwrap();
    let mut shape = spec.shape();
    shape.frames += 1;
    let mask = RealMask::ones(shape).unwrap();
    assert_eq!(
        signal.apply_mask(&mask).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn resampling_through_collaborator() {
    let signal = AudioSignal::new(
        SignalSource::FromSamples(tone(1000)),
        SignalConfig::default(),
    )
    .unwrap();
    let half = signal.resampled(&Decimator, 4_000).unwrap();
    assert_eq!(half.sample_rate(), 4_000);
    assert_eq!(half.len(), 500);
    assert_eq!(half.params().window_length(), 256);
    assert_eq!(
        signal.resampled(&Decimator, 3_000).unwrap_err().kind(),
        ErrorKind::External
    );
}

/// Three seconds of a 100 Hz mono ramp: sample `i` holds `i`.
fn ramp_decoder() -> FakeDecoder {
    FakeDecoder {
        rows: vec![(0..300).map(|i| i as f64).collect()],
        sample_rate: 100,
    }
}

#[test]
fn load_reads_a_section() {
    let _ = env_logger::builder().is_test(true).try_init();
    let decoder = ramp_decoder();
    let load = |options: LoadOptions| {
        AudioSignal::load_with(
            SignalSource::FromFile("ramp.wav".into()),
            SignalConfig::default(),
            &decoder,
            &options,
            None,
        )
    };

    let mid = LoadOptions::default()
        .with_offset(0.5)
        .unwrap()
        .with_duration(1.0)
        .unwrap();
    let signal = load(mid).unwrap();
    assert_eq!(signal.len(), 100);
    assert_eq!(signal.get_channel(0).unwrap()[0], 50.0);
    assert!(signal.samples().unwrap().active_region_is_default());

    // Running past the end reads to the end.
    let tail = LoadOptions::default()
        .with_offset(2.5)
        .unwrap()
        .with_duration(10.0)
        .unwrap();
    let signal = load(tail).unwrap();
    assert_eq!(signal.len(), 50);
    assert_eq!(signal.get_channel(0).unwrap()[49], 299.0);

    let beyond = LoadOptions::default().with_offset(3.5).unwrap();
    assert_eq!(load(beyond).unwrap_err().kind(), ErrorKind::InvalidArgument);
}

#[test]
fn load_resamples_to_requested_rate() {
    let decoder = ramp_decoder();
    let options = LoadOptions::default().with_sample_rate(50).unwrap();
    let signal = AudioSignal::load_with(
        SignalSource::FromFile("ramp.wav".into()),
        SignalConfig::default(),
        &decoder,
        &options,
        Some(&Decimator as &dyn Resampler),
    )
    .unwrap();
    assert_eq!(signal.sample_rate(), 50);
    assert_eq!(signal.len(), 150);
    assert_eq!(signal.get_channel(0).unwrap()[1], 2.0);
    assert_eq!(signal.file_name(), Some("ramp.wav"));

    let err = AudioSignal::load_with(
        SignalSource::FromFile("ramp.wav".into()),
        SignalConfig::default(),
        &decoder,
        &options,
        None,
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    // Already at the requested rate: no resampler needed.
    let same = LoadOptions::default().with_sample_rate(100).unwrap();
    let signal = AudioSignal::load_with(
        SignalSource::FromFile("ramp.wav".into()),
        SignalConfig::default(),
        &decoder,
        &same,
        None,
    )
    .unwrap();
    assert_eq!(signal.len(), 300);
}

#[test]
fn assigned_samples_use_their_full_length() {
    let mut narrowed = tone(30);
    narrowed.set_active_region(10, 20);
    let mut signal =
        AudioSignal::new(SignalSource::FromSamples(narrowed.clone()), config()).unwrap();
    assert!(signal.samples().unwrap().active_region_is_default());
    assert_eq!(signal.len(), 30);
    signal.samples_mut().unwrap().truncate_samples(25).unwrap();

    signal.set_samples(narrowed).unwrap();
    assert!(signal.samples().unwrap().active_region_is_default());
    signal.mix_to_mono().unwrap();
    assert_eq!(signal.len(), 30);
}

#[test]
fn istft_follows_edited_samples() {
    let mut signal = AudioSignal::new(SignalSource::FromSamples(tone(400)), config()).unwrap();
    signal.stft(StoreMode::Store).unwrap();
    signal.samples_mut().unwrap().truncate_samples(250).unwrap();
    let out = signal.istft(StoreMode::Discard, None).unwrap();
    assert_eq!(out.len(), 250);

    signal.samples_mut().unwrap().zero_pad(0, 100).unwrap();
    let out = signal.istft(StoreMode::Discard, None).unwrap();
    assert_eq!(out.len(), 350);
}
