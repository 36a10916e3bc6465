//! Test intent: verifies the fixed-point writer boundary by encoding and
//! decoding real WAV files.
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use sigframe::{
    AudioDecoder, AudioSignal, AudioWriter, BitDepth, DecodedAudio, FixedPointSamples, Result,
    SampleBuffer, SignalConfig, SignalError, SignalSource,
};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Writes integer WAV files with hound.
struct WavFileWriter {
    path: PathBuf,
}

impl AudioWriter for WavFileWriter {
    fn write(&mut self, samples: &FixedPointSamples) -> Result<()> {
        let spec = WavSpec {
            channels: samples.num_channels() as u16,
            sample_rate: samples.sample_rate(),
            bits_per_sample: samples.bit_depth().bits() as u16,
            sample_format: SampleFormat::Int,
        };
        let external = |e: hound::Error| SignalError::External(e.to_string());
        let mut writer = WavWriter::create(&self.path, spec).map_err(external)?;
        for s in samples.interleaved() {
            writer.write_sample(s).map_err(external)?;
        }
        writer.finalize().map_err(external)
    }
}

/// Reads integer WAV files with hound.
struct WavFileDecoder;

impl AudioDecoder for WavFileDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio> {
        let external = |e: hound::Error| SignalError::External(e.to_string());
        let mut reader = WavReader::open(path).map_err(external)?;
        let spec = reader.spec();
        let depth = BitDepth::from_bits(spec.bits_per_sample as u32)?;
        let interleaved: Vec<i32> = reader
            .samples::<i32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(external)?;
        let channels = spec.channels as usize;
        let scale = depth.full_scale();
        let rows = (0..channels)
            .map(|c| {
                interleaved
                    .iter()
                    .skip(c)
                    .step_by(channels)
                    .map(|&s| s as f64 / scale)
                    .collect()
            })
            .collect();
        Ok(DecodedAudio {
            rows,
            sample_rate: spec.sample_rate,
        })
    }
}

#[test]
fn stereo_16_bit_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stereo.wav");
    let left: Vec<f64> = (0..800).map(|i| 0.5 * (i as f64 * 0.01).sin()).collect();
    let right: Vec<f64> = left.iter().map(|x| -x).collect();
    let buffer = SampleBuffer::from_rows(vec![left.clone(), right], 8_000, true).unwrap();
    let signal = AudioSignal::new(SignalSource::FromSamples(buffer), SignalConfig::default()).unwrap();

    let mut writer = WavFileWriter { path: path.clone() };
    signal.write_with(&mut writer, BitDepth::Sixteen).unwrap();

    let loaded = AudioSignal::load(
        SignalSource::FromFile(path),
        SignalConfig::default(),
        &WavFileDecoder,
    )
    .unwrap();
    assert_eq!(loaded.num_channels(), 2);
    assert_eq!(loaded.len(), 800);
    assert_eq!(loaded.sample_rate(), 8_000);
    let decoded = loaded.get_channel(0).unwrap();
    for (a, b) in left.iter().zip(decoded) {
        assert!((a - b).abs() <= 1.0 / 32_768.0, "{} vs {}", a, b);
    }
}

#[test]
fn loud_signal_is_normalized_before_quantizing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("loud.wav");
    let buffer = SampleBuffer::from_mono(vec![0.0, 2.0, -4.0, 1.0], 8_000).unwrap();
    let signal = AudioSignal::new(SignalSource::FromSamples(buffer.clone()), SignalConfig::default()).unwrap();

    let mut writer = WavFileWriter { path: path.clone() };
    signal.write_with(&mut writer, BitDepth::Sixteen).unwrap();
    // The signal itself keeps its original samples.
    assert_eq!(signal.samples(), Some(&buffer));

    let mut reader = WavReader::open(&path).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![0, 16_384, -32_768, 8_192]);
}

#[test]
fn eight_bit_depth_is_honoured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("eight.wav");
    let buffer = SampleBuffer::from_mono(vec![0.5, -0.5, 0.25], 8_000).unwrap();
    let signal = AudioSignal::new(SignalSource::FromSamples(buffer), SignalConfig::default()).unwrap();
    let mut writer = WavFileWriter { path: path.clone() };
    signal.write_with(&mut writer, BitDepth::Eight).unwrap();

    let reader = WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 8);
}

#[test]
fn missing_file_is_an_external_error() {
    let dir = tempdir().unwrap();
    let err = AudioSignal::load(
        SignalSource::FromFile(dir.path().join("absent.wav")),
        SignalConfig::default(),
        &WavFileDecoder,
    )
    .unwrap_err();
    assert_eq!(err.kind(), sigframe::ErrorKind::External);
}
