//! The logical audio signal: time-domain samples, their spectrogram, or
//! both, plus the transform parameters that connect them.

use core::fmt;
use std::path::{Path, PathBuf};

use crate::buffer::{linspace, BitDepth, FixedPointSamples, SampleBuffer};
use crate::config::{LoadOptions, SignalConfig};
use crate::error::{Result, SignalError};
use crate::istft;
use crate::mask::{self, Mask};
use crate::num::Complex64;
use crate::params::StftParams;
use crate::spectrogram::{Spectrogram, TfArray, TfShape};
use crate::stft;

/// Samples produced by an [`AudioDecoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// One row per channel (or per sample frame; rows are auto-transposed
    /// when the signal's config allows it).
    pub rows: Vec<Vec<f64>>,
    pub sample_rate: u32,
}

/// Reads an audio file into floating point rows.
pub trait AudioDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedAudio>;
}

/// Consumes quantized samples, usually by encoding them to a file.
pub trait AudioWriter {
    fn write(&mut self, samples: &FixedPointSamples) -> Result<()>;
}

/// Converts one channel between sample rates.
pub trait Resampler {
    fn resample(&self, channel: &[f64], from_rate: u32, to_rate: u32) -> Result<Vec<f64>>;
}

/// Where a signal's data comes from. Exactly one source per signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalSource {
    /// Decoded by an [`AudioDecoder`].
    FromFile(PathBuf),
    FromSamples(SampleBuffer),
    FromSpectrum(Spectrogram),
}

/// Which domains currently hold data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Empty,
    TimeDomain,
    FrequencyDomain,
    Both,
}

/// What a transform does with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// Return the result, leave the signal untouched.
    Discard,
    /// Store the result next to the existing data.
    #[default]
    Store,
    /// Store the result and clear the domain it was computed from.
    Replace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    samples: Option<SampleBuffer>,
    spectrum: Option<Spectrogram>,
    sample_rate: u32,
    params: StftParams,
    config: SignalConfig,
    /// Length of the time-domain data the spectrogram was computed from.
    source_length: Option<usize>,
    path: Option<PathBuf>,
}

impl AudioSignal {
    /// A signal with no data at the config's default sample rate.
    pub fn empty(config: SignalConfig) -> Result<Self> {
        let sample_rate = config.default_sample_rate;
        Ok(Self {
            samples: None,
            spectrum: None,
            sample_rate,
            params: config.stft_params_for(sample_rate)?,
            config,
            source_length: None,
            path: None,
        })
    }

    /// Build from samples or a spectrogram. File sources need
    /// [`AudioSignal::load`].
    pub fn new(source: SignalSource, config: SignalConfig) -> Result<Self> {
        Self::from_source(source, config)
    }

    /// Build from any source, decoding files with `decoder`.
    pub fn load(
        source: SignalSource,
        config: SignalConfig,
        decoder: &dyn AudioDecoder,
    ) -> Result<Self> {
        Self::load_with(source, config, decoder, &LoadOptions::default(), None)
    }

    /// Like [`AudioSignal::load`], keeping only the section of a decoded
    /// file that `options` selects and converting it to
    /// `options.sample_rate` with `resampler` when the rates differ.
    /// Options are ignored for in-memory sources.
    pub fn load_with(
        source: SignalSource,
        config: SignalConfig,
        decoder: &dyn AudioDecoder,
        options: &LoadOptions,
        resampler: Option<&dyn Resampler>,
    ) -> Result<Self> {
        match source {
            SignalSource::FromFile(path) => {
                let mut signal = Self::empty(config)?;
                let buffer = decode_file(&path, &config, decoder, options, resampler)?;
                signal.set_samples(buffer)?;
                signal.path = Some(path);
                Ok(signal)
            }
            other => Self::from_source(other, config),
        }
    }

    fn from_source(source: SignalSource, config: SignalConfig) -> Result<Self> {
        let mut signal = Self::empty(config)?;
        match source {
            SignalSource::FromFile(path) => {
                return Err(SignalError::invalid_state(format!(
                    "no decoder available to read {}",
                    path.display()
                )))
            }
            SignalSource::FromSamples(buffer) => signal.set_samples(buffer)?,
            SignalSource::FromSpectrum(spectrogram) => signal.spectrum = Some(spectrogram),
        }
        Ok(signal)
    }

    /// Build from rows of samples, honouring the config's auto-transpose flag.
    pub fn from_rows(rows: Vec<Vec<f64>>, sample_rate: u32, config: SignalConfig) -> Result<Self> {
        let buffer = SampleBuffer::from_rows(rows, sample_rate, config.auto_transpose)?;
        Self::new(SignalSource::FromSamples(buffer), config)
    }

    pub fn state(&self) -> SignalState {
        match (self.samples.is_some(), self.spectrum.is_some()) {
            (false, false) => SignalState::Empty,
            (true, false) => SignalState::TimeDomain,
            (false, true) => SignalState::FrequencyDomain,
            (true, true) => SignalState::Both,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn params(&self) -> &StftParams {
        &self.params
    }

    pub fn set_params(&mut self, params: StftParams) {
        self.params = params;
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File name of the decoded source, without its directory.
    pub fn file_name(&self) -> Option<&str> {
        self.path.as_deref()?.file_name()?.to_str()
    }

    pub fn samples(&self) -> Option<&SampleBuffer> {
        self.samples.as_ref()
    }

    /// Edits made through this handle are picked up by the next
    /// [`AudioSignal::istft`], which restores the buffer's current length.
    pub fn samples_mut(&mut self) -> Option<&mut SampleBuffer> {
        self.samples.as_mut()
    }

    pub fn spectrum(&self) -> Option<&Spectrogram> {
        self.spectrum.as_ref()
    }

    pub fn spectrum_mut(&mut self) -> Option<&mut Spectrogram> {
        self.spectrum.as_mut()
    }

    /// Replace the time-domain data. The buffer's active region is reset to
    /// its full length. The signal adopts the buffer's sample rate; derived
    /// transform parameters follow it.
    pub fn set_samples(&mut self, mut buffer: SampleBuffer) -> Result<()> {
        buffer.reset_active_region();
        if buffer.sample_rate() != self.sample_rate {
            if self.config.stft.is_none() {
                self.params = StftParams::for_sample_rate(buffer.sample_rate())?;
            }
            self.sample_rate = buffer.sample_rate();
        }
        self.source_length = Some(buffer.len());
        self.samples = Some(buffer);
        Ok(())
    }

    pub fn set_spectrum(&mut self, spectrogram: Spectrogram) {
        self.spectrum = Some(spectrogram);
    }

    pub fn clear_samples(&mut self) -> Option<SampleBuffer> {
        self.samples.take()
    }

    pub fn clear_spectrum(&mut self) -> Option<Spectrogram> {
        self.spectrum.take()
    }

    fn require_samples(&self) -> Result<&SampleBuffer> {
        self.samples
            .as_ref()
            .ok_or_else(|| SignalError::invalid_state("signal has no time-domain data"))
    }

    fn require_spectrum(&self) -> Result<&Spectrogram> {
        self.spectrum
            .as_ref()
            .ok_or_else(|| SignalError::invalid_state("signal has no spectrogram; run stft first"))
    }

    /// Active length of the time-domain data, or the length the spectrogram
    /// was computed from.
    pub fn len(&self) -> usize {
        match &self.samples {
            Some(buf) => buf.len(),
            None => self.source_length.unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Channel count of the time-domain data, else of the spectrogram.
    pub fn num_channels(&self) -> usize {
        match (&self.samples, &self.spectrum) {
            (Some(buf), _) => buf.num_channels(),
            (None, Some(spec)) => spec.num_channels(),
            (None, None) => 0,
        }
    }

    pub fn is_mono(&self) -> bool {
        self.num_channels() == 1
    }

    pub fn is_stereo(&self) -> bool {
        self.num_channels() == 2
    }

    /// Forward transform of the active time-domain region.
    pub fn stft(&mut self, mode: StoreMode) -> Result<Spectrogram> {
        let buffer = self.require_samples()?;
        let length = buffer.len();
        let spectrogram = stft::forward(buffer, &self.params)?;
        match mode {
            StoreMode::Discard => {}
            StoreMode::Store => {
                self.spectrum = Some(spectrogram.clone());
                self.source_length = Some(length);
            }
            StoreMode::Replace => {
                self.spectrum = Some(spectrogram.clone());
                self.source_length = Some(length);
                self.samples = None;
            }
        }
        Ok(spectrogram)
    }

    /// Inverse transform of the stored spectrogram.
    ///
    /// The output is cut or zero-padded to `truncate_to_length` if given,
    /// else to the current time-domain length, else to the length the
    /// spectrogram was computed from, if known.
    pub fn istft(&mut self, mode: StoreMode, truncate_to_length: Option<usize>) -> Result<SampleBuffer> {
        let target = truncate_to_length
            .or_else(|| self.samples.as_ref().map(SampleBuffer::len))
            .or(self.source_length);
        let spectrogram = self.require_spectrum()?;
        let buffer = istft::inverse(spectrogram, &self.params, self.sample_rate, target)?;
        match mode {
            StoreMode::Discard => {}
            StoreMode::Store => self.samples = Some(buffer.clone()),
            StoreMode::Replace => {
                self.samples = Some(buffer.clone());
                self.spectrum = None;
            }
        }
        Ok(buffer)
    }

    /// Mask the spectrogram into a new signal that holds only the masked
    /// spectrogram. `self` is not modified.
    pub fn apply_mask<M: Mask + ?Sized>(&self, mask: &M) -> Result<AudioSignal> {
        let masked = mask::apply(self.require_spectrum()?, mask)?;
        Ok(self.copy_with_spectrum(masked))
    }

    /// Active region of channel `n`.
    pub fn get_channel(&self, n: usize) -> Result<&[f64]> {
        self.require_samples()?.channel(n)
    }

    pub fn channels(&self) -> Result<impl ExactSizeIterator<Item = &[f64]> + '_> {
        Ok(self.require_samples()?.channels())
    }

    /// Spectrogram channel `n` as `rows[bin][frame]`.
    pub fn get_spectrum_channel(&self, n: usize) -> Result<Vec<Vec<Complex64>>> {
        self.require_spectrum()?.to_matrix(n)
    }

    pub fn magnitude(&self) -> Result<TfArray<f64>> {
        Ok(self.require_spectrum()?.magnitude())
    }

    pub fn power(&self) -> Result<TfArray<f64>> {
        Ok(self.require_spectrum()?.power())
    }

    /// Magnitude of spectrogram channel `n` as `rows[bin][frame]`.
    pub fn magnitude_channel(&self, n: usize) -> Result<Vec<Vec<f64>>> {
        self.require_spectrum()?.channel(n)?.magnitude().to_matrix(0)
    }

    /// Power of spectrogram channel `n` as `rows[bin][frame]`.
    pub fn power_channel(&self, n: usize) -> Result<Vec<Vec<f64>>> {
        self.require_spectrum()?.channel(n)?.power().to_matrix(0)
    }

    /// A one-channel signal holding channel `n` of the time-domain data.
    pub fn make_signal_from_channel(&self, n: usize) -> Result<AudioSignal> {
        let samples = self.get_channel(n)?.to_vec();
        let buffer = SampleBuffer::from_mono(samples, self.sample_rate)?;
        Ok(self.copy_with_samples(buffer))
    }

    /// Channel average of the active time-domain region.
    pub fn to_mono(&self) -> Result<Vec<f64>> {
        Ok(self.require_samples()?.to_mono())
    }

    /// Replace the time-domain data with its channel average.
    pub fn mix_to_mono(&mut self) -> Result<()> {
        let mono = self.require_samples()?.to_mono_buffer()?;
        self.set_samples(mono)
    }

    /// Channel average of the spectrogram.
    pub fn spectrum_to_one_channel(&self) -> Result<Spectrogram> {
        Ok(self.require_spectrum()?.to_one_channel())
    }

    /// Centre frequency in Hz of every spectrogram bin, spaced evenly from 0
    /// to the Nyquist frequency.
    pub fn freq_vector(&self) -> Result<Vec<f64>> {
        let bins = self.require_spectrum()?.num_bins();
        Ok(linspace(0.0, (self.sample_rate / 2) as f64, bins))
    }

    /// Time in seconds of every spectrogram frame, spaced evenly from 0 to
    /// the signal duration.
    pub fn time_bins_vector(&self) -> Result<Vec<f64>> {
        let frames = self.require_spectrum()?.num_frames();
        Ok(linspace(0.0, self.duration_secs(), frames))
    }

    /// Index of the bin whose frequency is closest to `freq` Hz.
    pub fn closest_frequency_bin(&self, freq: f64) -> Result<usize> {
        let freqs = self.freq_vector()?;
        freqs
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - freq).abs().total_cmp(&(*b - freq).abs()))
            .map(|(i, _)| i)
            .ok_or_else(|| SignalError::invalid_state("spectrogram has no frequency bins"))
    }

    /// Root mean square of the active time-domain region.
    pub fn rms(&self) -> Result<f64> {
        Ok(self.require_samples()?.rms())
    }

    /// Same shape and settings, every value zero.
    pub fn make_empty_copy(&self) -> Result<AudioSignal> {
        let mut copy = self.clone();
        if let Some(buf) = &self.samples {
            copy.samples = Some(SampleBuffer::zeros(
                buf.num_channels(),
                buf.len(),
                buf.sample_rate(),
            )?);
        }
        if let Some(spec) = &self.spectrum {
            copy.spectrum = Some(Spectrogram::filled(spec.shape(), Complex64::ZERO)?);
        }
        Ok(copy)
    }

    /// Same settings with `buffer` as the only data.
    pub fn copy_with_samples(&self, buffer: SampleBuffer) -> AudioSignal {
        AudioSignal {
            source_length: Some(buffer.len()),
            sample_rate: buffer.sample_rate(),
            samples: Some(buffer),
            spectrum: None,
            params: self.params,
            config: self.config,
            path: self.path.clone(),
        }
    }

    /// Same settings with `spectrogram` as the only data. The source length
    /// is kept so the inverse transform can restore it.
    pub fn copy_with_spectrum(&self, spectrogram: Spectrogram) -> AudioSignal {
        AudioSignal {
            samples: None,
            spectrum: Some(spectrogram),
            sample_rate: self.sample_rate,
            params: self.params,
            config: self.config,
            source_length: self.source_length,
            path: self.path.clone(),
        }
    }

    /// A new time-domain signal at `new_rate`, converted channel by channel.
    pub fn resampled(&self, resampler: &dyn Resampler, new_rate: u32) -> Result<AudioSignal> {
        let buffer = self.require_samples()?;
        if new_rate == 0 {
            return Err(SignalError::invalid_argument("sample rate must be positive"));
        }
        let resampled = resample_buffer(buffer, resampler, new_rate)?;
        let mut signal = self.copy_with_samples(resampled);
        if self.config.stft.is_none() {
            signal.params = StftParams::for_sample_rate(new_rate)?;
        }
        Ok(signal)
    }

    /// Peak-normalize a copy of the active time-domain region, quantize it
    /// to `bit_depth` and hand it to `writer`.
    pub fn write_with(&self, writer: &mut dyn AudioWriter, bit_depth: BitDepth) -> Result<()> {
        let mut copy = self.require_samples()?.scale(1.0)?;
        if copy.peak_normalize()? {
            log::debug!("peak-normalized output before quantizing");
        }
        writer.write(&copy.to_fixed_point(bit_depth))
    }

    /// Shape of the stored spectrogram.
    pub fn spectrum_shape(&self) -> Option<TfShape> {
        self.spectrum.as_ref().map(|s| s.shape())
    }

    /// Deep comparison of every field.
    pub fn equals(&self, other: &AudioSignal) -> bool {
        self == other
    }
}

fn resample_buffer(
    buffer: &SampleBuffer,
    resampler: &dyn Resampler,
    new_rate: u32,
) -> Result<SampleBuffer> {
    let rows = buffer
        .channels()
        .map(|ch| resampler.resample(ch, buffer.sample_rate(), new_rate))
        .collect::<Result<Vec<_>>>()?;
    SampleBuffer::from_rows(rows, new_rate, false)
}

fn decode_file(
    path: &Path,
    config: &SignalConfig,
    decoder: &dyn AudioDecoder,
    options: &LoadOptions,
    resampler: Option<&dyn Resampler>,
) -> Result<SampleBuffer> {
    let decoded = decoder.decode(path)?;
    log::debug!(
        "decoded {}: {} row(s) at {} Hz",
        path.display(),
        decoded.rows.len(),
        decoded.sample_rate
    );
    let mut buffer =
        SampleBuffer::from_rows(decoded.rows, decoded.sample_rate, config.auto_transpose)?;
    let len = buffer.len();
    let (start, end) = options.section(len, buffer.sample_rate())?;
    if (start, end) != (0, len) {
        buffer.crop(start, len - end)?;
    }
    match options.sample_rate {
        Some(rate) if rate != buffer.sample_rate() => {
            let resampler = resampler.ok_or_else(|| {
                SignalError::invalid_state(format!(
                    "no resampler available to convert {} from {} Hz to {} Hz",
                    path.display(),
                    buffer.sample_rate(),
                    rate
                ))
            })?;
            log::warn!(
                "{} is sampled at {} Hz, resampling to {} Hz",
                path.display(),
                buffer.sample_rate(),
                rate
            );
            resample_buffer(&buffer, resampler, rate)
        }
        _ => Ok(buffer),
    }
}

impl fmt::Display for AudioSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AudioSignal")?;
        if let Some(name) = self.file_name() {
            write!(f, " ({})", name)?;
        }
        write!(
            f,
            ": {} channel(s), {:.3} s @ {} Hz, {:?}",
            self.num_channels(),
            self.duration_secs(),
            self.sample_rate,
            self.state()
        )
    }
}
