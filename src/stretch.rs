//! Phase-vocoder time stretch of complex spectrograms.
//!
//! Stretching resamples the time axis of a `[batch, channel, bin, frame]`
//! spectrogram at fractional positions `i * rate`. Magnitudes are linearly
//! interpolated between neighbouring frames, while phases are rebuilt by
//! accumulating each bin's instantaneous frequency so that the output stays
//! phase-continuous whatever the rate.

use num_traits::{Float, FloatConst, FromPrimitive};
use rustfft::num_complex::Complex;
use std::f64::consts::PI;
use std::fmt;
use std::mem;
use std::ops::Index;

use crate::AugmentError;
use crate::spectrogram::{ComplexSpectrogram, Spectrogram};

/// Expected phase advance of every frequency bin over one analysis hop.
///
/// Bin `k` of an `n_fft = 2 * (num_bins - 1)` transform rotates by
/// `2π * k * hop_len / n_fft` per hop, i.e. the table is linearly spaced
/// from `0` to `π * hop_len`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseAdvanceTable<T> {
    advance: Vec<T>,
}

impl<T: Float + FromPrimitive> PhaseAdvanceTable<T> {
    pub fn new(hop_len: usize, num_bins: usize) -> Result<Self, AugmentError> {
        if hop_len == 0 {
            return Err(AugmentError::InvalidParameter {
                name: "hop_len",
                value: 0.0,
            });
        }
        if num_bins == 0 {
            return Err(AugmentError::InvalidParameter {
                name: "num_bins",
                value: 0.0,
            });
        }

        let end = PI * hop_len as f64;
        let denom = (num_bins - 1).max(1) as f64;
        let advance = (0..num_bins)
            .map(|k| {
                T::from_f64(end * k as f64 / denom).ok_or(AugmentError::InvalidParameter {
                    name: "hop_len",
                    value: hop_len as f64,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self { advance })
    }
}

impl<T> PhaseAdvanceTable<T> {
    pub fn len(&self) -> usize {
        self.advance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advance.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.advance
    }
}

impl<T> Index<usize> for PhaseAdvanceTable<T> {
    type Output = T;

    fn index(&self, bin: usize) -> &T {
        &self.advance[bin]
    }
}

/// Wrap a phase into `(-π, π]`.
pub fn wrap_phase<T: Float + FloatConst>(phase: T) -> T {
    let pi = T::PI();
    let two_pi = pi + pi;

    let wrapped = phase - two_pi * (phase / two_pi).round();
    if wrapped <= -pi {
        wrapped + two_pi
    } else if wrapped > pi {
        wrapped - two_pi
    } else {
        wrapped
    }
}

fn check_rate<T: Float>(rate: T) -> Result<(), AugmentError> {
    if rate > T::zero() && rate.is_finite() {
        Ok(())
    } else {
        Err(AugmentError::InvalidParameter {
            name: "rate",
            value: rate.to_f64().unwrap_or(f64::NAN),
        })
    }
}

/// Number of output frames for `num_frames` input frames stretched by `rate`.
///
/// Fails when `ceil(num_frames / rate)` does not fit in a `usize`.
pub(crate) fn stretched_len<T: Float>(
    num_frames: usize,
    rate: T,
) -> Result<usize, AugmentError> {
    let rate = rate.to_f64().unwrap_or(f64::NAN);
    let frames = (num_frames as f64 / rate).ceil();
    if !frames.is_finite() || frames >= usize::MAX as f64 {
        return Err(AugmentError::InvalidParameter {
            name: "rate",
            value: rate,
        });
    }
    Ok((frames as usize).max(1))
}

/// Output frame count, rejecting rates whose output could not be allocated.
fn checked_output_frames<T: Float>(shape: [usize; 4], rate: T) -> Result<usize, AugmentError> {
    let [batch, channels, bins, frames] = shape;
    let out_frames = stretched_len(frames, rate)?;

    let bytes = batch
        .checked_mul(channels)
        .and_then(|n| n.checked_mul(bins))
        .and_then(|n| n.checked_mul(out_frames))
        .and_then(|n| n.checked_mul(mem::size_of::<Complex<T>>()));
    match bytes {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(out_frames),
        _ => Err(AugmentError::InvalidParameter {
            name: "rate",
            value: rate.to_f64().unwrap_or(f64::NAN),
        }),
    }
}

/// Stretch `spec` in time by `rate` without changing its pitch.
///
/// `rate > 1` speeds up (fewer frames), `rate < 1` slows down. The output has
/// `ceil(num_frames / rate)` frames, and never fewer than one. Frames past the
/// end of the input read as zero.
///
/// The bin count of `spec` must equal the length of `phase_advance`.
pub fn phase_vocoder<T: Float + FloatConst>(
    spec: &ComplexSpectrogram<T>,
    rate: T,
    phase_advance: &PhaseAdvanceTable<T>,
) -> Result<ComplexSpectrogram<T>, AugmentError> {
    check_rate(rate)?;

    let [batch, channels, bins, frames] = spec.shape();
    if bins != phase_advance.len() {
        return Err(AugmentError::ShapeMismatch {
            what: "frequency bins",
            expected: phase_advance.len(),
            actual: bins,
        });
    }

    if rate == T::one() {
        return Ok(spec.clone());
    }

    let out_frames = checked_output_frames(spec.shape(), rate)?;
    log::trace!(
        "phase vocoder: {} -> {} frames over {} lanes",
        frames,
        out_frames,
        batch * channels * bins
    );

    if frames == 0 {
        return Ok(Spectrogram::zeros([batch, channels, bins, out_frames]));
    }

    // Read positions i * rate, shared by every lane
    let mut positions = Vec::with_capacity(out_frames);
    let mut index = T::zero();
    for _ in 0..out_frames {
        let step = index * rate;
        let floor = step.floor();
        positions.push((floor.to_usize().unwrap_or(frames), step - floor));
        index = index + T::one();
    }

    let magnitudes = spec.magnitudes();
    let phases = spec.phases();
    let mut data = Vec::with_capacity(batch * channels * bins * out_frames);

    for (lane, (mag, phase)) in magnitudes.lanes().zip(phases.lanes()).enumerate() {
        let advance = phase_advance[lane % bins];
        // Zero padding past the last frame: magnitude 0, phase 0
        let at = |idx: usize| {
            (
                mag.get(idx).copied().unwrap_or_else(T::zero),
                phase.get(idx).copied().unwrap_or_else(T::zero),
            )
        };

        let mut phase_acc = phase[0];
        for &(lo, alpha) in &positions {
            let (mag_lo, phase_lo) = at(lo);
            let (mag_hi, phase_hi) = at(lo.saturating_add(1));

            let mag_i = (T::one() - alpha) * mag_lo + alpha * mag_hi;
            data.push(Complex::from_polar(mag_i, phase_acc));

            // One output hop covers one analysis hop of phase rotation
            phase_acc = phase_acc + wrap_phase(phase_hi - phase_lo - advance) + advance;
        }
    }

    Spectrogram::from_vec([batch, channels, bins, out_frames], data)
}

#[derive(Debug, Clone)]
pub struct StretchConfig<T> {
    /// Default stretch rate, overridable per call
    pub rate: T,
    /// Samples between STFT columns
    pub hop_len: usize,
    /// Frequency bins of the STFT (`n_fft / 2 + 1`)
    pub num_bins: usize,
}

impl<T: Float> Default for StretchConfig<T> {
    fn default() -> Self {
        Self {
            rate: T::one(),
            hop_len: 512,
            num_bins: 1025,
        }
    }
}

impl<T: Float> StretchConfig<T> {
    pub fn validate(&self) -> Result<(), AugmentError> {
        check_rate(self.rate)?;
        if self.hop_len == 0 {
            return Err(AugmentError::InvalidParameter {
                name: "hop_len",
                value: 0.0,
            });
        }
        if self.num_bins == 0 {
            return Err(AugmentError::InvalidParameter {
                name: "num_bins",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Time stretch with a default rate and its own phase advance table.
pub struct TimeStretch<T> {
    rate: T,
    hop_len: usize,
    phase_advance: PhaseAdvanceTable<T>,
}

impl<T: Float + FloatConst + FromPrimitive + fmt::Debug> TimeStretch<T> {
    pub fn new(rate: T, hop_len: usize, num_bins: usize) -> Result<Self, AugmentError> {
        Self::from_config(StretchConfig {
            rate,
            hop_len,
            num_bins,
        })
    }

    pub fn from_config(config: StretchConfig<T>) -> Result<Self, AugmentError> {
        config.validate()?;
        let phase_advance = PhaseAdvanceTable::new(config.hop_len, config.num_bins)?;

        log::debug!(
            "time stretch: rate={:?} hop_len={} num_bins={}",
            config.rate,
            config.hop_len,
            config.num_bins
        );

        Ok(Self {
            rate: config.rate,
            hop_len: config.hop_len,
            phase_advance,
        })
    }

    /// Stretch with `rate` if given, else with the default rate.
    pub fn stretch(
        &self,
        spec: &ComplexSpectrogram<T>,
        rate: Option<T>,
    ) -> Result<ComplexSpectrogram<T>, AugmentError> {
        phase_vocoder(spec, rate.unwrap_or(self.rate), &self.phase_advance)
    }

    pub fn rate(&self) -> T {
        self.rate
    }

    pub fn hop_len(&self) -> usize {
        self.hop_len
    }

    pub fn num_bins(&self) -> usize {
        self.phase_advance.len()
    }

    pub fn phase_advance(&self) -> &PhaseAdvanceTable<T> {
        &self.phase_advance
    }
}

/// Rate 1, hop 512, 1025 bins
impl<T: Float + FloatConst + FromPrimitive + fmt::Debug> Default for TimeStretch<T> {
    fn default() -> Self {
        Self::from_config(StretchConfig::default()).expect("Default config should always be valid")
    }
}

impl<T: fmt::Display> fmt::Display for TimeStretch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeStretch(rate={})", self.rate)
    }
}
