//! Random masking of contiguous frequency or time bands.
//!
//! A mask width is drawn uniformly from `[0, max_value)` and a start from
//! `[0, axis_len - width)`, both truncated to integers, and the covered rows
//! (frequency) or columns (time) are overwritten with a fill value. Masking
//! is either independent for every `(batch, channel)` pair or shared by the
//! whole batch.

use rand::{Rng, RngCore};
use std::fmt;

use crate::spectrogram::Spectrogram;
use crate::{AugmentError, SpectrogramAugment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Frequency,
    Time,
}

impl Axis {
    /// Position of the axis in the `[batch, channel, bin, frame]` layout
    pub fn index(self) -> usize {
        match self {
            Axis::Frequency => 2,
            Axis::Time => 3,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = AugmentError;

    fn try_from(axis: usize) -> Result<Self, Self::Error> {
        match axis {
            2 => Ok(Axis::Frequency),
            3 => Ok(Axis::Time),
            other => Err(AugmentError::InvalidAxis(other)),
        }
    }
}

/// Half-open `[start, end)` range along the masked axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskSpan {
    pub start: usize,
    pub end: usize,
}

impl MaskSpan {
    /// Turn the raw uniform draws into an index range: `start = trunc(min_value)`,
    /// `end = start + trunc(value)`, kept inside `[0, axis_len]`.
    fn from_draws(value: f64, min_value: f64, axis_len: usize) -> Self {
        let start = min_value as i64;
        let end = start.saturating_add(value as i64);
        let clamp = |idx: i64| idx.clamp(0, axis_len as i64) as usize;
        Self {
            start: clamp(start),
            end: clamp(end),
        }
    }

    fn draw<R: Rng + ?Sized>(rng: &mut R, max_value: f64, axis_len: usize) -> Self {
        let value = rng.gen::<f64>() * max_value;
        let min_value = rng.gen::<f64>() * (axis_len as f64 - value);
        Self::from_draws(value, min_value, axis_len)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }
}

fn check_max_value(max_value: f64) -> Result<(), AugmentError> {
    if max_value > 0.0 && max_value.is_finite() {
        Ok(())
    } else {
        Err(AugmentError::InvalidParameter {
            name: "max_value",
            value: max_value,
        })
    }
}

/// Overwrite `span` of one `(batch, channel)` plane.
fn fill_span<E: Copy>(
    spec: &mut Spectrogram<E>,
    pair: usize,
    axis: Axis,
    span: MaskSpan,
    mask_value: E,
) {
    if span.is_empty() {
        return;
    }

    let frames = spec.num_frames();
    let plane = spec.plane_mut(pair);
    match axis {
        // Rows of a plane are contiguous, so a frequency band is one slice
        Axis::Frequency => plane[span.start * frames..span.end * frames].fill(mask_value),
        Axis::Time => {
            for row in plane.chunks_exact_mut(frames) {
                row[span.start..span.end].fill(mask_value);
            }
        }
    }
}

/// Mask a random band along `axis`, drawn independently for every
/// `(batch, channel)` pair. `spec` is modified in place; the span used for each
/// pair is returned in storage order.
///
/// `axis` must be 2 (frequency) or 3 (time).
pub fn mask_along_axis<E: Copy, R: Rng + ?Sized>(
    spec: &mut Spectrogram<E>,
    max_value: f64,
    mask_value: E,
    axis: usize,
    rng: &mut R,
) -> Result<Vec<MaskSpan>, AugmentError> {
    let axis = Axis::try_from(axis)?;
    check_max_value(max_value)?;

    let axis_len = spec.shape()[axis.index()];
    let pairs = spec.batch_size() * spec.channels();

    // All widths are drawn before all starts
    let values: Vec<f64> = (0..pairs).map(|_| rng.gen::<f64>() * max_value).collect();
    let spans: Vec<MaskSpan> = values
        .into_iter()
        .map(|value| {
            let min_value = rng.gen::<f64>() * (axis_len as f64 - value);
            MaskSpan::from_draws(value, min_value, axis_len)
        })
        .collect();

    for (pair, &span) in spans.iter().enumerate() {
        fill_span(spec, pair, axis, span, mask_value);
    }

    log::trace!("masked {:?} per example: {:?}", axis, spans);
    Ok(spans)
}

/// Mask one random band along `axis`, shared by every `(batch, channel)` pair.
pub fn mask_along_axis_batch<E: Copy, R: Rng + ?Sized>(
    spec: &mut Spectrogram<E>,
    max_value: f64,
    mask_value: E,
    axis: usize,
    rng: &mut R,
) -> Result<MaskSpan, AugmentError> {
    let axis = Axis::try_from(axis)?;
    check_max_value(max_value)?;

    let span = MaskSpan::draw(rng, max_value, spec.shape()[axis.index()]);
    for pair in 0..spec.batch_size() * spec.channels() {
        fill_span(spec, pair, axis, span, mask_value);
    }

    log::trace!("masked {:?} across batch: {:?}", axis, span);
    Ok(span)
}

/// Frequency or time masking with a fixed maximum width.
#[derive(Debug, Clone)]
pub struct AxisMasking {
    max_value: f64,
    axis: Axis,
    across_batch: bool,
}

impl AxisMasking {
    pub fn new(max_value: f64, axis: Axis, across_batch: bool) -> Result<Self, AugmentError> {
        check_max_value(max_value)?;
        log::debug!(
            "axis masking: axis={:?} max_value={} across_batch={}",
            axis,
            max_value,
            across_batch
        );
        Ok(Self {
            max_value,
            axis,
            across_batch,
        })
    }

    /// Mask up to `max_freq` frequency bins.
    pub fn frequency(max_freq: f64, across_batch: bool) -> Result<Self, AugmentError> {
        Self::new(max_freq, Axis::Frequency, across_batch)
    }

    /// Mask up to `max_time` frames.
    pub fn time(max_time: f64, across_batch: bool) -> Result<Self, AugmentError> {
        Self::new(max_time, Axis::Time, across_batch)
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn across_batch(&self) -> bool {
        self.across_batch
    }

    pub fn mask<E: Copy>(
        &self,
        spec: &mut Spectrogram<E>,
        mask_value: E,
    ) -> Result<Vec<MaskSpan>, AugmentError> {
        self.mask_with_rng(spec, mask_value, &mut rand::thread_rng())
    }

    /// Mask `spec` in place and return the span applied to each
    /// `(batch, channel)` pair.
    pub fn mask_with_rng<E: Copy, R: Rng + ?Sized>(
        &self,
        spec: &mut Spectrogram<E>,
        mask_value: E,
        rng: &mut R,
    ) -> Result<Vec<MaskSpan>, AugmentError> {
        let axis = self.axis.index();
        if self.across_batch {
            let span = mask_along_axis_batch(spec, self.max_value, mask_value, axis, rng)?;
            Ok(vec![span; spec.batch_size() * spec.channels()])
        } else {
            mask_along_axis(spec, self.max_value, mask_value, axis, rng)
        }
    }
}

impl fmt::Display for AxisMasking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.axis {
            Axis::Frequency => "FrequencyMasking",
            Axis::Time => "TimeMasking",
        };
        write!(
            f,
            "{}(max_value={}, across_batch={})",
            name, self.max_value, self.across_batch
        )
    }
}

impl<T: Copy + num_traits::Zero> SpectrogramAugment<T> for AxisMasking {
    fn augment(
        &self,
        mut spec: Spectrogram<T>,
        rng: &mut dyn RngCore,
    ) -> Result<Spectrogram<T>, AugmentError> {
        self.mask_with_rng(&mut spec, T::zero(), rng)?;
        Ok(spec)
    }
}
