//! Dense 4-D spectrogram storage.
//!
//! Data is row-major over `[batch, channel, frequency_bin, time_frame]`, so the
//! frames of one `(batch, channel, bin)` lane are contiguous.

use num_traits::{Float, Zero};
use rustfft::num_complex::Complex;

use crate::AugmentError;

/// Axis names in shape order, used in error messages
const DIM_NAMES: [&str; 4] = ["batch", "channel", "frequency", "time"];

#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram<E> {
    shape: [usize; 4],
    data: Vec<E>,
}

/// Complex-valued spectrogram consumed by the time stretch
pub type ComplexSpectrogram<T> = Spectrogram<Complex<T>>;

impl<E: Clone> Spectrogram<E> {
    pub fn new(shape: [usize; 4], value: E) -> Self {
        Self {
            shape,
            data: vec![value; shape.iter().product()],
        }
    }

    /// Single-element spectrogram, broadcastable to any shape
    pub fn scalar(value: E) -> Self {
        Self::new([1, 1, 1, 1], value)
    }

    /// Materialize `self` at `shape`, repeating every dimension of size 1.
    pub fn broadcast_to(&self, shape: [usize; 4]) -> Result<Self, AugmentError> {
        for (dim, (&have, &want)) in self.shape.iter().zip(shape.iter()).enumerate() {
            if have != want && have != 1 {
                return Err(AugmentError::ShapeMismatch {
                    what: DIM_NAMES[dim],
                    expected: want,
                    actual: have,
                });
            }
        }

        if self.shape == shape {
            return Ok(self.clone());
        }

        let pick = |idx: usize, dim: usize| if self.shape[dim] == 1 { 0 } else { idx };
        Ok(Self::from_fn(shape, |[b, c, f, t]| {
            self.data[self.offset([pick(b, 0), pick(c, 1), pick(f, 2), pick(t, 3)])].clone()
        }))
    }
}

impl<E> Spectrogram<E> {
    pub fn from_vec(shape: [usize; 4], data: Vec<E>) -> Result<Self, AugmentError> {
        let expected = shape.iter().product();
        if data.len() != expected {
            return Err(AugmentError::ShapeMismatch {
                what: "element count",
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    pub fn from_fn(shape: [usize; 4], mut f: impl FnMut([usize; 4]) -> E) -> Self {
        let [batch, channels, bins, frames] = shape;
        let mut data = Vec::with_capacity(shape.iter().product());
        for b in 0..batch {
            for c in 0..channels {
                for k in 0..bins {
                    for t in 0..frames {
                        data.push(f([b, c, k, t]));
                    }
                }
            }
        }
        Self { shape, data }
    }

    #[inline]
    pub fn shape(&self) -> [usize; 4] {
        self.shape
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.shape[0]
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.shape[1]
    }

    #[inline]
    pub fn freq_bins(&self) -> usize {
        self.shape[2]
    }

    #[inline]
    pub fn num_frames(&self) -> usize {
        self.shape[3]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn offset(&self, [b, c, f, t]: [usize; 4]) -> usize {
        let [_, channels, bins, frames] = self.shape;
        ((b * channels + c) * bins + f) * frames + t
    }

    /// Panics if any index is out of bounds.
    #[inline]
    pub fn get(&self, index: [usize; 4]) -> &E {
        self.check_index(index);
        &self.data[self.offset(index)]
    }

    #[inline]
    pub fn set(&mut self, index: [usize; 4], value: E) {
        self.check_index(index);
        let offset = self.offset(index);
        self.data[offset] = value;
    }

    #[inline]
    fn check_index(&self, index: [usize; 4]) {
        for dim in 0..4 {
            assert!(
                index[dim] < self.shape[dim],
                "{} index {} out of bounds for size {}",
                DIM_NAMES[dim],
                index[dim],
                self.shape[dim]
            );
        }
    }

    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [E] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<E> {
        self.data
    }

    /// Iterate the time series of every `(batch, channel, bin)` in storage order.
    pub fn lanes(&self) -> impl Iterator<Item = &[E]> + '_ {
        // chunks_exact panics on 0
        self.data.chunks_exact(self.shape[3].max(1))
    }

    /// The `[frequency, time]` plane of one `(batch, channel)` pair, flattened.
    pub(crate) fn plane_mut(&mut self, pair: usize) -> &mut [E] {
        let plane = self.shape[2] * self.shape[3];
        &mut self.data[pair * plane..(pair + 1) * plane]
    }
}

impl<E: Clone + Zero> Spectrogram<E> {
    pub fn zeros(shape: [usize; 4]) -> Self {
        Self::new(shape, E::zero())
    }
}

impl<T: Float> Spectrogram<Complex<T>> {
    /// Element-wise magnitude `|z|`
    pub fn magnitudes(&self) -> Spectrogram<T> {
        Spectrogram {
            shape: self.shape,
            data: self.data.iter().map(|z| z.norm()).collect(),
        }
    }

    /// Element-wise phase `atan2(im, re)` in `[-π, π]`
    pub fn phases(&self) -> Spectrogram<T> {
        Spectrogram {
            shape: self.shape,
            data: self.data.iter().map(|z| z.arg()).collect(),
        }
    }

    pub fn from_magnitude_phase(
        magnitudes: &Spectrogram<T>,
        phases: &Spectrogram<T>,
    ) -> Result<Self, AugmentError> {
        if let Some(dim) = (0..4).find(|&d| magnitudes.shape[d] != phases.shape[d]) {
            return Err(AugmentError::ShapeMismatch {
                what: DIM_NAMES[dim],
                expected: magnitudes.shape[dim],
                actual: phases.shape[dim],
            });
        }

        let data = magnitudes
            .data
            .iter()
            .zip(phases.data.iter())
            .map(|(&mag, &phase)| Complex::from_polar(mag, phase))
            .collect();

        Ok(Spectrogram {
            shape: magnitudes.shape,
            data,
        })
    }
}
