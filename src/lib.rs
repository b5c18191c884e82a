/*MIT License

Copyright (c) 2025 David Maseda Neira

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Spectrogram augmentation for training robust audio models.
//!
//! Three independent operators work on 4-D spectrograms laid out as
//! `[batch, channel, frequency_bin, time_frame]`:
//!
//! - [`TimeStretch`]: phase-vocoder time stretch of a complex spectrogram
//! - [`AxisMasking`]: random contiguous masking along frequency or time
//! - [`AdditiveNoise`]: element-wise Gaussian noise
//!
//! Computing the STFT itself is left to the caller.

use rand::RngCore;
use std::fmt;

pub mod masking;
pub mod noise;
pub mod simd;
pub mod spectrogram;
pub mod stretch;

pub use masking::{Axis, AxisMasking, MaskSpan, mask_along_axis, mask_along_axis_batch};
pub use noise::{AdditiveNoise, NoiseScale, add_noise};
pub use rustfft::num_complex::Complex;
pub use spectrogram::{ComplexSpectrogram, Spectrogram};
pub use stretch::{PhaseAdvanceTable, StretchConfig, TimeStretch, phase_vocoder, wrap_phase};

pub mod prelude {
    pub use crate::{
        AdditiveNoise, AugmentError, Axis, AxisMasking, Complex, ComplexSpectrogram, MaskSpan,
        NoiseScale, PhaseAdvanceTable, Spectrogram, SpectrogramAugment, StretchConfig,
        TimeStretch, add_noise, mask_along_axis, mask_along_axis_batch, phase_vocoder,
    };
}

#[derive(Debug, Clone, PartialEq)]
pub enum AugmentError {
    /// A dimension or length disagrees with what the operation requires
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Masking only supports axis 2 (frequency) and axis 3 (time)
    InvalidAxis(usize),
    /// A rate, hop length, bin count, scale or mask width out of range
    InvalidParameter { name: &'static str, value: f64 },
}

impl fmt::Display for AugmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AugmentError::ShapeMismatch {
                what,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Shape mismatch in {}: expected {}, got {}",
                    what, expected, actual
                )
            }
            AugmentError::InvalidAxis(axis) => write!(
                f,
                "Invalid axis {}: only frequency (2) and time (3) masking is supported",
                axis
            ),
            AugmentError::InvalidParameter { name, value } => {
                write!(f, "Invalid parameter {}={}", name, value)
            }
        }
    }
}

impl std::error::Error for AugmentError {}

/// Common seam for the real-valued augmentations so they can be chained
/// by the caller.
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use specaug_rs::prelude::*;
///
/// let chain: Vec<Box<dyn SpectrogramAugment<f32>>> = vec![
///     Box::new(AxisMasking::frequency(4.0, false).unwrap()),
///     Box::new(AdditiveNoise::new(0.01).unwrap()),
/// ];
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let mut spec = Spectrogram::<f32>::new([1, 1, 16, 32], 1.0);
/// for step in &chain {
///     spec = step.augment(spec, &mut rng).unwrap();
/// }
/// assert_eq!(spec.shape(), [1, 1, 16, 32]);
/// ```
pub trait SpectrogramAugment<T> {
    fn augment(
        &self,
        spec: Spectrogram<T>,
        rng: &mut dyn RngCore,
    ) -> Result<Spectrogram<T>, AugmentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_error_display() {
        let err = AugmentError::ShapeMismatch {
            what: "frequency bins",
            expected: 1025,
            actual: 513,
        };
        assert_eq!(
            err.to_string(),
            "Shape mismatch in frequency bins: expected 1025, got 513"
        );

        let err = AugmentError::InvalidAxis(1);
        assert!(err.to_string().contains("Invalid axis 1"));

        let err = AugmentError::InvalidParameter {
            name: "rate",
            value: -1.0,
        };
        assert_eq!(err.to_string(), "Invalid parameter rate=-1");
    }

    #[test]
    fn test_augment_chain_keeps_shape() {
        let chain: Vec<Box<dyn SpectrogramAugment<f64>>> = vec![
            Box::new(AxisMasking::time(5.0, true).unwrap()),
            Box::new(AxisMasking::frequency(3.0, false).unwrap()),
            Box::new(AdditiveNoise::new(0.0).unwrap()),
        ];

        let mut rng = StdRng::seed_from_u64(42);
        let mut spec = Spectrogram::<f64>::new([2, 2, 8, 12], 1.0);
        for step in &chain {
            spec = step.augment(spec, &mut rng).unwrap();
        }

        assert_eq!(spec.shape(), [2, 2, 8, 12]);
        // Zero-scale noise leaves masked zeros and untouched ones exact
        assert!(spec.as_slice().iter().all(|&v| v == 0.0 || v == 1.0));
    }
}
