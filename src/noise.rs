//! Additive Gaussian noise.

use num_traits::Float;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};
use std::fmt;

use crate::spectrogram::Spectrogram;
use crate::simd::{self, Deviation};
use crate::{AugmentError, SpectrogramAugment};

/// Standard deviation of the added noise.
#[derive(Debug, Clone, PartialEq)]
pub enum NoiseScale<T> {
    /// Same deviation for every element
    Scalar(T),
    /// Per-element deviation, broadcast to the input shape
    Tensor(Spectrogram<T>),
}

impl<T: Float> NoiseScale<T> {
    /// Scales must be finite and non-negative. Zero is allowed and adds nothing.
    pub fn validate(&self) -> Result<(), AugmentError> {
        let bad = match self {
            NoiseScale::Scalar(s) => (!Self::is_valid(*s)).then_some(*s),
            NoiseScale::Tensor(t) => t.as_slice().iter().copied().find(|&s| !Self::is_valid(s)),
        };

        match bad {
            Some(s) => Err(AugmentError::InvalidParameter {
                name: "scale",
                value: s.to_f64().unwrap_or(f64::NAN),
            }),
            None => Ok(()),
        }
    }

    fn is_valid(s: T) -> bool {
        s >= T::zero() && s.is_finite()
    }
}

impl<T: fmt::Display> fmt::Display for NoiseScale<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseScale::Scalar(s) => write!(f, "{}", s),
            NoiseScale::Tensor(t) => write!(f, "tensor{:?}", t.shape()),
        }
    }
}

/// Return `spec + scale * z` with `z ~ N(0, 1)` drawn per element.
///
/// The input is left untouched. A tensor `scale` must broadcast to the shape of
/// `spec`.
pub fn add_noise<T, R>(
    spec: &Spectrogram<T>,
    scale: &NoiseScale<T>,
    rng: &mut R,
) -> Result<Spectrogram<T>, AugmentError>
where
    T: Float,
    StandardNormal: Distribution<T>,
    R: Rng + ?Sized,
{
    scale.validate()?;

    let noise: Vec<T> = (0..spec.len()).map(|_| rng.sample(StandardNormal)).collect();

    let mut output = spec.as_slice().to_vec();
    match scale {
        NoiseScale::Scalar(s) => {
            simd::add_scaled_noise(&mut output, &noise, Deviation::Uniform(*s));
        }
        NoiseScale::Tensor(t) => {
            let per_element = t.broadcast_to(spec.shape())?;
            simd::add_scaled_noise(
                &mut output,
                &noise,
                Deviation::PerElement(per_element.as_slice()),
            );
        }
    }

    Spectrogram::from_vec(spec.shape(), output)
}

/// Gaussian noise with a default scale that can be overridden per call.
#[derive(Debug, Clone)]
pub struct AdditiveNoise<T> {
    scale: NoiseScale<T>,
}

impl<T> AdditiveNoise<T>
where
    T: Float + fmt::Debug,
    StandardNormal: Distribution<T>,
{
    pub fn new(scale: T) -> Result<Self, AugmentError> {
        Self::from_scale(NoiseScale::Scalar(scale))
    }

    pub fn with_scale_tensor(scale: Spectrogram<T>) -> Result<Self, AugmentError> {
        Self::from_scale(NoiseScale::Tensor(scale))
    }

    fn from_scale(scale: NoiseScale<T>) -> Result<Self, AugmentError> {
        scale.validate()?;
        log::debug!("additive noise: scale={:?}", scale);
        Ok(Self { scale })
    }

    pub fn scale(&self) -> &NoiseScale<T> {
        &self.scale
    }

    pub fn apply(
        &self,
        spec: &Spectrogram<T>,
        scale: Option<&NoiseScale<T>>,
    ) -> Result<Spectrogram<T>, AugmentError> {
        self.apply_with_rng(spec, scale, &mut rand::thread_rng())
    }

    /// Add noise using `scale` if given, else the default scale.
    pub fn apply_with_rng<R: Rng + ?Sized>(
        &self,
        spec: &Spectrogram<T>,
        scale: Option<&NoiseScale<T>>,
        rng: &mut R,
    ) -> Result<Spectrogram<T>, AugmentError> {
        add_noise(spec, scale.unwrap_or(&self.scale), rng)
    }
}

/// Unit scale
impl<T: Float> Default for AdditiveNoise<T> {
    fn default() -> Self {
        Self {
            scale: NoiseScale::Scalar(T::one()),
        }
    }
}

impl<T: fmt::Display> fmt::Display for AdditiveNoise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdditiveNoise(scale={})", self.scale)
    }
}

impl<T> SpectrogramAugment<T> for AdditiveNoise<T>
where
    T: Float + fmt::Debug,
    StandardNormal: Distribution<T>,
{
    fn augment(
        &self,
        spec: Spectrogram<T>,
        rng: &mut dyn RngCore,
    ) -> Result<Spectrogram<T>, AugmentError> {
        self.apply_with_rng(&spec, None, rng)
    }
}
