//! Noise accumulation kernel, vectorized through pulp's runtime dispatch when
//! the `simd` feature is enabled

use num_traits::Float;

#[cfg(feature = "simd")]
use pulp::Arch;

/// Elements processed per unrolled step
#[cfg(feature = "simd")]
const LANES: usize = 4;

/// Standard deviation applied to each noise sample
#[derive(Debug, Clone, Copy)]
pub enum Deviation<'a, T> {
    /// One deviation for the whole buffer
    Uniform(T),
    /// One deviation per element, same length as the buffer
    PerElement(&'a [T]),
}

/// Computes `output[i] += noise[i] * deviation[i]` in place.
#[inline]
pub fn add_scaled_noise<T: Float>(output: &mut [T], noise: &[T], deviation: Deviation<'_, T>) {
    debug_assert_eq!(noise.len(), output.len());
    if let Deviation::PerElement(scale) = deviation {
        debug_assert_eq!(scale.len(), output.len());
    }

    #[cfg(feature = "simd")]
    Arch::new().dispatch(|| add_scaled_noise_unrolled(output, noise, deviation));

    #[cfg(not(feature = "simd"))]
    add_scaled_noise_scalar(output, noise, deviation);
}

#[cfg(not(feature = "simd"))]
fn add_scaled_noise_scalar<T: Float>(output: &mut [T], noise: &[T], deviation: Deviation<'_, T>) {
    match deviation {
        Deviation::Uniform(scale) => {
            for (out, &z) in output.iter_mut().zip(noise) {
                *out = *out + z * scale;
            }
        }
        Deviation::PerElement(scale) => {
            for ((out, &z), &s) in output.iter_mut().zip(noise).zip(scale) {
                *out = *out + z * s;
            }
        }
    }
}

/// Fixed-width body so the dispatched target features can vectorize it
#[cfg(feature = "simd")]
#[inline(always)]
fn add_scaled_noise_unrolled<T: Float>(output: &mut [T], noise: &[T], deviation: Deviation<'_, T>) {
    let (output_head, output_tail) = pulp::as_arrays_mut::<LANES, _>(output);
    let (noise_head, noise_tail) = pulp::as_arrays::<LANES, _>(noise);

    match deviation {
        Deviation::Uniform(scale) => {
            for (out, z) in output_head.iter_mut().zip(noise_head) {
                for j in 0..LANES {
                    out[j] = out[j] + z[j] * scale;
                }
            }
            for (out, &z) in output_tail.iter_mut().zip(noise_tail) {
                *out = *out + z * scale;
            }
        }
        Deviation::PerElement(scale) => {
            let (scale_head, scale_tail) = pulp::as_arrays::<LANES, _>(scale);
            for ((out, z), s) in output_head.iter_mut().zip(noise_head).zip(scale_head) {
                for j in 0..LANES {
                    out[j] = out[j] + z[j] * s[j];
                }
            }
            for ((out, &z), &s) in output_tail.iter_mut().zip(noise_tail).zip(scale_tail) {
                *out = *out + z * s;
            }
        }
    }
}
