//! Common test utilities
use rustfft::FftPlanner;
use specaug_rs::{Complex, ComplexSpectrogram, Spectrogram};
use std::f64::consts::PI;

#[allow(dead_code)]
/// Periodic Hann window
pub fn hann(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

/// Complex exponential at `bin` (may be fractional) of an `n_fft` transform
#[allow(dead_code)]
pub fn tone(bin: f64, n_fft: usize, len: usize) -> Vec<Complex<f64>> {
    (0..len)
        .map(|n| Complex::from_polar(1.0, 2.0 * PI * bin * n as f64 / n_fft as f64))
        .collect()
}

#[allow(dead_code)]
/// One-sided STFT without padding, shaped `[1, 1, n_fft / 2 + 1, frames]`.
pub fn stft(signal: &[Complex<f64>], n_fft: usize, hop: usize) -> ComplexSpectrogram<f64> {
    let window = hann(n_fft);
    let fft = FftPlanner::new().plan_fft_forward(n_fft);
    let bins = n_fft / 2 + 1;
    let frames = (signal.len() - n_fft) / hop + 1;

    let mut columns = Vec::with_capacity(frames);
    let mut buffer = vec![Complex::new(0.0, 0.0); n_fft];
    for frame in 0..frames {
        let start = frame * hop;
        for i in 0..n_fft {
            buffer[i] = signal[start + i] * window[i];
        }
        fft.process(&mut buffer);
        columns.push(buffer[..bins].to_vec());
    }

    Spectrogram::from_fn([1, 1, bins, frames], |[_, _, f, t]| columns[t][f])
}

#[allow(dead_code)]
pub fn wrap(phase: f64) -> f64 {
    phase - 2.0 * PI * (phase / (2.0 * PI)).round()
}

#[allow(dead_code)]
pub fn max_abs_error(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .max_by(|x, y| x.partial_cmp(y).unwrap())
        .unwrap_or(0.0)
}
