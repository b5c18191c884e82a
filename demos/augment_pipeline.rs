use rand::SeedableRng;
use rand::rngs::StdRng;
use specaug_rs::prelude::*;

fn main() {
    println!("Spectrogram Augmentation Demo\n");

    let hop_len = 256;
    let num_bins = 513;
    let frames = 120;

    // Stand-in for an STFT: two partials with a steady per-hop phase rotation
    let spec = Spectrogram::from_fn([2, 1, num_bins, frames], |[b, _, f, t]| {
        let partial = if f == 40 || f == 80 + 10 * b { 1.0 } else { 1e-3 };
        let advance = std::f32::consts::PI * hop_len as f32 * f as f32 / (num_bins - 1) as f32;
        Complex::from_polar(partial, advance * t as f32)
    });

    let stretch = TimeStretch::new(1.0, hop_len, num_bins).expect("Valid stretch config");
    let freq_mask = AxisMasking::frequency(30.0, false).expect("Valid frequency masking");
    let time_mask = AxisMasking::time(20.0, true).expect("Valid time masking");
    let noise = AdditiveNoise::new(0.01f32).expect("Valid noise scale");

    println!("  {}", stretch);
    println!("  {}", freq_mask);
    println!("  {}", time_mask);
    println!("  {}\n", noise);

    let mut rng = StdRng::seed_from_u64(2025);

    for rate in [0.8f32, 1.0, 1.25] {
        let stretched = stretch.stretch(&spec, Some(rate)).expect("Bins match table");
        let mut mags = stretched.magnitudes();

        let freq_spans = freq_mask
            .mask_with_rng(&mut mags, 0.0, &mut rng)
            .expect("Frequency masking");
        let time_spans = time_mask
            .mask_with_rng(&mut mags, 0.0, &mut rng)
            .expect("Time masking");
        let noisy = noise
            .apply_with_rng(&mags, None, &mut rng)
            .expect("Noise scale broadcasts");

        let energy: f32 = noisy.as_slice().iter().map(|v| v * v).sum();
        println!(
            "rate {:.2}: {} -> {} frames, freq masks {:?}, time mask {}..{}, energy {:.2}",
            rate,
            frames,
            noisy.num_frames(),
            freq_spans
                .iter()
                .map(|s| (s.start, s.end))
                .collect::<Vec<_>>(),
            time_spans[0].start,
            time_spans[0].end,
            energy
        );
    }
}
