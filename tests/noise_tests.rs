use rand::SeedableRng;
use rand::rngs::StdRng;
use specaug_rs::prelude::*;

#[test]
fn test_zero_scale_returns_input() {
    let spec = Spectrogram::from_fn([3, 2, 16, 20], |[b, c, f, t]| {
        ((b * 7 + c * 5 + f * 3 + t) % 11) as f32 - 5.0
    });

    let noise = AdditiveNoise::default();
    let out = noise
        .apply(&spec, Some(&NoiseScale::Scalar(0.0)))
        .unwrap();
    assert_eq!(out, spec);
}

#[test]
fn test_same_seed_same_noise() {
    let spec = Spectrogram::<f64>::zeros([1, 1, 32, 32]);
    let noise = AdditiveNoise::new(0.3).unwrap();

    let a = noise
        .apply_with_rng(&spec, None, &mut StdRng::seed_from_u64(10))
        .unwrap();
    let b = noise
        .apply_with_rng(&spec, None, &mut StdRng::seed_from_u64(10))
        .unwrap();
    let c = noise
        .apply_with_rng(&spec, None, &mut StdRng::seed_from_u64(11))
        .unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_per_channel_scale_statistics() {
    let mut rng = StdRng::seed_from_u64(8);
    let spec = Spectrogram::<f64>::zeros([8, 2, 64, 64]);
    let scale = Spectrogram::from_vec([1, 2, 1, 1], vec![0.5, 3.0]).unwrap();

    let out = add_noise(&spec, &NoiseScale::Tensor(scale), &mut rng).unwrap();

    for (channel, expected) in [(0, 0.5), (1, 3.0)] {
        let mut values = Vec::new();
        for b in 0..8 {
            for f in 0..64 {
                for t in 0..64 {
                    values.push(*out.get([b, channel, f, t]));
                }
            }
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

        assert!(mean.abs() < 0.05 * expected, "channel {} mean {}", channel, mean);
        assert!(
            (std - expected).abs() < 0.03 * expected,
            "channel {} std {}",
            channel,
            std
        );
    }
}

#[test]
fn test_full_shape_scale() {
    let mut rng = StdRng::seed_from_u64(1);
    let spec = Spectrogram::<f32>::new([1, 1, 2, 2], 10.0);
    let scale = Spectrogram::from_vec([1, 1, 2, 2], vec![0.0f32, 0.0, 0.0, 1.0]).unwrap();

    let out = add_noise(&spec, &NoiseScale::Tensor(scale), &mut rng).unwrap();
    assert_eq!(out.as_slice()[..3], [10.0, 10.0, 10.0]);
    assert_ne!(out.as_slice()[3], 10.0);
}
