use rand::SeedableRng;
use rand::rngs::StdRng;
use specaug_rs::prelude::*;

fn zero_rows(spec: &Spectrogram<f32>, b: usize, c: usize) -> Vec<usize> {
    (0..spec.freq_bins())
        .filter(|&f| (0..spec.num_frames()).all(|t| *spec.get([b, c, f, t]) == 0.0))
        .collect()
}

fn zero_columns(spec: &Spectrogram<f32>, b: usize, c: usize) -> Vec<usize> {
    (0..spec.num_frames())
        .filter(|&t| (0..spec.freq_bins()).all(|f| *spec.get([b, c, f, t]) == 0.0))
        .collect()
}

#[test]
fn test_batch_frequency_mask_same_rows() {
    let masking = AxisMasking::frequency(10.0, true).unwrap();

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut spec = Spectrogram::<f32>::new([2, 1, 10, 10], 1.0);
        let spans = masking.mask_with_rng(&mut spec, 0.0, &mut rng).unwrap();

        let rows = zero_rows(&spec, 0, 0);
        assert_eq!(rows, zero_rows(&spec, 1, 0));
        assert_eq!(rows, (spans[0].start..spans[0].end).collect::<Vec<_>>());
        // Everything outside the band is untouched
        let ones = spec.as_slice().iter().filter(|&&v| v == 1.0).count();
        assert_eq!(ones, 2 * 10 * (10 - rows.len()));
    }
}

#[test]
fn test_time_mask_coverage_bounds() {
    let max_time = 7.0;
    let masking = AxisMasking::time(max_time, false).unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut longest = 0;

    for _ in 0..300 {
        let mut spec = Spectrogram::<f32>::new([2, 3, 4, 16], 1.0);
        let spans = masking.mask_with_rng(&mut spec, 0.0, &mut rng).unwrap();
        assert_eq!(spans.len(), 6);

        for b in 0..2 {
            for c in 0..3 {
                let span = spans[b * 3 + c];
                assert!((span.len() as f64) < max_time);
                assert!(span.start + span.len() <= 16);
                assert_eq!(zero_columns(&spec, b, c), (span.start..span.end).collect::<Vec<_>>());
                longest = longest.max(span.len());
            }
        }
    }

    // Widths actually reach the top of [0, max_time)
    assert_eq!(longest, 6);
}

#[test]
fn test_per_example_masks_are_not_correlated() {
    let masking = AxisMasking::frequency(30.0, false).unwrap();
    let mut rng = StdRng::seed_from_u64(31);
    let mut identical = 0;

    for _ in 0..100 {
        let mut spec = Spectrogram::<f32>::new([2, 1, 80, 4], 1.0);
        let spans = masking.mask_with_rng(&mut spec, 0.0, &mut rng).unwrap();
        if spans[0] == spans[1] {
            identical += 1;
        }
    }

    assert!(identical < 10, "{} identical span pairs", identical);
}

#[test]
fn test_max_value_above_axis_length() {
    let mut rng = StdRng::seed_from_u64(4);

    for _ in 0..100 {
        let mut spec = Spectrogram::<f32>::new([1, 2, 5, 6], 1.0);
        let span = mask_along_axis_batch(&mut spec, 25.0, 0.0, 2, &mut rng).unwrap();
        assert!(span.end <= 5);

        let spans = mask_along_axis(&mut spec, 25.0, 0.0, 3, &mut rng).unwrap();
        assert!(spans.iter().all(|s| s.end <= 6));
    }
}

#[test]
fn test_fill_value_and_thread_rng() {
    let masking = AxisMasking::frequency(4.0, false).unwrap();
    let mut spec = Spectrogram::<f64>::new([4, 1, 12, 3], 1.0);

    let spans = masking.mask(&mut spec, -80.0).unwrap();
    for (b, span) in spans.iter().enumerate() {
        for f in 0..12 {
            let expected = if span.contains(f) { -80.0 } else { 1.0 };
            assert_eq!(*spec.get([b, 0, f, 2]), expected);
        }
    }
}

#[test]
fn test_invalid_axis() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut spec = Spectrogram::<f32>::new([1, 1, 4, 4], 1.0);
    assert_eq!(
        mask_along_axis(&mut spec, 2.0, 0.0, 1, &mut rng).unwrap_err(),
        AugmentError::InvalidAxis(1)
    );
    assert!(Axis::try_from(5).is_err());
}
