use std::path::PathBuf;

use fastmark_job_model::{output_path_for, SizeLevel, TimeWindow, OUTPUT_EXTENSION};
use proptest::prelude::*;

const DIVISORS: [f64; 5] = [1.0, 1.2, 1.5, 2.0, 2.5];

proptest! {
    #[test]
    fn scaled_width_matches_divisor(width in 2u32..=8192, level in 1u8..=5) {
        let size = SizeLevel::new(level).unwrap();
        let scaled = size.scale(width);
        let exact = width as f64 / DIVISORS[level as usize - 1];

        prop_assert!(scaled as f64 <= exact + 1e-9);
        prop_assert!(exact - (scaled as f64) < 1.0);
    }

    #[test]
    fn smaller_levels_never_grow(width in 2u32..=8192, level in 1u8..5) {
        let bigger = SizeLevel::new(level).unwrap().scale(width);
        let smaller = SizeLevel::new(level + 1).unwrap().scale(width);
        prop_assert!(smaller <= bigger);
    }

    #[test]
    fn output_path_stays_beside_source(
        dir in "[a-z]{1,8}",
        stem in "[a-z0-9]{1,12}",
        ext in "(mp4|mov|avi|mkv)",
    ) {
        let source = PathBuf::from(&dir).join(format!("{stem}.{ext}"));
        let output = output_path_for(&source);

        prop_assert_eq!(output.parent(), source.parent());
        prop_assert_eq!(
            output.extension().and_then(|e| e.to_str()),
            Some(OUTPUT_EXTENSION)
        );
        prop_assert_eq!(output_path_for(&source), output.clone());
        prop_assert_ne!(output, source);
    }

    #[test]
    fn fitted_window_stays_inside_video(
        start in 0u32..600,
        duration in 1u32..600,
        total in 1.0f64..1200.0,
    ) {
        let window = TimeWindow::new(start, Some(duration));
        match window.fit_to(Some(total)) {
            Ok((fitted, _)) => {
                prop_assert_eq!(fitted.start_secs, start);
                let end = fitted.end_secs().unwrap() as f64;
                prop_assert!(end < total + 1.0);
                prop_assert!(fitted.duration_secs.unwrap() >= 1);
            }
            Err(_) => prop_assert!(start as f64 >= total),
        }
    }
}
