//! Integration tests for the compute kernel and input validation
//!
//! These tests verify:
//! - The kernel result matches n³ for the inputs users actually type
//! - Progress reporting is consistent with the plain kernel
//! - Input text goes through the collector exactly as the session sees it

use longcalc::services::{
    InputCollector, InputError, MAX_SAFE_INPUT, cube_by_counting, cube_by_counting_with_progress,
};
use longcalc::Settings;

#[test]
fn test_kernel_matches_cube() {
    for n in [0u32, 1, 2, 3, 10, 20, 100, 250] {
        assert_eq!(cube_by_counting(n), u64::from(n).pow(3), "n = {}", n);
    }
}

#[test]
fn test_progress_kernel_matches_plain_kernel() {
    for n in [0u32, 1, 5, 99, 150] {
        let mut reports = Vec::new();
        let result = cube_by_counting_with_progress(n, |p| reports.push(p));

        assert_eq!(result, cube_by_counting(n));
        assert_eq!(reports.last(), Some(&100));
        assert!(reports.windows(2).all(|w| w[0] < w[1]), "{:?}", reports);
    }
}

#[test]
fn test_progress_reports_every_percent_for_large_outer_loop() {
    let mut reports = Vec::new();
    cube_by_counting_with_progress(200, |p| reports.push(p));

    // 200 outer iterations cover every whole percent
    assert_eq!(reports, (0..=100).collect::<Vec<u8>>());
}

#[test]
fn test_collector_from_default_settings() {
    let settings = Settings::default();
    let collector = InputCollector::new(settings.effective_max_input());

    assert_eq!(collector.parse(&settings.default_input), Ok(500));
    assert_eq!(collector.parse("2000"), Ok(2000));
    assert_eq!(
        collector.parse("2001"),
        Err(InputError::OutOfRange {
            value: 2001,
            max: 2000
        })
    );
}

#[test]
fn test_collector_rejects_typical_typos() {
    let collector = InputCollector::default();

    assert_eq!(collector.parse(" 42 "), Ok(42));
    assert_eq!(collector.parse("\t"), Err(InputError::Empty));
    for raw in ["4 2", "4.2", "1e3", "+7", "-1", "forty"] {
        assert!(
            matches!(collector.parse(raw), Err(InputError::NotANumber(_))),
            "{:?} should be rejected",
            raw
        );
    }
}

#[test]
fn test_huge_numbers_are_out_of_range_not_garbage() {
    let collector = InputCollector::default();

    let err = collector.parse("99999999999999999999999").unwrap_err();
    assert_eq!(
        err,
        InputError::OutOfRange {
            value: u64::MAX,
            max: MAX_SAFE_INPUT
        }
    );
    assert!(err.to_string().contains("too large"));
}
