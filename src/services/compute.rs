use std::hint::black_box;

/// Largest input whose cube still fits in a `u64`.
///
/// `2_642_245³ = 18_446_724_184_312_856_125 <= u64::MAX`, while `2_642_246³` overflows.
pub const MAX_SAFE_INPUT: u32 = 2_642_245;

/// Compute `n³` the slow way, by counting every iteration of a triple-nested loop.
///
/// Runtime grows cubically with `n`; memory use is constant. This is the
/// workload every execution strategy runs, and it is deliberately not
/// `n.pow(3)`.
///
/// # Example
/// ```
/// use longcalc::services::cube_by_counting;
///
/// assert_eq!(cube_by_counting(2), 8);
/// ```
pub fn cube_by_counting(n: u32) -> u64 {
    let mut result: u64 = 0;

    for _i in 0..n {
        for _j in 0..n {
            for _k in 0..n {
                // black_box keeps the optimizer from folding the loop into n*n*n
                result = black_box(result) + 1;
            }
        }
    }

    result
}

/// Same count as [`cube_by_counting`], reporting progress while it runs.
///
/// `on_progress` receives whole percent values in `0..=100`, once per change,
/// measured at outer-loop granularity. It always ends with `100`.
pub fn cube_by_counting_with_progress<F>(n: u32, mut on_progress: F) -> u64
where
    F: FnMut(u8),
{
    let mut result: u64 = 0;
    let mut last_percent: Option<u8> = None;

    for i in 0..n {
        let percent = percent_of(i, n);
        if last_percent != Some(percent) {
            on_progress(percent);
            last_percent = Some(percent);
        }

        for _j in 0..n {
            for _k in 0..n {
                result = black_box(result) + 1;
            }
        }
    }

    if last_percent != Some(100) {
        on_progress(100);
    }

    result
}

fn percent_of(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    ((u64::from(done) * 100) / u64::from(total)) as u8
}
