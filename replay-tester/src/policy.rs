//! Whole-suite retry policy.

/// Retries granted on CI when `--retries` is not given.
pub const CI_RETRIES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
}

impl RetryPolicy {
    /// An explicit count wins; otherwise CI gets [`CI_RETRIES`] and local
    /// runs get none. `CI` counts as set unless it is empty, `0` or `false`.
    pub fn resolve<F>(explicit: Option<u32>, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let retries = explicit.unwrap_or_else(|| {
            if is_ci(lookup("CI").as_deref()) {
                CI_RETRIES
            } else {
                0
            }
        });
        Self { retries }
    }

    pub const fn attempts(self) -> u32 {
        self.retries.saturating_add(1)
    }
}

fn is_ci(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        !(v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false"))
    })
}
