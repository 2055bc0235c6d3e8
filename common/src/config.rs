/// Process-wide scan options consumed by the fuzzing engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Stop dispatching variants for a target once one of them matched.
    ///
    /// Templates can enable the same behaviour for themselves only.
    pub stop_at_first_match: bool,
    /// Log the outcome of every precondition filter.
    pub matcher_status: bool,
    /// Dump the variable snapshot built for precondition filters.
    pub show_var_dump: bool,
    /// Failures after which a host is skipped for the rest of the scan.
    pub max_host_errors: usize,
    /// Requests per second, `0` disables rate limiting.
    pub rate_limit: u32,
}

pub const DEFAULT_MAX_HOST_ERRORS: usize = 30;

impl Default for Config {
    fn default() -> Self {
        Self {
            stop_at_first_match: false,
            matcher_status: false,
            show_var_dump: false,
            max_host_errors: DEFAULT_MAX_HOST_ERRORS,
            rate_limit: 0,
        }
    }
}
