use crate::PlanMode;

pub const ENV_FFT_MODE: &str = "MSIM_FFT_MODE";
pub const ENV_FFT_THREADS: &str = "MSIM_FFT_THREADS";

/// How transform plans are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConfig {
    pub mode: PlanMode,
    pub threads: usize,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            mode: PlanMode::Measured,
            threads: 1,
        }
    }
}

impl PlanConfig {
    pub fn new(mode: PlanMode, threads: usize) -> Self {
        Self {
            mode,
            threads: threads.max(1),
        }
    }

    /// Defaults overridden by `MSIM_FFT_MODE` (`measure` | `estimate`) and
    /// `MSIM_FFT_THREADS`. Unrecognized values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let mut config: PlanConfig = PlanConfig::default();

        if let Some(raw) = lookup(ENV_FFT_MODE) {
            match PlanMode::from_name(raw.trim()) {
                Some(mode) => config.mode = mode,
                None => tracing::warn!("{ENV_FFT_MODE}='{raw}' not recognized, keeping {:?}", config.mode),
            }
        }

        if let Some(raw) = lookup(ENV_FFT_THREADS) {
            match raw.trim().parse::<usize>() {
                Ok(threads) if threads > 0 => config.threads = threads,
                _ => tracing::warn!("{ENV_FFT_THREADS}='{raw}' not recognized, keeping {}", config.threads),
            }
        }

        config
    }
}
