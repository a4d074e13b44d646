use chrono::Offset;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub predict_path: String,
    pub progress_interval: Duration,
    pub progress_step: u8,
    /// Minimum time between submission and a successful result becoming visible.
    pub nominal_duration: Duration,
    pub request_timeout: Duration,
    pub preview_max_dimension: u32,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            predict_path: "/predict-emotion".to_string(),
            progress_interval: Duration::from_millis(300),
            progress_step: 5,
            nominal_duration: Duration::from_millis(6000),
            request_timeout: Duration::from_secs(30),
            preview_max_dimension: 256,
            logger_timezone: chrono::Utc.fix(),
        }
    }
}

impl Config {
    pub fn predict_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.predict_path
        )
    }

    pub fn health_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Number of progress ticks needed to go from 0 to 100.
    pub fn ticks_to_full(&self) -> u32 {
        let step = u32::from(self.progress_step.max(1));
        100_u32.div_ceil(step)
    }
}
