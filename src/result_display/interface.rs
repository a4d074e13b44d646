use crate::controller::present::View;
use std::error::Error;

/// Surface that shows the progress, the predicted label and the probability chart.
pub trait ResultDisplay: Send + Sync {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>>;
}
