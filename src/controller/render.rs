use crate::controller::core::Model;
use crate::controller::present::View;
use crate::result_display::interface::ResultDisplay;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct Render {
    result_display: Arc<Mutex<dyn ResultDisplay + Send + Sync>>,
}

impl Render {
    pub fn new(result_display: Arc<Mutex<dyn ResultDisplay + Send + Sync>>) -> Self {
        Self { result_display }
    }

    pub fn render(&self, model: &Model) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let view = View::from_model(model);
        let mut result_display = self
            .result_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        result_display.show(&view)
    }
}
