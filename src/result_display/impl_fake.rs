use crate::controller::present::View;
use crate::result_display::interface::ResultDisplay;
use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Default)]
pub struct ResultDisplayFake {
    views: Arc<Mutex<Vec<View>>>,
}

impl ResultDisplayFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<View> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last(&self) -> Option<View> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl ResultDisplay for ResultDisplayFake {
    fn show(&mut self, view: &View) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(view.clone());
        Ok(())
    }
}
