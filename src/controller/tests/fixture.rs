use crate::config::Config;
use crate::controller::core::{Model, SubmissionState};
use crate::controller::main::Controller;
use crate::library::clock::impl_system::ClockSystem;
use crate::library::logger::impl_fake::LoggerFake;
use crate::predictor::impl_fake::{PredictorFake, ScriptedOutcome};
use crate::predictor::interface::{Emotion, PredictionResult};
use crate::preview::impl_memory::tests::png_bytes;
use crate::preview::impl_memory::PreviewStoreMemory;
use crate::result_display::impl_fake::ResultDisplayFake;
use crate::selected_file::SelectedFile;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub fn happy_result() -> PredictionResult {
    PredictionResult {
        emotion: Emotion::Happy,
        probabilities: [0.01, 0.01, 0.02, 0.9, 0.02, 0.02, 0.02],
        confidence: None,
    }
}

pub fn sad_result() -> PredictionResult {
    PredictionResult {
        emotion: Emotion::Sad,
        probabilities: [0.05, 0.05, 0.1, 0.0, 0.1, 0.7, 0.0],
        confidence: Some(0.7),
    }
}

pub fn photo() -> SelectedFile {
    SelectedFile::new("photo.png", "image/png", png_bytes(8, 8))
}

/// Millisecond-scale timings so end-to-end runs finish quickly.
pub fn fast_config() -> Config {
    Config {
        progress_interval: Duration::from_millis(5),
        nominal_duration: Duration::from_millis(100),
        ..Config::default()
    }
}

pub struct Fixture {
    pub config: Config,
    pub logger: LoggerFake,
    pub predictor: Arc<PredictorFake>,
    pub preview_store: Arc<PreviewStoreMemory>,
    pub result_display: ResultDisplayFake,
    pub controller: Controller,
    runner: Option<JoinHandle<()>>,
}

impl Fixture {
    pub fn new(config: Config, outcomes: Vec<ScriptedOutcome>) -> Self {
        let logger = LoggerFake::new();
        let predictor = Arc::new(PredictorFake::scripted(Arc::new(logger.clone()), outcomes));
        let preview_store = Arc::new(PreviewStoreMemory::new(config.preview_max_dimension));
        let result_display = ResultDisplayFake::new();
        let controller = Controller::new(
            config.clone(),
            Arc::new(logger.clone()),
            Arc::new(ClockSystem::new()),
            predictor.clone(),
            preview_store.clone(),
            Arc::new(Mutex::new(result_display.clone())),
        );

        let runner = controller.clone();
        let runner = std::thread::spawn(move || {
            let _ = runner.run();
        });

        Self {
            config,
            logger,
            predictor,
            preview_store,
            result_display,
            controller,
            runner: Some(runner),
        }
    }

    /// Polls the model until `done` holds or the timeout passes.
    pub fn wait_for(&self, timeout: Duration, done: impl Fn(&Model) -> bool) -> Model {
        let deadline = Instant::now() + timeout;
        loop {
            let model = self.controller.model();
            if done(&model) || Instant::now() >= deadline {
                return model;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    pub fn wait_for_terminal(&self, timeout: Duration) -> Model {
        self.wait_for(timeout, |model| {
            matches!(
                model.state(),
                SubmissionState::Succeeded | SubmissionState::Failed
            )
        })
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        self.controller.close();
        if let Some(runner) = self.runner.take() {
            let _ = runner.join();
        }
    }
}
