use chrono::FixedOffset;
use clap::Parser;
use config::Config;
use controller::core::SubmissionState;
use controller::main::Controller;
use library::clock::impl_system::ClockSystem;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use predictor::impl_fake::PredictorFake;
use predictor::impl_http::PredictorHttp;
use predictor::interface::EmotionPredictor;
use preview::impl_memory::PreviewStoreMemory;
use result_display::impl_console::ResultDisplayConsole;
use result_display::impl_gui::{run_window, ResultDisplayGui};
use selected_file::SelectedFile;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod config;
mod controller;
mod error;
mod library;
mod predictor;
mod preview;
mod result_display;
mod selected_file;

#[derive(Debug, Parser)]
#[command(name = "emotion-lens", about = "Classify the emotion shown in an image")]
struct Cli {
    /// Base URL of the inference service
    #[arg(long)]
    base_url: Option<String>,

    /// Use a local random predictor instead of the inference service
    #[arg(long)]
    fake: bool,

    /// Classify this image on the console instead of opening a window
    #[arg(long)]
    image: Option<PathBuf>,

    /// Offset from UTC, in hours, for log timestamps
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_hours: Option<i32>,
}

impl Cli {
    fn apply(&self, config: &mut Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(hours) = self.utc_offset_hours {
            config.logger_timezone = FixedOffset::east_opt(hours * 3600)
                .ok_or_else(|| format!("invalid UTC offset: {} hours", hours))?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let mut config = Config::default();
    cli.apply(&mut config)?;

    let logger = Arc::new(LoggerConsole::new(config.logger_timezone));

    let predictor: Arc<dyn EmotionPredictor + Send + Sync> = if cli.fake {
        Arc::new(PredictorFake::new(logger.clone()))
    } else {
        Arc::new(PredictorHttp::new(&config, logger.clone())?)
    };

    match predictor.health() {
        Ok(message) => logger.info(&format!("Inference service: {}", message))?,
        Err(err) => logger.error(&format!("Inference service unreachable: {}", err))?,
    }

    let preview_store = Arc::new(PreviewStoreMemory::new(config.preview_max_dimension));

    match cli.image {
        Some(path) => run_headless(config, logger, predictor, preview_store, &path),
        None => {
            let display = ResultDisplayGui::new();
            let controller = Controller::new(
                config,
                logger.clone(),
                Arc::new(ClockSystem::new()),
                predictor,
                preview_store.clone(),
                Arc::new(Mutex::new(display.clone())),
            );

            let runner = controller.clone();
            let loop_logger = logger.clone();
            std::thread::spawn(move || {
                if let Err(err) = runner.run() {
                    let _ = loop_logger.error(&format!("Controller stopped: {}", err));
                }
            });

            let result = run_window(display, controller.clone(), preview_store, logger.clone());
            controller.close();
            result.map_err(|err| err.to_string())?;
            Ok(())
        }
    }
}

fn run_headless(
    config: Config,
    logger: Arc<LoggerConsole>,
    predictor: Arc<dyn EmotionPredictor + Send + Sync>,
    preview_store: Arc<PreviewStoreMemory>,
    path: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file = SelectedFile::from_path(path)?;

    let controller = Controller::new(
        config,
        logger.clone(),
        Arc::new(ClockSystem::new()),
        predictor,
        preview_store,
        Arc::new(Mutex::new(ResultDisplayConsole::new())),
    );

    let runner = controller.clone();
    let handle = std::thread::spawn(move || runner.run());

    controller.select_file(Some(file));
    controller.submit()?;

    let model = loop {
        let model = controller.model();
        if matches!(
            model.state(),
            SubmissionState::Succeeded | SubmissionState::Failed
        ) {
            break model;
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    controller.close();
    if let Ok(Err(err)) = handle.join() {
        logger.error(&format!("Controller stopped: {}", err))?;
    }

    match model.error_message() {
        Some(message) => Err(message.to_string().into()),
        None => Ok(()),
    }
}
