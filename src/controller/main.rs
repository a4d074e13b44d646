use crate::config::Config;
use crate::controller::core::{init, transition, Effect, Model, Msg, SubmissionId};
use crate::controller::present::View;
use crate::controller::render::Render;
use crate::controller::run_effect::RunEffect;
use crate::error::PredictError;
use crate::library::clock::interface::Clock;
use crate::library::logger::interface::Logger;
use crate::predictor::interface::EmotionPredictor;
use crate::preview::interface::PreviewStore;
use crate::result_display::interface::ResultDisplay;
use crate::selected_file::SelectedFile;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

/// Session handle. Every transition runs under the model lock, so user calls and
/// effect results interleave but never overlap.
#[derive(Clone)]
pub struct Controller {
    model: Arc<Mutex<Model>>,
    event_sender: Sender<Msg>,
    event_receiver: Arc<Mutex<Receiver<Msg>>>,
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    render: Render,
    run_effect: RunEffect,
}

impl Controller {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        predictor: Arc<dyn EmotionPredictor + Send + Sync>,
        preview_store: Arc<dyn PreviewStore + Send + Sync>,
        result_display: Arc<Mutex<dyn ResultDisplay + Send + Sync>>,
    ) -> Self {
        let (event_sender, event_receiver) = channel();
        let logger = logger.with_namespace("controller");
        let run_effect = RunEffect::new(
            config.clone(),
            logger.clone(),
            clock.clone(),
            predictor,
            preview_store,
            event_sender.clone(),
        );
        let (initial, effects) = init();

        let controller = Self {
            model: Arc::new(Mutex::new(initial.clone())),
            event_sender,
            event_receiver: Arc::new(Mutex::new(event_receiver)),
            config,
            logger,
            clock,
            render: Render::new(result_display),
            run_effect,
        };

        if let Err(err) = controller.render.render(&initial) {
            let _ = controller.logger.error(&format!("Render failed: {}", err));
        }
        controller.spawn_effects(effects);

        controller
    }

    pub fn select_file(&self, file: Option<SelectedFile>) {
        self.dispatch(Msg::FileSelected(file));
    }

    /// Starts a submission for the selected file, superseding any in-flight one.
    pub fn submit(&self) -> Result<SubmissionId, PredictError> {
        let model = self.dispatch(Msg::SubmitRequested {
            now: self.clock.now(),
        });

        if model.file().is_none() {
            return Err(PredictError::Validation);
        }

        model
            .submission
            .in_flight_id()
            .ok_or(PredictError::Validation)
    }

    /// Ends the session: pending timers stop and late responses are dropped.
    pub fn close(&self) {
        self.dispatch(Msg::SessionClosed);
        let _ = self.event_sender.send(Msg::SessionClosed);
    }

    pub fn model(&self) -> Model {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn view(&self) -> View {
        View::from_model(&self.model())
    }

    /// Drains effect results until the session is closed.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        loop {
            if self.model().closed {
                return Ok(());
            }

            let msg = self
                .event_receiver
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv()?;

            if self.dispatch(msg).closed {
                return Ok(());
            }
        }
    }

    fn dispatch(&self, msg: Msg) -> Model {
        let (new_model, effects) = {
            let mut model = self.model.lock().unwrap_or_else(PoisonError::into_inner);

            let _ = self.logger.info(&format!(
                "\nold model:\n\t{:?}\n\nmsg:\n\t{:?}",
                *model, msg,
            ));

            let (new_model, effects) = transition(&self.config, model.clone(), msg);

            let _ = self.logger.info(&format!(
                "\nnew model:\n\t{:?}\n\neffects:\n\t{:?}",
                new_model, effects
            ));

            *model = new_model.clone();

            if let Err(err) = self.render.render(&new_model) {
                let _ = self.logger.error(&format!("Render failed: {}", err));
            }

            (new_model, effects)
        };

        self.spawn_effects(effects);

        new_model
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let run_effect = self.run_effect.clone();
            std::thread::spawn(move || run_effect.run_effect(effect));
        }
    }
}
