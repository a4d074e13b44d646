use crate::config::Config;
use crate::controller::core::{Effect, Msg, SubmissionId};
use crate::library::clock::interface::Clock;
use crate::library::logger::interface::Logger;
use crate::predictor::interface::EmotionPredictor;
use crate::preview::interface::PreviewStore;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
    predictor: Arc<dyn EmotionPredictor + Send + Sync>,
    preview_store: Arc<dyn PreviewStore + Send + Sync>,
    timer: Arc<Mutex<TimerSlot>>,
    event_sender: Sender<Msg>,
}

/// Effect threads may start out of order. A timer only takes the slot when it is
/// newer than the current one and has not been cancelled already.
#[derive(Debug, Default)]
struct TimerSlot {
    active: Option<SubmissionId>,
    cancelled_up_to: Option<SubmissionId>,
}

impl RunEffect {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        predictor: Arc<dyn EmotionPredictor + Send + Sync>,
        preview_store: Arc<dyn PreviewStore + Send + Sync>,
        event_sender: Sender<Msg>,
    ) -> Self {
        Self {
            config,
            logger: logger.with_namespace("run_effect"),
            clock,
            predictor,
            preview_store,
            timer: Arc::new(Mutex::new(TimerSlot::default())),
            event_sender,
        }
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        match effect {
            Effect::CreatePreview { handle, file } => {
                if let Err(err) = self.preview_store.create(handle, &file) {
                    let _ = self.logger.error(&format!(
                        "No preview for {} ({:?}): {}",
                        file.name, handle, err
                    ));
                }
            }
            Effect::ReleasePreview { handle } => {
                self.preview_store.release(handle);
            }
            Effect::StartProgressTimer { submission } => {
                self.run_progress_timer(submission);
            }
            Effect::CancelProgressTimer { submission } => {
                let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
                if timer.active == Some(submission) {
                    timer.active = None;
                }
                timer.cancelled_up_to = timer.cancelled_up_to.max(Some(submission));
            }
            Effect::RequestPrediction { submission, file } => {
                let result = self.predictor.predict(&file);
                let _ = self.event_sender.send(Msg::PredictionDone {
                    submission,
                    received_at: self.clock.now(),
                    result,
                });
            }
            Effect::ScheduleReveal { submission, after } => {
                self.clock.sleep(after);
                let _ = self.event_sender.send(Msg::RevealDue { submission });
            }
        }
    }

    pub fn active_timer(&self) -> Option<SubmissionId> {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .active
    }

    fn claim_timer(&self, submission: SubmissionId) -> bool {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.cancelled_up_to >= Some(submission) || timer.active > Some(submission) {
            return false;
        }
        timer.active = Some(submission);
        true
    }

    fn is_timer_active(&self, submission: SubmissionId) -> bool {
        self.active_timer() == Some(submission)
    }

    fn run_progress_timer(&self, submission: SubmissionId) {
        if !self.claim_timer(submission) {
            let _ = self
                .logger
                .info(&format!("Progress timer for {:?} is stale", submission));
            return;
        }

        for _ in 0..self.config.ticks_to_full() {
            self.clock.sleep(self.config.progress_interval);

            if !self.is_timer_active(submission) {
                return;
            }

            if self
                .event_sender
                .send(Msg::ProgressTicked { submission })
                .is_err()
            {
                break;
            }
        }

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.active == Some(submission) {
            timer.active = None;
        }
    }
}
