use crate::config::Config;
use crate::error::{PredictError, NO_FILE_MESSAGE};
use crate::predictor::interface::PredictionResult;
use crate::preview::interface::PreviewHandle;
use crate::selected_file::SelectedFile;
use std::time::{Duration, Instant};

//
// Model
//

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Model {
    pub selection: Option<Selection>,
    pub submission: Submission,
    pub progress: u8,
    pub notice: Option<String>,
    pub closed: bool,
    next_preview: u64,
    next_submission: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub file: SelectedFile,
    pub preview: PreviewHandle,
}

/// Token identifying one submission. Messages carrying an older token are stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubmissionId(pub u64);

#[derive(Clone, Debug, PartialEq, Default)]
pub enum Submission {
    #[default]
    Idle,
    InFlight {
        id: SubmissionId,
        started_at: Instant,
        pending: Option<PredictionResult>,
    },
    Succeeded {
        id: SubmissionId,
        result: PredictionResult,
    },
    Failed {
        id: SubmissionId,
        error: PredictError,
        message: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl Submission {
    pub fn state(&self) -> SubmissionState {
        match self {
            Submission::Idle => SubmissionState::Idle,
            Submission::InFlight { .. } => SubmissionState::InFlight,
            Submission::Succeeded { .. } => SubmissionState::Succeeded,
            Submission::Failed { .. } => SubmissionState::Failed,
        }
    }

    pub fn in_flight_id(&self) -> Option<SubmissionId> {
        match self {
            Submission::InFlight { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            Submission::Succeeded { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Submission::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl Model {
    pub fn state(&self) -> SubmissionState {
        self.submission.state()
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.selection.as_ref().map(|selection| &selection.file)
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.selection.as_ref().map(|selection| selection.preview)
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.submission.result()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.submission.error_message()
    }

    fn allocate_preview(&mut self) -> PreviewHandle {
        self.next_preview += 1;
        PreviewHandle(self.next_preview)
    }

    fn allocate_submission(&mut self) -> SubmissionId {
        self.next_submission += 1;
        SubmissionId(self.next_submission)
    }
}

//
// Msg
//

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    FileSelected(Option<SelectedFile>),
    SubmitRequested {
        now: Instant,
    },
    ProgressTicked {
        submission: SubmissionId,
    },
    PredictionDone {
        submission: SubmissionId,
        received_at: Instant,
        result: Result<PredictionResult, PredictError>,
    },
    RevealDue {
        submission: SubmissionId,
    },
    SessionClosed,
}

//
// Effect
//

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    CreatePreview {
        handle: PreviewHandle,
        file: SelectedFile,
    },
    ReleasePreview {
        handle: PreviewHandle,
    },
    StartProgressTimer {
        submission: SubmissionId,
    },
    CancelProgressTimer {
        submission: SubmissionId,
    },
    RequestPrediction {
        submission: SubmissionId,
        file: SelectedFile,
    },
    ScheduleReveal {
        submission: SubmissionId,
        after: Duration,
    },
}

//
// Transition
//

pub fn init() -> (Model, Vec<Effect>) {
    (Model::default(), vec![])
}

pub fn transition(config: &Config, model: Model, msg: Msg) -> (Model, Vec<Effect>) {
    if model.closed {
        return (model, vec![]);
    }

    match msg {
        Msg::FileSelected(file) => transition_selection(model, file),

        Msg::SubmitRequested { now } => transition_submit(model, now),

        Msg::ProgressTicked { submission } => transition_tick(config, model, submission),

        Msg::PredictionDone {
            submission,
            received_at,
            result,
        } => transition_prediction_done(config, model, submission, received_at, result),

        Msg::RevealDue { submission } => transition_reveal(model, submission),

        Msg::SessionClosed => transition_closed(model),
    }
}

fn supersede(model: &mut Model) -> Vec<Effect> {
    match model.submission.in_flight_id() {
        Some(submission) => {
            model.submission = Submission::Idle;
            vec![Effect::CancelProgressTimer { submission }]
        }
        None => vec![],
    }
}

fn transition_selection(mut model: Model, file: Option<SelectedFile>) -> (Model, Vec<Effect>) {
    let mut effects = supersede(&mut model);

    if let Some(previous) = model.selection.take() {
        effects.push(Effect::ReleasePreview {
            handle: previous.preview,
        });
    }

    if let Some(file) = file {
        let handle = model.allocate_preview();
        effects.push(Effect::CreatePreview {
            handle,
            file: file.clone(),
        });
        model.selection = Some(Selection {
            file,
            preview: handle,
        });
    }

    model.submission = Submission::Idle;
    model.progress = 0;
    model.notice = None;

    (model, effects)
}

fn transition_submit(mut model: Model, now: Instant) -> (Model, Vec<Effect>) {
    let Some(file) = model.file().cloned() else {
        model.notice = Some(NO_FILE_MESSAGE.to_string());
        return (model, vec![]);
    };

    let mut effects = supersede(&mut model);

    let id = model.allocate_submission();
    model.submission = Submission::InFlight {
        id,
        started_at: now,
        pending: None,
    };
    model.progress = 0;
    model.notice = None;

    effects.push(Effect::StartProgressTimer { submission: id });
    effects.push(Effect::RequestPrediction {
        submission: id,
        file,
    });

    (model, effects)
}

fn transition_tick(
    config: &Config,
    mut model: Model,
    submission: SubmissionId,
) -> (Model, Vec<Effect>) {
    if model.submission.in_flight_id() == Some(submission) {
        model.progress = model.progress.saturating_add(config.progress_step).min(100);
    }
    (model, vec![])
}

fn transition_prediction_done(
    config: &Config,
    mut model: Model,
    submission: SubmissionId,
    received_at: Instant,
    result: Result<PredictionResult, PredictError>,
) -> (Model, Vec<Effect>) {
    let started_at = match model.submission {
        Submission::InFlight {
            id,
            started_at,
            pending: None,
        } if id == submission => started_at,
        _ => return (model, vec![]),
    };

    match result {
        Ok(result) => {
            let elapsed = received_at.saturating_duration_since(started_at);
            let wait = config.nominal_duration.saturating_sub(elapsed);

            if wait.is_zero() {
                model.submission = Submission::Succeeded {
                    id: submission,
                    result,
                };
                model.progress = 100;
                (model, vec![Effect::CancelProgressTimer { submission }])
            } else {
                model.submission = Submission::InFlight {
                    id: submission,
                    started_at,
                    pending: Some(result),
                };
                (
                    model,
                    vec![Effect::ScheduleReveal {
                        submission,
                        after: wait,
                    }],
                )
            }
        }
        Err(error) => {
            let message = error.user_message();
            model.submission = Submission::Failed {
                id: submission,
                error,
                message,
            };
            model.progress = 100;
            (model, vec![Effect::CancelProgressTimer { submission }])
        }
    }
}

fn transition_reveal(mut model: Model, submission: SubmissionId) -> (Model, Vec<Effect>) {
    match model.submission {
        Submission::InFlight {
            id,
            pending: Some(result),
            ..
        } if id == submission => {
            model.submission = Submission::Succeeded { id, result };
            model.progress = 100;
            (model, vec![Effect::CancelProgressTimer { submission }])
        }
        submission_state => {
            model.submission = submission_state;
            (model, vec![])
        }
    }
}

fn transition_closed(mut model: Model) -> (Model, Vec<Effect>) {
    let mut effects = supersede(&mut model);

    if let Some(previous) = model.selection.take() {
        effects.push(Effect::ReleasePreview {
            handle: previous.preview,
        });
    }

    model.closed = true;

    (model, effects)
}
