use crate::controller::core::{Model, SubmissionState};
use crate::predictor::interface::{Emotion, PredictionResult, CATEGORY_COUNT};
use crate::preview::interface::PreviewHandle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartEntry {
    pub label: &'static str,
    pub value: f32,
}

/// Label/value series in the fixed category order. All zeros when there is no result.
pub fn chart_series(result: Option<&PredictionResult>) -> [ChartEntry; CATEGORY_COUNT] {
    Emotion::ALL.map(|emotion| ChartEntry {
        label: emotion.label(),
        value: result
            .map(|result| result.probabilities[emotion.index()])
            .unwrap_or(0.0),
    })
}

pub fn label_text(result: &PredictionResult) -> String {
    match result.confidence {
        Some(confidence) => format!("{} ({:.1}%)", result.emotion.label(), confidence * 100.0),
        None => result.emotion.label().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub state: SubmissionState,
    pub progress: u8,
    pub file_name: Option<String>,
    pub preview: Option<PreviewHandle>,
    pub label: Option<String>,
    pub series: [ChartEntry; CATEGORY_COUNT],
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl Default for View {
    fn default() -> Self {
        Self::from_model(&Model::default())
    }
}

impl View {
    pub fn from_model(model: &Model) -> Self {
        let result = model.result();

        Self {
            state: model.state(),
            progress: model.progress,
            file_name: model.file().map(|file| file.name.clone()),
            preview: model.preview(),
            label: result.map(label_text),
            series: chart_series(result),
            error: model.error_message().map(str::to_string),
            notice: model.notice.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state == SubmissionState::InFlight
    }
}
