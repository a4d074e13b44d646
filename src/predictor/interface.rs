use crate::error::PredictError;
use crate::selected_file::SelectedFile;

pub const CATEGORY_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl Emotion {
    /// Fixed category order. Probability vectors are aligned to it by position.
    pub const ALL: [Emotion; CATEGORY_COUNT] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Surprise,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Happy => "Happy",
            Emotion::Neutral => "Neutral",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Emotion::ALL
            .into_iter()
            .find(|emotion| emotion.label().eq_ignore_ascii_case(label))
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub emotion: Emotion,
    pub probabilities: [f32; CATEGORY_COUNT],
    pub confidence: Option<f32>,
}

impl PredictionResult {
    /// Builds a result from raw service values. Values must be finite and within [0, 1];
    /// they are not required to sum to 1.
    pub fn from_parts(
        label: &str,
        probabilities: &[f64],
        confidence: Option<f64>,
    ) -> Result<Self, PredictError> {
        let emotion = Emotion::from_label(label)
            .ok_or_else(|| PredictError::Decode(format!("unknown emotion label {:?}", label)))?;

        if probabilities.len() != CATEGORY_COUNT {
            return Err(PredictError::Decode(format!(
                "expected {} probabilities, got {}",
                CATEGORY_COUNT,
                probabilities.len()
            )));
        }

        let mut values = [0.0_f32; CATEGORY_COUNT];
        for (slot, value) in values.iter_mut().zip(probabilities) {
            if !value.is_finite() || !(0.0..=1.0).contains(value) {
                return Err(PredictError::Decode(format!(
                    "probability {} is outside [0, 1]",
                    value
                )));
            }
            *slot = *value as f32;
        }

        Ok(Self {
            emotion,
            probabilities: values,
            confidence: confidence
                .filter(|value| value.is_finite())
                .map(|value| value as f32),
        })
    }
}

pub trait EmotionPredictor: Send + Sync {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError>;
    /// Greeting message of the service root, used as a reachability probe.
    fn health(&self) -> Result<String, PredictError>;
}
