use crate::error::PredictError;
use crate::library::logger::interface::Logger;
use crate::predictor::interface::{Emotion, EmotionPredictor, PredictionResult, CATEGORY_COUNT};
use crate::selected_file::SelectedFile;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ScriptedOutcome {
    pub delay: Duration,
    pub result: Result<PredictionResult, PredictError>,
}

/// Local stand-in for the inference service. Plays scripted outcomes first, then
/// answers with random distributions.
pub struct PredictorFake {
    logger: Arc<dyn Logger + Send + Sync>,
    delay: Duration,
    script: Mutex<VecDeque<ScriptedOutcome>>,
    calls: AtomicUsize,
}

impl PredictorFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("predictor").with_namespace("fake"),
            delay: Duration::from_secs(1),
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn scripted(logger: Arc<dyn Logger + Send + Sync>, outcomes: Vec<ScriptedOutcome>) -> Self {
        let fake = Self::new(logger).with_delay(Duration::ZERO);
        *fake.script.lock().unwrap_or_else(PoisonError::into_inner) = outcomes.into();
        fake
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn random_result(&self) -> PredictionResult {
        let mut rng = rand::rng();

        let mut probabilities = [0.0_f32; CATEGORY_COUNT];
        for value in probabilities.iter_mut() {
            *value = rng.random::<f32>();
        }
        let dominant = rng.random_range(0..CATEGORY_COUNT);
        probabilities[dominant] += 2.0;

        let total: f32 = probabilities.iter().sum();
        for value in probabilities.iter_mut() {
            *value /= total;
        }

        PredictionResult {
            emotion: Emotion::ALL[dominant],
            probabilities,
            confidence: Some(probabilities[dominant]),
        }
    }
}

impl EmotionPredictor for PredictorFake {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self
            .logger
            .info(&format!("Classifying {} with fake predictor...", file.name));

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match scripted {
            Some(outcome) => {
                std::thread::sleep(outcome.delay);
                outcome.result
            }
            None => {
                std::thread::sleep(self.delay);
                Ok(self.random_result())
            }
        }
    }

    fn health(&self) -> Result<String, PredictError> {
        Ok("fake predictor".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::logger::impl_fake::LoggerFake;

    #[test]
    fn test_random_result_is_normalized_and_consistent() {
        let fake = PredictorFake::new(Arc::new(LoggerFake::new())).with_delay(Duration::ZERO);
        let file = SelectedFile::new("photo.jpg", "image/jpeg", vec![1]);

        let result = fake.predict(&file).unwrap();

        let total: f32 = result.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
        assert!(result.probabilities.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(
            Some(result.probabilities[result.emotion.index()]),
            result.confidence
        );
        assert_eq!(fake.calls(), 1);
    }

    #[test]
    fn test_script_plays_in_order() {
        let fake = PredictorFake::scripted(
            Arc::new(LoggerFake::new()),
            vec![
                ScriptedOutcome {
                    delay: Duration::ZERO,
                    result: Err(PredictError::Service("model unavailable".to_string())),
                },
                ScriptedOutcome {
                    delay: Duration::ZERO,
                    result: Err(PredictError::Transport("refused".to_string())),
                },
            ],
        );
        let file = SelectedFile::new("photo.jpg", "image/jpeg", vec![1]);

        assert_eq!(
            fake.predict(&file),
            Err(PredictError::Service("model unavailable".to_string()))
        );
        assert_eq!(
            fake.predict(&file),
            Err(PredictError::Transport("refused".to_string()))
        );
        assert!(fake.predict(&file).is_ok());
        assert_eq!(fake.calls(), 3);
    }
}
