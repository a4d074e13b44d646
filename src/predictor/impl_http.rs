use crate::config::Config;
use crate::error::PredictError;
use crate::library::logger::interface::Logger;
use crate::predictor::interface::{EmotionPredictor, PredictionResult};
use crate::selected_file::SelectedFile;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    emotion: String,
    probabilities: Vec<f64>,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RootResponse {
    message: String,
}

pub struct PredictorHttp {
    client: Client,
    predict_url: String,
    health_url: String,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl PredictorHttp {
    pub fn new(
        config: &Config,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, PredictError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            predict_url: config.predict_url(),
            health_url: config.health_url(),
            logger: logger.with_namespace("predictor").with_namespace("http"),
        })
    }
}

impl EmotionPredictor for PredictorHttp {
    fn predict(&self, file: &SelectedFile) -> Result<PredictionResult, PredictError> {
        let _ = self.logger.info(&format!(
            "POST {} with {} ({} bytes)",
            self.predict_url,
            file.name,
            file.len()
        ));

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&self.predict_url).multipart(form).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        let result = interpret_response(status, &body);
        if let Err(err) = &result {
            let _ = self
                .logger
                .error(&format!("prediction failed with status {}: {}", status, err));
        }
        result
    }

    fn health(&self) -> Result<String, PredictError> {
        let response = self.client.get(&self.health_url).send()?.error_for_status()?;
        let root: RootResponse = response
            .json()
            .map_err(|err| PredictError::Decode(err.to_string()))?;
        Ok(root.message)
    }
}

/// Maps a raw HTTP status and body onto the prediction outcome.
pub fn interpret_response(status: u16, body: &str) -> Result<PredictionResult, PredictError> {
    if !(200..300).contains(&status) {
        return Err(match service_error(body) {
            Some(message) => PredictError::Service(message),
            None => PredictError::Transport(format!("HTTP {} without error payload", status)),
        });
    }

    match serde_json::from_str::<PredictionResponse>(body) {
        Ok(response) => PredictionResult::from_parts(
            &response.emotion,
            &response.probabilities,
            response.confidence,
        ),
        Err(err) => match service_error(body) {
            Some(message) => Err(PredictError::Service(message)),
            None => Err(PredictError::Decode(err.to_string())),
        },
    }
}

fn service_error(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|response| response.error)
        .filter(|message| !message.trim().is_empty())
}
