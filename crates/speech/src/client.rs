//! HTTP client for an OpenAI-compatible speech-synthesis endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use storyreel_common::config::SpeechConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use tracing::{debug, warn};

/// Liveness probes should answer fast; a slow probe counts as down.
const LIVENESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Audio container requested from the service.
pub const AUDIO_FORMAT: &str = "mp3";

/// Something that turns caption text into narration audio.
pub trait SpeechSynthesizer: Send + Sync {
    /// The synthesis endpoint, used in error messages.
    fn endpoint(&self) -> &str;

    /// Whether the service answers its liveness probe.
    fn is_alive(&self) -> impl Future<Output = bool> + Send;

    /// Synthesize `text` with `voice`, returning encoded audio bytes.
    fn synthesize(
        &self,
        text: &str,
        voice: &str,
    ) -> impl Future<Output = StoryreelResult<Vec<u8>>> + Send;
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    format: &'a str,
}

/// Client for the configured speech-synthesis service.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    http: Client,
    speech_url: String,
    health_url: String,
    api_key: String,
    model: String,
}

impl SpeechClient {
    pub fn new(config: &SpeechConfig) -> StoryreelResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| StoryreelError::speech(config.speech_url(), e.to_string()))?;

        Ok(Self {
            http,
            speech_url: config.speech_url(),
            health_url: config.health_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn health_url(&self) -> &str {
        &self.health_url
    }
}

impl SpeechSynthesizer for SpeechClient {
    fn endpoint(&self) -> &str {
        &self.speech_url
    }

    async fn is_alive(&self) -> bool {
        probe_liveness(&self.http, &self.health_url).await
    }

    async fn synthesize(&self, text: &str, voice: &str) -> StoryreelResult<Vec<u8>> {
        let body = SpeechRequest {
            model: &self.model,
            voice,
            input: text,
            format: AUDIO_FORMAT,
        };

        debug!(url = %self.speech_url, voice, chars = text.chars().count(), "Requesting narration");

        let response = self
            .http
            .post(&self.speech_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoryreelError::speech(&self.speech_url, format!("unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StoryreelError::speech(
                &self.speech_url,
                format!("HTTP {}: {}", status.as_u16(), detail.trim()),
            ));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| StoryreelError::speech(&self.speech_url, e.to_string()))?;
        if audio.is_empty() {
            return Err(StoryreelError::speech(&self.speech_url, "empty audio response"));
        }

        debug!(bytes = audio.len(), "Narration received");
        Ok(audio.to_vec())
    }
}

/// GET `url` and report whether it answered with a success status.
pub async fn probe_liveness(http: &Client, url: &str) -> bool {
    match http.get(url).timeout(LIVENESS_TIMEOUT).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            warn!(url, status = %response.status(), "Speech service liveness check failed");
            false
        }
        Err(e) => {
            debug!(url, error = %e, "Speech service not reachable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = SpeechRequest {
            model: "kokoro",
            voice: "af_bella",
            input: "Hello there",
            format: AUDIO_FORMAT,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "kokoro",
                "voice": "af_bella",
                "input": "Hello there",
                "format": "mp3",
            })
        );
    }

    #[test]
    fn test_client_uses_configured_urls() {
        let config = SpeechConfig {
            base_url: "http://tts.local:9000/".to_string(),
            ..SpeechConfig::default()
        };
        let client = SpeechClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://tts.local:9000/v1/audio/speech");
        assert_eq!(client.health_url(), "http://tts.local:9000/v1/models");
    }
}
