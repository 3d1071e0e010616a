//! Lifecycle of a locally launched speech-synthesis service.
//!
//! The service is an external process. `SpeechService` owns the child it
//! spawns (if any) and is the only place that starts or stops it; an already
//! running service is used as-is and never stopped by us.

use std::process::Stdio;
use std::time::{Duration, Instant};

use reqwest::Client;
use storyreel_common::config::{ServiceCommand, SpeechConfig};
use storyreel_common::error::{StoryreelError, StoryreelResult};
use tokio::process::{Child, Command};

use crate::client::probe_liveness;

/// Delay between liveness probes while waiting for startup.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Owned handle to the speech service process.
pub struct SpeechService {
    http: Client,
    health_url: String,
    speech_url: String,
    command: Option<ServiceCommand>,
    startup_timeout: Duration,
    poll_interval: Duration,
    child: Option<Child>,
}

impl SpeechService {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            http: Client::new(),
            health_url: config.health_url(),
            speech_url: config.speech_url(),
            command: config.autostart.clone(),
            startup_timeout: Duration::from_secs(config.startup_timeout_secs),
            poll_interval: POLL_INTERVAL,
            child: None,
        }
    }

    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Whether this handle launched the running service.
    pub fn is_managed(&self) -> bool {
        self.child.is_some()
    }

    pub async fn is_alive(&self) -> bool {
        probe_liveness(&self.http, &self.health_url).await
    }

    /// Make sure the service is reachable, launching it if necessary.
    pub async fn start(&mut self) -> StoryreelResult<()> {
        if self.is_alive().await {
            tracing::debug!(url = %self.health_url, "Speech service already running");
            return Ok(());
        }

        let Some(command) = self.command.clone() else {
            return Err(StoryreelError::speech(
                &self.speech_url,
                "service is not reachable and no autostart command is configured",
            ));
        };

        tracing::info!(program = %command.program, args = ?command.args, "Starting speech service");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|e| {
            StoryreelError::speech(
                &self.speech_url,
                format!("failed to launch '{}': {e}", command.program),
            )
        })?;
        self.child = Some(child);

        self.wait_until_alive().await
    }

    async fn wait_until_alive(&mut self) -> StoryreelResult<()> {
        let started = Instant::now();
        loop {
            if self.is_alive().await {
                tracing::info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Speech service is up"
                );
                return Ok(());
            }

            if let Some(child) = self.child.as_mut() {
                if let Ok(Some(status)) = child.try_wait() {
                    self.child = None;
                    return Err(StoryreelError::speech(
                        &self.speech_url,
                        format!("service process exited during startup ({status})"),
                    ));
                }
            }

            if started.elapsed() >= self.startup_timeout {
                self.stop().await?;
                return Err(StoryreelError::speech(
                    &self.speech_url,
                    format!(
                        "service did not become ready within {}s",
                        self.startup_timeout.as_secs_f64()
                    ),
                ));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Stop the service if this handle launched it.
    pub async fn stop(&mut self) -> StoryreelResult<()> {
        if let Some(mut child) = self.child.take() {
            tracing::info!(pid = ?child.id(), "Stopping speech service");
            child.kill().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> SpeechConfig {
        SpeechConfig {
            // Discard port; nothing should be listening.
            base_url: "http://127.0.0.1:9".to_string(),
            ..SpeechConfig::default()
        }
    }

    #[tokio::test]
    async fn test_start_without_command_fails_with_endpoint() {
        let mut service = SpeechService::new(&unreachable_config());
        let err = service.start().await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("http://127.0.0.1:9/v1/audio/speech"));
        assert!(message.contains("no autostart command"));
        assert!(!service.is_managed());
    }

    #[tokio::test]
    async fn test_missing_program_is_reported() {
        let mut config = unreachable_config();
        config.autostart = Some(ServiceCommand {
            program: "storyreel-no-such-tts-binary".to_string(),
            args: Vec::new(),
            working_dir: None,
        });
        let mut service = SpeechService::new(&config);
        let err = service.start().await.unwrap_err();
        assert!(err.to_string().contains("failed to launch"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_startup_timeout_stops_child() {
        let mut config = unreachable_config();
        config.autostart = Some(ServiceCommand {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
            working_dir: None,
        });
        let mut service = SpeechService::new(&config)
            .with_startup_timeout(Duration::from_millis(200))
            .with_poll_interval(Duration::from_millis(50));

        let err = service.start().await.unwrap_err();
        assert!(err.to_string().contains("did not become ready"));
        assert!(!service.is_managed());
    }

    #[tokio::test]
    async fn test_stop_without_child_is_noop() {
        let mut service = SpeechService::new(&unreachable_config());
        service.stop().await.unwrap();
    }
}
