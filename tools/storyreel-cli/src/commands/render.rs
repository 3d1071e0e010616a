//! Render one job.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use storyreel_common::config::AppConfig;
use storyreel_job_model::job::{JobConfig, JobProgress, JobRequest, JobStage, NarrationSettings};
use storyreel_job_model::script::ScriptPolicy;
use storyreel_job_model::style::{
    AspectRatio, CaptionBackend, ColorGrade, QualityTier, RevealEffect, TextColor,
};
use storyreel_render_engine::{EngineLocator, FfmpegEngine, Pipeline, PipelineSettings};
use storyreel_speech::{SpeechClient, SpeechService};

/// Parsed `render` arguments.
pub struct RenderArgs {
    pub images: Vec<PathBuf>,
    pub script: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub aspect: String,
    pub quality: String,
    pub grade: String,
    pub text_color: String,
    pub font: Option<String>,
    pub effect: String,
    pub narrate: bool,
    pub voice: Option<String>,
    pub music: Option<PathBuf>,
    pub strict: bool,
    pub drawtext: bool,
}

impl RenderArgs {
    fn job_config(&self) -> JobConfig {
        JobConfig {
            narration: self.narrate.then(|| NarrationSettings {
                voice: self.voice.clone(),
            }),
            aspect: AspectRatio::parse(&self.aspect),
            tier: QualityTier::parse(&self.quality),
            grade: ColorGrade::parse(&self.grade),
            text_color: TextColor::new(self.text_color.clone()),
            font: self.font.clone(),
            effect: RevealEffect::parse(&self.effect),
            caption_backend: if self.drawtext {
                CaptionBackend::DrawText
            } else {
                CaptionBackend::Ass
            },
            music: self.music.clone(),
            script_policy: if self.strict {
                ScriptPolicy::Strict
            } else {
                ScriptPolicy::Reconcile
            },
        }
    }
}

pub async fn run(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let script = match &args.script {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read script {}: {e}", path.display()))?,
        ),
        None => None,
    };
    let request = JobRequest::new(args.images.clone(), script).with_config(args.job_config());

    let located = EngineLocator::from_env(&config.engine).locate()?;
    println!(
        "Engine: {} (via {})",
        located.ffmpeg.display(),
        located.strategy.as_str()
    );
    let engine = FfmpegEngine::new(located);

    let mut service = None;
    let speech = if request.narration_enabled() {
        let mut handle = SpeechService::new(&config.speech);
        handle.start().await?;
        service = Some(handle);
        Some(SpeechClient::new(&config.speech)?)
    } else {
        None
    };

    let progress: storyreel_render_engine::ProgressCallback = Box::new(print_progress);
    let pipeline =
        Pipeline::new(engine, speech, PipelineSettings::from_config(config)).with_progress(progress);

    println!("Rendering {} image(s)...", request.images.len());
    let result = pipeline.run(&request).await;

    if let Some(mut handle) = service {
        if let Err(e) = handle.stop().await {
            tracing::warn!(error = %e, "Failed to stop speech service");
        }
    }

    match result {
        Ok(artifact) => {
            let final_path = match &args.output {
                Some(target) => place_output(&artifact.path, target)?,
                None => artifact.path.clone(),
            };
            println!("\nRender complete: {}", final_path.display());
            println!("  Scenes: {}", artifact.scene_count);
            println!("  Duration: {:.2}s", artifact.duration_secs);
            if artifact.music_mixed {
                println!("  Music: mixed");
            }
            Ok(())
        }
        Err(e) => {
            println!("\nRender failed: {e}");
            Err(e.into())
        }
    }
}

fn print_progress(p: JobProgress) {
    match p.stage {
        JobStage::RenderScene => print!(
            "\r  Scene {}/{} ({:.0}%)  ",
            p.scenes_done + 1,
            p.total_scenes,
            p.fraction() * 100.0
        ),
        JobStage::Done | JobStage::Failed => {}
        stage => print!("\r  {stage:?}...              "),
    }
    let _ = std::io::stdout().flush();
}

/// Move the artifact to `target`, copying when a rename crosses filesystems.
fn place_output(artifact: &Path, target: &Path) -> anyhow::Result<PathBuf> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if std::fs::rename(artifact, target).is_err() {
        std::fs::copy(artifact, target)
            .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", target.display()))?;
        std::fs::remove_file(artifact)?;
    }
    Ok(target.to_path_buf())
}
