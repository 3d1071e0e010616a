//! Job orchestration.
//!
//! `Validate -> ResolveScript -> RenderScene[] -> Concatenate -> MixMusic -> Done`,
//! with any fatal error ending in `Failed`. Scenes render strictly in order,
//! one engine call at a time. Intermediate files are named after the job id
//! so concurrent jobs can share a work directory.

use std::path::{Path, PathBuf};

use storyreel_common::config::AppConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};
use storyreel_job_model::job::{FinalArtifact, JobProgress, JobRequest, JobStage};
use storyreel_job_model::scene::Scene;
use storyreel_job_model::script::resolve_captions;
use storyreel_job_model::style::CaptionBackend;
use storyreel_processing_core::duration::{resolve_duration, DurationDefaults};
use storyreel_processing_core::FrameGeometry;
use storyreel_speech::SpeechSynthesizer;

use crate::assembly::{concatenate, mix_music};
use crate::engine::TranscodeEngine;
use crate::filter_chain::{CaptionOverlay, FilterChain};
use crate::fonts::resolve_font;
use crate::scene::{caption_document, render_scene, RenderedClip};

/// Progress callback invoked at every stage transition.
pub type ProgressCallback = Box<dyn Fn(JobProgress) + Send + Sync>;

/// Settings the pipeline takes from application configuration.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fps: u32,
    pub defaults: DurationDefaults,
    pub music_volume: f64,
    pub keep_intermediates: bool,
    pub default_voice: String,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            work_dir: config.work_dir.clone(),
            output_dir: config.output_dir.clone(),
            fps: config.render.fps.max(1),
            defaults: DurationDefaults {
                preview_secs: config.render.preview_default_secs,
                final_secs: config.render.final_default_secs,
            },
            music_volume: config.render.music_volume,
            keep_intermediates: config.render.keep_intermediates,
            default_voice: config.speech.default_voice.clone(),
        }
    }
}

/// Files a job creates, tracked for cleanup.
#[derive(Debug, Default)]
struct JobFiles {
    clips: Vec<RenderedClip>,
    scratch: Vec<PathBuf>,
}

impl JobFiles {
    fn remove_all(&mut self) {
        let paths = self
            .clips
            .drain(..)
            .map(|clip| clip.path)
            .chain(self.scratch.drain(..));
        for path in paths {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to remove intermediate");
                }
            }
        }
    }
}

/// Runs jobs against a transcoding engine and an optional speech service.
pub struct Pipeline<E, S> {
    engine: E,
    speech: Option<S>,
    settings: PipelineSettings,
    progress: Option<ProgressCallback>,
}

impl<E, S> Pipeline<E, S>
where
    E: TranscodeEngine,
    S: SpeechSynthesizer,
{
    pub fn new(engine: E, speech: Option<S>, settings: PipelineSettings) -> Self {
        Self {
            engine,
            speech,
            settings,
            progress: None,
        }
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one job to completion.
    pub async fn run(&self, request: &JobRequest) -> StoryreelResult<FinalArtifact> {
        let job_id = uuid::Uuid::new_v4().simple().to_string();
        let mut files = JobFiles::default();

        tracing::info!(
            job = %job_id,
            images = request.images.len(),
            aspect = request.config.aspect.as_str(),
            tier = request.config.tier.as_str(),
            narration = request.narration_enabled(),
            "Starting job"
        );

        let outcome = self.execute(&job_id, request, &mut files).await;
        match outcome {
            Ok(artifact) => {
                if self.settings.keep_intermediates {
                    tracing::info!(job = %job_id, "Keeping intermediates");
                } else {
                    files.remove_all();
                }
                self.report(JobStage::Done, artifact.scene_count, artifact.scene_count);
                tracing::info!(
                    job = %job_id,
                    output = %artifact.path.display(),
                    scenes = artifact.scene_count,
                    duration_secs = artifact.duration_secs,
                    music = artifact.music_mixed,
                    "Job complete"
                );
                Ok(artifact)
            }
            Err(e) => {
                let scenes_done = files.clips.len();
                files.remove_all();
                self.report(JobStage::Failed, scenes_done, request.images.len());
                tracing::error!(job = %job_id, error = %e, "Job failed");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        job_id: &str,
        request: &JobRequest,
        files: &mut JobFiles,
    ) -> StoryreelResult<FinalArtifact> {
        let config = &request.config;

        // Validate
        self.report(JobStage::Validate, 0, 0);
        if request.images.is_empty() {
            return Err(StoryreelError::input_contract("no images were supplied"));
        }
        if let Some(missing) = request.images.iter().find(|p| !p.is_file()) {
            return Err(StoryreelError::FileNotFound {
                path: missing.clone(),
            });
        }
        let default_secs = self.settings.defaults.for_tier(config.tier);
        if !default_secs.is_finite() || default_secs <= 0.0 {
            return Err(StoryreelError::config(format!(
                "default {} scene duration must be a positive number of seconds, got {default_secs}",
                config.tier.as_str()
            )));
        }
        let speech = if request.narration_enabled() {
            let speech = self.speech.as_ref().ok_or_else(|| {
                StoryreelError::config("narration requested but no speech service is configured")
            })?;
            if !speech.is_alive().await {
                return Err(StoryreelError::speech(
                    speech.endpoint(),
                    "service is not reachable",
                ));
            }
            Some(speech)
        } else {
            None
        };
        std::fs::create_dir_all(&self.settings.work_dir)?;
        std::fs::create_dir_all(&self.settings.output_dir)?;

        // ResolveScript
        self.report(JobStage::ResolveScript, 0, request.images.len());
        let captions = resolve_captions(
            &request.images,
            request.script.as_deref(),
            config.script_policy,
        )?;
        let total = captions.len();

        let geometry = FrameGeometry::resolve(config.aspect, config.tier).with_fps(self.settings.fps);
        let font_file = resolve_font(config.font.as_deref());
        let highlight = config.text_color.resolve();
        let voice = config
            .narration
            .as_ref()
            .and_then(|n| n.voice.clone())
            .unwrap_or_else(|| self.settings.default_voice.clone());

        // RenderScene
        for (offset, (image, caption)) in request.images.iter().zip(&captions).enumerate() {
            let index = offset + 1;
            self.report(JobStage::RenderScene, offset, total);

            let narration = match speech {
                Some(speech) => {
                    let path = self.work_path(job_id, &format!("narration_{index}.mp3"));
                    let audio = speech
                        .synthesize(caption, &voice)
                        .await
                        .map_err(|e| e.in_scene(index))?;
                    tokio::fs::write(&path, &audio)
                        .await
                        .map_err(|e| StoryreelError::from(e).in_scene(index))?;
                    files.scratch.push(path.clone());
                    Some(path)
                }
                None => None,
            };

            let duration_secs = resolve_duration(narration.as_deref(), default_secs, &|p: &Path| {
                self.engine.probe_duration(p)
            });

            let scene = Scene {
                index,
                image: image.clone(),
                caption: caption.clone(),
                narration,
                duration_secs,
                width: geometry.width,
                height: geometry.height,
                grade: config.grade,
                text_color: highlight,
                effect: config.effect,
            };

            let overlay = match config.caption_backend {
                CaptionBackend::Ass => {
                    let document = self.work_path(job_id, &format!("scene_{index}.ass"));
                    std::fs::write(&document, caption_document(&scene, &geometry, font_file.as_deref()))
                        .map_err(|e| StoryreelError::from(e).in_scene(index))?;
                    files.scratch.push(document.clone());
                    CaptionOverlay::Subtitles {
                        document,
                        fonts_dir: font_file.as_ref().and_then(|f| f.parent()).map(Path::to_path_buf),
                    }
                }
                CaptionBackend::DrawText => CaptionOverlay::DrawText {
                    text: scene.caption.clone(),
                    font_file: font_file.clone(),
                    font_size: geometry.font_size,
                    color: highlight,
                },
            };

            let chain = FilterChain::build(&scene, &geometry, overlay);
            let clip_path = self.work_path(job_id, &format!("scene_{index}.mp4"));
            // The engine may leave a partial clip behind when it fails.
            files.scratch.push(clip_path.clone());
            let clip = render_scene(&self.engine, &scene, &chain, config.tier, geometry.fps, &clip_path)
                .map_err(|e| e.in_scene(index))?;
            files.scratch.pop();
            files.clips.push(clip);
        }

        // Concatenate
        self.report(JobStage::Concatenate, total, total);
        let manifest = self.work_path(job_id, "concat.txt");
        files.scratch.push(manifest.clone());
        let output = self.settings.output_dir.join(format!("{job_id}.mp4"));
        files.scratch.push(output.clone());
        concatenate(&self.engine, &files.clips, &manifest, &output)?;
        files.scratch.pop();

        let duration_secs = files.clips.iter().map(|c| c.duration_secs).sum();
        let mut artifact = FinalArtifact::new(job_id, output, total, duration_secs);

        // MixMusic
        if let Some(music) = &config.music {
            self.report(JobStage::MixMusic, total, total);
            artifact.music_mixed =
                mix_music(&self.engine, &artifact.path, music, self.settings.music_volume);
        }

        Ok(artifact)
    }

    fn work_path(&self, job_id: &str, name: &str) -> PathBuf {
        self.settings.work_dir.join(format!("{job_id}_{name}"))
    }

    fn report(&self, stage: JobStage, scenes_done: usize, total_scenes: usize) {
        tracing::info!(stage = ?stage, scenes_done, total_scenes, "Stage");
        if let Some(cb) = &self.progress {
            cb(JobProgress {
                stage,
                scenes_done,
                total_scenes,
            });
        }
    }
}
