//! Assembly: concatenating scene clips and mixing background music.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use storyreel_common::error::{StoryreelError, StoryreelResult};

use crate::engine::{EngineInput, EngineInvocation, TranscodeEngine};
use crate::escape::manifest_entry;
use crate::scene::RenderedClip;

/// Write a concat manifest listing `clips` in order, one absolute path each.
pub fn write_manifest(clips: &[RenderedClip], manifest: &Path) -> StoryreelResult<()> {
    let cwd = std::env::current_dir()?;
    let mut file = std::fs::File::create(manifest)?;
    for clip in clips {
        let absolute = if clip.path.is_absolute() {
            clip.path.clone()
        } else {
            cwd.join(&clip.path)
        };
        writeln!(file, "{}", manifest_entry(&absolute))?;
    }
    file.flush()?;
    Ok(())
}

/// Stream-copy concatenation of a manifest.
pub fn concat_invocation(manifest: &Path, output: &Path) -> EngineInvocation {
    EngineInvocation::new("concatenate", output)
        .input(EngineInput::ConcatList {
            path: manifest.to_path_buf(),
        })
        .output_args(["-c", "copy"])
}

/// Mix a looped, attenuated music bed under the combined audio. The mix
/// lasts as long as the video's own audio. `normalize=0` keeps the original
/// audio at full level; only the music is attenuated.
pub fn mix_invocation(combined: &Path, music: &Path, volume: f64, output: &Path) -> EngineInvocation {
    EngineInvocation::new("mix music", output)
        .input(EngineInput::Media {
            path: combined.to_path_buf(),
        })
        .input(EngineInput::Looped {
            path: music.to_path_buf(),
        })
        .filter_complex(format!(
            "[1:a]volume={volume}[bg];[0:a][bg]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]"
        ))
        .map("0:v")
        .map("[aout]")
        .output_args(["-c:v", "copy", "-c:a", "aac", "-b:a", "192k"])
}

/// Concatenate clips into `output` via a manifest at `manifest`.
pub fn concatenate<E: TranscodeEngine + ?Sized>(
    engine: &E,
    clips: &[RenderedClip],
    manifest: &Path,
    output: &Path,
) -> StoryreelResult<()> {
    if clips.is_empty() {
        return Err(StoryreelError::input_contract("no scene clips to concatenate"));
    }

    write_manifest(clips, manifest)?;
    tracing::info!(
        clips = clips.len(),
        manifest = %manifest.display(),
        output = %output.display(),
        "Concatenating scenes"
    );
    engine.run(&concat_invocation(manifest, output))
}

/// Mix `music` into `combined` in place.
///
/// Returns whether the mix was applied. Any failure leaves `combined`
/// untouched and is only logged.
pub fn mix_music<E: TranscodeEngine + ?Sized>(
    engine: &E,
    combined: &Path,
    music: &Path,
    volume: f64,
) -> bool {
    if !music.is_file() {
        tracing::warn!(music = %music.display(), "Music track not found, keeping un-mixed output");
        return false;
    }

    let mixed = mixed_sibling(combined);
    tracing::info!(music = %music.display(), volume, "Mixing background music");

    let result = engine
        .run(&mix_invocation(combined, music, volume, &mixed))
        .and_then(|()| std::fs::rename(&mixed, combined).map_err(StoryreelError::from));

    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Music mix failed, keeping un-mixed output");
            let _ = std::fs::remove_file(&mixed);
            false
        }
    }
}

fn mixed_sibling(combined: &Path) -> PathBuf {
    let stem = combined
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = combined
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mp4".to_string());
    combined.with_file_name(format!("{stem}.mixed-{}.{ext}", uuid::Uuid::new_v4().simple()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(index: usize, path: &str) -> RenderedClip {
        RenderedClip {
            index,
            path: PathBuf::from(path),
            duration_secs: 1.0,
        }
    }

    #[test]
    fn test_manifest_lists_clips_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        write_manifest(&[clip(1, "/w/one.mp4"), clip(2, "/w/it's two.mp4")], &manifest).unwrap();

        let content = std::fs::read_to_string(&manifest).unwrap();
        assert_eq!(content, "file '/w/one.mp4'\nfile '/w/it'\\''s two.mp4'\n");
    }

    #[test]
    fn test_relative_clip_paths_become_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        write_manifest(&[clip(1, "clips/one.mp4")], &manifest).unwrap();
        let content = std::fs::read_to_string(&manifest).unwrap();
        let listed = content.trim().trim_start_matches("file '").trim_end_matches('\'');
        assert!(Path::new(listed).is_absolute());
    }

    #[test]
    fn test_mix_invocation_graph() {
        let invocation = mix_invocation(
            Path::new("/o/final.mp4"),
            Path::new("/m/bed.mp3"),
            0.15,
            Path::new("/o/final.mixed.mp4"),
        );
        let args = invocation.to_args().join(" ");
        assert!(args.contains("-i /o/final.mp4 -stream_loop -1 -i /m/bed.mp3"));
        assert!(args.contains(
            "[1:a]volume=0.15[bg];[0:a][bg]amix=inputs=2:duration=first:dropout_transition=0:normalize=0[aout]"
        ));
        assert!(args.contains("-map 0:v -map [aout] -c:v copy -c:a aac"));
    }

    #[test]
    fn test_mix_keeps_original_audio_level() {
        let invocation = mix_invocation(
            Path::new("/o/final.mp4"),
            Path::new("/m/bed.mp3"),
            0.15,
            Path::new("/o/final.mixed.mp4"),
        );
        let graph = invocation.to_args().join(" ");
        assert!(graph.contains("normalize=0"));
        assert!(!graph.contains("[0:a]volume"));
    }

    #[test]
    fn test_mixed_sibling_stays_in_directory() {
        let mixed = mixed_sibling(Path::new("/o/final.mp4"));
        assert_eq!(mixed.parent(), Some(Path::new("/o")));
        let name = mixed.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("final.mixed-") && name.ends_with(".mp4"));
    }
}
