//! Finding the ffmpeg and ffprobe binaries.
//!
//! Strategies are tried in order and the first existing file wins:
//! configured path, `STORYREEL_FFMPEG`, `PATH`, the WinGet `Links`
//! directory, a shallow scan of WinGet `Packages`, then `C:\ffmpeg\bin`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use storyreel_common::config::EngineConfig;
use storyreel_common::error::{StoryreelError, StoryreelResult};

/// Environment variable naming an ffmpeg binary.
pub const FFMPEG_ENV: &str = "STORYREEL_FFMPEG";

/// How deep the WinGet package scan descends.
const PACKAGE_SCAN_DEPTH: usize = 4;

/// Which strategy produced the engine location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    Configured,
    EnvVar,
    SearchPath,
    WingetLinks,
    WingetPackages,
    FixedDir,
}

impl LocateStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            LocateStrategy::Configured => "configured path",
            LocateStrategy::EnvVar => FFMPEG_ENV,
            LocateStrategy::SearchPath => "PATH",
            LocateStrategy::WingetLinks => "WinGet links",
            LocateStrategy::WingetPackages => "WinGet packages",
            LocateStrategy::FixedDir => "fixed install directory",
        }
    }
}

/// A resolved engine installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEngine {
    pub ffmpeg: PathBuf,
    /// `None` disables duration probing; scenes fall back to defaults.
    pub ffprobe: Option<PathBuf>,
    pub strategy: LocateStrategy,
}

/// Inputs for the locator, captured up front so lookups are testable.
#[derive(Debug, Clone, Default)]
pub struct EngineLocator {
    pub configured_ffmpeg: Option<PathBuf>,
    pub configured_ffprobe: Option<PathBuf>,
    pub env_ffmpeg: Option<PathBuf>,
    pub search_path: Option<OsString>,
    pub local_app_data: Option<PathBuf>,
    pub fixed_dirs: Vec<PathBuf>,
}

impl EngineLocator {
    /// Capture configuration and process environment.
    pub fn from_env(config: &EngineConfig) -> Self {
        Self {
            configured_ffmpeg: config.ffmpeg_path.clone(),
            configured_ffprobe: config.ffprobe_path.clone(),
            env_ffmpeg: std::env::var_os(FFMPEG_ENV).map(PathBuf::from),
            search_path: std::env::var_os("PATH"),
            local_app_data: std::env::var_os("LOCALAPPDATA").map(PathBuf::from),
            fixed_dirs: vec![PathBuf::from(r"C:\ffmpeg\bin")],
        }
    }

    /// Locate ffmpeg, or fail with [`StoryreelError::EngineMissing`].
    pub fn locate(&self) -> StoryreelResult<LocatedEngine> {
        let (ffmpeg, strategy) = self
            .find_ffmpeg()
            .ok_or_else(|| StoryreelError::engine_missing("ffmpeg"))?;
        let ffprobe = self.find_ffprobe(&ffmpeg);

        if ffprobe.is_none() {
            tracing::warn!("ffprobe not found, narration durations will use defaults");
        }
        tracing::info!(
            ffmpeg = %ffmpeg.display(),
            ffprobe = ?ffprobe,
            strategy = strategy.as_str(),
            "Located transcoding engine"
        );

        Ok(LocatedEngine {
            ffmpeg,
            ffprobe,
            strategy,
        })
    }

    fn find_ffmpeg(&self) -> Option<(PathBuf, LocateStrategy)> {
        let ffmpeg = exe_name("ffmpeg");

        if let Some(path) = self.configured_ffmpeg.as_ref().filter(|p| p.is_file()) {
            return Some((path.clone(), LocateStrategy::Configured));
        }
        if let Some(path) = self.env_ffmpeg.as_ref().filter(|p| p.is_file()) {
            return Some((path.clone(), LocateStrategy::EnvVar));
        }
        if let Some(path) = self.search("ffmpeg") {
            return Some((path, LocateStrategy::SearchPath));
        }
        if let Some(base) = &self.local_app_data {
            let winget = base.join("Microsoft").join("WinGet");
            let link = winget.join("Links").join(&ffmpeg);
            if link.is_file() {
                return Some((link, LocateStrategy::WingetLinks));
            }
            if let Some(found) = scan_for(&winget.join("Packages"), &ffmpeg, PACKAGE_SCAN_DEPTH) {
                return Some((found, LocateStrategy::WingetPackages));
            }
        }
        self.fixed_dirs
            .iter()
            .map(|dir| dir.join(&ffmpeg))
            .find(|candidate| candidate.is_file())
            .map(|path| (path, LocateStrategy::FixedDir))
    }

    fn find_ffprobe(&self, ffmpeg: &Path) -> Option<PathBuf> {
        if let Some(path) = self.configured_ffprobe.as_ref().filter(|p| p.is_file()) {
            return Some(path.clone());
        }
        let sibling = ffmpeg.with_file_name(exe_name("ffprobe"));
        if sibling.is_file() {
            return Some(sibling);
        }
        self.search("ffprobe")
    }

    fn search(&self, binary: &str) -> Option<PathBuf> {
        let paths = self.search_path.as_ref()?;
        let cwd = std::env::current_dir().ok()?;
        which::which_in(binary, Some(paths), cwd).ok()
    }
}

/// Platform executable name.
fn exe_name(stem: &str) -> String {
    if cfg!(windows) {
        format!("{stem}.exe")
    } else {
        stem.to_string()
    }
}

/// Depth-limited search for a file named `name` under `root`.
fn scan_for(root: &Path, name: &str, depth: usize) -> Option<PathBuf> {
    let entries = std::fs::read_dir(root).ok()?;
    let mut subdirs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|f| f == name) {
            return Some(path);
        }
    }
    if depth == 0 {
        return None;
    }
    subdirs.sort();
    subdirs
        .iter()
        .find_map(|dir| scan_for(dir, name, depth - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    fn empty_locator() -> EngineLocator {
        EngineLocator {
            search_path: Some(OsString::new()),
            ..EngineLocator::default()
        }
    }

    #[test]
    fn test_nothing_found_is_engine_missing() {
        let err = empty_locator().locate().unwrap_err();
        assert!(matches!(err, StoryreelError::EngineMissing { .. }));
    }

    #[test]
    fn test_configured_path_wins_with_sibling_probe() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = dir.path().join("bin").join(exe_name("ffmpeg"));
        let ffprobe = dir.path().join("bin").join(exe_name("ffprobe"));
        touch(&ffmpeg);
        touch(&ffprobe);

        let located = EngineLocator {
            configured_ffmpeg: Some(ffmpeg.clone()),
            ..empty_locator()
        }
        .locate()
        .unwrap();

        assert_eq!(located.strategy, LocateStrategy::Configured);
        assert_eq!(located.ffmpeg, ffmpeg);
        assert_eq!(located.ffprobe, Some(ffprobe));
    }

    #[test]
    fn test_missing_configured_path_falls_through_to_env() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = dir.path().join(exe_name("ffmpeg"));
        touch(&ffmpeg);

        let located = EngineLocator {
            configured_ffmpeg: Some(dir.path().join("nope")),
            env_ffmpeg: Some(ffmpeg.clone()),
            ..empty_locator()
        }
        .locate()
        .unwrap();

        assert_eq!(located.strategy, LocateStrategy::EnvVar);
        assert_eq!(located.ffprobe, None);
    }

    #[test]
    fn test_winget_links_then_packages() {
        let dir = tempfile::tempdir().unwrap();
        let packaged = dir
            .path()
            .join("Microsoft/WinGet/Packages/Gyan.FFmpeg/ffmpeg-7.0/bin")
            .join(exe_name("ffmpeg"));
        touch(&packaged);

        let locator = EngineLocator {
            local_app_data: Some(dir.path().to_path_buf()),
            ..empty_locator()
        };
        let located = locator.locate().unwrap();
        assert_eq!(located.strategy, LocateStrategy::WingetPackages);
        assert_eq!(located.ffmpeg, packaged);

        let link = dir.path().join("Microsoft/WinGet/Links").join(exe_name("ffmpeg"));
        touch(&link);
        assert_eq!(locator.locate().unwrap().strategy, LocateStrategy::WingetLinks);
    }

    #[test]
    fn test_fixed_dir_is_last_resort() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(exe_name("ffmpeg")));
        let located = EngineLocator {
            fixed_dirs: vec![dir.path().to_path_buf()],
            ..empty_locator()
        }
        .locate()
        .unwrap();
        assert_eq!(located.strategy, LocateStrategy::FixedDir);
    }
}
