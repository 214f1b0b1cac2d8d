//! Render orchestration: materialize the script, run Manim, and relocate the
//! produced video into the flat `videos` directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::process::Command;

use crate::config::Config;
use crate::error::RenderError;
use crate::pipeline::{locate, process};
use crate::types::render::{QualityPreset, RenderArtifact, RenderCommand};
use crate::types::script::GeneratedScript;

const SCRIPT_SUFFIX: &str = ".py";
const VIDEO_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct Renderer {
    media_dir: PathBuf,
    videos_dir: PathBuf,
    python: Option<PathBuf>,
    quality: QualityPreset,
    timeout: Duration,
    purge_render_dirs: bool,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Self {
            media_dir: absolutize(&config.media_dir),
            videos_dir: absolutize(&config.videos_dir),
            python: config.python_executable.clone(),
            quality: config.quality,
            timeout: config.render_timeout,
            purge_render_dirs: config.purge_render_dirs,
        }
    }

    /// Renders `script` and copies the result to `<videos_dir>/<output_name>`.
    pub async fn render(
        &self,
        script: &GeneratedScript,
        output_name: &str,
    ) -> Result<RenderArtifact, RenderError> {
        let python = locate::resolve_interpreter(self.python.as_deref())?;
        let command = locate::find_render_command(&python)?;

        tokio::fs::create_dir_all(&self.media_dir).await?;
        tokio::fs::create_dir_all(&self.videos_dir).await?;

        // Deleted when closed or dropped, so every return path cleans up.
        let script_file = write_script(&script.source)?;
        let script_path = script_file.path().to_path_buf();
        tracing::info!("Created temporary file at: {}", script_path.display());

        let render_dir = self.render_dir_for(&script_path)?;
        let mut cmd = self.build_command(&command, output_name, &script_path, &script.scene_name);
        tracing::info!(
            scene = %script.scene_name,
            quality = ?self.quality,
            "Running Manim command: {:?}",
            cmd.as_std()
        );

        let output = process::run_with_timeout(&mut cmd, &self.media_dir, self.timeout).await;
        if let Err(err) = script_file.close() {
            tracing::warn!("Failed to remove {}: {}", script_path.display(), err);
        }

        let output = output.map_err(|err| {
            if let RenderError::Process { stderr, stdout, .. } = &err {
                tracing::error!("Manim error: {}", stderr);
                tracing::error!("Manim stdout: {}", stdout);
            }
            err
        })?;
        tracing::info!(
            elapsed_ms = output.duration.as_millis() as u64,
            "Manim output: {}",
            output.stdout.trim()
        );
        if !output.stderr.trim().is_empty() {
            tracing::debug!("Manim stderr: {}", output.stderr.trim());
        }

        let produced = find_artifact(&render_dir.join(self.quality.output_subdir())).await?;
        tracing::info!("Found video file: {}", produced.display());

        let destination = self.videos_dir.join(output_name);
        let size_bytes = tokio::fs::copy(&produced, &destination).await?;
        tracing::info!("Copied video file to: {}", destination.display());

        if self.purge_render_dirs {
            if let Err(err) = tokio::fs::remove_dir_all(&render_dir).await {
                tracing::warn!("Failed to purge {}: {}", render_dir.display(), err);
            }
        }

        Ok(RenderArtifact {
            path: destination,
            file_name: output_name.to_string(),
            size_bytes,
        })
    }

    fn build_command(
        &self,
        command: &RenderCommand,
        output_name: &str,
        script_path: &Path,
        scene_name: &str,
    ) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .arg(self.quality.flag())
            .arg("--media_dir")
            .arg(&self.media_dir)
            .arg("-o")
            .arg(output_name)
            .arg(script_path)
            .arg(scene_name);
        cmd
    }

    /// Manim writes into `<media>/videos/<script stem>/`.
    fn render_dir_for(&self, script_path: &Path) -> Result<PathBuf, RenderError> {
        let stem = script_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                RenderError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "temporary script has no file stem",
                ))
            })?;
        Ok(self.media_dir.join("videos").join(stem))
    }
}

/// Manim is run from inside the media directory, so a relative
/// `--media_dir` would nest the output a second time.
fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn write_script(source: &str) -> Result<tempfile::NamedTempFile, RenderError> {
    let mut file = tempfile::Builder::new()
        .prefix("tmp")
        .suffix(SCRIPT_SUFFIX)
        .tempfile()?;
    file.write_all(source.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Picks the newest `.mp4` in `dir`; equal timestamps fall back to the
/// lexicographically last name.
pub async fn find_artifact(dir: &Path) -> Result<PathBuf, RenderError> {
    if !tokio::fs::metadata(dir)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        tracing::error!("Video directory not found: {}", dir.display());
        return Err(RenderError::MissingOutputDir(dir.to_path_buf()));
    }

    let mut best: Option<(SystemTime, String, PathBuf)> = None;
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(VIDEO_EXTENSION))
            .unwrap_or(false);
        let metadata = entry.metadata().await?;
        if !is_video || !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let name = entry.file_name().to_string_lossy().into_owned();
        let candidate = (modified, name, path);
        if best
            .as_ref()
            .map_or(true, |current| (&candidate.0, &candidate.1) > (&current.0, &current.1))
        {
            best = Some(candidate);
        }
    }

    best.map(|(_, _, path)| path).ok_or_else(|| {
        tracing::error!("No video files found in {}", dir.display());
        RenderError::NoArtifact(dir.to_path_buf())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_artifact(&dir.path().join("1080p60")).await.unwrap_err();
        assert!(matches!(err, RenderError::MissingOutputDir(_)));
    }

    #[tokio::test]
    async fn directory_without_videos_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("partial_movie_file_list.txt"), "x").unwrap();
        let err = find_artifact(dir.path()).await.unwrap_err();
        assert!(matches!(err, RenderError::NoArtifact(_)));
    }

    #[tokio::test]
    async fn newest_video_wins() {
        let dir = tempfile::tempdir().unwrap();
        let newer = dir.path().join("a_newer.mp4");
        let older = dir.path().join("z_older.mp4");
        std::fs::write(&older, "old").unwrap();
        std::fs::write(&newer, "new").unwrap();
        let past = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(past)
            .unwrap();

        assert_eq!(find_artifact(dir.path()).await.unwrap(), newer);
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_name() {
        let dir = tempfile::tempdir().unwrap();
        let stamp = SystemTime::now() - Duration::from_secs(60);
        for name in ["A.mp4", "C.mp4", "B.mp4"] {
            let path = dir.path().join(name);
            std::fs::write(&path, name).unwrap();
            std::fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(stamp)
                .unwrap();
        }
        assert_eq!(find_artifact(dir.path()).await.unwrap(), dir.path().join("C.mp4"));
    }

    #[test]
    fn command_follows_manim_cli_contract() {
        let config = Config::default().with_backend_dir(Path::new("/srv/app"));
        let renderer = Renderer::new(&config);
        let command = RenderCommand {
            program: PathBuf::from("/venv/bin/python"),
            args: vec!["-m".to_string(), "manim".to_string()],
        };
        let cmd = renderer.build_command(
            &command,
            "animation_20240101_120000.mp4",
            Path::new("/tmp/tmpabc.py"),
            "MyScene",
        );
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-m",
                "manim",
                "-qh",
                "--media_dir",
                "/srv/app/media",
                "-o",
                "animation_20240101_120000.mp4",
                "/tmp/tmpabc.py",
                "MyScene",
            ]
        );
    }

    #[test]
    fn render_dir_uses_script_stem() {
        let config = Config::default().with_backend_dir(Path::new("/srv/app"));
        let renderer = Renderer::new(&config);
        let dir = renderer.render_dir_for(Path::new("/tmp/tmpabc123.py")).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/app/media/videos/tmpabc123"));
    }
}
