use std::path::{Path, PathBuf};

use crate::error::RenderError;
use crate::types::render::RenderCommand;

const INTERPRETER_NAMES: [&str; 2] = ["python3", "python"];

/// Resolves the Python interpreter: the configured path if any, otherwise the
/// first `python3`/`python` on `PATH`.
pub fn resolve_interpreter(configured: Option<&Path>) -> Result<PathBuf, RenderError> {
    if let Some(path) = configured {
        return Ok(path.to_path_buf());
    }
    let search_path = std::env::var_os("PATH").unwrap_or_default();
    std::env::split_paths(&search_path)
        .flat_map(|dir| {
            INTERPRETER_NAMES
                .iter()
                .map(move |name| dir.join(executable_name(name)))
        })
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| RenderError::Environment("no Python interpreter found on PATH".to_string()))
}

/// Chooses how Manim will be invoked for the given interpreter.
///
/// A `manim` launcher next to the interpreter is preferred; otherwise the
/// interpreter runs the `manim` module.
pub fn find_render_command(python: &Path) -> Result<RenderCommand, RenderError> {
    if !python.exists() {
        return Err(RenderError::Environment(format!(
            "Python executable not found at: {}",
            python.display()
        )));
    }

    let bin_dir = python.parent().unwrap_or_else(|| Path::new("."));
    if let Some(launcher) = launcher_candidates(bin_dir)
        .into_iter()
        .find(|candidate| candidate.is_file())
    {
        tracing::info!("Found manim executable at: {}", launcher.display());
        return Ok(RenderCommand {
            program: launcher,
            args: Vec::new(),
        });
    }

    tracing::info!("Manim executable not found, using {} -m manim", python.display());
    Ok(RenderCommand {
        program: python.to_path_buf(),
        args: vec!["-m".to_string(), "manim".to_string()],
    })
}

#[cfg(windows)]
fn launcher_candidates(bin_dir: &Path) -> Vec<PathBuf> {
    vec![
        bin_dir.join("Scripts").join("manim.exe"),
        bin_dir.join("manim.exe"),
    ]
}

#[cfg(not(windows))]
fn launcher_candidates(bin_dir: &Path) -> Vec<PathBuf> {
    vec![bin_dir.join("manim")]
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn missing_interpreter_is_an_environment_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_render_command(&dir.path().join("python3")).unwrap_err();
        assert!(matches!(err, RenderError::Environment(msg) if msg.contains("python3")));
    }

    #[test]
    fn falls_back_to_module_invocation() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("python3");
        std::fs::write(&python, "").unwrap();

        let command = find_render_command(&python).unwrap();
        assert_eq!(command.program, python);
        assert_eq!(command.args, vec!["-m", "manim"]);
    }

    #[test]
    fn prefers_colocated_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let python = dir.path().join("python3");
        std::fs::write(&python, "").unwrap();
        std::fs::write(dir.path().join("manim"), "").unwrap();

        let command = find_render_command(&python).unwrap();
        assert_eq!(command.program, dir.path().join("manim"));
        assert!(command.args.is_empty());
    }

    #[test]
    fn configured_interpreter_is_used_verbatim() {
        let path = Path::new("/opt/venv/bin/python");
        assert_eq!(resolve_interpreter(Some(path)).unwrap(), path);
    }
}
