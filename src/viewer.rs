use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::config::ViewerConfig;
use crate::errors::{DevtoolsError, Result};
use crate::locator::{find_marker, read_lines, TestMarker};
use crate::platform::PlatformExecutor;
use crate::snippet;

/// What to show for the selected test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewTarget {
    /// Feed the embedded source snippet to the source command.
    Source,
    /// Open the exported dot file of the given kind (e.g. `ast`).
    Dot { kind: String },
}

impl FromStr for ViewTarget {
    type Err = DevtoolsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DevtoolsError::InvalidArgument(
                "ast_type must not be empty".to_string(),
            ));
        }
        if s.eq_ignore_ascii_case("source") {
            Ok(ViewTarget::Source)
        } else {
            Ok(ViewTarget::Dot {
                kind: s.to_string(),
            })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub file: PathBuf,
    pub line: usize,
    pub target: ViewTarget,
}

/// A fully resolved viewer invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    Pipe { command: String, input: String },
    Open { command: String, path: PathBuf },
}

impl LaunchPlan {
    pub fn command(&self) -> &str {
        match self {
            LaunchPlan::Pipe { command, .. } | LaunchPlan::Open { command, .. } => command,
        }
    }

    /// What `--print` writes: the snippet itself, or the dot-file path.
    pub fn payload(&self) -> String {
        match self {
            LaunchPlan::Pipe { input, .. } => input.clone(),
            LaunchPlan::Open { path, .. } => path.display().to_string(),
        }
    }
}

pub fn dot_path(config: &ViewerConfig, marker: &TestMarker, kind: &str) -> PathBuf {
    let dir = config
        .dot_dirs
        .get(kind)
        .map(String::as_str)
        .unwrap_or(kind);
    let file_name = format!("{}.{}", marker.identifier(), config.dot_extension);
    match &config.dot_root {
        Some(root) => root.join(dir).join(file_name),
        None => Path::new(dir).join(file_name),
    }
}

/// Locates the test around `request.line` and works out what to launch.
pub fn plan(request: &ViewRequest, config: &ViewerConfig) -> Result<LaunchPlan> {
    let lines = read_lines(&request.file)?;
    let marker = find_marker(&lines, request.line)?;

    match &request.target {
        ViewTarget::Source => {
            let snippet = snippet::extract(&lines, &marker)?;
            tracing::info!(
                test = %marker.identifier(),
                start = snippet.start_line,
                end = snippet.end_line,
                "extracted source snippet"
            );
            Ok(LaunchPlan::Pipe {
                command: config.source_command.clone(),
                input: snippet.text,
            })
        }
        ViewTarget::Dot { kind } => {
            let path = dot_path(config, &marker, kind);
            if !path.is_file() {
                return Err(DevtoolsError::FileNotFound(path));
            }
            tracing::info!(test = %marker.identifier(), path = %path.display(), "using dot file");
            Ok(LaunchPlan::Open {
                command: config.dot_command.clone(),
                path,
            })
        }
    }
}

/// Spawns the viewer and waits for it to exit.
pub fn launch(plan: &LaunchPlan, executor: &dyn PlatformExecutor) -> Result<()> {
    let mut cmd: Command = match plan {
        LaunchPlan::Pipe { command, .. } => {
            let mut cmd = executor.build_shell_command(command);
            cmd.stdin(Stdio::piped());
            cmd
        }
        LaunchPlan::Open { command, path } => {
            executor.build_command_with_arg(command, &path.to_string_lossy())
        }
    };

    tracing::debug!(command = plan.command(), "spawning viewer");
    let mut child = cmd.spawn().map_err(|e| DevtoolsError::SpawnError {
        command: plan.command().to_string(),
        reason: e.to_string(),
    })?;

    if let LaunchPlan::Pipe { input, .. } = plan {
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input.as_bytes()) {
                Ok(()) => {}
                // viewer quit without reading everything; its exit status decides
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    tracing::warn!(command = plan.command(), "viewer closed its input early");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(DevtoolsError::ViewerFailed {
            command: plan.command().to_string(),
            code: status.code(),
        });
    }
    Ok(())
}
