//! Hand-off to the external Graphviz renderer.
//!
//! A render goes through these stages:
//!
//! ```text
//! Idle -> WritingScratch -> InvokingRenderer -> OpeningOutput -> Cleanup -> Done
//! ```
//!
//! Writing the scratch file, invoking the renderer and opening the viewer can
//! each fail. A failure is reported to the operator and returned as
//! [`RenderOutcome::Failed`]; it is never turned into an `Err`, because by
//! the time rendering starts the graph itself has been built successfully.
//!
//! The scratch DOT file is owned by a guard that deletes it when dropped, so
//! it is removed on every exit path.

use crate::context::Reporter;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Graphviz executable.
pub const DEFAULT_RENDERER: &str = "dot";

/// Layout engine used when none is chosen.
pub const DEFAULT_ALGORITHM: &str = "dot";

/// Output format passed to `-T`.
pub const DEFAULT_FORMAT: &str = "svg";

/// Scratch DOT file, relative to the working directory.
pub const DEFAULT_SCRATCH_FILE: &str = "out.dot";

/// Rendered image, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "out.svg";

/// Layout engines accepted by `-K`.
pub const LAYOUT_ENGINES: [&str; 8] = [
    "dot", "neato", "fdp", "sfdp", "circo", "twopi", "osage", "patchwork",
];

const INSTALL_HINT: &str =
    "Install Graphviz (https://graphviz.org/download/) and make sure `dot` is on your PATH.";

/// How the rendered image is opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    /// The platform's default handler (`open`, `xdg-open` or `start`).
    SystemDefault,
    /// A specific program, called with the image path as its only argument.
    Command(String),
    /// Do not open the image.
    Disabled,
}

impl Viewer {
    /// Program and arguments that open `path`, or `None` when disabled.
    fn command_for(&self, path: &Path) -> Option<(String, Vec<OsString>)> {
        match self {
            Self::Disabled => None,
            Self::Command(program) => Some((program.clone(), vec![path.as_os_str().to_owned()])),
            Self::SystemDefault => Some(system_opener(path)),
        }
    }
}

#[cfg(target_os = "macos")]
fn system_opener(path: &Path) -> (String, Vec<OsString>) {
    ("open".to_string(), vec![path.as_os_str().to_owned()])
}

#[cfg(target_os = "windows")]
fn system_opener(path: &Path) -> (String, Vec<OsString>) {
    (
        "cmd".to_string(),
        vec![
            "/C".into(),
            "start".into(),
            "".into(),
            path.as_os_str().to_owned(),
        ],
    )
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn system_opener(path: &Path) -> (String, Vec<OsString>) {
    ("xdg-open".to_string(), vec![path.as_os_str().to_owned()])
}

/// Everything the render stage needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Renderer executable.
    pub renderer: String,
    /// Layout engine (`-K`).
    pub algorithm: String,
    /// Output format (`-T`).
    pub format: String,
    /// Where the DOT text is written before rendering.
    pub scratch_path: PathBuf,
    /// Where the image is written.
    pub output_path: PathBuf,
    /// How the image is opened afterwards.
    pub viewer: Viewer,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            renderer: DEFAULT_RENDERER.to_string(),
            algorithm: DEFAULT_ALGORITHM.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            scratch_path: PathBuf::from(DEFAULT_SCRATCH_FILE),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            viewer: Viewer::SystemDefault,
        }
    }
}

/// Where a render currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Nothing started yet.
    Idle,
    /// Writing the scratch DOT file.
    WritingScratch,
    /// Waiting for the renderer.
    InvokingRenderer,
    /// Launching the viewer.
    OpeningOutput,
    /// Removing the scratch file.
    Cleanup,
    /// Finished.
    Done,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Idle => "idle",
            Self::WritingScratch => "writing the scratch file",
            Self::InvokingRenderer => "invoking the renderer",
            Self::OpeningOutput => "opening the output",
            Self::Cleanup => "cleaning up",
            Self::Done => "done",
        };
        f.write_str(text)
    }
}

/// Errors raised while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The DOT text could not be written.
    #[error("failed to write '{}': {source}", path.display())]
    WriteScratch {
        /// Scratch file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The renderer is not installed.
    #[error("{command} not found\n\n{install_hint}")]
    RendererNotFound {
        /// The command that was not found.
        command: String,
        /// Installation instructions.
        install_hint: String,
    },

    /// The renderer could not be started.
    #[error("failed to spawn renderer '{command}': {source}")]
    RendererSpawn {
        /// The renderer command.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The renderer ran and failed.
    #[error("renderer '{command}' failed ({status}){}", describe_stderr(.stderr))]
    RendererFailed {
        /// The renderer command.
        command: String,
        /// Exit status.
        status: String,
        /// What the renderer printed on stderr.
        stderr: String,
    },

    /// The renderer reported success but wrote nothing.
    #[error("renderer did not produce '{}'", path.display())]
    MissingOutput {
        /// Expected output path.
        path: PathBuf,
    },

    /// The viewer could not be started.
    #[error("failed to open '{}' with '{command}': {source}", path.display())]
    ViewerSpawn {
        /// The viewer command.
        command: String,
        /// The image path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The viewer ran and failed.
    #[error("viewer '{command}' failed to open '{}' ({status})", path.display())]
    ViewerFailed {
        /// The viewer command.
        command: String,
        /// The image path.
        path: PathBuf,
        /// Exit status.
        status: String,
    },
}

fn describe_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Result of a render.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The image was written (and opened, unless the viewer is disabled).
    Rendered {
        /// The image path.
        output: PathBuf,
    },
    /// A stage failed; the failure has already been reported.
    Failed {
        /// Stage that failed.
        stage: RenderStage,
        /// What went wrong.
        error: RenderError,
    },
}

impl RenderOutcome {
    /// Returns `true` if the image was rendered and opened.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Rendered { .. })
    }
}

/// Scratch file deleted when the guard goes out of scope.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Write `contents` to `path` and take ownership of the file.
    ///
    /// The guard exists before the write so a partially written file is
    /// removed as well.
    async fn write(path: &Path, contents: &str) -> Result<Self, RenderError> {
        let guard = Self {
            path: path.to_path_buf(),
        };
        tokio::fs::write(&guard.path, contents)
            .await
            .map_err(|source| RenderError::WriteScratch {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(guard)
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!(path = %self.path.display(), error = %e, "Could not remove scratch file"),
        }
    }
}

/// Render `description` to an image and open it.
///
/// Never fails: errors are reported through `reporter` and returned inside
/// [`RenderOutcome::Failed`].
pub async fn render(
    reporter: &dyn Reporter,
    description: &str,
    options: &RenderOptions,
) -> RenderOutcome {
    let mut stage = RenderStage::Idle;
    match run_stages(reporter, description, options, &mut stage).await {
        Ok(()) => {
            reporter.success(&format!(
                "All completed: {}",
                options.output_path.display()
            ));
            RenderOutcome::Rendered {
                output: options.output_path.clone(),
            }
        }
        Err(err) => {
            debug!(%stage, error = %err, "Render failed");
            reporter.error(&format!("Render failed while {stage}: {err}"));
            RenderOutcome::Failed { stage, error: err }
        }
    }
}

fn advance(stage: &mut RenderStage, next: RenderStage) {
    debug!(from = %stage, to = %next, "Render stage");
    *stage = next;
}

async fn run_stages(
    reporter: &dyn Reporter,
    description: &str,
    options: &RenderOptions,
    stage: &mut RenderStage,
) -> Result<(), RenderError> {
    advance(stage, RenderStage::WritingScratch);
    let scratch = ScratchFile::write(&options.scratch_path, description).await?;

    advance(stage, RenderStage::InvokingRenderer);
    reporter.progress(&format!(
        "Rendering {} with the '{}' layout",
        options.output_path.display(),
        options.algorithm
    ));
    invoke_renderer(options, scratch.path()).await?;

    advance(stage, RenderStage::OpeningOutput);
    open_output(options).await?;

    advance(stage, RenderStage::Cleanup);
    drop(scratch);

    advance(stage, RenderStage::Done);
    Ok(())
}

async fn invoke_renderer(options: &RenderOptions, scratch: &Path) -> Result<(), RenderError> {
    let command = &options.renderer;
    debug!(
        command,
        algorithm = %options.algorithm,
        format = %options.format,
        input = %scratch.display(),
        output = %options.output_path.display(),
        "Invoking renderer"
    );

    // Anything at the output path afterwards must come from this invocation.
    remove_output(&options.output_path);

    let output = Command::new(command)
        .arg(format!("-K{}", options.algorithm))
        .arg(format!("-T{}", options.format))
        .arg(scratch)
        .arg("-o")
        .arg(&options.output_path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                RenderError::RendererNotFound {
                    command: command.clone(),
                    install_hint: INSTALL_HINT.to_string(),
                }
            } else {
                RenderError::RendererSpawn {
                    command: command.clone(),
                    source: e,
                }
            }
        })?;

    if !output.status.success() {
        // Whatever sits at the output path now is partial.
        remove_output(&options.output_path);
        return Err(RenderError::RendererFailed {
            command: command.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    if tokio::fs::metadata(&options.output_path).await.is_err() {
        return Err(RenderError::MissingOutput {
            path: options.output_path.clone(),
        });
    }
    Ok(())
}

fn remove_output(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %e, "Could not remove failed output");
        }
    }
}

async fn open_output(options: &RenderOptions) -> Result<(), RenderError> {
    let Some((program, args)) = options.viewer.command_for(&options.output_path) else {
        debug!("Viewer disabled");
        return Ok(());
    };

    debug!(viewer = %program, path = %options.output_path.display(), "Opening output");
    let status = Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|source| RenderError::ViewerSpawn {
            command: program.clone(),
            path: options.output_path.clone(),
            source,
        })?;

    if !status.success() {
        return Err(RenderError::ViewerFailed {
            command: program,
            path: options.output_path.clone(),
            status: status.to_string(),
        });
    }
    Ok(())
}
