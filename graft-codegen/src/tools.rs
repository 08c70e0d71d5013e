//! External formatter and linter.

use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::ToolError;

const PATH_PLACEHOLDER: &str = "{path}";

/// Source post-processing used by staging and finalizing.
pub trait SourceTools: Send + Sync {
    /// Format `content` that will be written to `path`.
    fn format(&self, content: &str, path: &Path) -> Result<String>;

    /// Apply lint fixes to the file at `path` in place.
    fn lint_fix(&self, path: &Path) -> Result<()>;
}

/// Tools that leave content and files untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTools;

impl SourceTools for NoopTools {
    fn format(&self, content: &str, _path: &Path) -> Result<String> {
        Ok(content.to_string())
    }

    fn lint_fix(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Tools backed by external commands.
///
/// Each command is an argv; `{path}` in any argument is replaced with the
/// file path. The formatter receives content on stdin and must print the
/// formatted content on stdout. An empty argv disables that tool.
#[derive(Debug, Clone, Default)]
pub struct CommandTools {
    format: Vec<String>,
    lint_fix: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandTools {
    pub fn new(format: Vec<String>, lint_fix: Vec<String>) -> Self {
        Self {
            format,
            lint_fix,
            current_dir: None,
        }
    }

    /// Run the commands from `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn command(&self, tool: &'static str, argv: &[String], path: &Path) -> Result<Command> {
        let Some((program, args)) = argv.split_first() else {
            return Err(eyre::eyre!("no {} command configured", tool));
        };
        let path = path.display().to_string();
        let mut command = Command::new(program);
        command.args(args.iter().map(|a| a.replace(PATH_PLACEHOLDER, &path)));
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        Ok(command)
    }
}

impl SourceTools for CommandTools {
    fn format(&self, content: &str, path: &Path) -> Result<String> {
        if self.format.is_empty() {
            return Ok(content.to_string());
        }
        debug!(path = %path.display(), "formatting");

        let mut child = self
            .command("formatter", &self.format, path)?
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                tool: "formatter",
                program: self.format[0].clone(),
                source,
            })?;

        // Feed stdin from another thread so a large output cannot block the writer
        let input = content.to_string();
        let stdin = child.stdin.take();
        let writer = std::thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(input.as_bytes())?;
            }
            Ok(())
        });

        let output = child
            .wait_with_output()
            .wrap_err("failed to wait for formatter")?;
        let written = writer
            .join()
            .map_err(|_| eyre::eyre!("formatter input thread panicked"))?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: "formatter",
                path: path.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        written.wrap_err("failed to write to formatter")?;

        String::from_utf8(output.stdout).wrap_err("formatter produced invalid UTF-8")
    }

    fn lint_fix(&self, path: &Path) -> Result<()> {
        if self.lint_fix.is_empty() {
            return Ok(());
        }
        debug!(path = %path.display(), "lint fix");

        let output = self
            .command("linter", &self.lint_fix, path)?
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ToolError::Spawn {
                tool: "linter",
                program: self.lint_fix[0].clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: "linter",
                path: path.to_path_buf(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(())
    }
}
