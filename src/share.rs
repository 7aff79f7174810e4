//! Result sharing
//!
//! A configured share command is tried first. Without one, the text goes to
//! the first clipboard tool found on `PATH`.

use crate::models::Config;
use crate::{AppError, Result};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Somewhere result text can be sent
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Short name for messages
    fn name(&self) -> &str;

    async fn is_available(&self) -> bool;

    async fn export(&self, text: &str) -> Result<()>;
}

/// External program that receives the text on stdin
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTarget {
    program: String,
    args: Vec<String>,
}

impl CommandTarget {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Split a command line on whitespace. No shell quoting is applied.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next()?.to_string();
        Some(Self {
            program,
            args: parts.map(String::from).collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn pipe(&self, text: &str) -> anyhow::Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start {}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .with_context(|| format!("failed to write to {}", self.program))?;
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("failed to wait for {}", self.program))?;
        anyhow::ensure!(status.success(), "{} exited with {}", self.program, status);
        Ok(())
    }
}

#[async_trait]
impl ShareTarget for CommandTarget {
    fn name(&self) -> &str {
        &self.program
    }

    async fn is_available(&self) -> bool {
        find_executable(&self.program).is_some()
    }

    async fn export(&self, text: &str) -> Result<()> {
        self.pipe(text)
            .await
            .map_err(|e| AppError::share(format!("{:#}", e)))
    }
}

/// Resolve a program name the way a shell would
fn find_executable(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let full = dir.join(program);
        if full.is_file() {
            return Some(full);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{}.exe", program));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

/// Clipboard tools for the current platform, in preference order
pub fn platform_clipboards() -> Vec<CommandTarget> {
    if cfg!(target_os = "macos") {
        vec![CommandTarget::new("pbcopy", &[])]
    } else if cfg!(windows) {
        vec![CommandTarget::new("clip", &[])]
    } else {
        let mut tools = Vec::new();
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            tools.push(CommandTarget::new("wl-copy", &[]));
        }
        tools.push(CommandTarget::new("xclip", &["-selection", "clipboard"]));
        tools.push(CommandTarget::new("xsel", &["--clipboard", "--input"]));
        tools
    }
}

/// How an export attempt ended
#[derive(Debug)]
pub enum ShareOutcome {
    /// Sent through the share command
    Shared(String),
    /// Placed on the clipboard
    Copied(String),
    /// The share command was available but failed
    ShareFailed(AppError),
    /// No share command, and no clipboard tool worked
    CopyFailed(AppError),
}

/// Share-then-clipboard export
pub struct Sharer {
    share: Option<Box<dyn ShareTarget>>,
    clipboards: Vec<Box<dyn ShareTarget>>,
}

impl Sharer {
    pub fn new(share: Option<Box<dyn ShareTarget>>, clipboards: Vec<Box<dyn ShareTarget>>) -> Self {
        Self { share, clipboards }
    }

    pub fn from_config(config: &Config) -> Self {
        let share = config
            .share_command
            .as_deref()
            .and_then(CommandTarget::parse)
            .map(|target| Box::new(target) as Box<dyn ShareTarget>);
        let clipboards = platform_clipboards()
            .into_iter()
            .map(|target| Box::new(target) as Box<dyn ShareTarget>)
            .collect();
        Self::new(share, clipboards)
    }

    pub async fn export(&self, text: &str) -> ShareOutcome {
        if let Some(share) = &self.share {
            if share.is_available().await {
                return match share.export(text).await {
                    Ok(()) => ShareOutcome::Shared(share.name().to_string()),
                    Err(e) => ShareOutcome::ShareFailed(e),
                };
            }
        }

        let mut last_error = None;
        for clipboard in &self.clipboards {
            if !clipboard.is_available().await {
                continue;
            }
            match clipboard.export(text).await {
                Ok(()) => return ShareOutcome::Copied(clipboard.name().to_string()),
                Err(e) => last_error = Some(e),
            }
        }

        ShareOutcome::CopyFailed(
            last_error.unwrap_or_else(|| AppError::share("no clipboard tool available")),
        )
    }
}
