//! [`BuildTool`] backed by `makepkg` and `pacman` subprocesses.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::package::SRCINFO_FILE;

use super::{BuildTool, EnvOverride};

const SYSTEM_UPGRADE: &[&str] = &["pacman", "--sync", "--refresh", "--sysupgrade", "--noconfirm"];
const PREPARE_ARGS: &[&str] = &["--nobuild", "--nodeps", "--noconfirm"];
const BUILD_ARGS: &[&str] = &["--install", "--syncdeps", "--noconfirm"];

/// Runs the real toolchain. Output of the tools is passed through to the
/// terminal.
#[derive(Debug, Clone)]
pub struct Makepkg {
    program: PathBuf,
}

impl Default for Makepkg {
    fn default() -> Self {
        Self::with_program("makepkg")
    }
}

impl Makepkg {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `makepkg` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl BuildTool for Makepkg {
    async fn refresh_environment(&self) -> Result<()> {
        run_cmd(None, &[], "sudo", SYSTEM_UPGRADE).await
    }

    async fn prepare_source(&self, dir: &Path) -> Result<()> {
        run_cmd(Some(dir), &[], &self.program, PREPARE_ARGS).await?;

        let srcinfo = capture_cmd(dir, &self.program, &["--printsrcinfo"]).await?;
        let path = dir.join(SRCINFO_FILE);
        tokio::fs::write(&path, srcinfo)
            .await
            .with_context(|| format!("Failed to write {:?}", path))
    }

    async fn build_and_install(&self, dir: &Path, env: &[EnvOverride]) -> Result<()> {
        run_cmd(Some(dir), env, &self.program, BUILD_ARGS).await
    }
}

fn command<S: AsRef<OsStr>>(dir: Option<&Path>, program: impl AsRef<OsStr>, args: &[S]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }
    cmd
}

fn describe<S: AsRef<OsStr>>(program: impl AsRef<OsStr>, args: &[S]) -> String {
    std::iter::once(program.as_ref())
        .chain(args.iter().map(AsRef::as_ref))
        .map(|s| s.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command to completion, inheriting stdio.
#[tracing::instrument(skip(env, program, args), fields(cmd = %describe(&program, args)))]
pub(crate) async fn run_cmd<S: AsRef<OsStr>>(
    dir: Option<&Path>,
    env: &[EnvOverride],
    program: impl AsRef<OsStr>,
    args: &[S],
) -> Result<()> {
    let description = describe(&program, args);
    debug!("Running `{}`", description);

    let mut cmd = command(dir, program, args);
    for var in env {
        cmd.env(&var.key, &var.value);
    }

    let status = cmd
        .status()
        .await
        .with_context(|| format!("Failed to execute `{}`", description))?;

    if !status.success() {
        anyhow::bail!("`{}` failed with {}", description, status);
    }
    Ok(())
}

/// Run a command to completion and return its stdout.
#[tracing::instrument(skip(program, args), fields(cmd = %describe(&program, args)))]
pub(crate) async fn capture_cmd<S: AsRef<OsStr>>(
    dir: &Path,
    program: impl AsRef<OsStr>,
    args: &[S],
) -> Result<Vec<u8>> {
    let description = describe(&program, args);
    debug!("Running `{}`", description);

    let output = command(Some(dir), program, args)
        .stderr(Stdio::inherit())
        .output()
        .await
        .with_context(|| format!("Failed to execute `{}`", description))?;

    if !output.status.success() {
        anyhow::bail!("`{}` failed with {}", description, output.status);
    }
    Ok(output.stdout)
}
