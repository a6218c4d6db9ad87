//! External process invocation helpers.
//!
//! Every build stage is a blocking call to an external tool. `Cmd` is a thin
//! builder over [`std::process::Command`] that captures output so failures can
//! surface the tool's own diagnostics verbatim.

use anyhow::{bail, Context, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;

/// Builder for an external command invocation.
pub struct Cmd {
    program: PathBuf,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    error_msg: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            error_msg: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Message used as the error prefix when `run()` fails.
    pub fn error_msg(mut self, msg: impl Into<String>) -> Self {
        self.error_msg = Some(msg.into());
        self
    }

    /// Run the command with captured stdout/stderr.
    ///
    /// Returns the raw [`Output`] regardless of exit status; the caller
    /// decides how to interpret a non-zero exit. Spawn failures (program
    /// missing, not executable) come back as the raw `io::Error`.
    pub fn output(self) -> std::io::Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.output()
    }

    /// Run the command, failing with captured diagnostics on non-zero exit.
    pub fn run(self) -> Result<()> {
        let program = self.program.clone();
        let msg = self
            .error_msg
            .clone()
            .unwrap_or_else(|| format!("{} failed", program.display()));

        let output = self
            .output()
            .with_context(|| format!("failed to execute {}", program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{}\n  Exit code: {}\n  stderr: {}",
                msg,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }

        Ok(())
    }

    /// Run the command, streaming its output to the parent's stdio line by
    /// line while also capturing it.
    ///
    /// For long builds: progress stays visible as it happens, and a failure
    /// can still surface the full transcript. Returns the exit status and the
    /// combined stdout/stderr text.
    pub fn stream(self) -> std::io::Result<(ExitStatus, String)> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let out_thread = thread::spawn(move || match stdout {
            Some(pipe) => tee(pipe, std::io::stdout()),
            None => String::new(),
        });
        let err_thread = thread::spawn(move || match stderr {
            Some(pipe) => tee(pipe, std::io::stderr()),
            None => String::new(),
        });

        let status = child.wait()?;
        let stdout_text = out_thread.join().unwrap_or_default();
        let stderr_text = err_thread.join().unwrap_or_default();

        Ok((status, combine_streams(&stdout_text, &stderr_text)))
    }

    /// Run the command with null stdio, observing only the exit status.
    pub fn status_only(self) -> std::io::Result<ExitStatus> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
    }
}

/// Fail with a descriptive error if `path` does not exist.
pub fn ensure_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} not found at: {}", what, path.display());
    }
    Ok(())
}

/// Copy lines from a child pipe to `sink` while accumulating them.
fn tee(reader: impl Read, mut sink: impl Write) -> String {
    let mut captured = String::new();
    for line in BufReader::new(reader).lines() {
        let Ok(line) = line else { break };
        let _ = writeln!(sink, "{}", line);
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}

fn combine_streams(stdout: &str, stderr: &str) -> String {
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (true, _) => stderr.to_string(),
        (_, true) => stdout.to_string(),
        (false, false) => format!("{}{}", stdout, stderr),
    }
}

/// Combine captured stdout and stderr into one diagnostic string.
///
/// Build tools split their complaints across both streams; the host wants the
/// whole transcript, untouched apart from joining the two.
pub fn diagnostics_from(output: &Output) -> String {
    combine_streams(
        &String::from_utf8_lossy(&output.stdout),
        &String::from_utf8_lossy(&output.stderr),
    )
}
