#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Solutions implemented by an external program.
//!
//! The program is started once per test case. It receives
//! `{"args": [...], "kwargs": {...}}` on stdin and must print its result as a
//! single JSON value on stdout.

use std::{
    ffi::{OsStr, OsString},
    process::{Output, Stdio},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use serde_json::json;
use tokio::{
    io::AsyncWriteExt,
    process::Command,
    runtime::{Builder, Runtime},
    time::timeout,
};
use tracing::debug;

use crate::{
    client::Solution,
    value::{Map, Value, preview},
};

/// Runs an external program as a [`Solution`].
pub struct CommandSolution {
    /// Program to execute.
    program: OsString,
    /// Arguments passed on every run.
    args:    Vec<OsString>,
    /// How long one run may take.
    limit:   Duration,
    /// Single-threaded runtime driving the child process.
    runtime: Runtime,
}

impl CommandSolution {
    /// Prepares to run `program` with `args`, allowing each run `limit`.
    pub fn new<I, A>(program: impl Into<OsString>, args: I, limit: Duration) -> Result<Self>
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        let runtime = Builder::new_current_thread()
            .enable_io()
            .enable_time()
            .build()
            .context("failed to start the process runtime")?;
        Ok(Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            limit,
            runtime,
        })
    }

    /// The command line, for messages.
    fn command_line(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|part| part.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Solution for CommandSolution {
    fn call(&self, args: &[Value], kwargs: &Map<String, Value>) -> Result<Value> {
        let payload = serde_json::to_vec(&json!({ "args": args, "kwargs": kwargs }))?;
        let command = self.command_line();
        debug!(command = %command, "running external solution");

        let output = self
            .runtime
            .block_on(run_with_input(&self.program, &self.args, payload, self.limit))
            .with_context(|| format!("could not run `{command}`"))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            bail!("`{command}` exited with {}:\n{}", output.status, stderr.trim_end());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = stdout.trim();
        serde_json::from_str(text).with_context(|| {
            format!(
                "`{command}` did not print a JSON value (stdout was {})",
                preview(&Value::String(text.to_string()))
            )
        })
    }
}

/// Spawns `program`, writes `input` to its stdin, and collects its output,
/// killing it if it runs past `limit`.
async fn run_with_input(
    program: &OsStr,
    args: &[OsString],
    input: Vec<u8>,
    limit: Duration,
) -> Result<Output> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .context("failed to spawn process")?;

    if let Some(mut stdin) = child.stdin.take() {
        tokio::spawn(async move {
            let _ = stdin.write_all(&input).await;
            let _ = stdin.shutdown().await;
        });
    }

    timeout(limit, child.wait_with_output())
        .await
        .with_context(|| format!("timed out after {}s", limit.as_secs_f64()))?
        .context("failed to wait on process")
}
