//! Docker CLI container runtime
//! Real implementation of the ContainerRuntime port driving the `docker`
//! command line with tokio child processes

use crate::domain::ports::{
    ContainerId, ContainerRuntime, ContainerSpec, ExecCompletion, FrameSender, OutputFrame,
    StreamKind,
};
use crate::domain::{DomainError, Result};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Drives a local docker daemon through the `docker` binary. Each port
/// operation maps onto one CLI invocation; output streaming uses piped
/// stdout/stderr with a line-reader task per stream.
pub struct DockerCliRuntime {
    binary: String,
}

impl DockerCliRuntime {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }

    /// Use a different engine CLI (e.g. `podman`).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run a docker command to completion, failing on a non-zero exit.
    async fn run(&self, args: &[String]) -> Result<std::process::Output> {
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::ContainerOperation(format!(
                    "Failed to run `{} {}`: {}",
                    self.binary,
                    args.join(" "),
                    e
                ))
            })?;

        if !output.status.success() {
            return Err(DomainError::ContainerOperation(format!(
                "`{} {}` failed with exit code {}: {}",
                self.binary,
                args.join(" "),
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(output)
    }

    /// Spawn a docker command with piped output and a line-reader task per
    /// stream, forwarding each line as one frame.
    fn spawn_streaming(
        &self,
        args: Vec<String>,
        frames: FrameSender,
    ) -> Result<(Child, JoinHandle<()>, JoinHandle<()>)> {
        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                DomainError::ContainerOperation(format!(
                    "Failed to spawn `{} {}`: {}",
                    self.binary,
                    args.join(" "),
                    e
                ))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DomainError::ContainerOperation("Child process has no stdout pipe".to_string())
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            DomainError::ContainerOperation("Child process has no stderr pipe".to_string())
        })?;

        let out_reader = spawn_line_reader(StreamKind::Stdout, stdout, frames.clone());
        let err_reader = spawn_line_reader(StreamKind::Stderr, stderr, frames);
        Ok((child, out_reader, err_reader))
    }

    fn exec_args(id: &ContainerId, argv: &[String], env: Option<&[String]>) -> Vec<String> {
        let mut args = vec!["exec".to_string()];
        if let Some(env) = env {
            for entry in env {
                args.push("-e".to_string());
                args.push(entry.clone());
            }
        }
        args.push(id.as_str().to_string());
        args.extend(argv.iter().cloned());
        args
    }
}

impl Default for DockerCliRuntime {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward lines from one child stream into the frame channel. Stops when
/// the stream ends or the receiving side goes away.
fn spawn_line_reader(
    stream: StreamKind,
    reader: impl AsyncRead + Unpin + Send + 'static,
    frames: FrameSender,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if frames.send(OutputFrame { stream, text: line }).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Error reading container output stream");
                    break;
                }
            }
        }
    })
}

#[async_trait]
impl ContainerRuntime for DockerCliRuntime {
    async fn create(&self, spec: ContainerSpec) -> Result<ContainerId> {
        let mut args = vec!["create".to_string()];
        let mut entrypoint = spec.entrypoint.iter();
        if let Some(first) = entrypoint.next() {
            args.push("--entrypoint".to_string());
            args.push(first.clone());
        }
        for entry in &spec.env {
            args.push("-e".to_string());
            args.push(entry.clone());
        }
        if let Some(user) = &spec.user {
            args.push("--user".to_string());
            args.push(user.clone());
        }
        for mount in &spec.bind_mounts {
            args.push("-v".to_string());
            args.push(mount.clone());
        }
        args.push(spec.image.clone());
        // Remaining entrypoint words become the container command.
        args.extend(entrypoint.cloned());

        let output = self.run(&args).await?;
        let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if id.is_empty() {
            return Err(DomainError::ContainerOperation(
                "docker create produced no container id".to_string(),
            ));
        }

        self.run(&["start".to_string(), id.clone()]).await?;
        debug!(container = %id, image = %spec.image, "Created and started scan container");
        Ok(ContainerId::new(id))
    }

    async fn copy_into(
        &self,
        id: &ContainerId,
        host_path: &Path,
        container_dir: &str,
    ) -> Result<()> {
        let args = vec![
            "cp".to_string(),
            host_path.display().to_string(),
            format!("{}:{}", id.as_str(), container_dir),
        ];
        self.run(&args).await?;
        Ok(())
    }

    async fn attach_output(&self, id: &ContainerId, frames: FrameSender) -> Result<()> {
        let args = vec!["logs".to_string(), "-f".to_string(), id.as_str().to_string()];
        let (mut child, out_reader, err_reader) = self.spawn_streaming(args, frames)?;

        // Runs for the container's lifetime; reap it in the background.
        tokio::spawn(async move {
            let _ = out_reader.await;
            let _ = err_reader.await;
            if let Err(e) = child.wait().await {
                warn!(error = %e, "Failed to reap container log follower");
            }
        });
        Ok(())
    }

    async fn exec<'a>(
        &self,
        id: &ContainerId,
        argv: &[String],
        env: Option<&'a [String]>,
        frames: FrameSender,
    ) -> Result<i64> {
        let args = Self::exec_args(id, argv, env);
        let (mut child, out_reader, err_reader) = self.spawn_streaming(args, frames)?;

        let status = child.wait().await.map_err(|e| {
            DomainError::ContainerOperation(format!("Failed to wait for exec: {}", e))
        })?;
        // Flush both readers so every produced line was forwarded before the
        // exit code is reported.
        let _ = out_reader.await;
        let _ = err_reader.await;

        Ok(i64::from(status.code().unwrap_or(-1)))
    }

    async fn exec_detached<'a>(
        &self,
        id: &ContainerId,
        argv: &[String],
        env: Option<&'a [String]>,
        frames: FrameSender,
        completion: ExecCompletion,
    ) -> Result<()> {
        let args = Self::exec_args(id, argv, env);
        let (mut child, out_reader, err_reader) = self.spawn_streaming(args, frames)?;

        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => i64::from(status.code().unwrap_or(-1)),
                Err(e) => {
                    warn!(error = %e, "Failed to wait for detached exec");
                    -1
                }
            };
            let _ = out_reader.await;
            let _ = err_reader.await;
            // Receiver may have timed out its drain wait already.
            let _ = completion.send(code);
        });
        Ok(())
    }

    async fn stop(&self, id: &ContainerId, grace_seconds: u32) -> Result<()> {
        let args = vec![
            "stop".to_string(),
            "-t".to_string(),
            grace_seconds.to_string(),
            id.as_str().to_string(),
        ];
        self.run(&args).await?;
        debug!(container = %id, "Stopped scan container");
        Ok(())
    }
}
