//! ContainerRuntime port
//! Interface for creating the scan container and running exec sessions in it

use crate::domain::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use tokio::sync::{mpsc, oneshot};

#[cfg(test)]
use mockall::automock;

/// Which stream of a container process a frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One raw frame of process output. A frame may contain several lines
/// separated by `\n` or `\r`; splitting is the demultiplexer's job.
#[derive(Debug, Clone)]
pub struct OutputFrame {
    pub stream: StreamKind,
    pub text: String,
}

impl OutputFrame {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stderr,
            text: text.into(),
        }
    }
}

/// Channel end the runtime pushes output frames into. One logical stream per
/// (container session, channel) pair; the receiving side is consumed by a
/// dedicated handler task.
pub type FrameSender = mpsc::UnboundedSender<OutputFrame>;

/// Fired exactly once with the exit code when a detached exec terminates.
pub type ExecCompletion = oneshot::Sender<i64>;

/// Opaque handle to a created container. Released by exactly one `stop`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything needed to create the scan container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub image: String,
    /// Entrypoint override keeping the container alive without a scan.
    pub entrypoint: Vec<String>,
    /// `KEY=value` entries for the container environment.
    pub env: Vec<String>,
    pub user: Option<String>,
    /// `host:container` bind mount specs.
    pub bind_mounts: Vec<String>,
}

/// Port for the container engine driving one scan session.
///
/// Implementations must deliver output as it is produced (frames must not be
/// withheld until process exit) and must tolerate the receiving side of a
/// frame channel going away.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Create and start a container from the given spec.
    async fn create(&self, spec: ContainerSpec) -> Result<ContainerId>;

    /// Copy a host file into a directory inside the container.
    async fn copy_into(
        &self,
        id: &ContainerId,
        host_path: &Path,
        container_dir: &str,
    ) -> Result<()>;

    /// Stream the container's own (entrypoint) output. Returns immediately;
    /// frames keep flowing until the container stops.
    async fn attach_output(&self, id: &ContainerId, frames: FrameSender) -> Result<()>;

    /// Run a command in the container and wait for it, streaming output.
    /// Returns the command's exit code.
    async fn exec<'a>(
        &self,
        id: &ContainerId,
        argv: &[String],
        env: Option<&'a [String]>,
        frames: FrameSender,
    ) -> Result<i64>;

    /// Start a command in the container without waiting for it. The
    /// completion sender fires with the exit code when the command ends.
    async fn exec_detached<'a>(
        &self,
        id: &ContainerId,
        argv: &[String],
        env: Option<&'a [String]>,
        frames: FrameSender,
        completion: ExecCompletion,
    ) -> Result<()>;

    /// Stop the container, giving it `grace_seconds` to terminate cleanly.
    async fn stop(&self, id: &ContainerId, grace_seconds: u32) -> Result<()>;
}
