//! ExecuteScan use case
//! Drives one scan container session end to end: create the container, run
//! the in-container exec sessions, drain the background tail, classify the
//! exit code

use crate::domain::constants::{
    DOCKERFILE_MOUNTPOINT, DOCKER_SOCKET_MOUNT, DUMMY_ENTRYPOINT, MKDIR_COMMAND,
    STOP_GRACE_SECONDS, TAIL_COMMAND, TAIL_DRAIN_TIMEOUT, TOUCH_COMMAND,
};
use crate::domain::entities::ScanRequest;
use crate::domain::ports::{ContainerId, ContainerRuntime, ContainerSpec, FrameSender};
use crate::domain::services::{
    build_container_env, build_scan_args, resolve_scan_image, spawn_info_consumer,
    spawn_scan_consumer, OutputRouter, ScanOutputBuffers,
};
use crate::domain::value_objects::ScanVerdict;
use crate::domain::{DomainError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Final result of a successful scan call. `report` is the raw JSON text
/// captured from the scan tool's stdout.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub verdict: ScanVerdict,
    pub report: String,
}

/// Use case for running one inline scan.
#[async_trait]
pub trait ExecuteScan: Send + Sync {
    async fn execute(&self, request: ScanRequest) -> Result<ScanReport>;
}

/// Implementation of ExecuteScan driving an injected container runtime.
pub struct ExecuteScanUseCase {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ExecuteScanUseCase {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Everything that runs against the created container before cleanup.
    /// Errors here propagate only after the cleanup region has run.
    #[allow(clippy::too_many_arguments)]
    async fn scan_phase(
        &self,
        container: &ContainerId,
        request: &ScanRequest,
        args: &[String],
        info_tx: FrameSender,
        scan_tx: FrameSender,
        tail_done_tx: oneshot::Sender<i64>,
    ) -> Result<i64> {
        if let Some(dockerfile) = request.dockerfile() {
            debug!(
                dockerfile = %dockerfile.display(),
                dest = DOCKERFILE_MOUNTPOINT,
                "Copying Dockerfile into container"
            );
            self.runtime
                .copy_into(container, dockerfile, DOCKERFILE_MOUNTPOINT)
                .await?;
        }

        self.runtime
            .attach_output(container, info_tx.clone())
            .await?;

        // The tail starts before the log file exists; it polls, so it picks
        // the file up once the setup commands below have created it.
        let mkdir = to_argv(&MKDIR_COMMAND);
        let touch = to_argv(&TOUCH_COMMAND);
        let tail = to_argv(&TAIL_COMMAND);
        self.runtime
            .exec_detached(container, &tail, None, info_tx.clone(), tail_done_tx)
            .await?;
        self.runtime
            .exec(container, &mkdir, None, info_tx.clone())
            .await?;
        self.runtime
            .exec(container, &touch, None, info_tx)
            .await?;

        debug!(argv = ?args, "Executing scan command in container");
        self.runtime.exec(container, args, None, scan_tx).await
    }
}

#[async_trait]
impl ExecuteScan for ExecuteScanUseCase {
    async fn execute(&self, request: ScanRequest) -> Result<ScanReport> {
        let scan_id = request.id();
        let mut args = build_scan_args(&request);

        // The Dockerfile is copied into /tmp/ inside the container; the scan
        // command references it by basename at that location.
        if let Some(dockerfile) = request.dockerfile() {
            let name = dockerfile
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    DomainError::InvalidConfiguration(format!(
                        "Dockerfile path has no usable file name: {}",
                        dockerfile.display()
                    ))
                })?;
            args.push(format!("--dockerfile={}{}", DOCKERFILE_MOUNTPOINT, name));
        }
        if let Some(extra) = &request.config().extra_params {
            args.extend(extra.split_whitespace().map(|p| p.to_string()));
        }

        let container_env = build_container_env(&request);
        let image = resolve_scan_image(&request);
        debug!(
            scan = %scan_id,
            image = %image,
            env = ?container_env,
            "Creating scan container"
        );

        let spec = ContainerSpec {
            image,
            entrypoint: vec![DUMMY_ENTRYPOINT.to_string()],
            env: container_env,
            user: request.config().run_as_user.clone(),
            bind_mounts: vec![DOCKER_SOCKET_MOUNT.to_string()],
        };
        let container = self.runtime.create(spec).await?;

        let buffers = ScanOutputBuffers::new();
        let router = OutputRouter::new(buffers.clone());
        let (info_tx, info_rx) = mpsc::unbounded_channel();
        let (scan_tx, scan_rx) = mpsc::unbounded_channel();
        let (tail_done_tx, tail_done_rx) = oneshot::channel();

        // One dedicated consumer task per logical channel; the scan consumer
        // is the only writer of the output buffers.
        let _info_consumer = spawn_info_consumer(info_rx);
        let scan_consumer = spawn_scan_consumer(router, scan_rx);

        let scan_result = self
            .scan_phase(&container, &request, &args, info_tx, scan_tx, tail_done_tx)
            .await;

        // Cleanup region: runs on every path out of the scan phase. Exactly
        // one stop per scan, then a bounded wait for the tail to notice the
        // container going away.
        debug!(scan = %scan_id, container = %container, "Stopping container");
        let stop_result = self.runtime.stop(&container, STOP_GRACE_SECONDS).await;
        if let Err(e) = &stop_result {
            error!(scan = %scan_id, error = %e, "Failed to stop scan container");
        }
        match timeout(TAIL_DRAIN_TIMEOUT, tail_done_rx).await {
            Ok(Ok(exit_code)) => {
                debug!(scan = %scan_id, exit_code = exit_code, "Container tail completed")
            }
            Ok(Err(_)) => {
                debug!(scan = %scan_id, "Tail completion signal dropped before firing")
            }
            Err(_) => {
                warn!(scan = %scan_id, "Timed out waiting for container tail to complete")
            }
        }

        // All frame senders are gone once the scan phase and the runtime's
        // streams have wound down; joining the consumer guarantees the
        // buffers are stable before anyone reads them.
        if let Err(e) = scan_consumer.await {
            error!(scan = %scan_id, error = %e, "Scan output consumer task failed");
            return Err(DomainError::Interrupted(
                "scan output consumer task failed".to_string(),
            ));
        }

        if request.config().debug {
            debug!(
                "Inline-scanner verbose execution stdout output:\n{}",
                buffers.json_output()
            );
            debug!(
                "Inline-scanner verbose execution stderr output:\n{}",
                buffers.error_output()
            );
        }

        let exit_code = scan_result?;
        // The scan itself succeeded; a failed stop is the only error left.
        stop_result?;

        let verdict = ScanVerdict::from_exit_code(exit_code);
        if let ScanVerdict::ToolError(code) = verdict {
            error!(
                scan = %scan_id,
                exit_code = code,
                "Error executing the inline scanner"
            );
            if !request.config().debug {
                error!("Standard Output:\n{}", buffers.json_output());
                error!("Error Output:\n{}", buffers.error_output());
            }
            return Err(DomainError::ScanFailed { exit_code: code });
        }

        info!(
            scan = %scan_id,
            image = %request.image(),
            verdict = %verdict,
            "Inline scan finished"
        );
        Ok(ScanReport {
            verdict,
            report: buffers.json_output(),
        })
    }
}

fn to_argv(command: &[&str]) -> Vec<String> {
    command.iter().map(|s| s.to_string()).collect()
}
