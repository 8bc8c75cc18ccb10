//! Mock container runtime for testing
//! In-memory implementation that records every call and replays scripted
//! exec output, so scan-flow tests need no container engine

use crate::domain::{DomainError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::{ContainerId, ContainerRuntime, ContainerSpec, ExecCompletion, FrameSender, OutputFrame};

/// Scripted response for a foreground or detached exec, matched on argv[0].
#[derive(Debug, Clone)]
pub struct ExecScript {
    pub command: String,
    pub frames: Vec<OutputFrame>,
    pub exit_code: i64,
}

#[derive(Default)]
struct State {
    created: Vec<ContainerSpec>,
    copies: Vec<(PathBuf, String)>,
    execs: Vec<Vec<String>>,
    detached_execs: Vec<Vec<String>>,
    stops: Vec<(ContainerId, u32)>,
    scripts: Vec<ExecScript>,
    fail_exec_commands: Vec<String>,
    fail_stop: bool,
    complete_detached: bool,
    // Senders parked here never fire, forcing the drain timeout path.
    held_completions: Vec<ExecCompletion>,
}

/// In-memory mock runtime for testing.
#[derive(Clone)]
pub struct MockRuntime {
    state: Arc<Mutex<State>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                complete_detached: true,
                ..State::default()
            })),
        }
    }

    /// Replay the given frames and exit code when `command` (argv[0]) runs.
    /// Unscripted commands produce no output and exit 0.
    pub fn script_exec(&self, command: impl Into<String>, frames: Vec<OutputFrame>, exit_code: i64) {
        self.state.lock().unwrap().scripts.push(ExecScript {
            command: command.into(),
            frames,
            exit_code,
        });
    }

    /// Make `exec` of the given command fail with a container error.
    pub fn fail_exec(&self, command: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .fail_exec_commands
            .push(command.into());
    }

    /// Make `stop` fail with a container error.
    pub fn fail_stop(&self) {
        self.state.lock().unwrap().fail_stop = true;
    }

    /// When false, detached execs never signal completion, so the caller's
    /// drain wait must hit its timeout.
    pub fn set_complete_detached(&self, complete: bool) {
        self.state.lock().unwrap().complete_detached = complete;
    }

    pub fn created(&self) -> Vec<ContainerSpec> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn copies(&self) -> Vec<(PathBuf, String)> {
        self.state.lock().unwrap().copies.clone()
    }

    pub fn exec_history(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().execs.clone()
    }

    pub fn detached_exec_history(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().detached_execs.clone()
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().unwrap().stops.len()
    }

    fn script_for(&self, argv: &[String]) -> Option<ExecScript> {
        let state = self.state.lock().unwrap();
        argv.first().and_then(|command| {
            state
                .scripts
                .iter()
                .find(|s| &s.command == command)
                .cloned()
        })
    }
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn create(&self, spec: ContainerSpec) -> Result<ContainerId> {
        let mut state = self.state.lock().unwrap();
        state.created.push(spec);
        Ok(ContainerId::new(format!("mock-{}", state.created.len())))
    }

    async fn copy_into(
        &self,
        _id: &ContainerId,
        host_path: &Path,
        container_dir: &str,
    ) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .copies
            .push((host_path.to_path_buf(), container_dir.to_string()));
        Ok(())
    }

    async fn attach_output(&self, _id: &ContainerId, _frames: FrameSender) -> Result<()> {
        Ok(())
    }

    async fn exec<'a>(
        &self,
        _id: &ContainerId,
        argv: &[String],
        _env: Option<&'a [String]>,
        frames: FrameSender,
    ) -> Result<i64> {
        {
            let mut state = self.state.lock().unwrap();
            state.execs.push(argv.to_vec());
            if argv
                .first()
                .map(|c| state.fail_exec_commands.contains(c))
                .unwrap_or(false)
            {
                return Err(DomainError::ContainerOperation(format!(
                    "exec failed: {}",
                    argv.join(" ")
                )));
            }
        }

        match self.script_for(argv) {
            Some(script) => {
                for frame in script.frames {
                    let _ = frames.send(frame);
                }
                Ok(script.exit_code)
            }
            None => Ok(0),
        }
    }

    async fn exec_detached<'a>(
        &self,
        _id: &ContainerId,
        argv: &[String],
        _env: Option<&'a [String]>,
        frames: FrameSender,
        completion: ExecCompletion,
    ) -> Result<()> {
        self.state.lock().unwrap().detached_execs.push(argv.to_vec());

        let exit_code = match self.script_for(argv) {
            Some(script) => {
                for frame in script.frames {
                    let _ = frames.send(frame);
                }
                script.exit_code
            }
            None => 0,
        };

        let mut state = self.state.lock().unwrap();
        if state.complete_detached {
            let _ = completion.send(exit_code);
        } else {
            state.held_completions.push(completion);
        }
        Ok(())
    }

    async fn stop(&self, id: &ContainerId, grace_seconds: u32) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.stops.push((id.clone(), grace_seconds));
        if state.fail_stop {
            return Err(DomainError::ContainerOperation("stop failed".to_string()));
        }
        Ok(())
    }
}
