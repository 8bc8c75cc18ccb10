//! Output demultiplexer
//! Splits raw output frames into lines and routes them to the right sink:
//! the info log, the JSON report buffer or the error buffer

use crate::domain::ports::{OutputFrame, StreamKind};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shell-trace prefix some scan tool versions leak into stdout (`set -x`).
const TRACE_PREFIX: &str = "+ ";

/// The two output buffers accumulated during a scan. Append-only while the
/// scan runs; read only after the drain phase, once all writers are done.
#[derive(Default)]
pub struct ScanOutputBuffers {
    json: Mutex<String>,
    error: Mutex<String>,
}

impl ScanOutputBuffers {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn append_json(&self, text: &str) {
        self.json.lock().unwrap().push_str(text);
    }

    fn append_error(&self, text: &str) {
        self.error.lock().unwrap().push_str(text);
    }

    pub fn json_output(&self) -> String {
        self.json.lock().unwrap().clone()
    }

    pub fn error_output(&self) -> String {
        self.error.lock().unwrap().clone()
    }
}

/// Routes frames from one scan session into the shared buffers.
#[derive(Clone)]
pub struct OutputRouter {
    buffers: Arc<ScanOutputBuffers>,
}

impl OutputRouter {
    pub fn new(buffers: Arc<ScanOutputBuffers>) -> Self {
        Self { buffers }
    }

    /// Info channel: every line goes to the log, nothing is buffered.
    pub fn route_info(frame: &OutputFrame) {
        for line in frame_lines(&frame.text) {
            info!("{}", line);
        }
    }

    /// Scan channel: stdout is the JSON report (minus leaked trace lines),
    /// stderr accumulates verbatim.
    pub fn route_scan(&self, frame: &OutputFrame) {
        match frame.stream {
            StreamKind::Stdout => self.route_scan_stdout(&frame.text),
            StreamKind::Stderr => self.route_scan_stderr(&frame.text),
        }
    }

    fn route_scan_stdout(&self, text: &str) {
        for line in frame_lines(text) {
            if line.starts_with(TRACE_PREFIX) {
                error!(line = %line, "Filtered out spurious JSON output line");
                self.buffers.append_error(&format!("{}\n", line));
            } else {
                self.buffers.append_json(line);
            }
        }
    }

    fn route_scan_stderr(&self, text: &str) {
        for line in frame_lines(text) {
            self.buffers.append_error(&format!("{}\n", line));
        }
    }
}

/// Split a frame into lines on `\n` or `\r`, dropping trailing empty
/// segments so a terminating newline does not produce a phantom line.
fn frame_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split(['\n', '\r']).collect();
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines
}

/// Consume the info channel on a dedicated task, logging each frame.
pub fn spawn_info_consumer(mut rx: mpsc::UnboundedReceiver<OutputFrame>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            OutputRouter::route_info(&frame);
        }
    })
}

/// Consume the scan channel on a dedicated task, writing the buffers.
/// The task ends when every sender is dropped; awaiting it guarantees the
/// buffers have quiesced.
pub fn spawn_scan_consumer(
    router: OutputRouter,
    mut rx: mpsc::UnboundedReceiver<OutputFrame>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            router.route_scan(&frame);
        }
    })
}
