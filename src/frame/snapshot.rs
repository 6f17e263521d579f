//! Snapshot providers: where captured frames come from.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Binding, ExecutionFrame, FrameType, Local, ObjectId, SourceLocation};
use crate::Result;

/// Captures the call chain leading to a starting context.
///
/// Frames are returned innermost first. How the capture happens is up to the
/// host.
pub trait SnapshotProvider {
    /// Capture the frames reachable from `target`.
    fn capture(&self, target: &Binding) -> Vec<ExecutionFrame>;

    /// Whether a frame belongs to the debugging host itself and should be
    /// hidden from navigation.
    fn is_internal(&self, _frame: &ExecutionFrame) -> bool {
        false
    }
}

impl<F> SnapshotProvider for F
where
    F: Fn(&Binding) -> Vec<ExecutionFrame>,
{
    fn capture(&self, target: &Binding) -> Vec<ExecutionFrame> {
        self(target)
    }
}

/// Serialized form of one captured frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub receiver: ObjectId,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub locals: Vec<Local>,
    #[serde(default)]
    pub frame_type: Option<FrameType>,
    pub file: String,
    pub line: u32,
    /// Frame belongs to the debugging host.
    #[serde(default)]
    pub internal: bool,
}

impl From<FrameRecord> for ExecutionFrame {
    fn from(record: FrameRecord) -> Self {
        ExecutionFrame::new(
            Binding::new(record.receiver, record.method, record.locals),
            record.frame_type,
            SourceLocation::new(record.file, record.line),
        )
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    frames: Vec<FrameRecord>,
}

/// Replays a call stack recorded as JSON.
///
/// ```json
/// { "frames": [ { "receiver": 1, "method": "run", "frame_type": "method",
///                 "file": "app.rb", "line": 12 } ] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonSnapshotProvider {
    frames: Vec<ExecutionFrame>,
    internal: Vec<Binding>,
}

impl JsonSnapshotProvider {
    /// Load a snapshot file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a snapshot document.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(json)?;
        let mut provider = Self::default();

        for record in file.frames {
            let internal = record.internal;
            let frame = ExecutionFrame::from(record);
            if internal {
                provider.internal.push(frame.context().clone());
            }
            provider.frames.push(frame);
        }

        tracing::debug!(
            frames = provider.frames.len(),
            internal = provider.internal.len(),
            "loaded call stack snapshot"
        );
        Ok(provider)
    }

    /// The recorded frames, innermost first.
    pub fn frames(&self) -> &[ExecutionFrame] {
        &self.frames
    }

    /// Context of the innermost recorded frame, the natural start target.
    pub fn innermost(&self) -> Option<&Binding> {
        self.frames.first().map(ExecutionFrame::context)
    }
}

impl SnapshotProvider for JsonSnapshotProvider {
    fn capture(&self, _target: &Binding) -> Vec<ExecutionFrame> {
        self.frames.clone()
    }

    fn is_internal(&self, frame: &ExecutionFrame) -> bool {
        self.internal
            .iter()
            .any(|binding| binding.same_handle(frame.context()))
    }
}
