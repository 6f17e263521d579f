//! Captured call-stack frames.
//!
//! A frame pairs a [`Binding`] with where it was captured and what kind of
//! scope it is. Frames are produced in bulk by a [`SnapshotProvider`],
//! innermost first, and never change afterwards.

mod binding;
mod snapshot;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use binding::{bindings_equal, Binding, Local, ObjectId};
pub use snapshot::{FrameRecord, JsonSnapshotProvider, SnapshotProvider};

/// Classification of the scope a frame was captured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameType {
    Method,
    Block,
    Class,
    Eval,
    Main,
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameType::Method => "method",
            FrameType::Block => "block",
            FrameType::Class => "class",
            FrameType::Eval => "eval",
            FrameType::Main => "main",
        };
        f.write_str(name)
    }
}

/// File and line a frame was executing at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One captured level of a call stack.
///
/// Equality is the structural [`bindings_equal`] comparison of the contexts;
/// frame type and location do not take part.
#[derive(Debug, Clone)]
pub struct ExecutionFrame {
    context: Binding,
    frame_type: Option<FrameType>,
    location: SourceLocation,
}

impl ExecutionFrame {
    pub fn new(context: Binding, frame_type: Option<FrameType>, location: SourceLocation) -> Self {
        Self {
            context,
            frame_type,
            location,
        }
    }

    pub fn context(&self) -> &Binding {
        &self.context
    }

    pub fn frame_type(&self) -> Option<FrameType> {
        self.frame_type
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl PartialEq for ExecutionFrame {
    fn eq(&self, other: &Self) -> bool {
        bindings_equal(&self.context, &other.context)
    }
}

/// The diagnostic trace shown for a session's current position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Backtrace(Vec<SourceLocation>);

impl Backtrace {
    pub fn new(locations: Vec<SourceLocation>) -> Self {
        Self(locations)
    }

    /// Trace as seen from `frames[depth]` outwards.
    pub fn from_frames(frames: &[ExecutionFrame], depth: usize) -> Self {
        Self(
            frames
                .iter()
                .skip(depth)
                .map(|frame| frame.location.clone())
                .collect(),
        )
    }

    pub fn locations(&self) -> &[SourceLocation] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, location) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", location)?;
        }
        Ok(())
    }
}
