//! Frame information for the host's status display.
//!
//! The host owns rendering. It calls a registered [`StatusExtension`] from its
//! own status hook and prints whatever the extension writes.

use std::fmt;

use crate::config::StatusSection;
use crate::frame::{Binding, FrameType};
use crate::registry::ThreadLocalRegistry;
use crate::session::SessionId;

/// Cursor position of a session's active frame manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatus {
    /// Current frame index.
    pub index: usize,
    /// Highest valid index.
    pub last_index: usize,
    pub frame_type: Option<FrameType>,
}

impl FrameStatus {
    /// Read the status of the session's active manager, if it has one.
    pub fn query(session: SessionId) -> Option<Self> {
        ThreadLocalRegistry::with_frame_manager(session, |fm| Self {
            index: fm.binding_index(),
            last_index: fm.len() - 1,
            frame_type: fm.current_frame().frame_type(),
        })
    }
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame number: {}/{}", self.index, self.last_index)?;
        if let Some(frame_type) = self.frame_type {
            write!(f, "\nFrame type: {}", frame_type)?;
        }
        Ok(())
    }
}

/// Extension point invoked by the host before it renders status output.
pub trait StatusExtension {
    /// Write extra status lines for `session`, evaluating in `target`.
    fn before_status(
        &self,
        session: SessionId,
        target: &Binding,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result;
}

/// Adds frame number and type to the status display.
pub struct StackStatusExtension {
    show_frame_type: bool,
    is_internal: Box<dyn Fn(&Binding) -> bool>,
}

impl StackStatusExtension {
    pub fn new(config: &StatusSection) -> Self {
        Self {
            show_frame_type: config.show_frame_type,
            is_internal: Box::new(|_| false),
        }
    }

    /// Suppress output while the host is evaluating in one of its own
    /// bindings.
    pub fn with_internal_filter<F>(mut self, is_internal: F) -> Self
    where
        F: Fn(&Binding) -> bool + 'static,
    {
        self.is_internal = Box::new(is_internal);
        self
    }
}

impl Default for StackStatusExtension {
    fn default() -> Self {
        Self::new(&StatusSection::default())
    }
}

impl StatusExtension for StackStatusExtension {
    fn before_status(
        &self,
        session: SessionId,
        target: &Binding,
        out: &mut dyn fmt::Write,
    ) -> fmt::Result {
        if (self.is_internal)(target) {
            return Ok(());
        }

        let Some(mut status) = FrameStatus::query(session) else {
            return Ok(());
        };
        if !self.show_frame_type {
            status.frame_type = None;
        }
        writeln!(out)?;
        writeln!(out, "{}", status)
    }
}
