//! Session lifecycle glue.
//!
//! The host calls [`LifecycleBridge::session_started`] from its "session
//! started" hook and [`LifecycleBridge::session_ended`] from its "session
//! ended" hook.

use tracing::{debug, warn};

use crate::config::ExplorerSection;
use crate::error::StackExplorerError;
use crate::frame::{bindings_equal, Binding, ExecutionFrame, SnapshotProvider};
use crate::registry::ThreadLocalRegistry;
use crate::session::DebugSession;
use crate::stack::PushOptions;
use crate::Result;

/// Where the frames for a starting session come from.
#[derive(Debug, Clone, Default)]
pub enum CallStack {
    /// Capture the caller chain through the snapshot provider.
    #[default]
    Capture,
    /// Use frames supplied by the host.
    Explicit(Vec<ExecutionFrame>),
    /// Start without a frame manager.
    Disabled,
}

/// Per-start options passed by the host.
#[derive(Debug, Clone, Default)]
pub struct StartOptions {
    pub call_stack: CallStack,
    /// Frame to start on. Captured stacks fall back to the configured
    /// default, explicit ones to 0.
    pub initial_frame: Option<usize>,
}

impl StartOptions {
    pub fn explicit(frames: Vec<ExecutionFrame>) -> Self {
        Self {
            call_stack: CallStack::Explicit(frames),
            initial_frame: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            call_stack: CallStack::Disabled,
            initial_frame: None,
        }
    }

    pub fn with_initial_frame(mut self, index: usize) -> Self {
        self.initial_frame = Some(index);
        self
    }
}

/// Reacts to host session start and end events.
pub struct LifecycleBridge<P> {
    provider: P,
    config: ExplorerSection,
}

impl<P: SnapshotProvider> LifecycleBridge<P> {
    pub fn new(provider: P, config: &ExplorerSection) -> Self {
        Self {
            provider,
            config: config.clone(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Seed a frame manager for a session that just started evaluating in
    /// `target`. Returns whether one was pushed.
    pub fn session_started<S>(
        &self,
        session: &mut S,
        target: &Binding,
        options: StartOptions,
    ) -> Result<bool>
    where
        S: DebugSession + ?Sized,
    {
        let (frames, initial_frame) = match options.call_stack {
            CallStack::Disabled => return Ok(false),
            CallStack::Explicit(frames) => {
                if frames.is_empty() {
                    return Err(StackExplorerError::InvalidCallStack(
                        "explicit call stack has no frames".into(),
                    ));
                }
                (frames, options.initial_frame.unwrap_or(0))
            }
            CallStack::Capture => {
                if !self.config.capture_on_start {
                    return Ok(false);
                }
                let frames = self.caller_frames(target);
                if frames.is_empty() {
                    warn!(session = %session.id(), "no navigable frames captured");
                    return Ok(false);
                }
                (
                    frames,
                    options.initial_frame.unwrap_or(self.config.initial_frame),
                )
            }
        };

        let fm = ThreadLocalRegistry::create_and_push_frame_manager(
            frames,
            session,
            PushOptions::initial_frame(initial_frame),
        )?;
        debug!(
            session = %session.id(),
            frames = fm.len(),
            initial_frame,
            "seeded frame manager on session start"
        );
        Ok(true)
    }

    /// Tear down every frame manager of an ending session.
    pub fn session_ended<S>(&self, session: &mut S)
    where
        S: DebugSession + ?Sized,
    {
        let depth = ThreadLocalRegistry::depth(session.id());
        ThreadLocalRegistry::clear_frame_managers(session);
        debug!(session = %session.id(), depth, "cleared frame managers on session end");
    }

    /// Captured caller chain of `target` with host-internal frames removed.
    ///
    /// When the innermost frame is structurally equal to `target`, its
    /// context is swapped for the live `target` handle. Any other capture is
    /// kept as is.
    pub fn caller_frames(&self, target: &Binding) -> Vec<ExecutionFrame> {
        let mut frames: Vec<ExecutionFrame> = self
            .provider
            .capture(target)
            .into_iter()
            .filter(|frame| !self.provider.is_internal(frame))
            .collect();

        if let Some(first) = frames.first_mut() {
            if bindings_equal(target, first.context()) {
                *first = ExecutionFrame::new(
                    target.clone(),
                    first.frame_type(),
                    first.location().clone(),
                );
            }
        }
        frames
    }
}
