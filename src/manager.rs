//! Frame manager: one navigation episode over a captured call stack.

use tracing::trace;

use crate::error::StackExplorerError;
use crate::frame::{Backtrace, Binding, ExecutionFrame};
use crate::session::{replace_top, DebugSession, SessionId};
use crate::Result;

/// Direction of a frame search relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards callers (higher indices).
    Up,
    /// Towards callees (lower indices).
    Down,
}

/// Governs one ordered sequence of frames and a cursor into it.
///
/// Index 0 is the innermost frame. The binding and backtrace the session had
/// when the manager was created are kept so they can be put back when the
/// manager is popped.
///
/// Navigation goes through the manager owned by the registry; callers only
/// ever see a [`FrameManagerSnapshot`] of it.
#[derive(Debug)]
pub struct FrameManager {
    session: SessionId,
    frames: Vec<ExecutionFrame>,
    binding_index: usize,
    prior_binding: Option<Binding>,
    prior_backtrace: Backtrace,
}

impl FrameManager {
    /// Create a manager for `frames`, recording the session's current
    /// binding and backtrace.
    ///
    /// The cursor starts at 0. The session itself is not touched.
    pub fn new<S>(frames: Vec<ExecutionFrame>, session: &S) -> Result<Self>
    where
        S: DebugSession + ?Sized,
    {
        if frames.is_empty() {
            return Err(StackExplorerError::EmptyFrames);
        }

        Ok(Self {
            session: session.id(),
            frames,
            binding_index: 0,
            prior_binding: session.current_binding().cloned(),
            prior_backtrace: session.backtrace().clone(),
        })
    }

    /// The session this manager navigates for.
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    /// All frames, innermost first.
    pub fn bindings(&self) -> &[ExecutionFrame] {
        &self.frames
    }

    /// Cursor position.
    pub fn binding_index(&self) -> usize {
        self.binding_index
    }

    pub fn current_frame(&self) -> &ExecutionFrame {
        &self.frames[self.binding_index]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; a manager never holds an empty sequence.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionFrame> {
        self.frames.iter()
    }

    /// Binding active before this manager took over, if any.
    pub fn prior_binding(&self) -> Option<&Binding> {
        self.prior_binding.as_ref()
    }

    /// Backtrace visible before this manager took over.
    pub fn prior_backtrace(&self) -> &Backtrace {
        &self.prior_backtrace
    }

    /// Read-only copy of the manager's current state.
    pub fn snapshot(&self) -> FrameManagerSnapshot {
        FrameManagerSnapshot {
            session: self.session,
            frames: self.frames.clone(),
            binding_index: self.binding_index,
            prior_binding: self.prior_binding.clone(),
            prior_backtrace: self.prior_backtrace.clone(),
        }
    }

    /// Move the cursor to `index` and make that frame's context active.
    ///
    /// With `affect_trace` the session's backtrace is replaced by the view
    /// from the new frame; otherwise it is left alone. An out-of-range index
    /// leaves both the cursor and the session untouched.
    pub fn change_frame_to<S>(
        &mut self,
        session: &mut S,
        index: usize,
        affect_trace: bool,
    ) -> Result<()>
    where
        S: DebugSession + ?Sized,
    {
        if index >= self.frames.len() {
            return Err(StackExplorerError::out_of_bounds(index, self.frames.len()));
        }
        self.apply(session, index, affect_trace);
        Ok(())
    }

    /// Re-assert the current frame's context as active.
    pub fn refresh_frame<S>(&mut self, session: &mut S, affect_trace: bool)
    where
        S: DebugSession + ?Sized,
    {
        self.apply(session, self.binding_index, affect_trace);
    }

    /// Move `n` frames towards the callers.
    pub fn up<S>(&mut self, session: &mut S, n: usize) -> Result<()>
    where
        S: DebugSession + ?Sized,
    {
        let target = self
            .binding_index
            .checked_add(n)
            .ok_or_else(|| StackExplorerError::out_of_bounds(usize::MAX, self.frames.len()))?;
        self.change_frame_to(session, target, true)
    }

    /// Move `n` frames towards the innermost frame.
    pub fn down<S>(&mut self, session: &mut S, n: usize) -> Result<()>
    where
        S: DebugSession + ?Sized,
    {
        match self.binding_index.checked_sub(n) {
            Some(target) => self.change_frame_to(session, target, true),
            None => {
                let requested = (self.binding_index as isize).saturating_sub_unsigned(n);
                Err(StackExplorerError::out_of_bounds(requested, self.frames.len()))
            }
        }
    }

    /// Resolve a `frame N` argument. Negative values count back from the
    /// outermost frame, so `-1` is the last one.
    pub fn resolve_index(&self, index: isize) -> Result<usize> {
        let len = self.frames.len() as isize;
        if index >= len || index < -len {
            return Err(StackExplorerError::out_of_bounds(index, self.frames.len()));
        }
        Ok(index.rem_euclid(len) as usize)
    }

    /// Nearest frame in `direction` from the cursor matching `predicate`.
    pub fn find_frame<P>(&self, direction: Direction, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&ExecutionFrame) -> bool,
    {
        match direction {
            Direction::Up => (self.binding_index + 1..self.frames.len())
                .find(|&i| predicate(&self.frames[i])),
            Direction::Down => (0..self.binding_index)
                .rev()
                .find(|&i| predicate(&self.frames[i])),
        }
    }

    fn apply<S>(&mut self, session: &mut S, index: usize, affect_trace: bool)
    where
        S: DebugSession + ?Sized,
    {
        debug_assert_eq!(
            session.id(),
            self.session,
            "frame manager driven by a foreign session"
        );

        let frame = &self.frames[index];
        replace_top(session.binding_stack_mut(), frame.context().clone());
        if affect_trace {
            session.set_backtrace(Backtrace::from_frames(&self.frames, index));
        }
        self.binding_index = index;

        trace!(
            session = %self.session,
            index,
            location = %frame.location(),
            affect_trace,
            "changed frame"
        );
    }
}

/// State of a [`FrameManager`] at the moment it was read.
///
/// Detached from the registry and unable to navigate; later cursor moves are
/// not reflected.
#[derive(Debug, Clone)]
pub struct FrameManagerSnapshot {
    session: SessionId,
    frames: Vec<ExecutionFrame>,
    binding_index: usize,
    prior_binding: Option<Binding>,
    prior_backtrace: Backtrace,
}

impl FrameManagerSnapshot {
    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn bindings(&self) -> &[ExecutionFrame] {
        &self.frames
    }

    pub fn binding_index(&self) -> usize {
        self.binding_index
    }

    pub fn current_frame(&self) -> &ExecutionFrame {
        &self.frames[self.binding_index]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ExecutionFrame> {
        self.frames.iter()
    }

    pub fn prior_binding(&self) -> Option<&Binding> {
        self.prior_binding.as_ref()
    }

    pub fn prior_backtrace(&self) -> &Backtrace {
        &self.prior_backtrace
    }
}

impl<'a> IntoIterator for &'a FrameManager {
    type Item = &'a ExecutionFrame;
    type IntoIter = std::slice::Iter<'a, ExecutionFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
