//! Per-session LIFO stack of frame managers.

use tracing::debug;

use crate::frame::ExecutionFrame;
use crate::manager::FrameManager;
use crate::session::{replace_top, DebugSession, SessionId};
use crate::Result;

/// Options for pushing a new frame manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushOptions {
    /// Frame the new manager starts on.
    pub initial_frame: usize,
}

impl PushOptions {
    pub fn initial_frame(index: usize) -> Self {
        Self {
            initial_frame: index,
        }
    }
}

/// Observable state of a session's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackState {
    Empty,
    /// `depth` managers are stacked; the last pushed is active.
    Active { depth: usize },
}

/// Nested navigation episodes for one session, innermost last.
#[derive(Debug)]
pub struct SessionFrameStack {
    session: SessionId,
    managers: Vec<FrameManager>,
}

impl SessionFrameStack {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            managers: Vec::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn state(&self) -> StackState {
        match self.managers.len() {
            0 => StackState::Empty,
            depth => StackState::Active { depth },
        }
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// The active manager.
    pub fn peek(&self) -> Option<&FrameManager> {
        self.managers.last()
    }

    pub fn peek_mut(&mut self) -> Option<&mut FrameManager> {
        self.managers.last_mut()
    }

    /// All managers, oldest first.
    pub fn managers(&self) -> &[FrameManager] {
        &self.managers
    }

    /// Build a manager over `frames`, push it, and switch the session to its
    /// initial frame without touching the backtrace.
    ///
    /// Nothing is pushed when `frames` is empty or the initial frame is out
    /// of range.
    pub fn create_and_push<S>(
        &mut self,
        frames: Vec<ExecutionFrame>,
        session: &mut S,
        options: PushOptions,
    ) -> Result<&mut FrameManager>
    where
        S: DebugSession + ?Sized,
    {
        debug_assert_eq!(session.id(), self.session, "stack driven by a foreign session");

        let mut manager = FrameManager::new(frames, &*session)?;
        manager.change_frame_to(session, options.initial_frame, false)?;
        self.managers.push(manager);

        debug!(
            session = %self.session,
            depth = self.managers.len(),
            initial_frame = options.initial_frame,
            "pushed frame manager"
        );

        let top = self.managers.len() - 1;
        Ok(&mut self.managers[top])
    }

    /// Pop the active manager and restore what the session had before that
    /// manager was created.
    ///
    /// When it was the last manager the prior binding replaces the top of the
    /// session's binding stack (or becomes its only entry); otherwise the
    /// manager below is refreshed. The prior backtrace is restored in both
    /// cases. Popping an empty stack does nothing.
    pub fn pop<S>(&mut self, session: &mut S) -> Option<FrameManager>
    where
        S: DebugSession + ?Sized,
    {
        let popped = self.managers.pop()?;

        match self.managers.last_mut() {
            None => {
                let stack = session.binding_stack_mut();
                match popped.prior_binding() {
                    Some(prior) => replace_top(stack, prior.clone()),
                    None => {
                        stack.pop();
                    }
                }
            }
            Some(below) => below.refresh_frame(session, false),
        }
        session.set_backtrace(popped.prior_backtrace().clone());

        debug!(
            session = %self.session,
            depth = self.managers.len(),
            "popped frame manager"
        );
        Some(popped)
    }

    /// Pop every manager, restoring as each one goes.
    pub fn clear<S>(&mut self, session: &mut S)
    where
        S: DebugSession + ?Sized,
    {
        while self.pop(session).is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackExplorerError;
    use crate::frame::{Backtrace, Binding, ObjectId, SourceLocation};
    use crate::session::SessionContext;

    fn frames(base: u64, n: u64) -> Vec<ExecutionFrame> {
        (0..n)
            .map(|i| {
                ExecutionFrame::new(
                    Binding::top_level(ObjectId::from_raw(base + i)),
                    None,
                    SourceLocation::new("app.rb", (base + i) as u32),
                )
            })
            .collect()
    }

    fn setup() -> (SessionContext, SessionFrameStack, Binding) {
        let origin = Binding::top_level(ObjectId::from_raw(1));
        let mut session = SessionContext::with_binding(origin.clone());
        session.set_backtrace(Backtrace::new(vec![SourceLocation::new("repl", 1)]));
        let stack = SessionFrameStack::new(session.id());
        (session, stack, origin)
    }

    #[test]
    fn test_push_switches_context_not_trace() {
        let (mut session, mut stack, _) = setup();
        let original_trace = session.backtrace().clone();

        let fm = stack
            .create_and_push(frames(10, 3), &mut session, PushOptions::initial_frame(1))
            .unwrap();
        let expected = fm.bindings()[1].context().clone();

        assert_eq!(stack.state(), StackState::Active { depth: 1 });
        assert_eq!(stack.peek().unwrap().binding_index(), 1);
        assert!(session.current_binding().unwrap().same_handle(&expected));
        assert_eq!(session.backtrace(), &original_trace);
    }

    #[test]
    fn test_push_rejects_bad_initial_frame() {
        let (mut session, mut stack, origin) = setup();

        let result =
            stack.create_and_push(frames(10, 2), &mut session, PushOptions::initial_frame(2));

        assert!(matches!(
            result,
            Err(StackExplorerError::OutOfBoundsFrame { .. })
        ));
        assert!(stack.is_empty());
        assert!(session.current_binding().unwrap().same_handle(&origin));
    }

    #[test]
    fn test_pop_empty_is_noop() {
        let (mut session, mut stack, origin) = setup();
        let trace = session.backtrace().clone();

        assert!(stack.pop(&mut session).is_none());
        assert_eq!(stack.state(), StackState::Empty);
        assert!(session.current_binding().unwrap().same_handle(&origin));
        assert_eq!(session.backtrace(), &trace);
    }

    #[test]
    fn test_pop_last_restores_prior() {
        let (mut session, mut stack, origin) = setup();
        let trace = session.backtrace().clone();

        let fm = stack
            .create_and_push(frames(10, 3), &mut session, PushOptions::default())
            .unwrap();
        fm.change_frame_to(&mut session, 2, true).unwrap();
        assert_ne!(session.backtrace(), &trace);

        let popped = stack.pop(&mut session).unwrap();

        assert_eq!(popped.binding_index(), 2);
        assert!(stack.is_empty());
        assert_eq!(session.binding_stack().len(), 1);
        assert!(session.current_binding().unwrap().same_handle(&origin));
        assert_eq!(session.backtrace(), &trace);
    }

    #[test]
    fn test_pop_last_pushes_when_binding_stack_emptied() {
        let (mut session, mut stack, origin) = setup();
        stack
            .create_and_push(frames(10, 2), &mut session, PushOptions::default())
            .unwrap();

        // Host dropped every binding while the manager was active.
        session.binding_stack_mut().clear();
        stack.pop(&mut session);

        assert_eq!(session.binding_stack().len(), 1);
        assert!(session.current_binding().unwrap().same_handle(&origin));
    }

    #[test]
    fn test_pop_without_prior_binding() {
        let mut session = SessionContext::new();
        let mut stack = SessionFrameStack::new(session.id());
        stack
            .create_and_push(frames(10, 2), &mut session, PushOptions::default())
            .unwrap();
        assert_eq!(session.binding_stack().len(), 1);

        stack.pop(&mut session);
        assert!(session.binding_stack().is_empty());
    }

    #[test]
    fn test_pop_nested_refreshes_below() {
        let (mut session, mut stack, _) = setup();

        let a = stack
            .create_and_push(frames(10, 3), &mut session, PushOptions::default())
            .unwrap();
        a.change_frame_to(&mut session, 2, true).unwrap();
        let a_frame = a.bindings()[2].context().clone();
        let a_trace = session.backtrace().clone();

        let b = stack
            .create_and_push(frames(20, 2), &mut session, PushOptions::default())
            .unwrap();
        b.change_frame_to(&mut session, 1, true).unwrap();

        stack.pop(&mut session);

        assert_eq!(stack.state(), StackState::Active { depth: 1 });
        assert_eq!(stack.peek().unwrap().binding_index(), 2);
        assert!(session.current_binding().unwrap().same_handle(&a_frame));
        assert_eq!(session.backtrace(), &a_trace);
    }

    #[test]
    fn test_clear_idempotent() {
        let (mut session, mut stack, origin) = setup();
        stack
            .create_and_push(frames(10, 2), &mut session, PushOptions::default())
            .unwrap();
        stack
            .create_and_push(frames(20, 2), &mut session, PushOptions::initial_frame(1))
            .unwrap();

        stack.clear(&mut session);
        assert!(stack.is_empty());
        assert!(session.current_binding().unwrap().same_handle(&origin));

        stack.clear(&mut session);
        assert!(stack.is_empty());
        assert_eq!(session.binding_stack().len(), 1);
        assert!(session.current_binding().unwrap().same_handle(&origin));
    }
}
