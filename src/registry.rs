//! Thread-scoped registry of frame-manager stacks.
//!
//! Each thread owns a disjoint map from [`SessionId`] to
//! [`SessionFrameStack`], so no locking is involved and a session's stack is
//! invisible to every other thread, even for the same identity value.
//!
//! The closures handed to the `with_*` and [`ThreadLocalRegistry::get_or_create`]
//! functions run while the thread's map is borrowed and must not call back
//! into the registry.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use crate::frame::ExecutionFrame;
use crate::manager::{FrameManager, FrameManagerSnapshot};
use crate::session::{DebugSession, SessionId};
use crate::stack::{PushOptions, SessionFrameStack};
use crate::Result;

thread_local! {
    static FRAME_MANAGERS: RefCell<HashMap<SessionId, SessionFrameStack>> =
        RefCell::new(HashMap::new());
}

/// Entry point to the calling thread's frame-manager stacks.
pub struct ThreadLocalRegistry;

impl ThreadLocalRegistry {
    /// Run `f` on the session's stack, creating an empty one if absent.
    pub fn get_or_create<F, R>(session: SessionId, f: F) -> R
    where
        F: FnOnce(&mut SessionFrameStack) -> R,
    {
        FRAME_MANAGERS.with(|cell| {
            let mut map = cell.borrow_mut();
            let stack = map
                .entry(session)
                .or_insert_with(|| SessionFrameStack::new(session));
            f(stack)
        })
    }

    /// Run `f` on the session's stack if one exists. Never creates an entry.
    pub fn with_stack<F, R>(session: SessionId, f: F) -> Option<R>
    where
        F: FnOnce(&SessionFrameStack) -> R,
    {
        FRAME_MANAGERS.with(|cell| cell.borrow().get(&session).map(f))
    }

    /// Drop the session's entry.
    pub fn remove(session: SessionId) -> Option<SessionFrameStack> {
        FRAME_MANAGERS.with(|cell| cell.borrow_mut().remove(&session))
    }

    pub fn contains(session: SessionId) -> bool {
        FRAME_MANAGERS.with(|cell| cell.borrow().contains_key(&session))
    }

    /// Number of sessions with an entry on this thread.
    pub fn session_count() -> usize {
        FRAME_MANAGERS.with(|cell| cell.borrow().len())
    }

    /// Number of stacked managers for the session.
    pub fn depth(session: SessionId) -> usize {
        Self::with_stack(session, SessionFrameStack::len).unwrap_or(0)
    }

    /// Push a new frame manager for the session and switch it to the
    /// initial frame. Returns a snapshot of the new manager; navigate it
    /// through [`ThreadLocalRegistry::with_frame_manager_mut`].
    pub fn create_and_push_frame_manager<S>(
        frames: Vec<ExecutionFrame>,
        session: &mut S,
        options: PushOptions,
    ) -> Result<FrameManagerSnapshot>
    where
        S: DebugSession + ?Sized,
    {
        let id = session.id();
        let pushed = Self::get_or_create(id, |stack| {
            stack
                .create_and_push(frames, session, options)
                .map(|fm| fm.snapshot())
        });

        // A failed push must not leave an empty entry behind.
        if pushed.is_err() && Self::depth(id) == 0 {
            Self::remove(id);
        }
        pushed
    }

    /// Pop the session's active manager, restoring the session, and drop the
    /// registry entry once the stack is empty.
    pub fn pop_frame_manager<S>(session: &mut S) -> Option<FrameManagerSnapshot>
    where
        S: DebugSession + ?Sized,
    {
        let id = session.id();
        FRAME_MANAGERS.with(|cell| {
            let mut map = cell.borrow_mut();
            let stack = map.get_mut(&id)?;
            let popped = stack.pop(session);
            if stack.is_empty() {
                map.remove(&id);
                debug!(session = %id, "frame manager stack emptied");
            }
            popped.map(|fm| fm.snapshot())
        })
    }

    /// Pop every manager for the session and remove its entry.
    pub fn clear_frame_managers<S>(session: &mut S)
    where
        S: DebugSession + ?Sized,
    {
        while Self::pop_frame_manager(session).is_some() {}
        Self::remove(session.id());
    }

    /// Snapshot of the session's active manager.
    pub fn frame_manager(session: SessionId) -> Option<FrameManagerSnapshot> {
        Self::with_frame_manager(session, FrameManager::snapshot)
    }

    /// Run `f` on the session's active manager.
    pub fn with_frame_manager<F, R>(session: SessionId, f: F) -> Option<R>
    where
        F: FnOnce(&FrameManager) -> R,
    {
        Self::with_stack(session, |stack| stack.peek().map(f)).flatten()
    }

    /// Run `f` on the session's active manager with mutable access to both,
    /// e.g. to navigate with [`FrameManager::up`].
    pub fn with_frame_manager_mut<S, F, R>(session: &mut S, f: F) -> Option<R>
    where
        S: DebugSession + ?Sized,
        F: FnOnce(&mut FrameManager, &mut S) -> R,
    {
        let id = session.id();
        FRAME_MANAGERS.with(|cell| {
            let mut map = cell.borrow_mut();
            let manager = map.get_mut(&id)?.peek_mut()?;
            Some(f(manager, session))
        })
    }

    /// Move the session's active manager to `index`, updating the trace.
    /// Returns `None` when the session has no active manager.
    pub fn change_frame_to<S>(session: &mut S, index: usize) -> Option<Result<()>>
    where
        S: DebugSession + ?Sized,
    {
        Self::with_frame_manager_mut(session, |fm, s| fm.change_frame_to(s, index, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Binding, ObjectId, SourceLocation};
    use crate::session::SessionContext;

    fn frames(n: u64) -> Vec<ExecutionFrame> {
        (0..n)
            .map(|i| {
                ExecutionFrame::new(
                    Binding::top_level(ObjectId::from_raw(i)),
                    None,
                    SourceLocation::new("app.rb", i as u32),
                )
            })
            .collect()
    }

    fn push(frames: Vec<ExecutionFrame>, session: &mut SessionContext) -> FrameManagerSnapshot {
        ThreadLocalRegistry::create_and_push_frame_manager(frames, session, PushOptions::default())
            .unwrap()
    }

    fn session() -> SessionContext {
        SessionContext::with_binding(Binding::top_level(ObjectId::from_raw(99)))
    }

    #[test]
    fn test_get_or_create_vivifies() {
        let id = SessionId::new();
        assert!(!ThreadLocalRegistry::contains(id));

        let len = ThreadLocalRegistry::get_or_create(id, |stack| stack.len());
        assert_eq!(len, 0);
        assert!(ThreadLocalRegistry::contains(id));

        assert!(ThreadLocalRegistry::remove(id).is_some());
        assert!(ThreadLocalRegistry::remove(id).is_none());
    }

    #[test]
    fn test_queries_do_not_vivify() {
        let id = SessionId::new();
        assert!(ThreadLocalRegistry::frame_manager(id).is_none());
        assert_eq!(ThreadLocalRegistry::depth(id), 0);
        assert!(!ThreadLocalRegistry::contains(id));
    }

    #[test]
    fn test_push_and_pop_manage_entry() {
        let mut s = session();
        let fm = ThreadLocalRegistry::create_and_push_frame_manager(
            frames(3),
            &mut s,
            PushOptions::default(),
        )
        .unwrap();
        assert_eq!(fm.len(), 3);
        assert!(ThreadLocalRegistry::contains(s.id()));
        assert_eq!(ThreadLocalRegistry::depth(s.id()), 1);

        assert!(ThreadLocalRegistry::pop_frame_manager(&mut s).is_some());
        assert!(!ThreadLocalRegistry::contains(s.id()));
        assert!(ThreadLocalRegistry::pop_frame_manager(&mut s).is_none());
    }

    #[test]
    fn test_failed_push_leaves_no_entry() {
        let mut s = session();
        let result = ThreadLocalRegistry::create_and_push_frame_manager(
            Vec::new(),
            &mut s,
            PushOptions::default(),
        );
        assert!(result.is_err());
        assert!(!ThreadLocalRegistry::contains(s.id()));
    }

    #[test]
    fn test_change_frame_through_registry() {
        let mut s = session();
        assert!(ThreadLocalRegistry::change_frame_to(&mut s, 0).is_none());

        push(frames(3), &mut s);

        ThreadLocalRegistry::change_frame_to(&mut s, 2)
            .unwrap()
            .unwrap();
        assert!(ThreadLocalRegistry::change_frame_to(&mut s, 3)
            .unwrap()
            .is_err());

        let fm = ThreadLocalRegistry::frame_manager(s.id()).unwrap();
        assert_eq!(fm.binding_index(), 2);
        assert!(s.current_binding().unwrap().same_handle(fm.bindings()[2].context()));

        ThreadLocalRegistry::clear_frame_managers(&mut s);
    }

    #[test]
    fn test_registry_cursor_tracks_active_context() {
        let mut s = session();
        let pushed = push(frames(3), &mut s);

        ThreadLocalRegistry::with_frame_manager_mut(&mut s, |fm, s| fm.up(s, 2))
            .unwrap()
            .unwrap();
        // The value handed back at push time is a stale copy.
        assert_eq!(pushed.binding_index(), 0);

        let fm = ThreadLocalRegistry::frame_manager(s.id()).unwrap();
        assert_eq!(fm.binding_index(), 2);
        assert!(s.current_binding().unwrap().same_handle(fm.current_frame().context()));

        push(frames(2), &mut s);
        ThreadLocalRegistry::change_frame_to(&mut s, 1).unwrap().unwrap();
        ThreadLocalRegistry::pop_frame_manager(&mut s).unwrap();

        let fm = ThreadLocalRegistry::frame_manager(s.id()).unwrap();
        assert_eq!(fm.binding_index(), 2);
        assert!(s.current_binding().unwrap().same_handle(fm.current_frame().context()));

        ThreadLocalRegistry::clear_frame_managers(&mut s);
    }

    #[test]
    fn test_clear_twice() {
        let mut s = session();
        let origin = s.current_binding().unwrap().clone();
        for _ in 0..3 {
            ThreadLocalRegistry::create_and_push_frame_manager(
                frames(2),
                &mut s,
                PushOptions::initial_frame(1),
            )
            .unwrap();
        }
        assert_eq!(ThreadLocalRegistry::depth(s.id()), 3);

        ThreadLocalRegistry::clear_frame_managers(&mut s);
        ThreadLocalRegistry::clear_frame_managers(&mut s);

        assert!(!ThreadLocalRegistry::contains(s.id()));
        assert!(s.current_binding().unwrap().same_handle(&origin));
    }

    #[test]
    fn test_sessions_independent() {
        let mut a = session();
        let mut b = session();
        let before = ThreadLocalRegistry::session_count();

        push(frames(2), &mut a);
        push(frames(3), &mut b);
        assert_eq!(ThreadLocalRegistry::session_count(), before + 2);

        ThreadLocalRegistry::clear_frame_managers(&mut a);
        assert!(!ThreadLocalRegistry::contains(a.id()));
        assert_eq!(ThreadLocalRegistry::frame_manager(b.id()).unwrap().len(), 3);

        ThreadLocalRegistry::clear_frame_managers(&mut b);
    }
}
