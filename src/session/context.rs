//! The host session surface the navigation engine drives.

use super::SessionId;
use crate::frame::{Backtrace, Binding};

/// What the engine needs from a debugging session.
///
/// The binding stack is the session's stack of active execution contexts;
/// its last entry is where evaluation currently happens. Implementations must
/// not call back into the frame-manager registry from these accessors.
pub trait DebugSession {
    /// Registry key for this session.
    fn id(&self) -> SessionId;

    fn binding_stack(&self) -> &[Binding];

    fn binding_stack_mut(&mut self) -> &mut Vec<Binding>;

    fn backtrace(&self) -> &Backtrace;

    fn set_backtrace(&mut self, backtrace: Backtrace);

    /// The context evaluation currently happens in.
    fn current_binding(&self) -> Option<&Binding> {
        self.binding_stack().last()
    }
}

/// Make `binding` the active context: overwrite the top entry, or push it
/// as the sole entry when the stack is empty.
pub(crate) fn replace_top(stack: &mut Vec<Binding>, binding: Binding) {
    match stack.last_mut() {
        Some(top) => *top = binding,
        None => stack.push(binding),
    }
}

/// In-memory debugging session.
///
/// Hosts with their own session type implement [`DebugSession`] directly;
/// this one backs the command-line driver and tests.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    id: SessionId,
    binding_stack: Vec<Binding>,
    backtrace: Backtrace,
}

impl SessionContext {
    /// Create a session with a fresh identity and no active context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session evaluating in `binding`.
    pub fn with_binding(binding: Binding) -> Self {
        Self {
            binding_stack: vec![binding],
            ..Default::default()
        }
    }

    /// Reuse a host-assigned identity.
    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    /// Enter a nested evaluation context, e.g. `cd` into an object.
    pub fn push_binding(&mut self, binding: Binding) {
        self.binding_stack.push(binding);
    }

    /// Leave the innermost evaluation context.
    pub fn pop_binding(&mut self) -> Option<Binding> {
        self.binding_stack.pop()
    }
}

impl DebugSession for SessionContext {
    fn id(&self) -> SessionId {
        self.id
    }

    fn binding_stack(&self) -> &[Binding] {
        &self.binding_stack
    }

    fn binding_stack_mut(&mut self) -> &mut Vec<Binding> {
        &mut self.binding_stack
    }

    fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    fn set_backtrace(&mut self, backtrace: Backtrace) {
        self.backtrace = backtrace;
    }
}
