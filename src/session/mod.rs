//! Debugging session surface.
//!
//! The engine never owns a session. It reads and writes a session's binding
//! stack and backtrace through [`DebugSession`] and keys its per-session
//! state by [`SessionId`].

mod context;
mod id;

pub(crate) use context::replace_top;
pub use context::{DebugSession, SessionContext};
pub use id::SessionId;
