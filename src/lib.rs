//! # stack-explorer
//!
//! Call-stack navigation core for interactive debugging sessions.
//!
//! A session's captured call stack is governed by a [`FrameManager`], which
//! keeps a cursor into the frames and switches the session's active binding
//! as the user moves `up`, `down` or to `frame N`. Navigation episodes nest:
//! each session has a LIFO [`SessionFrameStack`] of managers, and popping one
//! puts back exactly the binding and backtrace the session had before that
//! manager was pushed.
//!
//! ## Features
//!
//! - **Nested navigation**: stack-of-stacks with exact restoration on pop
//! - **Thread isolation**: per-thread registry, no locking
//! - **Host agnostic**: sessions and snapshot capture are traits
//!
//! ## Quick Start
//!
//! ```no_run
//! use stack_explorer::{
//!     Binding, ExecutionFrame, ObjectId, PushOptions, SessionContext, SourceLocation,
//!     ThreadLocalRegistry,
//! };
//!
//! fn main() -> stack_explorer::Result<()> {
//!     stack_explorer::logging::try_init().ok();
//!
//!     let mut session = SessionContext::with_binding(Binding::top_level(ObjectId::from_raw(1)));
//!     let frames = vec![ExecutionFrame::new(
//!         Binding::new(ObjectId::from_raw(2), Some("run".into()), vec![]),
//!         None,
//!         SourceLocation::new("app.rb", 12),
//!     )];
//!
//!     ThreadLocalRegistry::create_and_push_frame_manager(frames, &mut session, PushOptions::default())?;
//!     ThreadLocalRegistry::pop_frame_manager(&mut session);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod hooks;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod session;
pub mod stack;
pub mod status;

// Re-export commonly used types
pub use error::{Result, StackExplorerError};
pub use frame::{
    bindings_equal, Backtrace, Binding, ExecutionFrame, FrameType, JsonSnapshotProvider, Local,
    ObjectId, SnapshotProvider, SourceLocation,
};
pub use hooks::{CallStack, LifecycleBridge, StartOptions};
pub use manager::{Direction, FrameManager, FrameManagerSnapshot};
pub use registry::ThreadLocalRegistry;
pub use session::{DebugSession, SessionContext, SessionId};
pub use stack::{PushOptions, SessionFrameStack, StackState};
pub use status::{FrameStatus, StackStatusExtension, StatusExtension};
