//! Captured execution contexts and their identity tokens.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity token of a host object.
///
/// Two tokens are equal only when they name the very same object; objects
/// that merely hold equal values get distinct tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Create a token from a raw host identity value.
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw identity value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<0x{:x}>", self.0)
    }
}

/// A local variable as seen by a binding at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Local {
    pub name: String,
    pub value: ObjectId,
}

impl Local {
    pub fn new(name: impl Into<String>, value: ObjectId) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug)]
struct Scope {
    receiver: ObjectId,
    method: Option<String>,
    locals: Vec<Local>,
}

/// Handle to a captured execution context (receiver, executing method, locals).
///
/// Cloning is cheap and yields another handle to the same captured scope.
#[derive(Debug, Clone)]
pub struct Binding(Arc<Scope>);

impl Binding {
    /// Capture a scope. `method` is `None` at top level.
    pub fn new(receiver: ObjectId, method: Option<String>, locals: Vec<Local>) -> Self {
        Self(Arc::new(Scope {
            receiver,
            method,
            locals,
        }))
    }

    /// Scope of a top-level evaluation with no locals.
    pub fn top_level(receiver: ObjectId) -> Self {
        Self::new(receiver, None, Vec::new())
    }

    pub fn receiver(&self) -> ObjectId {
        self.0.receiver
    }

    pub fn method(&self) -> Option<&str> {
        self.0.method.as_deref()
    }

    pub fn locals(&self) -> &[Local] {
        &self.0.locals
    }

    /// Look up a local by name.
    pub fn local(&self, name: &str) -> Option<ObjectId> {
        self.0
            .locals
            .iter()
            .find(|local| local.name == name)
            .map(|local| local.value)
    }

    /// Whether both handles refer to the same captured scope.
    pub fn same_handle(&self, other: &Binding) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Structural comparator for captured contexts.
///
/// Receivers must be the same object, executing methods must be equal, and
/// the local values must be the same objects in the same order. Local names
/// are not compared.
pub fn bindings_equal(a: &Binding, b: &Binding) -> bool {
    a.receiver() == b.receiver()
        && a.method() == b.method()
        && a.locals().len() == b.locals().len()
        && a
            .locals()
            .iter()
            .zip(b.locals())
            .all(|(x, y)| x.value == y.value)
}
