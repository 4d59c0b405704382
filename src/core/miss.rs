//! Purpose: Record non-fatal extraction misses without disturbing mapped results.
//! Exports: `Miss`, `MissKind`, `MissLog`.
//! Role: Diagnostic channel shared by every mapping context of one top-level call.
//! Invariants: Misses never alter accessor return values; the log is additive-only.
//! Invariants: A log is confined to a single synchronous mapping call.

use std::cell::RefCell;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MissKind {
    MissingKey,
    TypeMismatch,
    UnknownBoolean,
    EmptyUrl,
    InvalidUrl,
    UnknownFormat,
    UnparsableDate,
    InvalidJson,
    UnsupportedShape,
    Io,
}

/// One recorded extraction miss: what failed, and where.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Miss {
    kind: MissKind,
    keypath: Option<String>,
    detail: Option<String>,
}

impl Miss {
    pub fn new(kind: MissKind) -> Self {
        Self {
            kind,
            keypath: None,
            detail: None,
        }
    }

    pub fn with_keypath(mut self, keypath: impl Into<String>) -> Self {
        self.keypath = Some(keypath.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> MissKind {
        self.kind
    }

    pub fn keypath(&self) -> Option<&str> {
        self.keypath.as_deref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(keypath) = &self.keypath {
            write!(f, " at `{keypath}`")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

/// Accumulator for the misses of one mapping call.
#[derive(Debug, Default)]
pub struct MissLog {
    entries: RefCell<Vec<Miss>>,
}

impl MissLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, miss: Miss) {
        tracing::debug!(kind = ?miss.kind(), keypath = miss.keypath(), "extraction miss");
        self.entries.borrow_mut().push(miss);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn entries(&self) -> Vec<Miss> {
        self.entries.borrow().clone()
    }

    pub fn into_entries(self) -> Vec<Miss> {
        self.entries.into_inner()
    }
}
