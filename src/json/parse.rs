//! Purpose: Decode raw bytes into dynamic JSON values.
//! Exports: `value_from_slice`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Decode failures are reported by callsites as misses, never as panics.

use serde_json::Value;

pub(crate) fn value_from_slice(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}
