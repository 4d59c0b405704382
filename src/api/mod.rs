//! Purpose: Define the stable public API boundary for jsongraft.
//! Exports: The mapping engine types needed by domain crates.
//! Role: Canonical import path for downstream code; additive-only surface.
//! Invariants: Everything a `Mappable` implementation needs is reachable from here.

pub use crate::core::adapter::Adapter;
pub use crate::core::convert::FromJsonValue;
pub use crate::core::formats::{DateFormat, FormatterRegistry};
pub use crate::core::keypath::{JsonObject, resolve};
pub use crate::core::mapper::{Mappable, Mapper};
pub use crate::core::miss::{Miss, MissKind, MissLog};
