//! Purpose: Ingestion entry points turning files, bytes, or decoded values into domain objects.
//! Exports: `Adapter`.
//! Role: Selects the top-level shape and hands each object a fresh mapping context.
//! Invariants: Entry points never surface errors; every failure collapses to absent.
//! Invariants: Only a top-level object or an array of objects is ingestible.

use std::path::Path;

use serde_json::Value;

use crate::core::formats::FormatterRegistry;
use crate::core::keypath::JsonObject;
use crate::core::mapper::{Mappable, Mapper};
use crate::core::miss::{Miss, MissKind, MissLog};
use crate::json;

/// The mapping engine: owns the formatter registry and drives construction.
///
/// Built once, then shared immutably; every mapping call creates its own
/// contexts and diagnostic log internally.
#[derive(Clone, Debug)]
pub struct Adapter {
    formats: FormatterRegistry,
}

impl Adapter {
    /// Adapter with no registered date formats.
    pub fn new() -> Self {
        Self::with_formats(FormatterRegistry::new())
    }

    pub fn with_formats(formats: FormatterRegistry) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &FormatterRegistry {
        &self.formats
    }

    /// Read a file (blocking) and map its JSON contents. A failed read is
    /// absent, like every other failure.
    pub fn objects_from_file<T: Mappable>(&self, path: impl AsRef<Path>) -> Option<Vec<T>> {
        let log = MissLog::new();
        let bytes = match std::fs::read(path.as_ref()) {
            Ok(bytes) => bytes,
            Err(err) => {
                log.record(Miss::new(MissKind::Io).with_detail(err.to_string()));
                return None;
            }
        };
        self.slice_into(&bytes, &log)
    }

    /// Decode raw JSON bytes and map the result.
    pub fn objects_from_slice<T: Mappable>(&self, bytes: &[u8]) -> Option<Vec<T>> {
        let log = MissLog::new();
        self.slice_into(bytes, &log)
    }

    /// Map an already-decoded value: an object yields one element, an array
    /// of objects yields one element each in source order, anything else is
    /// absent.
    pub fn objects_from_value<T: Mappable>(&self, value: &Value) -> Option<Vec<T>> {
        let log = MissLog::new();
        self.value_into(value, &log)
    }

    /// Like [`Adapter::objects_from_value`], additionally returning every
    /// extraction miss recorded during the call. The mapped result is
    /// identical to the plain variant.
    pub fn objects_from_value_reporting<T: Mappable>(
        &self,
        value: &Value,
    ) -> (Option<Vec<T>>, Vec<Miss>) {
        let log = MissLog::new();
        let objects = self.value_into(value, &log);
        (objects, log.into_entries())
    }

    /// Construct one domain object from one JSON object.
    pub fn object_from_map<T: Mappable>(&self, object: &JsonObject) -> T {
        let log = MissLog::new();
        self.map_one(object, &log)
    }

    /// Construct one domain object per JSON object, in order.
    pub fn objects_from_maps<T: Mappable>(&self, objects: &[JsonObject]) -> Vec<T> {
        let log = MissLog::new();
        objects
            .iter()
            .map(|object| self.map_one(object, &log))
            .collect()
    }

    /// Downcast a dynamic array to objects and map each; any non-object
    /// element makes the whole array absent.
    pub fn objects_from_array<T: Mappable>(&self, items: &[Value]) -> Option<Vec<T>> {
        let log = MissLog::new();
        self.array_into(items, &log)
    }

    fn slice_into<T: Mappable>(&self, bytes: &[u8], log: &MissLog) -> Option<Vec<T>> {
        match json::parse::value_from_slice(bytes) {
            Ok(value) => self.value_into(&value, log),
            Err(err) => {
                log.record(Miss::new(MissKind::InvalidJson).with_detail(err.to_string()));
                None
            }
        }
    }

    fn value_into<T: Mappable>(&self, value: &Value, log: &MissLog) -> Option<Vec<T>> {
        match value {
            Value::Object(object) => Some(vec![self.map_one(object, log)]),
            Value::Array(items) => self.array_into(items, log),
            other => {
                log.record(Miss::new(MissKind::UnsupportedShape).with_detail(shape_name(other)));
                None
            }
        }
    }

    fn array_into<T: Mappable>(&self, items: &[Value], log: &MissLog) -> Option<Vec<T>> {
        let Some(objects) = items
            .iter()
            .map(Value::as_object)
            .collect::<Option<Vec<_>>>()
        else {
            log.record(
                Miss::new(MissKind::UnsupportedShape).with_detail("array holds non-objects"),
            );
            return None;
        };
        Some(
            objects
                .into_iter()
                .map(|object| self.map_one(object, log))
                .collect(),
        )
    }

    fn map_one<T: Mappable>(&self, object: &JsonObject, log: &MissLog) -> T {
        Mapper::<T>::new(object, &self.formats, log).construct()
    }
}

impl Default for Adapter {
    fn default() -> Self {
        Self::new()
    }
}

fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
