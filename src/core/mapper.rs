//! Purpose: Mapping context and the typed accessor family over one JSON object.
//! Exports: `Mappable`, `Mapper`.
//! Role: The surface domain constructors pull their fields through.
//! Invariants: A context views exactly one object and is created fresh per dictionary.
//! Invariants: Every accessor degrades to absent or the caller's default, never an error.
//! Invariants: A context cannot outlive the mapping call that created it.

use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;

use serde_json::Value;
use time::OffsetDateTime;
use url::Url;

use crate::core::convert::FromJsonValue;
use crate::core::formats::FormatterRegistry;
use crate::core::keypath::{JsonObject, resolve};
use crate::core::miss::{Miss, MissKind, MissLog};

/// A domain type constructible from a mapping context.
///
/// The single entry point receives a borrowed context with an anonymous
/// lifetime, so an implementation can read fields but never retain the
/// context or anything borrowed from it.
pub trait Mappable: Sized {
    fn from_mapper(mapper: &Mapper<'_, Self>) -> Self;
}

/// The mapping context for one JSON object being decoded into one `T`.
///
/// The target type parameter exists only to pin which `Mappable`
/// constructor a context feeds; it has no runtime effect.
pub struct Mapper<'a, T: Mappable> {
    object: &'a JsonObject,
    formats: &'a FormatterRegistry,
    misses: &'a MissLog,
    target: PhantomData<fn() -> T>,
}

impl<'a, T: Mappable> Mapper<'a, T> {
    pub(crate) fn new(
        object: &'a JsonObject,
        formats: &'a FormatterRegistry,
        misses: &'a MissLog,
    ) -> Self {
        Self {
            object,
            formats,
            misses,
            target: PhantomData,
        }
    }

    pub(crate) fn construct(&self) -> T {
        T::from_mapper(self)
    }

    /// Fresh context over a nested object, sharing the registry and log.
    fn child<U: Mappable>(&self, object: &'a JsonObject) -> Mapper<'a, U> {
        Mapper::new(object, self.formats, self.misses)
    }

    fn miss(&self, kind: MissKind, keypath: &str) {
        self.misses.record(Miss::new(kind).with_keypath(keypath));
    }

    fn lookup(&self, keypath: &str) -> Option<&'a Value> {
        let value = resolve(keypath, self.object);
        if value.is_none() {
            self.miss(MissKind::MissingKey, keypath);
        }
        value
    }

    fn downcast<V: FromJsonValue>(&self, keypath: &str) -> Option<V> {
        let value = self.lookup(keypath)?;
        let cast = V::from_json_value(value);
        if cast.is_none() {
            self.miss(MissKind::TypeMismatch, keypath);
        }
        cast
    }

    pub fn string_for(&self, keypath: &str) -> Option<String> {
        self.downcast(keypath)
    }

    pub fn string_value_for(&self, keypath: &str, default: impl Into<String>) -> String {
        self.string_for(keypath)
            .unwrap_or_else(|| default.into())
    }

    pub fn int_for(&self, keypath: &str) -> Option<i64> {
        self.downcast(keypath)
    }

    pub fn int_value_for(&self, keypath: &str, default: i64) -> i64 {
        self.int_for(keypath).unwrap_or(default)
    }

    pub fn double_for(&self, keypath: &str) -> Option<f64> {
        self.downcast(keypath)
    }

    pub fn double_value_for(&self, keypath: &str, default: f64) -> f64 {
        self.double_for(keypath).unwrap_or(default)
    }

    pub fn float_for(&self, keypath: &str) -> Option<f32> {
        self.downcast(keypath)
    }

    pub fn float_value_for(&self, keypath: &str, default: f32) -> f32 {
        self.float_for(keypath).unwrap_or(default)
    }

    /// Boolean with string coercion: "true"/"yes"/"1" and "false"/"no"/"0"
    /// (case-insensitive) convert; any other string is absent, not a guess.
    pub fn bool_for(&self, keypath: &str) -> Option<bool> {
        match self.lookup(keypath)? {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => {
                let coerced = coerce_bool(text);
                if coerced.is_none() {
                    self.miss(MissKind::UnknownBoolean, keypath);
                }
                coerced
            }
            _ => {
                self.miss(MissKind::TypeMismatch, keypath);
                None
            }
        }
    }

    pub fn bool_value_for(&self, keypath: &str, default: bool) -> bool {
        self.bool_for(keypath).unwrap_or(default)
    }

    /// URL from a string field. An empty string never becomes a URL.
    pub fn url_for(&self, keypath: &str) -> Option<Url> {
        let text = self.string_for(keypath)?;
        if text.is_empty() {
            self.miss(MissKind::EmptyUrl, keypath);
            return None;
        }
        match Url::parse(&text) {
            Ok(url) => Some(url),
            Err(_) => {
                self.miss(MissKind::InvalidUrl, keypath);
                None
            }
        }
    }

    pub fn url_value_for(&self, keypath: &str, default: Url) -> Url {
        self.url_for(keypath).unwrap_or(default)
    }

    /// Homogeneous primitive array. One mismatched element makes the whole
    /// array absent.
    pub fn array_for<E: FromJsonValue>(&self, keypath: &str) -> Option<Vec<E>> {
        let Value::Array(items) = self.lookup(keypath)? else {
            self.miss(MissKind::TypeMismatch, keypath);
            return None;
        };
        let cast = items
            .iter()
            .map(E::from_json_value)
            .collect::<Option<Vec<E>>>();
        if cast.is_none() {
            self.miss(MissKind::TypeMismatch, keypath);
        }
        cast
    }

    pub fn array_value_for<E: FromJsonValue>(&self, keypath: &str) -> Vec<E> {
        self.array_for(keypath).unwrap_or_default()
    }

    /// Primitive array collapsed into a set; equal elements dedup.
    pub fn set_for<E>(&self, keypath: &str) -> Option<HashSet<E>>
    where
        E: FromJsonValue + Eq + Hash,
    {
        self.array_for(keypath)
            .map(|items| items.into_iter().collect())
    }

    pub fn set_value_for<E>(&self, keypath: &str) -> HashSet<E>
    where
        E: FromJsonValue + Eq + Hash,
    {
        self.set_for(keypath).unwrap_or_default()
    }

    pub fn dictionary_for(&self, keypath: &str) -> Option<&'a JsonObject> {
        match self.lookup(keypath)? {
            Value::Object(object) => Some(object),
            _ => {
                self.miss(MissKind::TypeMismatch, keypath);
                None
            }
        }
    }

    pub fn dictionary_value_for(&self, keypath: &str) -> JsonObject {
        self.dictionary_for(keypath).cloned().unwrap_or_default()
    }

    pub fn date_from_int_for<F>(&self, keypath: &str, transform: F) -> Option<OffsetDateTime>
    where
        F: FnOnce(i64) -> Option<OffsetDateTime>,
    {
        transform(self.int_for(keypath)?)
    }

    pub fn date_from_string_for<F>(&self, keypath: &str, transform: F) -> Option<OffsetDateTime>
    where
        F: FnOnce(&str) -> Option<OffsetDateTime>,
    {
        let text = self.string_for(keypath)?;
        transform(&text)
    }

    /// Date via a format registered under `format_key`. An unregistered key
    /// or unparsable text is absent.
    pub fn date_for(&self, keypath: &str, format_key: &str) -> Option<OffsetDateTime> {
        let text = self.string_for(keypath)?;
        let Some(format) = self.formats.lookup(format_key) else {
            self.misses.record(
                Miss::new(MissKind::UnknownFormat)
                    .with_keypath(keypath)
                    .with_detail(format!("no format registered for `{format_key}`")),
            );
            return None;
        };
        let parsed = format.parse(&text);
        if parsed.is_none() {
            self.miss(MissKind::UnparsableDate, keypath);
        }
        parsed
    }

    /// Nested object decoded through a fresh context for `U`.
    pub fn object_for<U: Mappable>(&self, keypath: &str) -> Option<U> {
        let object = self.dictionary_for(keypath)?;
        Some(self.child::<U>(object).construct())
    }

    /// Array of nested objects, each decoded through its own fresh context,
    /// in source order. Any non-object element makes the array absent.
    pub fn object_array_for<U: Mappable>(&self, keypath: &str) -> Option<Vec<U>> {
        let Value::Array(items) = self.lookup(keypath)? else {
            self.miss(MissKind::TypeMismatch, keypath);
            return None;
        };
        let Some(objects) = items
            .iter()
            .map(Value::as_object)
            .collect::<Option<Vec<_>>>()
        else {
            self.miss(MissKind::TypeMismatch, keypath);
            return None;
        };
        Some(
            objects
                .into_iter()
                .map(|object| self.child::<U>(object).construct())
                .collect(),
        )
    }

    pub fn object_array_value_for<U: Mappable>(&self, keypath: &str) -> Vec<U> {
        self.object_array_for(keypath).unwrap_or_default()
    }

    /// Array of nested objects collapsed into a set; structurally equal
    /// elements dedup and ordering is not preserved.
    pub fn object_set_for<U>(&self, keypath: &str) -> Option<HashSet<U>>
    where
        U: Mappable + Eq + Hash,
    {
        self.object_array_for(keypath)
            .map(|objects| objects.into_iter().collect())
    }

    pub fn object_set_value_for<U>(&self, keypath: &str) -> HashSet<U>
    where
        U: Mappable + Eq + Hash,
    {
        self.object_set_for(keypath).unwrap_or_default()
    }

    /// Escape hatch for types without a built-in accessor: downcast the
    /// resolved value to `I`, then let the caller convert it.
    pub fn transform<I, O, F>(&self, keypath: &str, convert: F) -> Option<O>
    where
        I: FromJsonValue,
        F: FnOnce(I) -> Option<O>,
    {
        convert(self.downcast(keypath)?)
    }

    pub fn transform_value<I, O, F>(&self, keypath: &str, default: O, convert: F) -> O
    where
        I: FromJsonValue,
        F: FnOnce(I) -> O,
    {
        match self.downcast(keypath) {
            Some(input) => convert(input),
            None => default,
        }
    }
}

fn coerce_bool(text: &str) -> Option<bool> {
    match text.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Mappable, Mapper};
    use crate::core::formats::{DateFormat, FormatterRegistry};
    use crate::core::miss::{MissKind, MissLog};
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use time::OffsetDateTime;
    use url::Url;

    struct Probe;

    impl Mappable for Probe {
        fn from_mapper(_: &Mapper<'_, Self>) -> Self {
            Probe
        }
    }

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Pair {
        left: i64,
        right: i64,
    }

    impl Mappable for Pair {
        fn from_mapper(mapper: &Mapper<'_, Self>) -> Self {
            Self {
                left: mapper.int_value_for("left", 0),
                right: mapper.int_value_for("right", 0),
            }
        }
    }

    fn registry() -> FormatterRegistry {
        let mut registry = FormatterRegistry::new();
        registry.register("stamp", DateFormat::Rfc3339);
        registry
    }

    fn mapper<'a>(
        doc: &'a Value,
        formats: &'a FormatterRegistry,
        log: &'a MissLog,
    ) -> Mapper<'a, Probe> {
        Mapper::new(doc.as_object().expect("object fixture"), formats, log)
    }

    #[test]
    fn primitives_round_trip_exactly() {
        let doc = json!({
            "name": "Ada LOVELACE",
            "count": -42,
            "ratio": 0.1,
            "weight": 2.5,
            "flag": true
        });
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert_eq!(mapper.string_for("name"), Some("Ada LOVELACE".to_string()));
        assert_eq!(mapper.int_for("count"), Some(-42));
        assert_eq!(mapper.double_for("ratio"), Some(0.1));
        assert_eq!(mapper.float_for("weight"), Some(2.5f32));
        assert_eq!(mapper.bool_for("flag"), Some(true));
        assert!(log.is_empty());
    }

    #[test]
    fn value_getters_fall_back_to_defaults() {
        let doc = json!({"present": "here"});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert_eq!(mapper.string_value_for("present", "other"), "here");
        assert_eq!(mapper.string_value_for("gone", "other"), "other");
        assert_eq!(mapper.int_value_for("gone", 7), 7);
        assert_eq!(mapper.double_value_for("gone", 1.5), 1.5);
        assert_eq!(mapper.float_value_for("gone", 0.5), 0.5);
        assert!(mapper.bool_value_for("gone", true));
        assert_eq!(log.entries().len(), 5);
        assert!(
            log.entries()
                .iter()
                .all(|miss| miss.kind() == MissKind::MissingKey)
        );
    }

    #[test]
    fn bool_coercion_matrix() {
        let doc = json!({
            "a": "yes", "b": "YES", "c": "1", "d": true,
            "e": "no", "f": "0", "g": false,
            "h": "maybe", "i": 1
        });
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        for key in ["a", "b", "c", "d"] {
            assert_eq!(mapper.bool_for(key), Some(true), "key {key}");
        }
        for key in ["e", "f", "g"] {
            assert_eq!(mapper.bool_for(key), Some(false), "key {key}");
        }
        assert_eq!(mapper.bool_for("h"), None);
        assert_eq!(mapper.bool_for("i"), None);
    }

    #[test]
    fn unrecognized_bool_string_takes_the_callers_default() {
        let doc = json!({"flag": "maybe"});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert!(mapper.bool_value_for("flag", true));
        assert!(!mapper.bool_value_for("flag", false));
        assert!(
            log.entries()
                .iter()
                .any(|miss| miss.kind() == MissKind::UnknownBoolean)
        );
    }

    #[test]
    fn url_accessor_rejects_empty_and_invalid() {
        let doc = json!({"home": "http://x.com", "blank": "", "plain": "not a url"});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert_eq!(
            mapper.url_for("home"),
            Some(Url::parse("http://x.com").expect("url"))
        );
        assert_eq!(mapper.url_for("blank"), None);
        assert_eq!(mapper.url_for("plain"), None);

        let fallback = Url::parse("https://fallback.example").expect("url");
        assert_eq!(mapper.url_value_for("blank", fallback.clone()), fallback);
    }

    #[test]
    fn primitive_arrays_are_all_or_nothing() {
        let doc = json!({"ints": [1, 2, 3], "mixed": [1, "two", 3]});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert_eq!(mapper.array_for::<i64>("ints"), Some(vec![1, 2, 3]));
        assert_eq!(mapper.array_for::<i64>("mixed"), None);
        assert_eq!(mapper.array_value_for::<i64>("mixed"), Vec::<i64>::new());
        assert_eq!(mapper.array_value_for::<i64>("gone"), Vec::<i64>::new());
    }

    #[test]
    fn primitive_sets_dedup() {
        let doc = json!({"indices": [0, 7, 7, 0]});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        let set = mapper.set_value_for::<i64>("indices");
        assert_eq!(set, HashSet::from([0, 7]));
        assert!(mapper.set_value_for::<i64>("gone").is_empty());
    }

    #[test]
    fn dictionary_accessor_falls_back_to_empty() {
        let doc = json!({"meta": {"k": "v"}, "scalar": 3});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert_eq!(
            mapper.dictionary_for("meta").and_then(|m| m.get("k")),
            Some(&json!("v"))
        );
        assert_eq!(mapper.dictionary_for("scalar"), None);
        assert!(mapper.dictionary_value_for("scalar").is_empty());
        assert!(mapper.dictionary_value_for("gone").is_empty());
    }

    #[test]
    fn keyed_date_parses_and_misses_quietly() {
        let doc = json!({"at": "2015-02-09T18:55:14Z", "bad": "tuesday-ish"});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        let parsed = mapper.date_for("at", "stamp").expect("date");
        assert_eq!(parsed.unix_timestamp(), 1_423_508_114);
        assert_eq!(mapper.date_for("bad", "stamp"), None);
        assert_eq!(mapper.date_for("at", "unregistered"), None);
        assert!(
            log.entries()
                .iter()
                .any(|miss| miss.kind() == MissKind::UnknownFormat)
        );
    }

    #[test]
    fn functional_date_transforms() {
        let doc = json!({"epoch": 1_423_508_114i64, "iso": "2015-02-09T18:55:14Z"});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        let from_int = mapper
            .date_from_int_for("epoch", |secs| OffsetDateTime::from_unix_timestamp(secs).ok())
            .expect("date");
        assert_eq!(from_int.unix_timestamp(), 1_423_508_114);

        let from_string = mapper
            .date_from_string_for("iso", |text| DateFormat::Rfc3339.parse(text))
            .expect("date");
        assert_eq!(from_string, from_int);

        assert_eq!(mapper.date_from_int_for("gone", |_| None), None);
    }

    #[test]
    fn nested_objects_arrays_and_sets() {
        let doc = json!({
            "pair": {"left": 1, "right": 2},
            "pairs": [
                {"left": 1, "right": 2},
                {"left": 1, "right": 2},
                {"left": 3, "right": 4}
            ],
            "broken": [{"left": 1}, 5]
        });
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        assert_eq!(
            mapper.object_for::<Pair>("pair"),
            Some(Pair { left: 1, right: 2 })
        );
        assert_eq!(mapper.object_for::<Pair>("gone"), None);

        let pairs = mapper.object_array_for::<Pair>("pairs").expect("pairs");
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], Pair { left: 1, right: 2 });
        assert_eq!(pairs[2], Pair { left: 3, right: 4 });

        assert_eq!(mapper.object_array_for::<Pair>("broken"), None);
        assert!(mapper.object_array_value_for::<Pair>("gone").is_empty());

        let set = mapper.object_set_value_for::<Pair>("pairs");
        assert_eq!(set.len(), 2);
        assert!(mapper.object_set_for::<Pair>("gone").is_none());
    }

    #[test]
    fn transform_pipeline_converts_and_defaults() {
        let doc = json!({"hex": "ff8800", "num": 12});
        let formats = registry();
        let log = MissLog::new();
        let mapper = mapper(&doc, &formats, &log);

        let rgb = mapper.transform("hex", |text: String| {
            if text.len() != 6 {
                return None;
            }
            let channel = |range| u8::from_str_radix(&text[range], 16).ok();
            Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
        });
        assert_eq!(rgb, Some((0xff, 0x88, 0x00)));

        assert_eq!(mapper.transform("num", |_: String| Some(())), None);
        assert_eq!(
            mapper.transform_value("num", 0, |value: i64| value * 2),
            24
        );
        assert_eq!(
            mapper.transform_value("gone", 9, |value: i64| value * 2),
            9
        );
    }
}
