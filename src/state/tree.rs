//! Shape-tolerant accessors over a parsed nmstate document
//!
//! nmstate output is schemaless from our point of view: any section may be
//! missing or hold an unexpected type. Every accessor returns `None` on a
//! mismatch so callers can skip the subtree.

use serde_yaml::{Mapping, Sequence, Value};

/// The mapping stored under `key`, if `node` is a mapping and the value is one too
pub fn get_mapping<'a>(node: &'a Value, key: &str) -> Option<&'a Mapping> {
    node.as_mapping()?.get(key)?.as_mapping()
}

pub fn get_mapping_mut<'a>(node: &'a mut Value, key: &str) -> Option<&'a mut Mapping> {
    node.as_mapping_mut()?.get_mut(key)?.as_mapping_mut()
}

/// The sequence stored under `key`, if `node` is a mapping and the value is one
pub fn get_sequence<'a>(node: &'a Value, key: &str) -> Option<&'a Sequence> {
    node.as_mapping()?.get(key)?.as_sequence()
}

pub fn get_sequence_mut<'a>(node: &'a mut Value, key: &str) -> Option<&'a mut Sequence> {
    node.as_mapping_mut()?.get_mut(key)?.as_sequence_mut()
}

/// The string stored under `key`
pub fn get_str<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
    as_str(node.as_mapping()?.get(key)?)
}

/// A scalar field as a string; numbers, booleans and nulls are not names
pub fn as_str(field: &Value) -> Option<&str> {
    field.as_str()
}
