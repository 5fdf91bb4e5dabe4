//! PropertyMap: the attribute table row of a feature.

use std::collections::HashMap;
use super::Value;

/// A map of field names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Build a PropertyMap from `(key, value)` pairs.
pub fn properties<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
