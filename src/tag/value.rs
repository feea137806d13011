use std::fmt;

/// A node in the serializable tag tree.
///
/// The tree is immutable once built (see [`MapBuilder`](crate::MapBuilder))
/// and owns all of its children: no sharing, no back references. Dictionary
/// references in the wire format are a serialization-level optimization and
/// never surface here.
#[derive(Debug, Clone)]
pub enum Tag {
    /// Carries no payload.
    Unit,
    /// One of two values.
    Boolean(bool),
    /// A signed 8-bit integer.
    Byte(i8),
    /// A signed 16-bit integer.
    Short(i16),
    /// A signed 32-bit integer.
    Int(i32),
    /// A signed 64-bit integer.
    Long(i64),
    /// A 32-bit IEEE float.
    Float(f32),
    /// A 64-bit IEEE float.
    Double(f64),
    /// An immutable, fixed-length byte sequence.
    ByteArray(Vec<u8>),
    /// Immutable UTF-8 text.
    String(String),
    /// An ordered sequence of tags; duplicates allowed.
    List(Vec<Tag>),
    /// Unique string keys mapped to tags; key order is not significant.
    Map(TagMap),
}

impl Tag {
    /// Строит байтовый лист из произвольного источника байтов.
    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Tag::ByteArray(b.into())
    }

    /// Целочисленное значение, если тег — целочисленный лист.
    pub(crate) fn as_int(&self) -> Option<i64> {
        match self {
            Tag::Byte(v) => Some(*v as i64),
            Tag::Short(v) => Some(*v as i64),
            Tag::Int(v) => Some(*v as i64),
            Tag::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Числовое значение как f64, если тег — любой числовой лист.
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            Tag::Byte(v) => Some(*v as f64),
            Tag::Short(v) => Some(*v as f64),
            Tag::Int(v) => Some(*v as f64),
            Tag::Long(v) => Some(*v as f64),
            Tag::Float(v) => Some(*v as f64),
            Tag::Double(v) => Some(*v),
            _ => None,
        }
    }

    fn is_float(&self) -> bool {
        matches!(self, Tag::Float(_) | Tag::Double(_))
    }
}

/// Кросс-типовое числовое равенство: целые сравниваются как i64,
/// при участии float обе стороны приводятся к f64, NaN == NaN.
fn numeric_eq(a: &Tag, b: &Tag) -> bool {
    if !a.is_float() && !b.is_float() {
        return match (a.as_int(), b.as_int()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x.is_nan() && y.is_nan()) || x == y,
        _ => false,
    }
}

/// ByteArray равен списку байто-значных числовых тегов той же длины;
/// байты массива трактуются как знаковые.
fn bytes_eq_list(bytes: &[u8], list: &[Tag]) -> bool {
    bytes.len() == list.len()
        && bytes
            .iter()
            .zip(list)
            .all(|(b, t)| t.as_int() == Some(*b as i8 as i64))
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        use Tag::*;
        match (self, other) {
            (Unit, Unit) => true,
            (Boolean(a), Boolean(b)) => a == b,
            (String(a), String(b)) => a == b,
            (ByteArray(a), ByteArray(b)) => a == b,
            (ByteArray(a), List(l)) | (List(l), ByteArray(a)) => bytes_eq_list(a, l),
            (List(a), List(b)) => a == b,
            (Map(a), Map(b)) => a == b,
            (a, b) if a.as_f64().is_some() && b.as_f64().is_some() => numeric_eq(a, b),
            _ => false,
        }
    }
}

// NaN == NaN делает отношение рефлексивным, так что Eq корректен.
impl Eq for Tag {}

/// An unordered collection of unique `String → Tag` pairs.
///
/// Entries keep their insertion order so that encoding is deterministic, but
/// equality ignores order entirely: two maps with the same pairs are equal.
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    entries: Vec<(String, Tag)>,
}

impl TagMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Вставка с заменой по ключу. Доступна только изнутри крейта:
    /// публичное построение идёт через `MapBuilder`.
    pub(crate) fn insert(&mut self, key: String, value: Tag) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Returns the tag stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Tag> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Tag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for TagMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.get(k) == Some(v))
    }
}

impl Eq for TagMap {}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagMap({} entries)", self.len())
    }
}

// -----------------------------------------------------------------------------
//  From-конверсии для листовых типов
// -----------------------------------------------------------------------------

impl From<()> for Tag {
    fn from(_: ()) -> Self {
        Tag::Unit
    }
}

impl From<bool> for Tag {
    fn from(v: bool) -> Self {
        Tag::Boolean(v)
    }
}

impl From<i8> for Tag {
    fn from(v: i8) -> Self {
        Tag::Byte(v)
    }
}

impl From<i16> for Tag {
    fn from(v: i16) -> Self {
        Tag::Short(v)
    }
}

impl From<i32> for Tag {
    fn from(v: i32) -> Self {
        Tag::Int(v)
    }
}

impl From<i64> for Tag {
    fn from(v: i64) -> Self {
        Tag::Long(v)
    }
}

impl From<f32> for Tag {
    fn from(v: f32) -> Self {
        Tag::Float(v)
    }
}

impl From<f64> for Tag {
    fn from(v: f64) -> Self {
        Tag::Double(v)
    }
}

impl From<&str> for Tag {
    fn from(v: &str) -> Self {
        Tag::String(v.to_string())
    }
}

impl From<String> for Tag {
    fn from(v: String) -> Self {
        Tag::String(v)
    }
}

impl From<Vec<Tag>> for Tag {
    fn from(v: Vec<Tag>) -> Self {
        Tag::List(v)
    }
}

impl From<TagMap> for Tag {
    fn from(v: TagMap) -> Self {
        Tag::Map(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cross_type_equality() {
        assert_eq!(Tag::Byte(1), Tag::Int(1));
        assert_eq!(Tag::Short(-5), Tag::Long(-5));
        assert_eq!(Tag::Int(7), Tag::Double(7.0));
        assert_eq!(Tag::Float(2.5), Tag::Double(2.5));
        assert_ne!(Tag::Int(7), Tag::Double(7.5));
        assert_ne!(Tag::Boolean(true), Tag::Byte(1));
    }

    #[test]
    fn test_large_integers_compare_exactly() {
        // f64 не различил бы эти два значения
        assert_ne!(Tag::Long(i64::MAX), Tag::Long(i64::MAX - 1));
        assert_eq!(Tag::Long(i64::MAX), Tag::Long(i64::MAX));
    }

    #[test]
    fn test_nan_equals_nan() {
        assert_eq!(Tag::Double(f64::NAN), Tag::Double(f64::NAN));
        assert_eq!(Tag::Float(f32::NAN), Tag::Double(f64::NAN));
        assert_ne!(Tag::Double(f64::NAN), Tag::Double(0.0));
    }

    #[test]
    fn test_byte_array_equals_byte_list() {
        let arr = Tag::bytes(vec![0x01, 0x02, 0xFF]);
        let list = Tag::List(vec![Tag::Byte(1), Tag::Byte(2), Tag::Byte(-1)]);
        assert_eq!(arr, list);
        assert_eq!(list, arr);

        let shorter = Tag::List(vec![Tag::Byte(1), Tag::Byte(2)]);
        assert_ne!(arr, shorter);

        let wrong = Tag::List(vec![Tag::Byte(1), Tag::Byte(2), Tag::Byte(3)]);
        assert_ne!(arr, wrong);
    }

    #[test]
    fn test_map_equality_ignores_order() {
        let mut a = TagMap::new();
        a.insert("x".into(), Tag::Int(1));
        a.insert("y".into(), Tag::Int(2));

        let mut b = TagMap::new();
        b.insert("y".into(), Tag::Int(2));
        b.insert("x".into(), Tag::Int(1));

        assert_eq!(a, b);

        b.insert("x".into(), Tag::Int(99));
        assert_ne!(a, b);
    }

    #[test]
    fn test_map_insert_replaces() {
        let mut m = TagMap::new();
        m.insert("k".into(), Tag::Int(1));
        m.insert("k".into(), Tag::Int(2));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("k"), Some(&Tag::Int(2)));
    }

    #[test]
    fn test_iter_preserves_insertion_order() {
        let mut m = TagMap::new();
        m.insert("b".into(), Tag::Unit);
        m.insert("a".into(), Tag::Unit);
        let keys: Vec<_> = m.iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
