//! Построение дерева тегов снизу вверх.
//!
//! Дерево неизменяемо после завершения: builder финализируется вызовом
//! `finish()`, и только готовый результат передаётся кодеку. «Живые»
//! изменяемые структуры приложения конвертируются в эту форму снаружи.

use super::{Tag, TagMap};

/// Builder для [`TagMap`].
///
/// # Examples
/// ```
/// use tagbin::{MapBuilder, Tag};
///
/// let map = MapBuilder::new()
///     .put("answer", 42i32)
///     .put("greeting", "hello")
///     .finish();
/// assert_eq!(map.get("answer"), Some(&Tag::Int(42)));
/// ```
#[derive(Debug, Default)]
pub struct MapBuilder {
    map: TagMap,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет пару ключ-значение; повторный ключ заменяет прежнее значение.
    pub fn put(mut self, key: impl Into<String>, value: impl Into<Tag>) -> Self {
        self.map.insert(key.into(), value.into());
        self
    }

    /// Финализирует карту. После этого она неизменяема.
    pub fn finish(self) -> TagMap {
        self.map
    }
}

/// Builder для [`Tag::List`].
#[derive(Debug, Default)]
pub struct ListBuilder {
    items: Vec<Tag>,
}

impl ListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет элемент в конец списка; порядок значим, дубликаты допустимы.
    pub fn push(mut self, value: impl Into<Tag>) -> Self {
        self.items.push(value.into());
        self
    }

    /// Финализирует список.
    pub fn finish(self) -> Tag {
        Tag::List(self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_builder_put_and_replace() {
        let map = MapBuilder::new()
            .put("a", 1i32)
            .put("b", "text")
            .put("a", 2i32)
            .finish();

        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&Tag::Int(2)));
        assert_eq!(map.get("b"), Some(&Tag::String("text".into())));
    }

    #[test]
    fn test_list_builder_keeps_order_and_duplicates() {
        let list = ListBuilder::new().push("x").push(1i8).push("x").finish();
        match list {
            Tag::List(items) => {
                assert_eq!(items.len(), 3);
                assert_eq!(items[0], items[2]);
            }
            other => panic!("Expected Tag::List, got: {other:?}"),
        }
    }

    #[test]
    fn test_nested_construction() {
        let inner = MapBuilder::new().put("k", ()).finish();
        let root = MapBuilder::new()
            .put("inner", inner)
            .put("list", ListBuilder::new().push(true).finish())
            .finish();

        assert!(matches!(root.get("inner"), Some(Tag::Map(m)) if m.len() == 1));
        assert!(matches!(root.get("list"), Some(Tag::List(l)) if l.len() == 1));
    }
}
