//! Модель данных: неизменяемое рекурсивное дерево тегов.
//!
//! - [`value`] — тип `Tag`, карта `TagMap` и отношение равенства
//! - [`builder`] — построение дерева снизу вверх перед кодированием

pub mod builder;
pub mod value;

pub use builder::{ListBuilder, MapBuilder};
pub use value::{Tag, TagMap};
