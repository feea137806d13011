//! Модуль бинарного формата TBIN.
//!
//! ## Архитектура
//!
//! Поток данных при записи:
//!
//! ```text
//! TagMap (root) → StringDict::build → write_tree → байтовый поток
//!                                     [опционально DEFLATE]
//! ```
//!
//! и обратный путь при чтении:
//!
//! ```text
//! поток → заголовок → [распаковка] → StringDict::read → read_tree → TagMap
//! ```
//!
//! ## Модули
//!
//! - [`format`] — магия файла и версионирование формата
//! - [`opcodes`] — однобайтовые opcode-константы узлов
//! - [`varint`] — варинт-кодирование длин
//! - [`budget`] — бюджет аллокаций декодера
//! - [`dict`] — словарь повторяющихся строк
//! - [`compression`] — DEFLATE-сжатие структурного тела
//! - [`encode`] — сериализация дерева тегов
//! - [`decode`] — десериализация с защитой от вредоносного входа

pub mod budget;
pub mod compression;
pub mod decode;
pub mod dict;
pub mod encode;
pub mod format;
pub mod opcodes;
pub mod varint;

// Публичный экспорт основных типов и функций из вложенных модулей,
// чтобы упростить доступ к ним из внешнего кода.
pub use budget::*;
pub use compression::*;
pub use decode::*;
pub use dict::*;
pub use encode::*;
pub use format::*;
pub use opcodes::*;
pub use varint::*;
