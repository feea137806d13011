//! Определение opcode-констант бинарного формата TBIN.
//!
//! Каждый узел кодируется однобайтовым opcode. Значения стабильны в рамках
//! одной версии формата. Используется в модулях `decode` и `encode`.

/// Начало вложенной карты
pub const STRUCTURE_BEGIN: u8 = 0x01;
/// Пустая вложенная карта (однобайтовая форма)
pub const STRUCTURE_EMPTY: u8 = 0x02;
/// Конец текущей карты
pub const STRUCTURE_TERMINATE: u8 = 0x03;
/// Начало вложенного списка
pub const LIST_BEGIN: u8 = 0x04;
/// Пустой вложенный список (однобайтовая форма)
pub const LIST_EMPTY: u8 = 0x05;
/// Конец текущего списка
pub const LIST_TERMINATE: u8 = 0x06;

/// Unit-лист, без полезной нагрузки
pub const TAG_UNIT: u8 = 0x10;
/// Логическое значение (один байт)
pub const TAG_BOOLEAN: u8 = 0x11;
/// Целое i8
pub const TAG_BYTE: u8 = 0x12;
/// Целое i16
pub const TAG_INT16: u8 = 0x13;
/// Целое i32
pub const TAG_INT32: u8 = 0x14;
/// Целое i64
pub const TAG_INT64: u8 = 0x15;
/// Число с плавающей точкой f32
pub const TAG_FLOAT32: u8 = 0x16;
/// Число с плавающей точкой f64
pub const TAG_FLOAT64: u8 = 0x17;
/// Массив байтов (варинт-длина + данные)
pub const TAG_BYTE_ARRAY: u8 = 0x18;
/// Строка-литерал (варинт-длина + UTF-8)
pub const TAG_STRING: u8 = 0x19;
/// Строка-ссылка на словарь (один байт id)
pub const TAG_STRING_REF: u8 = 0x1A;

/// Может ли байт открывать узел (а не терминировать структуру).
pub(crate) fn is_node_opcode(opcode: u8) -> bool {
    matches!(
        opcode,
        STRUCTURE_BEGIN | STRUCTURE_EMPTY | LIST_BEGIN | LIST_EMPTY | TAG_UNIT..=TAG_STRING_REF
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcodes_are_mutually_exclusive() {
        let all = [
            STRUCTURE_BEGIN,
            STRUCTURE_EMPTY,
            STRUCTURE_TERMINATE,
            LIST_BEGIN,
            LIST_EMPTY,
            LIST_TERMINATE,
            TAG_UNIT,
            TAG_BOOLEAN,
            TAG_BYTE,
            TAG_INT16,
            TAG_INT32,
            TAG_INT64,
            TAG_FLOAT32,
            TAG_FLOAT64,
            TAG_BYTE_ARRAY,
            TAG_STRING,
            TAG_STRING_REF,
        ];
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_terminators_are_not_node_opcodes() {
        assert!(!is_node_opcode(STRUCTURE_TERMINATE));
        assert!(!is_node_opcode(LIST_TERMINATE));
        assert!(is_node_opcode(STRUCTURE_BEGIN));
        assert!(is_node_opcode(TAG_STRING_REF));
        assert!(!is_node_opcode(0xEE));
    }
}
