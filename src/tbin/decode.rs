//! Десериализация дерева тегов из бинарного формата TBIN.
//!
//! Reader зеркален writer'у, но несёт обязанность, которой у writer'а нет:
//! защиту от входа, заявляющего неограниченный объём памяти. Каждое
//! декодируемое значение списывает свою стоимость из [`AllocBudget`]
//! *до* аллокации — маленький крафтовый вход не может заставить reader
//! выделить большой буфер.
//!
//! Машина состояний одного узла:
//!
//! ```text
//! Start → opcode → {скаляр: фикс. payload → Emit}
//!                | {строка/массив: списание бюджета → payload → Emit}
//!                | {карта/список: списание накладных → рекурсия → Emit}
//!                | {терминатор: Stop}
//! ```

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use tracing::debug;

use super::{
    budget::{AllocBudget, LIST_OVERHEAD, MAP_OVERHEAD},
    compression::decompress_block,
    dict::StringDict,
    format::{FormatVersion, FILE_MAGIC},
    opcodes::*,
    varint::read_varint,
};
use crate::{
    error::{CodecResult, FormatError},
    tag::{Tag, TagMap},
};

/// Читает дерево целиком: заголовок, словарь, структурное тело.
///
/// # Errors
/// - [`FormatError::BadMagic`] при несовпадении магии
/// - [`FormatError::UnsupportedVersion`] для версии новее поддерживаемой
/// - [`FormatError::InvalidOpcode`] на неизвестном opcode
/// - [`FormatError::InvalidReference`] на ссылке за границей словаря
/// - [`FormatError::AllocationDenied`] при исчерпании бюджета
/// - `CodecError::Io` на усечённом или повреждённом потоке
pub fn read_tree<R: Read>(r: &mut R, budget: &mut AllocBudget) -> CodecResult<TagMap> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != FILE_MAGIC {
        return Err(FormatError::BadMagic { found: magic }.into());
    }

    let version = FormatVersion::try_from(r.read_u8()?)?;
    let compression = r.read_i8()?;

    if compression >= 0 {
        let compressed_len = r.read_i32::<BigEndian>()?;
        let compressed_len = usize::try_from(compressed_len).map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Negative compressed length: {compressed_len}"),
            )
        })?;

        // сжатый буфер сам материализуется — списываем его до чтения
        budget.charge(compressed_len as u64)?;
        let mut compressed = vec![0u8; compressed_len];
        r.read_exact(&mut compressed)?;

        // распаковка ограничена остатком бюджета: радиус бомбы — этот буфер
        let inflated = decompress_block(&compressed, budget.remaining())?;
        debug!(
            version = version as u8,
            compressed_len,
            inflated_len = inflated.len(),
            "tbin decode: inflated body"
        );
        return read_body(&mut inflated.as_slice(), budget);
    }

    debug!(version = version as u8, "tbin decode: uncompressed body");
    read_body(r, budget)
}

/// Словарь плюс корневая карта.
fn read_body<R: Read>(r: &mut R, budget: &mut AllocBudget) -> CodecResult<TagMap> {
    let dict = StringDict::read(r, budget)?;
    let (root, list_terminated) = read_map(r, &dict, budget)?;
    if list_terminated {
        // LIST_TERMINATE на уровне корня — вне какого-либо списка
        return Err(FormatError::InvalidOpcode(LIST_TERMINATE).into());
    }
    Ok(root)
}

/// Цикл записей карты: по одному opcode за итерацию.
///
/// Возвращает `(карта, false)` на `STRUCTURE_TERMINATE` и `(карта, true)`
/// на `LIST_TERMINATE` — «эта карта закончилась, и объемлющий список тоже».
/// Сигнал потребляет [`read_list`], ровно одним уровнем выше.
fn read_map<R: Read>(
    r: &mut R,
    dict: &StringDict,
    budget: &mut AllocBudget,
) -> CodecResult<(TagMap, bool)> {
    budget.charge(MAP_OVERHEAD)?;
    let mut map = TagMap::new();

    loop {
        let opcode = r.read_u8()?;
        match opcode {
            STRUCTURE_TERMINATE => return Ok((map, false)),
            LIST_TERMINATE => return Ok((map, true)),
            _ => {
                // opcode валидируется до чтения ключа, иначе мусор после него
                // выглядел бы как усечённый поток
                if !is_node_opcode(opcode) {
                    return Err(FormatError::InvalidOpcode(opcode).into());
                }
                let key = read_string(r, dict, budget)?;
                let value = read_value(opcode, r, dict, budget)?;
                map.insert(key, value);
            }
        }
    }
}

/// Цикл элементов списка. У элементов нет ключей.
fn read_list<R: Read>(
    r: &mut R,
    dict: &StringDict,
    budget: &mut AllocBudget,
) -> CodecResult<Vec<Tag>> {
    budget.charge(LIST_OVERHEAD)?;
    let mut items = Vec::new();

    loop {
        let opcode = r.read_u8()?;
        match opcode {
            LIST_TERMINATE => return Ok(items),
            STRUCTURE_BEGIN => {
                let (child, list_terminated) = read_map(r, dict, budget)?;
                items.push(Tag::Map(child));
                if list_terminated {
                    // слитный терминатор: карта и список закрыты одним байтом
                    return Ok(items);
                }
            }
            STRUCTURE_TERMINATE => {
                return Err(FormatError::InvalidOpcode(opcode).into());
            }
            _ => items.push(read_value(opcode, r, dict, budget)?),
        }
    }
}

/// Полезная нагрузка одного узла по его opcode (ключ уже прочитан).
fn read_value<R: Read>(
    opcode: u8,
    r: &mut R,
    dict: &StringDict,
    budget: &mut AllocBudget,
) -> CodecResult<Tag> {
    match opcode {
        TAG_UNIT => Ok(Tag::Unit),
        TAG_BOOLEAN => {
            budget.charge(1)?;
            Ok(Tag::Boolean(r.read_u8()? != 0))
        }
        TAG_BYTE => {
            budget.charge(1)?;
            Ok(Tag::Byte(r.read_i8()?))
        }
        TAG_INT16 => {
            budget.charge(2)?;
            Ok(Tag::Short(r.read_i16::<BigEndian>()?))
        }
        TAG_INT32 => {
            budget.charge(4)?;
            Ok(Tag::Int(r.read_i32::<BigEndian>()?))
        }
        TAG_INT64 => {
            budget.charge(8)?;
            Ok(Tag::Long(r.read_i64::<BigEndian>()?))
        }
        TAG_FLOAT32 => {
            budget.charge(4)?;
            Ok(Tag::Float(r.read_f32::<BigEndian>()?))
        }
        TAG_FLOAT64 => {
            budget.charge(8)?;
            Ok(Tag::Double(r.read_f64::<BigEndian>()?))
        }
        TAG_BYTE_ARRAY => {
            let len = read_varint(r)?;
            budget.charge(len as u64)?;
            let mut bytes = vec![0u8; len as usize];
            r.read_exact(&mut bytes)?;
            Ok(Tag::ByteArray(bytes))
        }
        TAG_STRING => Ok(Tag::String(read_literal(r, budget)?)),
        TAG_STRING_REF => Ok(Tag::String(read_reference(r, dict, budget)?)),
        STRUCTURE_BEGIN => {
            let (map, list_terminated) = read_map(r, dict, budget)?;
            if list_terminated {
                // карта не была элементом списка — сигналу некуда уходить
                return Err(FormatError::InvalidOpcode(LIST_TERMINATE).into());
            }
            Ok(Tag::Map(map))
        }
        STRUCTURE_EMPTY => {
            budget.charge(MAP_OVERHEAD)?;
            Ok(Tag::Map(TagMap::new()))
        }
        LIST_BEGIN => Ok(Tag::List(read_list(r, dict, budget)?)),
        LIST_EMPTY => {
            budget.charge(LIST_OVERHEAD)?;
            Ok(Tag::List(Vec::new()))
        }
        other => Err(FormatError::InvalidOpcode(other).into()),
    }
}

/// Строка с маркером литерал/ссылка — форма, в которой кодируются ключи.
fn read_string<R: Read>(
    r: &mut R,
    dict: &StringDict,
    budget: &mut AllocBudget,
) -> CodecResult<String> {
    let marker = r.read_u8()?;
    match marker {
        TAG_STRING => read_literal(r, budget),
        TAG_STRING_REF => read_reference(r, dict, budget),
        other => Err(FormatError::InvalidOpcode(other).into()),
    }
}

fn read_literal<R: Read>(r: &mut R, budget: &mut AllocBudget) -> CodecResult<String> {
    let len = read_varint(r)?;
    // списание до аллокации — ключевой защитный инвариант
    budget.charge(len as u64)?;
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Ссылка списывает длину строки как литерал: многократный повтор одного
/// id не обходит бюджет.
fn read_reference<R: Read>(
    r: &mut R,
    dict: &StringDict,
    budget: &mut AllocBudget,
) -> CodecResult<String> {
    let id = r.read_u8()?;
    let s = dict.lookup(id)?;
    budget.charge(s.len() as u64)?;
    Ok(s.to_string())
}
