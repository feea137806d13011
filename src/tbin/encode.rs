//! Сериализация дерева тегов в бинарный формат TBIN.
//!
//! Writer — детерминированная тотальная функция от готового дерева:
//! отказать он может только на ошибке ввода-вывода потока или на
//! непредставимой полезной нагрузке ([`FormatError::UnsupportedTag`]).

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use tracing::debug;

use super::{
    compression::{compress_block, DEFAULT_COMPRESSION_LEVEL},
    dict::StringDict,
    format::{FILE_MAGIC, FORMAT_VERSION, NO_COMPRESSION},
    opcodes::*,
    varint::write_varint,
};
use crate::{
    error::{CodecResult, FormatError},
    tag::{Tag, TagMap},
};

/// Настройки кодирования.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Уровень DEFLATE (0-9); `None` — тело пишется без сжатия.
    pub compression: Option<u32>,
    /// Строить ли словарь строк. Без словаря все строки — литералы.
    pub use_dict: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: None,
            use_dict: true,
        }
    }
}

impl EncodeOptions {
    /// Сжатое тело с уровнем по умолчанию.
    pub fn compressed() -> Self {
        Self {
            compression: Some(DEFAULT_COMPRESSION_LEVEL),
            ..Self::default()
        }
    }
}

/// Записывает дерево целиком: заголовок, словарь, структурное тело.
///
/// При включённом сжатии словарь и тело сначала буферизуются в памяти,
/// затем сжимаются одним DEFLATE-блоком с длиной в заголовке. После
/// возврата никакого наблюдаемого состояния не остаётся.
pub fn write_tree<W: Write>(w: &mut W, root: &TagMap, opts: &EncodeOptions) -> CodecResult<()> {
    let dict = if opts.use_dict {
        StringDict::build(root)
    } else {
        StringDict::empty()
    };

    w.write_all(FILE_MAGIC)?;
    w.write_u8(FORMAT_VERSION)?;

    match opts.compression {
        None => {
            w.write_i8(NO_COMPRESSION)?;
            dict.write(w)?;
            write_map_body(w, root, &dict)?;
            debug!(
                dict_entries = dict.len(),
                compressed = false,
                "tbin encode finished"
            );
        }
        Some(level) => {
            let level = level.min(9);
            w.write_i8(level as i8)?;

            let mut body = Vec::new();
            dict.write(&mut body)?;
            write_map_body(&mut body, root, &dict)?;

            let compressed = compress_block(&body, level)?;
            let len = i32::try_from(compressed.len()).map_err(|_| {
                FormatError::UnsupportedTag(format!(
                    "compressed body of {} bytes",
                    compressed.len()
                ))
            })?;
            w.write_i32::<BigEndian>(len)?;
            w.write_all(&compressed)?;
            debug!(
                dict_entries = dict.len(),
                raw_len = body.len(),
                compressed_len = compressed.len(),
                "tbin encode finished"
            );
        }
    }
    Ok(())
}

/// Записи карты плюс закрывающий `STRUCTURE_TERMINATE`.
fn write_map_body<W: Write>(w: &mut W, map: &TagMap, dict: &StringDict) -> CodecResult<()> {
    for (key, value) in map.iter() {
        write_node(w, Some(key), value, dict)?;
    }
    w.write_u8(STRUCTURE_TERMINATE)?;
    Ok(())
}

/// Один узел: `[opcode][ключ, если мы в карте][payload]`.
///
/// Элементы списка идут без ключа — их идентичность задаёт позиция.
fn write_node<W: Write>(
    w: &mut W,
    key: Option<&str>,
    tag: &Tag,
    dict: &StringDict,
) -> CodecResult<()> {
    w.write_u8(opcode_for(tag, dict))?;
    if let Some(k) = key {
        write_string(w, k, dict)?;
    }

    match tag {
        Tag::Unit => {}
        Tag::Boolean(v) => w.write_u8(*v as u8)?,
        Tag::Byte(v) => w.write_i8(*v)?,
        Tag::Short(v) => w.write_i16::<BigEndian>(*v)?,
        Tag::Int(v) => w.write_i32::<BigEndian>(*v)?,
        Tag::Long(v) => w.write_i64::<BigEndian>(*v)?,
        Tag::Float(v) => w.write_f32::<BigEndian>(*v)?,
        Tag::Double(v) => w.write_f64::<BigEndian>(*v)?,
        Tag::ByteArray(bytes) => {
            write_len(w, bytes.len())?;
            w.write_all(bytes)?;
        }
        Tag::String(s) => match dict.id_of(s) {
            // ссылка строго короче литерала, поэтому всегда предпочитается
            Some(id) => w.write_u8(id)?,
            None => {
                write_len(w, s.len())?;
                w.write_all(s.as_bytes())?;
            }
        },
        Tag::List(items) => {
            if !items.is_empty() {
                for item in items {
                    write_node(w, None, item, dict)?;
                }
                w.write_u8(LIST_TERMINATE)?;
            }
        }
        Tag::Map(m) => {
            if !m.is_empty() {
                write_map_body(w, m, dict)?;
            }
        }
    }
    Ok(())
}

fn opcode_for(tag: &Tag, dict: &StringDict) -> u8 {
    match tag {
        Tag::Unit => TAG_UNIT,
        Tag::Boolean(_) => TAG_BOOLEAN,
        Tag::Byte(_) => TAG_BYTE,
        Tag::Short(_) => TAG_INT16,
        Tag::Int(_) => TAG_INT32,
        Tag::Long(_) => TAG_INT64,
        Tag::Float(_) => TAG_FLOAT32,
        Tag::Double(_) => TAG_FLOAT64,
        Tag::ByteArray(_) => TAG_BYTE_ARRAY,
        Tag::String(s) => {
            if dict.id_of(s).is_some() {
                TAG_STRING_REF
            } else {
                TAG_STRING
            }
        }
        Tag::List(items) => {
            if items.is_empty() {
                LIST_EMPTY
            } else {
                LIST_BEGIN
            }
        }
        Tag::Map(m) => {
            if m.is_empty() {
                STRUCTURE_EMPTY
            } else {
                STRUCTURE_BEGIN
            }
        }
    }
}

/// Строка с собственным маркером литерал/ссылка — так кодируются ключи.
fn write_string<W: Write>(w: &mut W, s: &str, dict: &StringDict) -> CodecResult<()> {
    match dict.id_of(s) {
        Some(id) => {
            w.write_u8(TAG_STRING_REF)?;
            w.write_u8(id)?;
        }
        None => {
            w.write_u8(TAG_STRING)?;
            write_len(w, s.len())?;
            w.write_all(s.as_bytes())?;
        }
    }
    Ok(())
}

fn write_len<W: Write>(w: &mut W, len: usize) -> CodecResult<()> {
    let len = u32::try_from(len)
        .map_err(|_| FormatError::UnsupportedTag(format!("payload of {len} bytes")))?;
    write_varint(w, len)?;
    Ok(())
}
