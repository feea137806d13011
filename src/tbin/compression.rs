//! Модуль для сжатия и распаковки структурного тела с помощью DEFLATE.
//!
//! Распаковка всегда ограничена верхней границей размера выхода: это
//! изолирует радиус поражения decompression-бомбы буфером, который сам
//! подчиняется бюджету аллокаций декодера.

use std::io::{Read, Write};

use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};

use crate::error::{CodecResult, FormatError};

/// Уровень сжатия по умолчанию: баланс между скоростью и размером.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Сжимает срез байтов алгоритмом DEFLATE.
pub fn compress_block(data: &[u8], level: u32) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data)?;
    encoder.finish()
}

/// Распаковывает DEFLATE-блок, не позволяя выходу превысить `max_len` байт.
///
/// # Errors
/// - [`FormatError::AllocationDenied`], если распакованные данные длиннее
///   `max_len` (вход отвергается, буфер большего размера не создаётся)
/// - ошибка ввода-вывода, если поток не является корректным DEFLATE
pub fn decompress_block(data: &[u8], max_len: u64) -> CodecResult<Vec<u8>> {
    let mut out = Vec::new();
    // take(max_len + 1): лишний байт выдаёт переполнение без полной распаковки
    let limit = max_len.saturating_add(1);
    let mut decoder = DeflateDecoder::new(data).take(limit);
    decoder.read_to_end(&mut out)?;

    if out.len() as u64 > max_len {
        return Err(FormatError::AllocationDenied {
            requested: out.len() as u64,
            remaining: max_len,
        }
        .into());
    }
    Ok(out)
}
