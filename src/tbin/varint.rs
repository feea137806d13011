//! Variable-length integer encoding (LEB128-style).
//!
//! Экономит место для коротких длин строк и массивов:
//! - 0-127: 1 байт
//! - 128-16383: 2 байта
//! - до u32::MAX: 5 байт максимум

use std::io::{self, Read, Write};

use crate::error::CodecResult;

/// Максимальное кол-во байт для u32 в varint encoding (5 байт)
pub const MAX_VARINT_LEN: usize = 5;

/// Записывает u32 в varint формате.
///
/// # Формат
/// - Каждый байт: 7 бит данных + 1 бит continuation
/// - MSB=1: есть ещё байты
/// - MSB=0: последний байт
///
/// # Examples
/// ```
/// use tagbin::tbin::varint::write_varint;
///
/// let mut buf = Vec::new();
/// write_varint(&mut buf, 127).unwrap();
/// assert_eq!(buf, vec![0x7F]); // 1 байт
///
/// let mut buf = Vec::new();
/// write_varint(&mut buf, 128).unwrap();
/// assert_eq!(buf, vec![0x80, 0x01]); // 2 байта
/// ```
pub fn write_varint<W: Write>(w: &mut W, mut value: u32) -> CodecResult<usize> {
    let mut bytes_written = 0;

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if value != 0 {
            byte |= 0x80; // Continuation bit
        }

        w.write_all(&[byte])?;
        bytes_written += 1;

        if value == 0 {
            break;
        }
    }

    Ok(bytes_written)
}

/// Читает u32 из varint формата.
///
/// # Errors
/// - `UnexpectedEof`, если поток кончился раньше времени
/// - `InvalidData`, если varint длиннее 5 байт (повреждённый вход)
pub fn read_varint<R: Read>(r: &mut R) -> CodecResult<u32> {
    let mut result: u32 = 0;
    let mut shift = 0;

    for i in 0..MAX_VARINT_LEN {
        let mut buf = [0u8; 1];
        r.read_exact(&mut buf)?;

        let byte = buf[0];
        result |= ((byte & 0x7F) as u32) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;

        // NOTE: varint для u32 не бывает длиннее 5 байт
        if i == MAX_VARINT_LEN - 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Varint too long (>{MAX_VARINT_LEN} bytes), possible corruption"),
            )
            .into());
        }
    }

    unreachable!()
}

/// Вычисляет размер varint для числа (без записи).
pub fn varint_size(mut value: u32) -> usize {
    if value == 0 {
        return 1;
    }

    let mut size = 0;
    while value != 0 {
        value >>= 7;
        size += 1;
    }
    size
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_varint_size() {
        assert_eq!(varint_size(0), 1);
        assert_eq!(varint_size(127), 1);
        assert_eq!(varint_size(128), 2);
        assert_eq!(varint_size(16383), 2);
        assert_eq!(varint_size(16384), 3);
        assert_eq!(varint_size(u32::MAX), 5);
    }

    #[test]
    fn test_varint_roundtrip() {
        let test_cases = vec![0, 1, 127, 128, 255, 256, 16383, 16384, 65535, 1_000_000, u32::MAX];

        for &value in &test_cases {
            let mut buf = Vec::new();
            let written = write_varint(&mut buf, value).unwrap();

            let mut cursor = Cursor::new(&buf);
            let decoded = read_varint(&mut cursor).unwrap();

            assert_eq!(decoded, value, "Roundtrip failed for {value}: got {decoded}");
            assert_eq!(written, buf.len(), "Size mismatch for {value}");
            assert_eq!(written, varint_size(value), "Size calculation wrong for {value}");
        }
    }

    #[test]
    fn test_known_encodings() {
        // 300 => 0xAC, 0x02
        let mut buf = Vec::new();
        write_varint(&mut buf, 300).unwrap();
        assert_eq!(buf, vec![0xAC, 0x02]);

        // u32::MAX => 0xFF,0xFF,0xFF,0xFF,0x0F
        let mut buf = Vec::new();
        write_varint(&mut buf, u32::MAX).unwrap();
        assert_eq!(buf, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn test_varint_invalid_long() {
        // 6 байт с continuation bits (невалидно)
        let bad_data = vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut cursor = Cursor::new(bad_data);
        let err = read_varint(&mut cursor).unwrap_err();

        let err_msg = err.to_string();
        assert!(
            err_msg.contains("too long") || err_msg.contains("corruption"),
            "Expected 'too long' error, got: {err_msg}"
        );
    }

    #[test]
    fn test_varint_unexpected_eof() {
        // Неполный varint (continuation bit установлен, но данных нет)
        let incomplete = vec![0x80];
        let mut cursor = Cursor::new(incomplete);
        let err = read_varint(&mut cursor).unwrap_err();

        match err {
            crate::CodecError::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof)
            }
            other => panic!("Expected Io error, got: {other}"),
        }
    }

    #[test]
    fn test_read_leaves_extra_bytes() {
        // varint(300) + лишний 0x42
        let data = vec![0xAC, 0x02, 0x42];
        let mut cursor = Cursor::new(data);
        let v = read_varint(&mut cursor).unwrap();
        assert_eq!(v, 300);

        let mut next = [0u8; 1];
        cursor.read_exact(&mut next).unwrap();
        assert_eq!(next[0], 0x42);
    }
}
