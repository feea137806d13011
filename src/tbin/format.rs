use crate::error::FormatError;

/// «Магическое» начало файла: ASCII-буквы «TBIN».
pub const FILE_MAGIC: &[u8; 4] = b"TBIN";

/// Байт компрессии в заголовке: тело не сжато.
pub const NO_COMPRESSION: i8 = -1;

/// Поддерживаемые версии формата TBIN.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatVersion {
    V1 = 1,
    // В будущем: V2 = 2, V3 = 3 и т.д.
}

impl TryFrom<u8> for FormatVersion {
    type Error = FormatError;
    fn try_from(value: u8) -> Result<Self, FormatError> {
        match value {
            1 => Ok(FormatVersion::V1),
            other => Err(FormatError::UnsupportedVersion(other)),
        }
    }
}

/// Текущая версия формата, как число (для совместимости).
pub const FORMAT_VERSION: u8 = FormatVersion::V1 as u8;
