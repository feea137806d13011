use std::io;

use thiserror::Error;

pub type CodecResult<T> = Result<T, CodecError>;

/// Верхнеуровневая ошибка кодека: либо отказ самого формата,
/// либо прозрачно проброшенная ошибка потока.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Invalid UTF-8 in string payload: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Нарушения бинарного формата TBIN.
///
/// Любая из этих ошибок терминальна для текущего вызова encode/decode:
/// частичного восстановления формат не предусматривает.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Bad file magic: {found:02x?}")]
    BadMagic { found: [u8; 4] },

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Dictionary reference out of range: id {id} >= {len}")]
    InvalidReference { id: u8, len: usize },

    #[error("Unsupported tag payload: {0}")]
    UnsupportedTag(String),

    #[error("Allocation budget exhausted: requested {requested}, remaining {remaining}")]
    AllocationDenied { requested: u64, remaining: u64 },
}

impl CodecError {
    /// `true`, если ошибка вызвана исчерпанием бюджета аллокаций.
    pub fn is_allocation_denied(&self) -> bool {
        matches!(
            self,
            CodecError::Format(FormatError::AllocationDenied { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_is_transparent() {
        let io = io::Error::new(io::ErrorKind::UnexpectedEof, "boom");
        let err: CodecError = io.into();
        match err {
            CodecError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("Expected Io, got: {other}"),
        }
    }

    #[test]
    fn test_allocation_denied_predicate() {
        let err: CodecError = FormatError::AllocationDenied {
            requested: 100,
            remaining: 10,
        }
        .into();
        assert!(err.is_allocation_denied());

        let err: CodecError = FormatError::InvalidOpcode(0xEE).into();
        assert!(!err.is_allocation_denied());
    }

    #[test]
    fn test_display_messages() {
        let err = FormatError::InvalidOpcode(0x7F);
        assert!(err.to_string().contains("0x7f"));

        let err = FormatError::InvalidReference { id: 9, len: 3 };
        assert!(err.to_string().contains("9 >= 3"));
    }
}
