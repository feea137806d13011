//! Tagged binary serialization: a self-describing, recursive binary format
//! for a generic tag tree, with string-dictionary compression and a
//! budgeted, bomb-resistant decoder.
//!
//! ```
//! use tagbin::{read_tree, write_tree, AllocBudget, EncodeOptions, MapBuilder, Tag};
//!
//! let root = MapBuilder::new()
//!     .put("name", "player")
//!     .put("score", 42i32)
//!     .finish();
//!
//! let mut buf = Vec::new();
//! write_tree(&mut buf, &root, &EncodeOptions::default())?;
//!
//! let mut budget = AllocBudget::new(1024 * 1024);
//! let decoded = read_tree(&mut buf.as_slice(), &mut budget)?;
//! assert_eq!(decoded, root);
//! # Ok::<(), tagbin::CodecError>(())
//! ```

/// Common error types: format violations, allocation denial, I/O.
pub mod error;
/// The tag value model: `Tag`, `TagMap`, builders.
pub mod tag;
/// The TBIN wire format: writer, reader, dictionary, compression.
pub mod tbin;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

pub use error::{CodecError, CodecResult, FormatError};
pub use tag::{ListBuilder, MapBuilder, Tag, TagMap};
pub use tbin::{
    read_tree, write_tree, AllocBudget, EncodeOptions, FormatVersion, StringDict, FILE_MAGIC,
    FORMAT_VERSION,
};
