//! # Serialization format
//!
//! The de/serializable node kinds are [`crate::node::Block`],
//! [`crate::node::List`], [`crate::node::SdbString`] and
//! [`crate::node::Primitive`]. All multi-byte integers are little-endian.
//!
//! Every record starts with a 2-byte `tag`. Its low byte is the [`Category`];
//! for primitives the high byte is the [`PrimitiveKind`].
//! Primitives have fixed body lengths, which are not encoded.
//! All other records encode their full length (tag and size field included)
//! right after the tag, so a reader may slice or skip them whole.
//!
//! Only the root block of a document is framed by a header and a footer.
//!
//! ```text
//! struct Document {
//!     signature:          [u8; 4] = "SDB2",
//!     reserved:           u32 = 0,
//!     flags:              u16 = 0,
//!     header_end:         [u8; 4] = "HDRE",
//!     root:               Block (with tag RootBlock),
//!     footer:             [u8; 17] = "THIS IS THE END!\0",
//! }
//!
//! struct Primitive {
//!     tag:                u16 = Primitive | (kind << 8),
//!     value:              [u8; width_of(kind)],
//! }
//!
//! struct String {
//!     tag:                u16 = String,
//!     record_size:        u32,
//!     text_len:           u16,
//!     text:               [u8; text_len],
//!     terminator:         u8 = 0,
//! }
//!
//! struct List {
//!     tag:                u16 = List,
//!     record_size:        u32,
//!     elem_count:         u32,
//!     slots:              [Slot; elem_count],
//! }
//! enum Slot {
//!     Empty {
//!         marker:             u8 = 0,
//!     },
//!     Present {
//!         index:              u16,    // informational; position is the loop counter
//!         child:              Primitive | String | List | Block,
//!     },
//! }
//!
//! struct Block {
//!     tag:                u16 = Block or RootBlock,
//!     record_size:        u32,        // header and footer excluded
//!     str_table_end:      u32,        // see below
//!     str_table:          [Key; entry_count],
//!     data:               [Entry; entry_count],
//! }
//! struct Key {
//!     key_len:            u16,
//!     key:                [u8; key_len],
//!     terminator:         u8 = 0,
//! }
//! struct Entry {
//!     str_offset:         u32,        // into str_table
//!     child:              Primitive | String | List | Block,
//! }
//! ```
//!
//! `str_table_end` holds the position of the field itself, relative to the
//! buffer a reader sees (the whole document for the root, the record for a
//! nested block), plus the length of `str_table`. A reader adds the field's
//! own width to get the absolute end of the table.
//!
//! `str_offset` is assigned when a key is first inserted, as the running sum of
//! the encoded lengths of the keys inserted before it. It is a lookup key into
//! the table and is never recomputed.
//!
//! An empty list slot is a single zero byte with no index. At slot `i`, a
//! zero byte followed by an index equal to `i` and a well-formed record is a
//! present slot; any other zero byte is an empty slot.

mod frame;
mod lengths;
mod serializable;
mod tag;

pub use frame::*;
pub use lengths::*;
pub use serializable::*;
pub use tag::*;
