use crate::cursor::ByteCursor;
use crate::serde::NodeTag;
use derive_more::{Deref, From};
use std::mem;

pub const TAG_LEN: usize = mem::size_of::<NodeTag>();
pub const RECORD_SIZE_LEN: usize = mem::size_of::<RecordSize>();
/// Tag and record size, shared by every non-primitive record.
pub const BASE_LEN: usize = TAG_LEN + RECORD_SIZE_LEN;

pub const ELEM_COUNT_LEN: usize = mem::size_of::<ElemCount>();
pub const SLOT_INDEX_LEN: usize = mem::size_of::<u16>();
pub const EMPTY_SLOT_LEN: usize = mem::size_of::<u8>();
/// Highest list index the 2-byte slot index can hold.
pub const MAX_SLOT_INDEX: usize = u16::MAX as usize;

pub const STR_TABLE_END_LEN: usize = mem::size_of::<StrTableEnd>();
pub const STR_OFFSET_LEN: usize = mem::size_of::<StrTableOffset>();

pub const TEXT_LEN_LEN: usize = mem::size_of::<u16>();
pub const TEXT_TERMINATOR_LEN: usize = mem::size_of::<u8>();
/// Longest text (and key) the 2-byte length prefix can describe.
pub const MAX_TEXT_LEN: usize = u16::MAX as usize;

/// Bytes a text occupies in a string record or a string table:
/// length prefix, text, terminator.
pub fn encoded_text_len(text: &[u8]) -> u32 {
    (TEXT_LEN_LEN + text.len() + TEXT_TERMINATOR_LEN) as u32
}

/// Full length of a non-primitive record, tag and size field included.
#[derive(Deref, From, PartialEq, Eq, Clone, Copy, Debug)]
pub struct RecordSize(u32);
impl RecordSize {
    pub fn deser<B: AsRef<[u8]>>(r: &ByteCursor<B>) -> Option<Self> {
        r.get_u32().map(Self)
    }

    /// Rewrites the size field of the record starting at `rec_pos` when fewer bytes
    /// than `expected` were written, i.e. when the depth bound left children out.
    pub fn patch<B: AsRef<[u8]> + AsMut<[u8]>>(
        w: &mut ByteCursor<B>,
        rec_pos: usize,
        expected: u32,
    ) {
        let end = w.position();
        let written = (end - rec_pos) as u32;
        if written != expected {
            w.set_position(rec_pos + TAG_LEN);
            w.put_u32(written);
            w.set_position(end);
        }
    }
}

#[derive(Deref, From, Clone, Copy, Debug)]
pub struct ElemCount(u32);
impl ElemCount {
    pub fn from_slots<T>(slots: &[T]) -> Self {
        Self(slots.len() as u32)
    }
    pub fn deser<B: AsRef<[u8]>>(r: &ByteCursor<B>) -> Option<Self> {
        r.get_u32().map(Self)
    }
}

/// Where a block's string table ends, less the width of this field.
#[derive(Deref, From, Clone, Copy, Debug)]
pub struct StrTableEnd(u32);
impl StrTableEnd {
    /// `field_pos` is relative to the buffer the reader will see.
    pub fn new(field_pos: usize, str_table_len: u32) -> Self {
        Self(field_pos as u32 + str_table_len)
    }
    pub fn deser<B: AsRef<[u8]>>(r: &ByteCursor<B>) -> Option<Self> {
        r.get_u32().map(Self)
    }
    /// Absolute end of the string table.
    pub fn table_end(self) -> usize {
        self.0 as usize + STR_TABLE_END_LEN
    }
}

/// Write-once offset of a key within its block's string table.
#[derive(Deref, From, PartialEq, Eq, Clone, Copy, Debug)]
pub struct StrTableOffset(u32);
impl StrTableOffset {
    pub fn deser<B: AsRef<[u8]>>(r: &ByteCursor<B>) -> Option<Self> {
        r.get_u32().map(Self)
    }
}

#[derive(Deref, From, PartialEq, Eq, Clone, Copy, Debug)]
pub struct WriteLen(usize);
