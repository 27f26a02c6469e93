use crate::cursor::ByteCursor;
use anyhow::{anyhow, Result};
use derive_more::{From, Into};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use std::any;
use std::mem;

/// Low byte of a [`NodeTag`].
#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum Category {
    Unknown = 0,
    Block = 1,
    List = 2,
    Primitive = 3,
    RootBlock = 4,
    String = 5,
}
impl TryFrom<u8> for Category {
    type Error = anyhow::Error;
    fn try_from(int: u8) -> Result<Self> {
        Category::from_u8(int).ok_or(anyhow!("Unknown {} {}", any::type_name::<Self>(), int))
    }
}

/// High byte of a primitive's [`NodeTag`].
#[repr(u8)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum PrimitiveKind {
    Boolean = 0,
    Byte = 1,
    Char = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    Float = 6,
    Double = 7,
}
impl TryFrom<u8> for PrimitiveKind {
    type Error = anyhow::Error;
    fn try_from(int: u8) -> Result<Self> {
        PrimitiveKind::from_u8(int).ok_or(anyhow!(
            "Unknown {} {}",
            any::type_name::<Self>(),
            int
        ))
    }
}
impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Width of the value on the wire, tag excluded.
    pub fn width(self) -> usize {
        match self {
            Self::Boolean | Self::Byte => mem::size_of::<u8>(),
            Self::Char | Self::Short => mem::size_of::<u16>(),
            Self::Int | Self::Float => mem::size_of::<u32>(),
            Self::Long | Self::Double => mem::size_of::<u64>(),
        }
    }
}

#[derive(From, Into, PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct NodeTag(u16);
impl NodeTag {
    pub const UNKNOWN: Self = Self::of(Category::Unknown);
    pub const BLOCK: Self = Self::of(Category::Block);
    pub const LIST: Self = Self::of(Category::List);
    pub const ROOT_BLOCK: Self = Self::of(Category::RootBlock);
    pub const STRING: Self = Self::of(Category::String);

    const fn of(cat: Category) -> Self {
        Self(cat as u16)
    }

    pub fn primitive(kind: PrimitiveKind) -> Self {
        let cat = Category::Primitive.to_u16().unwrap_or_default();
        let kind = kind.to_u16().unwrap_or_default();
        Self(cat | (kind << 8))
    }

    pub fn category_byte(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn kind_byte(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Non-primitive categories only match when the high byte is zero.
    pub fn category(self) -> Category {
        match Category::from_u8(self.category_byte()) {
            Some(Category::Primitive) => Category::Primitive,
            Some(cat) if self.kind_byte() == 0 => cat,
            _ => Category::Unknown,
        }
    }

    pub fn primitive_kind(self) -> Option<PrimitiveKind> {
        match self.category() {
            Category::Primitive => PrimitiveKind::from_u8(self.kind_byte()),
            _ => None,
        }
    }

    pub fn to_le_bytes(self) -> [u8; mem::size_of::<u16>()] {
        self.0.to_le_bytes()
    }

    pub fn deser<B: AsRef<[u8]>>(r: &ByteCursor<B>) -> Option<Self> {
        r.get_u16().map(Self)
    }
}
