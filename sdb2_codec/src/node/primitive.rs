use crate::cursor::ByteCursor;
use crate::serde::{CodecCtx, NodeTag, PrimitiveKind, Ser, TAG_LEN};

/// `Char` is a 16-bit code unit.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Primitive {
    Bool(bool),
    Byte(u8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Primitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Boolean,
            Self::Byte(_) => PrimitiveKind::Byte,
            Self::Char(_) => PrimitiveKind::Char,
            Self::Short(_) => PrimitiveKind::Short,
            Self::Int(_) => PrimitiveKind::Int,
            Self::Long(_) => PrimitiveKind::Long,
            Self::Float(_) => PrimitiveKind::Float,
            Self::Double(_) => PrimitiveKind::Double,
        }
    }

    pub fn zero(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => Self::Bool(false),
            PrimitiveKind::Byte => Self::Byte(0),
            PrimitiveKind::Char => Self::Char(0),
            PrimitiveKind::Short => Self::Short(0),
            PrimitiveKind::Int => Self::Int(0),
            PrimitiveKind::Long => Self::Long(0),
            PrimitiveKind::Float => Self::Float(0.0),
            PrimitiveKind::Double => Self::Double(0.0),
        }
    }

    /// Decodes a record expected to hold `kind`.
    /// A record whose tag is not `kind`'s, or which is too short, decodes to `kind`'s zero value.
    pub fn deser_kind(kind: PrimitiveKind, buf: &[u8]) -> Self {
        let mut r = ByteCursor::new(buf);
        if NodeTag::deser(&r) != Some(NodeTag::primitive(kind)) {
            return Self::zero(kind);
        }
        r.skip(TAG_LEN as i64);
        Self::deser_value(kind, &r).unwrap_or(Self::zero(kind))
    }

    fn deser_value(kind: PrimitiveKind, r: &ByteCursor<&[u8]>) -> Option<Self> {
        let prim = match kind {
            PrimitiveKind::Boolean => Self::Bool(r.get_bool()?),
            PrimitiveKind::Byte => Self::Byte(r.get_u8()?),
            PrimitiveKind::Char => Self::Char(r.get_u16()?),
            PrimitiveKind::Short => Self::Short(r.get_u16()? as i16),
            PrimitiveKind::Int => Self::Int(r.get_u32()? as i32),
            PrimitiveKind::Long => Self::Long(r.get_u64()? as i64),
            PrimitiveKind::Float => Self::Float(r.get_f32()?),
            PrimitiveKind::Double => Self::Double(r.get_f64()?),
        };
        Some(prim)
    }
}

impl Ser for Primitive {
    fn tag(&self) -> NodeTag {
        NodeTag::primitive(self.kind())
    }

    fn size(&self) -> u32 {
        (TAG_LEN + self.kind().width()) as u32
    }

    fn ser_into(&self, w: &mut ByteCursor<Vec<u8>>, _ctx: &mut CodecCtx) {
        w.put_u16(self.tag().into());
        match *self {
            Self::Bool(v) => w.put_bool(v),
            Self::Byte(v) => w.put_u8(v),
            Self::Char(v) => w.put_u16(v),
            Self::Short(v) => w.put_u16(v as u16),
            Self::Int(v) => w.put_u32(v as u32),
            Self::Long(v) => w.put_u64(v as u64),
            Self::Float(v) => w.put_f32(v),
            Self::Double(v) => w.put_f64(v),
        }
    }
}
