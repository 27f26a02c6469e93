//! The in-memory tree.
//!
//! Children are owned by their parent container, so a container can never be
//! inserted into itself and no cycles can be built:
//!
//! ```compile_fail
//! use sdb2_codec::node::Block;
//!
//! let mut block = Block::new();
//! block.set("Recursion", block);
//! ```

use crate::cursor::ByteCursor;
use crate::serde::{
    Category, CodecCtx, Deser, NodeTag, RecordSize, Ser, BASE_LEN, TAG_LEN,
};
use anyhow::{anyhow, bail, ensure, Result};

mod block;
mod list;
mod primitive;
mod string;

pub use block::*;
pub use list::*;
pub use primitive::*;
pub use string::*;

#[derive(PartialEq, Clone, Debug)]
pub enum Node {
    Block(Block),
    List(List),
    Str(SdbString),
    Prim(Primitive),
}

impl Node {
    /// Called when the node is placed into a container.
    fn adopt(&mut self) {
        if let Node::Block(block) = self {
            block.mark_nested();
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Block(_) | Node::List(_))
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            _ => None,
        }
    }
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Node::List(list) => Some(list),
            _ => None,
        }
    }
    pub fn as_sdb_string(&self) -> Option<&SdbString> {
        match self {
            Node::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Node::Prim(prim) => Some(prim),
            _ => None,
        }
    }

    /// Empty when the record is not a String or is not valid UTF-8.
    pub fn as_str(&self) -> &str {
        self.as_sdb_string().and_then(SdbString::as_str).unwrap_or("")
    }
}

impl Ser for Node {
    fn tag(&self) -> NodeTag {
        match self {
            Node::Block(block) => block.tag(),
            Node::List(list) => list.tag(),
            Node::Str(s) => s.tag(),
            Node::Prim(prim) => prim.tag(),
        }
    }

    fn size(&self) -> u32 {
        match self {
            Node::Block(block) => block.size(),
            Node::List(list) => list.size(),
            Node::Str(s) => s.size(),
            Node::Prim(prim) => prim.size(),
        }
    }

    /// Containers deeper than the configured bound write nothing.
    /// Parents leave such children out, see [`CodecCtx::at_limit`].
    fn ser_into(&self, w: &mut ByteCursor<Vec<u8>>, ctx: &mut CodecCtx) {
        match self {
            Node::Block(block) => {
                ctx.nested(|ctx| block.ser_into(w, ctx));
            }
            Node::List(list) => {
                ctx.nested(|ctx| list.ser_into(w, ctx));
            }
            Node::Str(s) => s.ser_into(w, ctx),
            Node::Prim(prim) => prim.ser_into(w, ctx),
        }
    }
}

/// Reads the tag of the record at the cursor and the record's full length.
/// Fails unless the whole record lies before `limit`.
pub(crate) fn peek_record(r: &ByteCursor<&[u8]>, limit: usize) -> Result<(NodeTag, usize)> {
    let tag = NodeTag::deser(r).ok_or(anyhow!("truncated tag at {}", r.position()))?;

    let rec_len = match tag.category() {
        Category::Primitive => {
            let kind = tag
                .primitive_kind()
                .ok_or(anyhow!("unknown primitive kind {}", tag.kind_byte()))?;
            TAG_LEN + kind.width()
        }
        _ => {
            let mut ahead = r.clone();
            ahead.skip(TAG_LEN as i64);
            let rec_size = RecordSize::deser(&ahead)
                .ok_or(anyhow!("truncated record size at {}", ahead.position()))?;
            let rec_len = *rec_size as usize;
            ensure!(
                rec_len >= BASE_LEN,
                "record size {rec_len} at {} is smaller than its own header",
                r.position()
            );
            rec_len
        }
    };

    ensure!(
        r.position() + rec_len <= limit,
        "record of {rec_len} bytes at {} overruns {limit}",
        r.position()
    );
    Ok((tag, rec_len))
}

/// Decodes one child record. `Ok(None)` means the record was skipped.
pub(crate) fn deser_record(tag: NodeTag, rec: &[u8], ctx: &mut CodecCtx) -> Result<Option<Node>> {
    let node = match tag.category() {
        Category::RootBlock => bail!("root block nested inside a container"),
        Category::Block => ctx
            .nested(|ctx| Block::deser_ctx(rec, ctx))
            .map(Node::Block),
        Category::List => ctx.nested(|ctx| List::deser_ctx(rec, ctx)).map(Node::List),
        Category::String => Some(Node::Str(SdbString::deser_ctx(rec, ctx))),
        Category::Primitive => tag
            .primitive_kind()
            .map(|kind| Node::Prim(Primitive::deser_kind(kind, rec))),
        Category::Unknown => {
            ctx.diag(format_args!(
                "skipping {} byte record with unknown tag {:#06x}",
                rec.len(),
                u16::from(tag)
            ));
            None
        }
    };
    Ok(node)
}

/// Scalar kinds that can be read out of a container by key or index.
pub trait Scalar: Default + Sized {
    fn from_node(node: &Node) -> Option<Self>;
}

macro_rules! scalar {
    ($t:ty, $variant:ident) => {
        impl Scalar for $t {
            fn from_node(node: &Node) -> Option<Self> {
                match node {
                    Node::Prim(Primitive::$variant(v)) => Some(*v),
                    _ => None,
                }
            }
        }
        impl From<$t> for Node {
            fn from(v: $t) -> Self {
                Node::Prim(Primitive::$variant(v))
            }
        }
    };
}

scalar!(bool, Bool);
scalar!(u8, Byte);
scalar!(u16, Char);
scalar!(i16, Short);
scalar!(i32, Int);
scalar!(i64, Long);
scalar!(f32, Float);
scalar!(f64, Double);

impl From<Primitive> for Node {
    fn from(prim: Primitive) -> Self {
        Node::Prim(prim)
    }
}
impl From<SdbString> for Node {
    fn from(s: SdbString) -> Self {
        Node::Str(s)
    }
}
impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::Str(SdbString::new(s))
    }
}
impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::Str(SdbString::new(s))
    }
}
impl From<Vec<u8>> for Node {
    fn from(bytes: Vec<u8>) -> Self {
        Node::Str(SdbString::new(bytes))
    }
}
impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}
impl From<List> for Node {
    fn from(list: List) -> Self {
        Node::List(list)
    }
}
