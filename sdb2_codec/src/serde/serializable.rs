use crate::config::CodecConfig;
use crate::cursor::ByteCursor;
use crate::serde::{NodeTag, WriteLen};
use anyhow::Result;
use std::fmt;
use std::io::Write;

/// Per-call state threaded through the recursive serializer and deserializer.
pub struct CodecCtx<'c> {
    cfg: &'c CodecConfig,
    depth: usize,
}

impl<'c> CodecCtx<'c> {
    pub fn new(cfg: &'c CodecConfig) -> Self {
        Self { cfg, depth: 0 }
    }

    pub fn cfg(&self) -> &CodecConfig {
        self.cfg
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether a container nested one level below the current one would exceed the configured depth.
    pub fn at_limit(&self) -> bool {
        self.depth >= self.cfg.max_depth
    }

    /// Runs `f` one container deeper, unless that would exceed the configured depth.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.at_limit() {
            self.diag(format_args!(
                "container at depth {} exceeds max depth {}",
                self.depth + 1,
                self.cfg.max_depth
            ));
            return None;
        }
        self.depth += 1;
        let ret = f(self);
        self.depth -= 1;
        Some(ret)
    }

    pub fn diag(&self, args: fmt::Arguments) {
        self.cfg.diag(args)
    }
}

pub trait Ser {
    fn tag(&self) -> NodeTag;

    /// Serialized length in bytes, when no container is cut off by the depth bound.
    fn size(&self) -> u32;

    /// Writes the whole record at the cursor.
    fn ser_into(&self, w: &mut ByteCursor<Vec<u8>>, ctx: &mut CodecCtx);

    fn ser_solo_with(&self, cfg: &CodecConfig) -> Vec<u8> {
        let mut w = ByteCursor::with_capacity(self.size() as usize).with_diag(cfg.diag_level);
        self.ser_into(&mut w, &mut CodecCtx::new(cfg));
        /* containers cut off by the depth bound leave the tail unwritten */
        let written = w.position();
        let mut buf = w.into_inner();
        buf.truncate(written);
        buf
    }

    fn ser_solo(&self) -> Vec<u8> {
        self.ser_solo_with(&CodecConfig::default())
    }

    fn ser<W: Write>(&self, w: &mut W) -> Result<WriteLen> {
        let buf = self.ser_solo();
        w.write_all(&buf)?;
        Ok(WriteLen::from(buf.len()))
    }
}

/// Decoding never fails outright: malformed input yields an empty or partial value,
/// and the reason is reported through [`CodecConfig::diag_level`].
pub trait Deser: Sized {
    fn deser_ctx(buf: &[u8], ctx: &mut CodecCtx) -> Self;

    fn deser_with(buf: &[u8], cfg: &CodecConfig) -> Self {
        Self::deser_ctx(buf, &mut CodecCtx::new(cfg))
    }

    fn deser_solo(buf: &[u8]) -> Self {
        Self::deser_with(buf, &CodecConfig::default())
    }
}
