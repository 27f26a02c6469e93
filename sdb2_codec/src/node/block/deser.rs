use crate::config::CodecConfig;
use crate::cursor::ByteCursor;
use crate::node::string::parse_text;
use crate::node::{deser_record, peek_record, Block};
use crate::serde::{
    deser_frame, has_signature, CodecCtx, Deser, NodeTag, RecordSize, StrTableEnd,
    StrTableOffset, BASE_LEN, RECORD_SIZE_LEN, STR_OFFSET_LEN, STR_TABLE_END_LEN, TAG_LEN,
};
use anyhow::{anyhow, ensure, Result};

impl Block {
    /// Like [`Deser::deser_with`], but reports why decoding of this block stopped.
    /// Failures inside child containers stay local to them.
    pub fn try_deser(buf: &[u8], cfg: &CodecConfig) -> Result<Block> {
        let mut block = Block::new();
        block.deser_into(buf, &mut CodecCtx::new(cfg))?;
        Ok(block)
    }

    fn deser_into(&mut self, buf: &[u8], ctx: &mut CodecCtx) -> Result<()> {
        let mut r = ByteCursor::new(buf).with_diag(ctx.cfg().diag_level);

        let (exp_tag, limit) = if has_signature(buf) {
            let footer_pos = deser_frame(&mut r)?;
            (NodeTag::ROOT_BLOCK, footer_pos)
        } else {
            (NodeTag::BLOCK, buf.len())
        };
        self.has_parent = exp_tag == NodeTag::BLOCK;
        let rec_pos = r.position();

        /* tag */
        let tag = NodeTag::deser(&r).ok_or(anyhow!("truncated block tag"))?;
        ensure!(
            tag == exp_tag,
            "block record has tag {:#06x}, expected {:#06x}",
            u16::from(tag),
            u16::from(exp_tag)
        );
        r.skip(TAG_LEN as i64);

        /* record_size */
        let rec_size = RecordSize::deser(&r).ok_or(anyhow!("truncated block size"))?;
        let rec_end = rec_pos + *rec_size as usize;
        ensure!(
            BASE_LEN + STR_TABLE_END_LEN <= *rec_size as usize && rec_end <= limit,
            "block size {} at {rec_pos} does not fit before {limit}",
            *rec_size
        );
        r.skip(RECORD_SIZE_LEN as i64);

        /* str_table_end */
        let str_table_start = r.position() + STR_TABLE_END_LEN;
        let str_table_end = StrTableEnd::deser(&r)
            .ok_or(anyhow!("truncated string table end"))?
            .table_end();
        ensure!(
            str_table_start <= str_table_end && str_table_end <= rec_end,
            "string table [{str_table_start}, {str_table_end}) does not fit in block ending at {rec_end}"
        );
        let str_table = &buf[str_table_start..str_table_end];
        r.set_position(str_table_end);

        /* data */
        while r.position() < rec_end {
            ensure!(
                r.position() + STR_OFFSET_LEN <= rec_end,
                "truncated key offset at {}",
                r.position()
            );
            let str_offset =
                StrTableOffset::deser(&r).ok_or(anyhow!("truncated key offset"))?;
            r.skip(STR_OFFSET_LEN as i64);

            let (tag, rec_len) = peek_record(&r, rec_end)?;
            let pos = r.position();
            r.skip(rec_len as i64);

            let key = str_table
                .get(*str_offset as usize..)
                .map(parse_text)
                .unwrap_or_default();
            if key.is_empty() {
                ctx.diag(format_args!(
                    "skipping record at {pos} with empty key (offset {})",
                    *str_offset
                ));
                continue;
            }
            if let Some(node) = deser_record(tag, &buf[pos..pos + rec_len], ctx)? {
                self.set(&String::from_utf8_lossy(key), node);
            }
        }
        Ok(())
    }
}

impl Deser for Block {
    /// Keeps whatever entries decoded before a failure.
    fn deser_ctx(buf: &[u8], ctx: &mut CodecCtx) -> Self {
        let mut block = Block::new();
        if let Err(e) = block.deser_into(buf, ctx) {
            ctx.diag(format_args!("block decoding stopped: {e:#}"));
        }
        block.invalidate_size();
        block
    }
}
