use crate::cursor::ByteCursor;
use crate::node::string::ser_text;
use crate::node::Block;
use crate::serde::{
    encoded_text_len, ser_footer, ser_header, CodecCtx, NodeTag, RecordSize, Ser, StrTableEnd,
    BASE_LEN, FOOTER_LEN, HEADER_LEN, STR_OFFSET_LEN, STR_TABLE_END_LEN,
};

impl Block {
    pub fn str_table_len(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| encoded_text_len(e.key.as_bytes()))
            .sum()
    }

    /// Length of the block record alone, without a root's header and footer.
    pub fn record_size(&self) -> u32 {
        if let Some(size) = self.cached_size.get() {
            return size;
        }
        let mut size = (BASE_LEN + STR_TABLE_END_LEN) as u32 + self.str_table_len();
        for e in self.entries.iter() {
            size += STR_OFFSET_LEN as u32 + e.node.size();
        }
        self.cached_size.set(Some(size));
        size
    }
}

impl Ser for Block {
    fn tag(&self) -> NodeTag {
        if self.has_parent {
            NodeTag::BLOCK
        } else {
            NodeTag::ROOT_BLOCK
        }
    }

    fn size(&self) -> u32 {
        let frame_len = if self.is_root() {
            (HEADER_LEN + FOOTER_LEN) as u32
        } else {
            0
        };
        self.record_size() + frame_len
    }

    fn ser_into(&self, w: &mut ByteCursor<Vec<u8>>, ctx: &mut CodecCtx) {
        let base = w.position();

        if self.is_root() {
            ser_header(w);
        }
        let rec_pos = w.position();

        /* tag */
        w.put_u16(self.tag().into());

        /* record_size */
        w.put_u32(self.record_size());

        /* str_table_end */
        let str_table_end = StrTableEnd::new(w.position() - base, self.str_table_len());
        w.put_u32(*str_table_end);

        /* str_table */
        for e in self.entries.iter() {
            ser_text(w, e.key.as_bytes());
        }

        /* data */
        for e in self.entries.iter() {
            if e.node.is_container() && ctx.at_limit() {
                ctx.diag(format_args!(
                    "leaving out {:?} at depth {}",
                    e.key,
                    ctx.depth() + 1
                ));
                continue;
            }
            w.put_u32(*e.str_offset);
            e.node.ser_into(w, ctx);
        }

        RecordSize::patch(w, rec_pos, self.record_size());

        if self.is_root() {
            ser_footer(w);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::CodecConfig;
    use crate::serde::FOOTER;

    #[test]
    fn root_layout() {
        let mut block = Block::new();
        block.set("a", 7u8);
        assert_eq!(block.record_size(), 21);
        assert_eq!(block.size(), 52);

        let buf = block.ser_solo();
        assert_eq!(buf.len(), 52);
        assert_eq!(&buf[..14], b"SDB2\0\0\0\0\0\0HDRE");
        assert_eq!(
            &buf[14..35],
            &[
                0x04, 0x00, // tag
                0x15, 0x00, 0x00, 0x00, // record_size
                0x18, 0x00, 0x00, 0x00, // str_table_end
                0x01, 0x00, b'a', 0x00, // str_table
                0x00, 0x00, 0x00, 0x00, // str_offset
                0x03, 0x01, 0x07, // child
            ]
        );
        assert_eq!(&buf[35..], &FOOTER[..]);
    }

    #[test]
    fn str_table_end_is_relative_to_reader_buffer() {
        let mut inner = Block::new();
        inner.set("key", 1i32);
        inner.set("other", 2i32);
        let mut root = Block::new();
        root.set("a", 0u8);
        root.set("inner", inner);

        let buf = root.ser_solo();
        let root_field = u32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]);
        assert_eq!(root_field, 20 + root.str_table_len());

        let inner_bytes = root
            .get_block("inner")
            .map(|b| b.ser_solo())
            .unwrap_or_default();
        let inner_field = u32::from_le_bytes([
            inner_bytes[6],
            inner_bytes[7],
            inner_bytes[8],
            inner_bytes[9],
        ]);
        assert_eq!(inner_field, 6 + (2 + 3 + 1) + (2 + 5 + 1));
        assert_eq!(&inner_bytes[..2], &[0x01u8, 0x00]);
    }

    #[test]
    fn over_deep_entry_is_left_out() {
        let mut inner = Block::new();
        inner.set("x", 1u8);
        let mut block = Block::new();
        block.set("before", 1i16);
        block.set("inner", inner);
        block.set("after", 2i16);

        let cfg = CodecConfig {
            max_depth: 0,
            ..CodecConfig::silent()
        };
        let inner_len =
            STR_OFFSET_LEN as u32 + block.get_block("inner").map(|b| b.size()).unwrap_or_default();
        assert_eq!(inner_len, 4 + 21);
        let buf = block.ser_solo_with(&cfg);
        assert_eq!(buf.len() as u32, block.size() - inner_len);

        let rec_size = u32::from_le_bytes([buf[16], buf[17], buf[18], buf[19]]);
        assert_eq!(rec_size, block.record_size() - inner_len);
        assert_eq!(&buf[buf.len() - FOOTER_LEN..], &FOOTER[..]);
    }

    #[test]
    fn nested_size_has_no_frame() {
        let mut outer = Block::new();
        outer.set("inner", Block::new());
        let inner = outer.get_block("inner").map(|b| b.size());
        assert_eq!(inner, Some(10));
        assert_eq!(outer.record_size(), 10 + 8 + 4 + 10);
    }
}
