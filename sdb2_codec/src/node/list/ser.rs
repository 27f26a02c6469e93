use crate::cursor::ByteCursor;
use crate::node::List;
use crate::serde::{
    CodecCtx, ElemCount, NodeTag, RecordSize, Ser, BASE_LEN, ELEM_COUNT_LEN, EMPTY_SLOT_LEN,
    SLOT_INDEX_LEN,
};

impl List {
    fn compute_size(&self) -> u32 {
        let mut size = (BASE_LEN + ELEM_COUNT_LEN) as u32;
        for slot in self.slots.iter() {
            size += match slot {
                None => EMPTY_SLOT_LEN as u32,
                Some(node) => SLOT_INDEX_LEN as u32 + node.size(),
            };
        }
        size
    }
}

impl Ser for List {
    fn tag(&self) -> NodeTag {
        NodeTag::LIST
    }

    fn size(&self) -> u32 {
        match self.cached_size.get() {
            Some(size) => size,
            None => {
                let size = self.compute_size();
                self.cached_size.set(Some(size));
                size
            }
        }
    }

    fn ser_into(&self, w: &mut ByteCursor<Vec<u8>>, ctx: &mut CodecCtx) {
        let rec_pos = w.position();

        /* tag */
        w.put_u16(self.tag().into());

        /* record_size */
        w.put_u32(self.size());

        /* elem_count */
        w.put_u32(*ElemCount::from_slots(&self.slots));

        /* slots */
        for (i, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(node) if node.is_container() && ctx.at_limit() => {
                    ctx.diag(format_args!(
                        "leaving slot {i} empty at depth {}",
                        ctx.depth() + 1
                    ));
                    w.put_u8(0);
                }
                None => w.put_u8(0),
                Some(node) => {
                    w.put_u16(i as u16);
                    node.ser_into(w, ctx);
                }
            }
        }

        RecordSize::patch(w, rec_pos, self.size());
    }
}
