use crate::cursor::ByteCursor;
use crate::node::{deser_record, peek_record, List};
use crate::serde::{
    Category, CodecCtx, Deser, ElemCount, NodeTag, RecordSize, BASE_LEN, ELEM_COUNT_LEN,
    EMPTY_SLOT_LEN, RECORD_SIZE_LEN, SLOT_INDEX_LEN, TAG_LEN,
};
use anyhow::{anyhow, ensure, Result};
use std::collections::HashSet;

#[derive(Clone, Copy, Debug)]
enum Slot {
    Empty,
    Present { tag: NodeTag, rec_len: usize },
}

impl Slot {
    fn len(self) -> usize {
        match self {
            Slot::Empty => EMPTY_SLOT_LEN,
            Slot::Present { rec_len, .. } => SLOT_INDEX_LEN + rec_len,
        }
    }
}

impl List {
    fn deser_into(&mut self, buf: &[u8], ctx: &mut CodecCtx) -> Result<()> {
        let mut r = ByteCursor::new(buf).with_diag(ctx.cfg().diag_level);

        /* tag */
        let tag = NodeTag::deser(&r).ok_or(anyhow!("truncated list tag"))?;
        ensure!(tag == NodeTag::LIST, "list record has tag {:#06x}", u16::from(tag));
        r.skip(TAG_LEN as i64);

        /* record_size */
        let rec_size = RecordSize::deser(&r).ok_or(anyhow!("truncated list size"))?;
        let rec_end = *rec_size as usize;
        ensure!(
            BASE_LEN + ELEM_COUNT_LEN <= rec_end && rec_end <= buf.len(),
            "list size {rec_end} does not fit its {} byte buffer",
            buf.len()
        );
        r.skip(RECORD_SIZE_LEN as i64);

        /* elem_count */
        let elem_count = ElemCount::deser(&r).ok_or(anyhow!("truncated list count"))?;
        r.skip(ELEM_COUNT_LEN as i64);

        /* slots */
        let rec = &buf[..rec_end];
        match plan_slots(rec, r.position(), *elem_count) {
            Some(plan) => {
                let mut pos = r.position();
                for slot in plan {
                    self.push_slot(rec, pos, slot, ctx)?;
                    pos += slot.len();
                }
                Ok(())
            }
            None => {
                ctx.diag(format_args!(
                    "{} list slots do not add up to {rec_end} bytes, reading greedily",
                    *elem_count
                ));
                let mut r = ByteCursor::new(rec).with_diag(ctx.cfg().diag_level);
                r.set_position(BASE_LEN + ELEM_COUNT_LEN);
                for i in 0..*elem_count {
                    let slot = read_slot_header(&r, i)?;
                    self.push_slot(rec, r.position(), slot, ctx)?;
                    r.skip(slot.len() as i64);
                }
                Ok(())
            }
        }
    }

    fn push_slot(
        &mut self,
        rec: &[u8],
        pos: usize,
        slot: Slot,
        ctx: &mut CodecCtx,
    ) -> Result<()> {
        let node = match slot {
            Slot::Empty => None,
            Slot::Present { tag, rec_len } => {
                let child_pos = pos + SLOT_INDEX_LEN;
                let mut node = deser_record(tag, &rec[child_pos..child_pos + rec_len], ctx)?;
                if let Some(node) = node.as_mut() {
                    node.adopt();
                }
                node
            }
        };
        self.slots.push(node);
        Ok(())
    }
}

/// Tags a writer puts in a list slot.
fn is_child_tag(tag: NodeTag) -> bool {
    match tag.category() {
        Category::Block | Category::List | Category::String => tag.kind_byte() == 0,
        Category::Primitive => tag.primitive_kind().is_some(),
        Category::RootBlock | Category::Unknown => false,
    }
}

/// Readings of the slot at `pos` that carry `index`, the likeliest last.
/// A zero byte can be an empty marker or the low byte of the index.
fn slot_candidates(rec: &[u8], pos: usize, index: u32) -> Vec<Slot> {
    let mut r = ByteCursor::new(rec);
    let mut alts = vec![];
    if !r.set_position(pos) {
        return alts;
    }
    let first = match r.get_u8() {
        None => return alts,
        Some(first) => first,
    };
    if first == 0 {
        alts.push(Slot::Empty);
    }
    if r.get_u16() == Some(index as u16) {
        let mut ahead = r.clone();
        ahead.skip(SLOT_INDEX_LEN as i64);
        if let Ok((tag, rec_len)) = peek_record(&ahead, rec.len()) {
            if first != 0 || is_child_tag(tag) {
                alts.push(Slot::Present { tag, rec_len });
            }
        }
    }
    alts
}

/// Finds the reading of all `count` slots, starting at `start`, that ends exactly
/// at the end of `rec`. Readings that failed from a given slot and position are not retried.
fn plan_slots(rec: &[u8], start: usize, count: u32) -> Option<Vec<Slot>> {
    if count == 0 {
        return Some(vec![]);
    }
    let mut dead = HashSet::new();
    let mut frames = vec![(start, slot_candidates(rec, start, 0))];
    let mut plan: Vec<Slot> = vec![];
    while let Some((pos, alts)) = frames.last_mut() {
        let pos = *pos;
        let index = plan.len() as u32;
        match alts.pop() {
            None => {
                dead.insert((index, pos));
                frames.pop();
                plan.pop();
            }
            Some(slot) => {
                let next = pos + slot.len();
                if index + 1 == count {
                    if next == rec.len() {
                        plan.push(slot);
                        return Some(plan);
                    }
                } else if next < rec.len() && !dead.contains(&(index + 1, next)) {
                    plan.push(slot);
                    frames.push((next, slot_candidates(rec, next, index + 1)));
                }
            }
        }
    }
    None
}

/// Reads one slot without looking ahead. A non-zero first byte always starts a record,
/// whatever index it carries.
fn read_slot_header(r: &ByteCursor<&[u8]>, index: u32) -> Result<Slot> {
    let first = r
        .get_u8()
        .ok_or(anyhow!("list ends before slot {index}"))?;
    let mut ahead = r.clone();
    ahead.skip(SLOT_INDEX_LEN as i64);
    if first == 0 {
        let present = r.get_u16() == Some(index as u16)
            && peek_record(&ahead, r.len()).is_ok_and(|(tag, _)| is_child_tag(tag));
        if !present {
            return Ok(Slot::Empty);
        }
    }
    r.get_u16()
        .ok_or(anyhow!("truncated slot index at {}", r.position()))?;
    let (tag, rec_len) = peek_record(&ahead, r.len())?;
    Ok(Slot::Present { tag, rec_len })
}

impl Deser for List {
    /// Keeps whatever slots decoded before a failure.
    fn deser_ctx(buf: &[u8], ctx: &mut CodecCtx) -> Self {
        let mut list = List::new();
        if let Err(e) = list.deser_into(buf, ctx) {
            ctx.diag(format_args!("list decoding stopped: {e:#}"));
        }
        list.invalidate_size();
        list
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::{Node, Primitive};
    use crate::serde::Ser;

    #[test]
    fn sparse_layout() {
        let mut list = List::new();
        list.set(2, 0x41u8);
        assert_eq!(list.size(), 6 + 4 + 1 + 1 + (2 + 3));
        let buf = list.ser_solo();
        assert_eq!(
            buf,
            vec![
                0x02, 0x00, // tag
                0x11, 0x00, 0x00, 0x00, // record_size
                0x03, 0x00, 0x00, 0x00, // elem_count
                0x00, // empty
                0x00, // empty
                0x02, 0x00, // index
                0x03, 0x01, 0x41, // child
            ]
        );
        assert_eq!(List::deser_solo(&buf), list);
    }

    #[test]
    fn zero_low_byte_index_is_present() {
        let mut list = List::new();
        list.set(0, 5i32);
        list.set(256, 6i32);
        let back = List::deser_solo(&list.ser_solo());
        assert_eq!(back, list);
        assert_eq!(back.get::<i32>(0), 5);
        assert_eq!(back.get::<i32>(256), 6);
        assert_eq!(back.present().count(), 2);
    }

    #[test]
    fn index_bytes_after_empty_slot_256() {
        let mut list = List::new();
        list.set(257, "AB");
        list.set(258, "x".repeat(3000));
        let buf = list.ser_solo();
        // empty slot 256, then slot 257's index: 00 01 01
        let slot_256 = BASE_LEN + ELEM_COUNT_LEN + 256;
        assert_eq!(&buf[slot_256..slot_256 + 3], &[0x00u8, 0x01, 0x01]);

        let back = List::deser_solo(&buf);
        assert_eq!(back, list);
        assert_eq!(back.get_str(257), "AB");
        assert_eq!(back.get_str(258).len(), 3000);
    }

    #[test]
    fn leading_empty_slots_before_list_child() {
        // slot 0 empty and slot 1 empty read as 00 00, like the index of slot 0
        let mut inner = List::new();
        inner.set(0, 1u8);
        let mut list = List::new();
        list.set(2, inner);
        list.set(3, "tail");
        let back = List::deser_solo(&list.ser_solo());
        assert_eq!(back, list);
        assert_eq!(back.present().map(|(i, _)| i).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn unknown_category_leaves_gap() {
        let mut list = List::new();
        list.set(1, "x");
        list.set(2, 3i16);
        let mut buf = list.ser_solo();
        // retag the string record (after tag, size, count, empty, index) as unknown
        buf[6 + 4 + 1 + 2] = 0x09;
        let back = List::deser_solo(&buf);
        assert_eq!(back.len(), 3);
        assert!(!back.is_present(1));
        assert_eq!(back.get::<i16>(2), 3);
    }

    #[test]
    fn overrunning_child_keeps_prefix() {
        let mut list = List::new();
        list.set(0, true);
        list.set(1, "abc");
        let mut buf = list.ser_solo();
        // string record size points past the list
        let str_size_pos = 6 + 4 + 2 + 3 + 2 + 2;
        buf[str_size_pos] = 0xFF;
        let back = List::deser_solo(&buf);
        assert_eq!(back.len(), 1);
        assert_eq!(back.get_node(0), Some(&Node::Prim(Primitive::Bool(true))));
    }

    #[test]
    fn wrong_tag_is_empty() {
        let mut list = List::new();
        list.set(0, 1u8);
        let mut buf = list.ser_solo();
        buf[0] = 0x01;
        assert!(List::deser_solo(&buf).is_empty());
        assert!(List::deser_solo(&[]).is_empty());
    }

    #[test]
    fn nested_lists() {
        let mut inner = List::new();
        inner.set(1, 2.5f32);
        let mut list = List::new();
        list.set(0, inner);
        let back = List::deser_solo(&list.ser_solo());
        assert_eq!(back.get_list(0).map(|l| l.get::<f32>(1)), Some(2.5));
    }
}
