//! A fixed-capacity byte buffer with a movable position.
//!
//! Reads and moves are decoupled: `get_*` never moves the position, callers
//! `skip` explicitly after reading. Writes advance the position by the width
//! of the written field.
//!
//! Nothing here panics or grows the buffer. A move outside `[0, len]` clamps
//! and reports `false`; a write that does not fit is dropped whole.

use log::Level;
use std::mem;

#[derive(Clone, Debug)]
pub struct ByteCursor<B> {
    buf: B,
    pos: usize,
    diag_level: Option<Level>,
}

impl<B: AsRef<[u8]>> ByteCursor<B> {
    pub fn new(buf: B) -> Self {
        Self {
            buf,
            pos: 0,
            diag_level: None,
        }
    }

    /// Report dropped writes and clamped moves at this level.
    pub fn with_diag(mut self, diag_level: Option<Level>) -> Self {
        self.diag_level = diag_level;
        self
    }

    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.len() - self.pos
    }

    pub fn set_position(&mut self, pos: usize) -> bool {
        if pos > self.len() {
            self.diag(format_args!(
                "position {pos} beyond buffer of {} bytes",
                self.len()
            ));
            self.pos = self.len();
            return false;
        }
        self.pos = pos;
        true
    }

    pub fn skip(&mut self, delta: i64) -> bool {
        let target = self.pos as i64 + delta;
        if target < 0 {
            self.diag(format_args!("skip {delta} from {} moves before 0", self.pos));
            self.pos = 0;
            return false;
        }
        self.set_position(target as usize)
    }

    fn peek<const N: usize>(&self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes = self.buf.as_ref().get(self.pos..end)?;
        bytes.try_into().ok()
    }

    pub fn get_u8(&self) -> Option<u8> {
        self.peek::<{ mem::size_of::<u8>() }>().map(u8::from_le_bytes)
    }
    pub fn get_bool(&self) -> Option<bool> {
        self.get_u8().map(|b| b != 0)
    }
    pub fn get_u16(&self) -> Option<u16> {
        self.peek::<{ mem::size_of::<u16>() }>().map(u16::from_le_bytes)
    }
    pub fn get_u32(&self) -> Option<u32> {
        self.peek::<{ mem::size_of::<u32>() }>().map(u32::from_le_bytes)
    }
    pub fn get_u64(&self) -> Option<u64> {
        self.peek::<{ mem::size_of::<u64>() }>().map(u64::from_le_bytes)
    }
    pub fn get_f32(&self) -> Option<f32> {
        self.get_u32().map(f32::from_bits)
    }
    pub fn get_f64(&self) -> Option<f64> {
        self.get_u64().map(f64::from_bits)
    }

    /// The `len` bytes starting at the current position.
    pub fn get_bytes(&self, len: usize) -> Option<&[u8]> {
        let end = self.pos.checked_add(len)?;
        self.buf.as_ref().get(self.pos..end)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }

    pub fn into_inner(self) -> B {
        self.buf
    }

    fn diag(&self, args: std::fmt::Arguments) {
        if let Some(level) = self.diag_level {
            log::log!(level, "{args}");
        }
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> ByteCursor<B> {
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        let end = match self.pos.checked_add(bytes.len()) {
            Some(end) if end <= self.len() => end,
            _ => {
                self.diag(format_args!(
                    "dropping {} byte write at {} in buffer of {} bytes",
                    bytes.len(),
                    self.pos,
                    self.len()
                ));
                return;
            }
        };
        self.buf.as_mut()[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }

    pub fn put_u8(&mut self, v: u8) {
        self.put_bytes(&v.to_le_bytes())
    }
    pub fn put_bool(&mut self, v: bool) {
        self.put_u8(v as u8)
    }
    pub fn put_u16(&mut self, v: u16) {
        self.put_bytes(&v.to_le_bytes())
    }
    pub fn put_u32(&mut self, v: u32) {
        self.put_bytes(&v.to_le_bytes())
    }
    pub fn put_u64(&mut self, v: u64) {
        self.put_bytes(&v.to_le_bytes())
    }
    pub fn put_f32(&mut self, v: f32) {
        self.put_u32(v.to_bits())
    }
    pub fn put_f64(&mut self, v: f64) {
        self.put_u64(v.to_bits())
    }
}

impl ByteCursor<Vec<u8>> {
    /// A zero-filled buffer of exactly `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(vec![0u8; capacity])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn skip_clamps() {
        let mut c = ByteCursor::new([0u8; 4]);

        assert!(c.skip(4));
        assert_eq!(c.position(), 4);

        assert!(!c.skip(1));
        assert_eq!(c.position(), 4);

        assert!(c.skip(-3));
        assert_eq!(c.position(), 1);

        assert!(!c.skip(-2));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn writes_are_little_endian() {
        let mut c = ByteCursor::with_capacity(15);
        c.put_u16(0x0102);
        c.put_u32(0xBEEF_BEEF);
        c.put_u64(0x0807_0605_0403_0201);
        c.put_bool(true);
        assert_eq!(c.position(), 15);
        assert_eq!(
            c.into_inner(),
            vec![
                0x02, 0x01, //
                0xEF, 0xBE, 0xEF, 0xBE, //
                0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, //
                0x01,
            ]
        );
    }

    #[test]
    fn overflowing_write_is_dropped() {
        let mut c = ByteCursor::with_capacity(5);
        c.put_u32(0xFFFF_FFFF);
        c.put_u16(0xAAAA);
        assert_eq!(c.position(), 4);
        c.put_u8(0x11);
        assert_eq!(c.into_inner(), vec![0xFF, 0xFF, 0xFF, 0xFF, 0x11]);
    }

    #[test]
    fn reads_do_not_move() {
        let mut c = ByteCursor::new(&[0xEF, 0xBE, 0xEF, 0xBE, 0x00][..]);
        assert_eq!(c.get_u32(), Some(0xBEEF_BEEF));
        assert_eq!(c.get_u16(), Some(0xBEEF));
        assert_eq!(c.position(), 0);

        c.skip(2);
        assert_eq!(c.get_u32(), None);
        assert_eq!(c.get_u16(), Some(0xBEEF));

        c.skip(3);
        assert_eq!(c.get_u8(), None);
        assert_eq!(c.get_bool(), None);
    }

    #[test]
    fn floats_use_raw_bits() {
        let mut c = ByteCursor::with_capacity(12);
        c.put_f32(std::f32::consts::PI);
        c.put_f64(-0.0);
        c.set_position(0);
        assert_eq!(c.get_f32(), Some(std::f32::consts::PI));
        c.skip(4);
        assert_eq!(c.get_f64().map(f64::to_bits), Some((-0.0f64).to_bits()));
    }
}
