//! Header and footer framing a root document.

use crate::cursor::ByteCursor;
use anyhow::{anyhow, ensure, Result};
use std::mem;

pub const SIGNATURE: &[u8; 4] = b"SDB2";
pub const HEADER_END: &[u8; 4] = b"HDRE";
pub const FOOTER: &[u8; 17] = b"THIS IS THE END!\0";

const RESERVED_LEN: usize = mem::size_of::<u32>();
const FLAGS_LEN: usize = mem::size_of::<u16>();

pub const HEADER_LEN: usize = SIGNATURE.len() + RESERVED_LEN + FLAGS_LEN + HEADER_END.len();
pub const FOOTER_LEN: usize = FOOTER.len();

pub fn ser_header<B: AsRef<[u8]> + AsMut<[u8]>>(w: &mut ByteCursor<B>) {
    w.put_bytes(SIGNATURE);
    /* reserved for compression; no flags are defined yet */
    w.put_u32(0);
    w.put_u16(0);
    w.put_bytes(HEADER_END);
}

pub fn ser_footer<B: AsRef<[u8]> + AsMut<[u8]>>(w: &mut ByteCursor<B>) {
    w.put_bytes(FOOTER);
}

pub fn has_signature(buf: &[u8]) -> bool {
    buf.starts_with(SIGNATURE)
}

/// Checks the header at the cursor and the footer at the tail of the buffer.
/// Leaves the cursor just past the header and returns where the footer starts.
pub fn deser_frame(r: &mut ByteCursor<&[u8]>) -> Result<usize> {
    ensure!(
        r.len() >= HEADER_LEN + FOOTER_LEN,
        "document of {} bytes is too small for its header and footer",
        r.len()
    );

    /* signature */
    ensure!(
        r.get_bytes(SIGNATURE.len()) == Some(&SIGNATURE[..]),
        "missing signature"
    );
    r.skip(SIGNATURE.len() as i64);

    /* reserved */
    let reserved = r.get_u32().ok_or(anyhow!("truncated header"))?;
    ensure!(reserved == 0, "unsupported reserved field {reserved:#x}");
    r.skip(RESERVED_LEN as i64);

    /* flags */
    r.skip(FLAGS_LEN as i64);

    /* header_end */
    ensure!(
        r.get_bytes(HEADER_END.len()) == Some(&HEADER_END[..]),
        "missing header end marker"
    );
    r.skip(HEADER_END.len() as i64);

    /* footer */
    let footer_pos = r.len() - FOOTER_LEN;
    let footer = &r.as_bytes()[footer_pos..];
    if let Some(i) = footer.iter().zip(FOOTER.iter()).position(|(a, b)| a != b) {
        return Err(anyhow!("corrupt footer at byte {i}"));
    }

    Ok(footer_pos)
}

#[cfg(test)]
mod test {
    use super::*;

    fn framed(body: &[u8]) -> Vec<u8> {
        let mut w = ByteCursor::with_capacity(HEADER_LEN + body.len() + FOOTER_LEN);
        ser_header(&mut w);
        w.put_bytes(body);
        ser_footer(&mut w);
        w.into_inner()
    }

    #[test]
    fn header_layout() {
        let buf = framed(&[]);
        assert_eq!(HEADER_LEN, 14);
        assert_eq!(FOOTER_LEN, 17);
        assert_eq!(&buf[..4], b"SDB2");
        assert_eq!(&buf[4..10], &[0u8; 6]);
        assert_eq!(&buf[10..14], b"HDRE");
        assert_eq!(&buf[14..], &FOOTER[..]);
    }

    #[test]
    fn frame_ok() -> Result<()> {
        let buf = framed(&[1, 2, 3]);
        let mut r = ByteCursor::new(&buf[..]);
        let footer_pos = deser_frame(&mut r)?;
        assert_eq!(r.position(), HEADER_LEN);
        assert_eq!(footer_pos, HEADER_LEN + 3);
        Ok(())
    }

    #[test]
    fn frame_rejects_corruption() {
        let good = framed(&[1, 2, 3]);

        let mut bad_reserved = good.clone();
        bad_reserved[5] = 1;
        assert!(deser_frame(&mut ByteCursor::new(&bad_reserved[..])).is_err());

        let mut bad_marker = good.clone();
        bad_marker[12] = b'X';
        assert!(deser_frame(&mut ByteCursor::new(&bad_marker[..])).is_err());

        for i in 0..FOOTER_LEN {
            let mut bad_footer = good.clone();
            let pos = bad_footer.len() - FOOTER_LEN + i;
            bad_footer[pos] ^= 0xFF;
            assert!(deser_frame(&mut ByteCursor::new(&bad_footer[..])).is_err());
        }

        assert!(deser_frame(&mut ByteCursor::new(&good[..20])).is_err());
    }
}
