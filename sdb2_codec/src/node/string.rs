use crate::cursor::ByteCursor;
use crate::serde::{
    encoded_text_len, CodecCtx, Deser, NodeTag, Ser, BASE_LEN, MAX_TEXT_LEN, TEXT_LEN_LEN,
    TEXT_TERMINATOR_LEN,
};
use std::borrow::Cow;

/// Raw text bytes. Only UTF-8 text is guaranteed to read back as `&str`.
#[derive(PartialEq, Eq, Clone, Default, Debug)]
pub struct SdbString {
    bytes: Vec<u8>,
}

impl SdbString {
    /// Text beyond what the 2-byte length prefix can describe is cut off.
    pub fn new(text: impl Into<Vec<u8>>) -> Self {
        let mut bytes = text.into();
        if bytes.len() > MAX_TEXT_LEN {
            log::warn!(
                "truncating {} byte text to {MAX_TEXT_LEN} bytes",
                bytes.len()
            );
            bytes.truncate(MAX_TEXT_LEN);
        }
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Parses a length-prefixed, zero-terminated text from the start of `buf`.
/// Yields nothing when the declared length does not fit in `buf`
/// or the terminator is missing.
pub(crate) fn parse_text(buf: &[u8]) -> &[u8] {
    let r = ByteCursor::new(buf);
    let text_len = match r.get_u16() {
        None => return &[],
        Some(len) => len as usize,
    };
    let text_end = TEXT_LEN_LEN + text_len;
    if text_end + TEXT_TERMINATOR_LEN > buf.len() || buf[text_end] != 0 {
        return &[];
    }
    &buf[TEXT_LEN_LEN..text_end]
}

pub(crate) fn ser_text<B: AsRef<[u8]> + AsMut<[u8]>>(w: &mut ByteCursor<B>, text: &[u8]) {
    w.put_u16(text.len() as u16);
    w.put_bytes(text);
    w.put_u8(0);
}

impl Ser for SdbString {
    fn tag(&self) -> NodeTag {
        NodeTag::STRING
    }

    fn size(&self) -> u32 {
        BASE_LEN as u32 + encoded_text_len(&self.bytes)
    }

    fn ser_into(&self, w: &mut ByteCursor<Vec<u8>>, _ctx: &mut CodecCtx) {
        w.put_u16(self.tag().into());
        w.put_u32(self.size());
        ser_text(w, &self.bytes);
    }
}

impl Deser for SdbString {
    fn deser_ctx(buf: &[u8], ctx: &mut CodecCtx) -> Self {
        let r = ByteCursor::new(buf);
        if NodeTag::deser(&r) != Some(NodeTag::STRING) {
            ctx.diag(format_args!("string record has the wrong tag"));
            return Self::default();
        }
        let text = buf.get(BASE_LEN..).map(parse_text).unwrap_or_default();
        Self::new(text)
    }
}
