use sdb2_codec::{Block, List};

pub fn gen_sample_doc() -> Block {
    let mut doc = Block::new();
    doc.set("Boolean", true);
    doc.set("Byte", 0x7Fu8);
    doc.set("Short", 0x1234i16);
    doc.set("Char", 'K' as u16);
    doc.set("Integer", 0xBEEF_BEEFu32 as i32);
    doc.set("Long", 0x0123_4567_89AB_CDEFi64);
    doc.set("Float", 3.5f32);
    doc.set("Double", -1.0e-3f64);
    doc.set("String", "Hello, SDB2");

    let mut crash = List::new();
    crash.set(0, false);
    crash.set(1, 0x01u8);
    crash.set(2, 0x0202i16);
    crash.set(3, 'c' as u16);
    crash.set(4, 4i32);
    crash.set(5, 5i64);
    crash.set(6, 6.0f32);
    crash.set(7, 7.0f64);
    doc.set("Crash", crash);

    let mut nested = Block::new();
    nested.set("Name", "inner");
    let mut sparse = List::new();
    sparse.set(5, "five");
    nested.set("Sparse", sparse);
    doc.set("Nested", nested);

    doc
}

pub fn verify_sample_doc(doc: &Block) {
    assert!(doc.is_root());
    assert!(doc.get::<bool>("Boolean"));
    assert_eq!(doc.get::<u8>("Byte"), 0x7F);
    assert_eq!(doc.get::<i16>("Short"), 0x1234);
    assert_eq!(doc.get::<u16>("Char"), 'K' as u16);
    assert_eq!(doc.get::<i32>("Integer"), 0xBEEF_BEEFu32 as i32);
    assert_eq!(doc.get::<i64>("Long"), 0x0123_4567_89AB_CDEF);
    assert_eq!(doc.get::<f32>("Float"), 3.5);
    assert_eq!(doc.get::<f64>("Double"), -1.0e-3);
    assert_eq!(doc.get_str("String"), "Hello, SDB2");

    let crash = doc.get_list("Crash");
    assert_eq!(crash.map(List::len), Some(8));
    assert_eq!(crash.map(|l| l.get::<f64>(7)), Some(7.0));
    assert_eq!(crash.map(|l| l.get::<i32>(4)), Some(4));
    assert_eq!(crash.map(|l| l.get::<u16>(3)), Some('c' as u16));

    let nested = doc.get_block("Nested");
    assert_eq!(nested.map(Block::is_root), Some(false));
    assert_eq!(nested.map(|b| b.get_str("Name")), Some("inner"));
    let sparse = nested.and_then(|b| b.get_list("Sparse"));
    assert_eq!(sparse.map(List::len), Some(6));
    assert_eq!(sparse.map(|l| l.get_str(5)), Some("five"));
    assert_eq!(sparse.map(|l| l.is_present(0)), Some(false));
}
