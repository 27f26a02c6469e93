use anyhow::{Context, Result};
use itertools::Itertools;
use sdb2_codec::{Block, CodecConfig, List, Ser};
use std::env;
use std::f32::consts::PI as PI_F32;
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;

const ENV_VAR_OUT_PATH: &str = "SDB2_OUT_PATH";

const HEX_DUMP_WIDTH: usize = 16;

fn gen_doc() -> Block {
    let mut block = Block::new();
    block.set("Boolean", true);
    block.set("Byte", 1u8);
    block.set("Short", 2i16);
    block.set("Char", 'A' as u16);
    block.set("Integer", 0xBEEF_BEEFu32 as i32);
    block.set("Long", 0x7EDC_BA98_7654_3210i64);
    block.set("Float", PI_F32);
    block.set("Double", PI);

    let mut list = List::new();
    list.set(0, true);
    list.set(1, 0xFFu8);
    list.set(2, -1i16);
    list.set(3, 0xFFFFu16);
    list.set(4, -1i32);
    list.set(5, -1i64);
    list.set(6, f32::from_bits(0xFFFF_FFFF));
    list.set(7, PI * 2.0);
    list.set(6, PI_F32);
    list.set(7, PI);
    block.set("Crash", list);

    block
}

fn hex_dump(buf: &[u8]) -> String {
    buf.chunks(HEX_DUMP_WIDTH)
        .map(|line| line.iter().map(|b| format!("{b:02x}")).join(" "))
        .join("\n")
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cfg = CodecConfig::from_env()?;
    let out_path = env::var(ENV_VAR_OUT_PATH)
        .map_or_else(|_| env::temp_dir().join("test0.sdb2"), PathBuf::from);

    let block = gen_doc();
    let buf = block.ser_solo_with(&cfg);
    log::debug!("serialized {} bytes:\n{}", buf.len(), hex_dump(&buf));

    let des = Block::try_deser(&buf, &cfg)?;
    let crash_7 = des.get_list("Crash").map(|l| l.get::<f64>(7)).unwrap_or_default();
    println!("{crash_7}");

    fs::write(&out_path, &buf).with_context(|| format!("writing {}", out_path.display()))?;
    log::info!("wrote {} bytes to {}", buf.len(), out_path.display());

    Ok(())
}
