pub mod config;
pub mod cursor;
pub mod node;
pub mod serde;

pub use config::CodecConfig;
pub use node::{Block, List, Node, Primitive, Scalar, SdbString};
pub use serde::{Deser, Ser};
