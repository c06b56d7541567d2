//! compression/codecs/mod.rs
//! One module per codec; all share the envelope from `compression::types`.

pub mod deflate;
pub mod lz4;
pub mod zstd;

pub use self::deflate::*;
pub use self::lz4::*;
pub use self::zstd::*;
