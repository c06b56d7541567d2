/// Stable codec IDs. Stored in bits 1..=2 of the capture header flags, so they must stay
/// within 1..=3.
pub mod codec_ids {
    pub const ZSTD: u16    = 0x0001;
    pub const LZ4: u16     = 0x0002;
    pub const DEFLATE: u16 = 0x0003;
}

/// Default compression levels (balanced).
pub const DEFAULT_LEVEL_ZSTD: i32 = 6;
pub const DEFAULT_LEVEL_LZ4: i32 = 0; // lz4 block mode has no levels
pub const DEFAULT_LEVEL_DEFLATE: i32 = 6;

/// Largest payload a section can carry (the header length field is u32).
pub const MAX_PAYLOAD_SIZE: usize = u32::MAX as usize;

/// Length prefix plus trailing crc32.
pub const ENVELOPE_OVERHEAD: usize = 8;
