/// Magic number for capture files.
/// "KCAP" = Kernel CAPture
pub const MAGIC_KCAP: [u8; 4] = *b"KCAP";

/// File format version this build writes. Readers accept anything up to and including it.
pub const CAPTURE_FORMAT_V1: u16 = 1;
pub const CAPTURE_FORMAT_CURRENT: u16 = CAPTURE_FORMAT_V1;

/// Reserved section kind id for the end-of-capture marker written by `close()`.
pub const END_OF_CAPTURE_KIND: u16 = 0xFFFF;
pub const END_OF_CAPTURE_VERSION: u16 = 1;

/// Default upper bound for a single section payload accepted by readers (256 MiB).
pub const DEFAULT_MAX_SECTION_LEN: u32 = 256 * 1024 * 1024;

/// Flag bits of `CaptureFileHeader::flags`.
pub mod flags {
    /// Section payloads are compressed.
    pub const COMPRESSED: u8 = 0b0000_0001;
    /// Two bits carrying the compression codec id.
    pub const CODEC_MASK: u8 = 0b0000_0110;
    pub const CODEC_SHIFT: u8 = 1;
    /// Must be zero in format v1.
    pub const RESERVED_MASK: u8 = 0b1111_1000;
}
