//! Section format versions.
//!
//! Numbering is independent per section kind and always starts at 1. A version number is
//! never reused: when the on-disk layout of a kind changes, a new constant is added here and a
//! new codec is registered for it. Existing codecs are never edited to read a different layout.

/// On-disk version of a section layout.
pub type SectionVersion = u16;

/// v1 of the kernel event section.
pub const KEVT_SEC_V1: SectionVersion = 1;
/// v2 of the kernel event section: adds the per-event metadata map.
pub const KEVT_SEC_V2: SectionVersion = 2;

/// v1 of the process section.
pub const PROCESS_SEC_V1: SectionVersion = 1;

/// v1 of the handle section.
pub const HANDLE_SEC_V1: SectionVersion = 1;

/// v1 of the PE section.
pub const PE_SEC_V1: SectionVersion = 1;
