//! Bit layout of the 64-bit frame timestamp
//!
//! Positions are the least-significant bit of each field. Masks are applied to the
//! value after shifting it down, so every mask is also the field's maximum value.

/// Protocol version carried in bits 61-58
pub const PROTOCOL_VERSION: u8 = 1;

// Header shared by both frame kinds
pub mod header {
    pub const RESERVED_BIT: u32 = 63; // always 0
    pub const ORIGIN_BIT: u32 = 62; // always 1

    pub const VERSION_SHIFT: u32 = 58;
    pub const VERSION_MASK: u64 = 0xF;

    pub const SESSION_ID_SHIFT: u32 = 50;
    pub const SESSION_ID_MASK: u64 = 0xFF;

    pub const FRAME_KIND_BIT: u32 = 49; // 0 = data, 1 = command

    pub const BASE_PTS_SHIFT: u32 = 0;
    pub const BASE_PTS_MASK: u64 = 0xFFFF;
}

// Data frame body (frame_kind = 0); bits 36-16 reserved
pub mod data {
    pub const SENTENCE_ID_SHIFT: u32 = 37;
    pub const SENTENCE_ID_MASK: u64 = 0xFFF;
}

// Command frame body (frame_kind = 1); bits 31-16 reserved
pub mod command {
    pub const CMD_TYPE_SHIFT: u32 = 44;
    pub const CMD_TYPE_MASK: u64 = 0x1F;

    pub const SESSION_DUR_SHIFT: u32 = 32;
    pub const SESSION_DUR_MASK: u64 = 0xFFF;

    // Known command codes
    pub const SESSION_END: u8 = 1;
    pub const SESSION_INTERRUPT: u8 = 2;
}

/// Sentence ids and session durations wrap at this modulus
pub const SEQUENCE_MODULUS: u32 = 4096;
