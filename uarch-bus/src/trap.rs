//! Named trap codes latched into [`crate::UarchBus::trap`]. These are the
//! wire-level contract with the dispute protocol, so they stay plain
//! integers rather than an enum — a non-zero value is handed straight
//! back out of a step's entry point.

/// Alignment violation or other internal assertion failure.
pub const MISALIGNED: u8 = 1;

/// A read reached past the end of the 16-entry access log.
pub const LOG_READ_PAST_END: u8 = 18;

/// A read's address or kind didn't match the next access-log entry.
pub const LOG_READ_MISMATCH: u8 = 19;

/// The direct-RAM backend's single pending-write slot was already
/// occupied. Same numeric value as [`LOG_READ_MISMATCH`] — the two
/// backends never run in the same step, so the code is unambiguous to
/// whichever caller receives it.
pub const WRITE_SLOT_OCCUPIED: u8 = 19;

/// A write reached past the end of the 16-entry access log.
pub const LOG_WRITE_PAST_END: u8 = 20;

/// A write's address, kind, or value didn't match the next access-log
/// entry.
pub const LOG_WRITE_MISMATCH: u8 = 21;

/// No decode table entry matched the fetched instruction.
pub const ILLEGAL_INSTRUCTION: u8 = 253;
