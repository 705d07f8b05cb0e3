//! Named adjudicator verdict codes (`spec.md` §4.7, §7). Like
//! `uarch_bus::trap`, these stay plain integers: they are the wire
//! contract the dispute protocol reads directly.

/// The access log was not terminated by an `End` entry at the expected
/// position — reused for the bisection replay's log-linearity check
/// (`spec.md` §4.7 step 4), which has no separate code of its own in
/// the reference and falls into the same "structurally invalid log"
/// bucket.
pub const LOG_NOT_TERMINATED: u32 = 22;

/// The prover's claimed "before"/"after" RAM snapshot doesn't match the
/// bisection trace's recorded value at the corresponding round.
pub const SNAPSHOT_MISMATCH: u32 = 44;

/// A log entry's address falls outside both the first-page overlay
/// (`< 1024`) and the uarch RAM window — `spec.md` §4.7 step 5 names
/// this code explicitly.
pub const ADDRESS_MAPPING_FAILURE: u32 = 45;

/// The RAM computed by applying the log's write delta to the
/// "before" snapshot doesn't match the prover's "after" snapshot.
pub const DELTA_MISMATCH: u32 = 46;

/// A log `Read` entry's value disagrees with the prover's claimed RAM
/// at that address.
pub const LOG_READ_DISAGREES_WITH_RAM: u32 = 432;

// The remaining codes below belong to the same numeric range as the
// reference's `mpc_main` full post-state comparison (cycle/pc/halt/
// write_addr/write_val/regs against caller-supplied "after" values).
// `BisectInput` (`spec.md` §3) carries no such "after" fields — the
// bisection algorithm in §4.7 reconstructs the disputed state from the
// RAM delta instead — so these are not reachable through
// `verify_dispute`. They're kept here because `spec.md` §7 names them
// as part of the adjudicator's code space.
pub const POST_CYCLE_MISMATCH: u32 = 100;
pub const POST_PC_MISMATCH: u32 = 101;
pub const POST_HALT_MISMATCH: u32 = 102;
pub const POST_WRITE_ADDR_MISMATCH: u32 = 103;
pub const POST_WRITE_VAL_MISMATCH: u32 = 104;
/// Shares its value with [`POST_WRITE_VAL_MISMATCH`], matching the
/// reference's `mpc_main`, which reports both under the same code.
pub const POST_REGS_MISMATCH: u32 = 104;
