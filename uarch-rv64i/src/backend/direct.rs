//! Direct-RAM backend (C5b): architectural fields as plain struct
//! fields, backed by a contiguous RAM array and a single pending-write
//! slot. Used for state-carrying simulation, where a caller wants the
//! post-step state back rather than a log replay verdict.

use uarch_bus::consts::{RAM_SIZE, UARCH_RAM_END, UARCH_RAM_START, UHALT};
use uarch_bus::trap;
use uarch_bus::UarchBus;

const RAM_WORDS: usize = RAM_SIZE / 8;

/// One uarch step's worth of directly-addressable state.
///
/// `ram` is boxed rather than inline: at `RAM_SIZE / 8` 64-bit words it
/// is 128 KiB, too large to carry by value through a call chain without
/// a caller needing to know to box it themselves.
#[derive(Debug)]
pub struct UarchState {
    pub cycle: u64,
    pub pc: u64,
    pub regs: [u64; 32],
    pub halt: bool,
    pub ram: Box<[u64]>,
    /// `0` means no write has happened yet this step — valid, since
    /// `0` is well below `UARCH_RAM_START` and so can never be a real
    /// write target.
    pub write_addr: u64,
    pub write_val: u64,
    pub trap: u8,
}

impl UarchState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cycle: 0,
            pc: UARCH_RAM_START,
            regs: [0; 32],
            halt: false,
            ram: vec![0u64; RAM_WORDS].into_boxed_slice(),
            write_addr: 0,
            write_val: 0,
            trap: 0,
        }
    }

    /// Whether any RAM write was buffered during the last step.
    #[must_use]
    pub const fn has_pending_write(&self) -> bool {
        self.write_addr != 0
    }
}

impl Default for UarchState {
    fn default() -> Self {
        Self::new()
    }
}

impl UarchBus for UarchState {
    fn read_word(&mut self, addr: u64) -> u64 {
        if addr < UARCH_RAM_START || addr >= UARCH_RAM_END {
            self.set_trap(trap::LOG_READ_PAST_END);
            return 0;
        }
        let idx = ((addr - UARCH_RAM_START) / 8) as usize;
        self.ram[idx]
    }

    fn write_word(&mut self, addr: u64, val: u64) {
        if addr == UHALT {
            self.halt = true;
            return;
        }
        if self.has_pending_write() {
            self.set_trap(trap::WRITE_SLOT_OCCUPIED);
            return;
        }
        self.write_addr = addr;
        self.write_val = val;
    }

    fn trap(&self) -> u8 {
        self.trap
    }

    fn set_trap(&mut self, code: u8) {
        if self.trap == 0 {
            self.trap = code;
        }
    }

    fn read_cycle(&mut self) -> u64 {
        self.cycle
    }

    fn write_cycle(&mut self, val: u64) {
        self.cycle = val;
    }

    fn read_halt(&mut self) -> bool {
        self.halt
    }

    fn set_halt(&mut self) {
        self.halt = true;
    }

    fn read_pc(&mut self) -> u64 {
        self.pc
    }

    fn write_pc(&mut self, val: u64) {
        self.pc = val;
    }

    fn read_x(&mut self, i: u8) -> u64 {
        self.regs[i as usize]
    }

    fn write_x(&mut self, i: u8, val: u64) {
        if i != 0 {
            self.regs[i as usize] = val;
        }
    }
}
