//! One handler per RV64I integer opcode (C3), written against
//! [`UarchBus`] so the same code runs unchanged over either backend.
//!
//! Each handler reads its operands, computes its result, writes at most
//! one register (`write_x` already drops writes to `x0`), and advances
//! `pc` — either by 4, or to a computed branch/jump target. Handlers do
//! not stop early on a trap: a fault latches `UarchBus::trap`, and the
//! step driver is the one that turns that into a rejected step. This
//! mirrors the reference interpreter, which has no early-return
//! mechanism either.

use uarch_bus::bits::{sar32, sar64, shl32, shl64, shr32, shr64};
use uarch_bus::trap::ILLEGAL_INSTRUCTION;
use uarch_bus::UarchBus;

use crate::decode::{
    funct3, funct7, imm_b, imm_i, imm_j, imm_s, imm_u, match_opcode, match_opcode_funct3,
    match_opcode_funct3_funct7_sr1, rd, rs1, rs2, shamt5, shamt6,
};

const OP_LOAD: u32 = 0x03;
const OP_MISC_MEM: u32 = 0x0f;
const OP_IMM: u32 = 0x13;
const OP_AUIPC: u32 = 0x17;
const OP_IMM32: u32 = 0x1b;
const OP_STORE: u32 = 0x23;
const OP: u32 = 0x33;
const OP_LUI: u32 = 0x37;
const OP32: u32 = 0x3b;
const OP_BRANCH: u32 = 0x63;
const OP_JALR: u32 = 0x67;
const OP_JAL: u32 = 0x6f;

/// Truncates to 32 bits and sign-extends back to 64, the result shape
/// every `-W` instruction variant produces.
const fn sext32(v: u32) -> u64 {
    v as i32 as i64 as u64
}

fn advance_pc<B: UarchBus>(bus: &mut B, pc: u64) {
    bus.write_pc(pc.wrapping_add(4));
}

/// Decodes and runs one instruction. Traps with [`ILLEGAL_INSTRUCTION`]
/// if no RV64I opcode/funct3/funct7 combination matches.
pub fn execute_insn<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let op = crate::decode::opcode(insn);
    let f3 = funct3(insn);
    let f7 = funct7(insn);

    if match_opcode(insn, OP_LUI) {
        exec_lui(bus, insn, pc);
    } else if match_opcode(insn, OP_AUIPC) {
        exec_auipc(bus, insn, pc);
    } else if match_opcode(insn, OP_JAL) {
        exec_jal(bus, insn, pc);
    } else if match_opcode_funct3(insn, OP_JALR, 0) {
        exec_jalr(bus, insn, pc);
    } else if op == OP_BRANCH {
        match f3 {
            0 => exec_beq(bus, insn, pc),
            1 => exec_bne(bus, insn, pc),
            4 => exec_blt(bus, insn, pc),
            5 => exec_bge(bus, insn, pc),
            6 => exec_bltu(bus, insn, pc),
            7 => exec_bgeu(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if op == OP_LOAD {
        match f3 {
            0 => exec_lb(bus, insn, pc),
            1 => exec_lh(bus, insn, pc),
            2 => exec_lw(bus, insn, pc),
            3 => exec_ld(bus, insn, pc),
            4 => exec_lbu(bus, insn, pc),
            5 => exec_lhu(bus, insn, pc),
            6 => exec_lwu(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if op == OP_STORE {
        match f3 {
            0 => exec_sb(bus, insn, pc),
            1 => exec_sh(bus, insn, pc),
            2 => exec_sw(bus, insn, pc),
            3 => exec_sd(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if op == OP_IMM {
        match f3 {
            0 => exec_addi(bus, insn, pc),
            1 if match_opcode_funct3_funct7_sr1(insn, OP_IMM, 1, 0) => exec_slli(bus, insn, pc),
            2 => exec_slti(bus, insn, pc),
            3 => exec_sltiu(bus, insn, pc),
            4 => exec_xori(bus, insn, pc),
            5 if match_opcode_funct3_funct7_sr1(insn, OP_IMM, 5, 0) => exec_srli(bus, insn, pc),
            5 if match_opcode_funct3_funct7_sr1(insn, OP_IMM, 5, 0x10) => exec_srai(bus, insn, pc),
            6 => exec_ori(bus, insn, pc),
            7 => exec_andi(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if op == OP_IMM32 {
        match f3 {
            0 => exec_addiw(bus, insn, pc),
            1 if f7 == 0 => exec_slliw(bus, insn, pc),
            5 if f7 == 0 => exec_srliw(bus, insn, pc),
            5 if f7 == 0x20 => exec_sraiw(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if op == OP {
        match (f3, f7) {
            (0, 0) => exec_add(bus, insn, pc),
            (0, 0x20) => exec_sub(bus, insn, pc),
            (1, 0) => exec_sll(bus, insn, pc),
            (2, 0) => exec_slt(bus, insn, pc),
            (3, 0) => exec_sltu(bus, insn, pc),
            (4, 0) => exec_xor(bus, insn, pc),
            (5, 0) => exec_srl(bus, insn, pc),
            (5, 0x20) => exec_sra(bus, insn, pc),
            (6, 0) => exec_or(bus, insn, pc),
            (7, 0) => exec_and(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if op == OP32 {
        match (f3, f7) {
            (0, 0) => exec_addw(bus, insn, pc),
            (0, 0x20) => exec_subw(bus, insn, pc),
            (1, 0) => exec_sllw(bus, insn, pc),
            (5, 0) => exec_srlw(bus, insn, pc),
            (5, 0x20) => exec_sraw(bus, insn, pc),
            _ => bus.set_trap(ILLEGAL_INSTRUCTION),
        }
    } else if match_opcode_funct3(insn, OP_MISC_MEM, 0) {
        advance_pc(bus, pc);
    } else {
        bus.set_trap(ILLEGAL_INSTRUCTION);
    }
}

fn exec_lui<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    bus.write_x(rd(insn), imm_u(insn) as u64);
    advance_pc(bus, pc);
}

fn exec_auipc<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    bus.write_x(rd(insn), pc.wrapping_add(imm_u(insn) as u64));
    advance_pc(bus, pc);
}

fn exec_jal<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    bus.write_x(rd(insn), pc.wrapping_add(4));
    bus.write_pc(pc.wrapping_add(imm_j(insn) as u64));
}

fn exec_jalr<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let base = bus.read_x(rs1(insn));
    let target = base.wrapping_add(imm_i(insn) as u64) & !1u64;
    bus.write_x(rd(insn), pc.wrapping_add(4));
    bus.write_pc(target);
}

fn branch<B: UarchBus>(bus: &mut B, insn: u32, pc: u64, taken: bool) {
    if taken {
        bus.write_pc(pc.wrapping_add(imm_b(insn) as u64));
    } else {
        advance_pc(bus, pc);
    }
}

fn exec_beq<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = bus.read_x(rs1(insn)) == bus.read_x(rs2(insn));
    branch(bus, insn, pc, taken);
}

fn exec_bne<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = bus.read_x(rs1(insn)) != bus.read_x(rs2(insn));
    branch(bus, insn, pc, taken);
}

fn exec_blt<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = (bus.read_x(rs1(insn)) as i64) < (bus.read_x(rs2(insn)) as i64);
    branch(bus, insn, pc, taken);
}

fn exec_bge<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = (bus.read_x(rs1(insn)) as i64) >= (bus.read_x(rs2(insn)) as i64);
    branch(bus, insn, pc, taken);
}

fn exec_bltu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = bus.read_x(rs1(insn)) < bus.read_x(rs2(insn));
    branch(bus, insn, pc, taken);
}

fn exec_bgeu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = bus.read_x(rs1(insn)) >= bus.read_x(rs2(insn));
    branch(bus, insn, pc, taken);
}

fn load_addr<B: UarchBus>(bus: &mut B, insn: u32) -> u64 {
    bus.read_x(rs1(insn)).wrapping_add(imm_i(insn) as u64)
}

fn exec_lb<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = bus.read_u8(addr) as i8 as i64 as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_lh<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = bus.read_u16(addr) as i16 as i64 as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_lw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = bus.read_u32(addr) as i32 as i64 as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_ld<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = bus.read_u64(addr);
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_lbu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = u64::from(bus.read_u8(addr));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_lhu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = u64::from(bus.read_u16(addr));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_lwu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = load_addr(bus, insn);
    let val = u64::from(bus.read_u32(addr));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn store_addr<B: UarchBus>(bus: &mut B, insn: u32) -> u64 {
    bus.read_x(rs1(insn)).wrapping_add(imm_s(insn) as u64)
}

fn exec_sb<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = store_addr(bus, insn);
    let val = bus.read_x(rs2(insn)) as u8;
    bus.write_u8(addr, val);
    advance_pc(bus, pc);
}

fn exec_sh<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = store_addr(bus, insn);
    let val = bus.read_x(rs2(insn)) as u16;
    bus.write_u16(addr, val);
    advance_pc(bus, pc);
}

fn exec_sw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = store_addr(bus, insn);
    let val = bus.read_x(rs2(insn)) as u32;
    bus.write_u32(addr, val);
    advance_pc(bus, pc);
}

fn exec_sd<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let addr = store_addr(bus, insn);
    let val = bus.read_x(rs2(insn));
    bus.write_u64(addr, val);
    advance_pc(bus, pc);
}

fn exec_addi<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)).wrapping_add(imm_i(insn) as u64);
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_slti<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = (bus.read_x(rs1(insn)) as i64) < imm_i(insn);
    bus.write_x(rd(insn), u64::from(taken));
    advance_pc(bus, pc);
}

fn exec_sltiu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = bus.read_x(rs1(insn)) < imm_i(insn) as u64;
    bus.write_x(rd(insn), u64::from(taken));
    advance_pc(bus, pc);
}

fn exec_xori<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)) ^ imm_i(insn) as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_ori<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)) | imm_i(insn) as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_andi<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)) & imm_i(insn) as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_slli<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = shl64(bus.read_x(rs1(insn)), shamt6(insn));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_srli<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = shr64(bus.read_x(rs1(insn)), shamt6(insn));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_srai<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sar64(bus.read_x(rs1(insn)) as i64, shamt6(insn)) as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_addiw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32((bus.read_x(rs1(insn)) as u32).wrapping_add(imm_i(insn) as u32));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_slliw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32(shl32(bus.read_x(rs1(insn)) as u32, shamt5(insn)));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_srliw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32(shr32(bus.read_x(rs1(insn)) as u32, shamt5(insn)));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_sraiw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32(sar32(bus.read_x(rs1(insn)) as i32, shamt5(insn)) as u32);
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_add<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)).wrapping_add(bus.read_x(rs2(insn)));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_sub<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)).wrapping_sub(bus.read_x(rs2(insn)));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_sll<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = shl64(bus.read_x(rs1(insn)), bus.read_x(rs2(insn)) as u32);
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_slt<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = (bus.read_x(rs1(insn)) as i64) < (bus.read_x(rs2(insn)) as i64);
    bus.write_x(rd(insn), u64::from(taken));
    advance_pc(bus, pc);
}

fn exec_sltu<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let taken = bus.read_x(rs1(insn)) < bus.read_x(rs2(insn));
    bus.write_x(rd(insn), u64::from(taken));
    advance_pc(bus, pc);
}

fn exec_xor<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)) ^ bus.read_x(rs2(insn));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_srl<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = shr64(bus.read_x(rs1(insn)), bus.read_x(rs2(insn)) as u32);
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_sra<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sar64(bus.read_x(rs1(insn)) as i64, bus.read_x(rs2(insn)) as u32) as u64;
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_or<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)) | bus.read_x(rs2(insn));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_and<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = bus.read_x(rs1(insn)) & bus.read_x(rs2(insn));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_addw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32((bus.read_x(rs1(insn)) as u32).wrapping_add(bus.read_x(rs2(insn)) as u32));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_subw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32((bus.read_x(rs1(insn)) as u32).wrapping_sub(bus.read_x(rs2(insn)) as u32));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_sllw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32(shl32(bus.read_x(rs1(insn)) as u32, bus.read_x(rs2(insn)) as u32));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_srlw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let val = sext32(shr32(bus.read_x(rs1(insn)) as u32, bus.read_x(rs2(insn)) as u32));
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

fn exec_sraw<B: UarchBus>(bus: &mut B, insn: u32, pc: u64) {
    let shamt = bus.read_x(rs2(insn)) as u32;
    let val = sext32(sar32(bus.read_x(rs1(insn)) as i32, shamt) as u32);
    bus.write_x(rd(insn), val);
    advance_pc(bus, pc);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::direct::UarchState;

    fn new_state_at(pc: u64) -> UarchState {
        let mut s = UarchState::new();
        s.pc = pc;
        s
    }

    #[test]
    fn addi_identity_when_imm_zero() {
        let mut s = new_state_at(0x7000_0000);
        s.regs[2] = 0x1234;
        // ADDI x1, x2, 0
        let insn = (0 << 20) | (2 << 15) | (0 << 12) | (1 << 7) | 0x13;
        let pc = s.pc;
        execute_insn(&mut s, insn, pc);
        assert_eq!(s.regs[1], 0x1234);
        assert_eq!(s.pc, 0x7000_0004);
    }

    #[test]
    fn x0_write_is_dropped() {
        let mut s = new_state_at(0x7000_0000);
        // ADDI x0, x0, 7
        let insn = (7 << 20) | (0 << 15) | (0 << 12) | (0 << 7) | 0x13;
        let pc = s.pc;
        execute_insn(&mut s, insn, pc);
        assert_eq!(s.regs[0], 0);
    }

    #[test]
    fn illegal_instruction_traps() {
        let mut s = new_state_at(0x7000_0000);
        let pc = s.pc;
        execute_insn(&mut s, 0xffff_ffff, pc);
        assert_eq!(s.trap, ILLEGAL_INSTRUCTION);
    }

    #[test]
    fn jalr_masks_bit_zero_of_target() {
        let mut s = new_state_at(0x7000_0000);
        s.regs[1] = 0x7000_0011;
        // JALR x5, x1, 0
        let insn = (0 << 20) | (1 << 15) | (0 << 12) | (5 << 7) | 0x67;
        let pc = s.pc;
        execute_insn(&mut s, insn, pc);
        assert_eq!(s.pc, 0x7000_0010);
        assert_eq!(s.regs[5], 0x7000_0004);
    }

    #[test]
    fn lb_sign_extends_negative_byte() {
        let mut s = new_state_at(0x7000_0000);
        s.regs[1] = 0x7000_0100;
        s.ram[(0x100) / 8] = 0xff;
        // LB x2, 0(x1)
        let insn = (0 << 20) | (1 << 15) | (0 << 12) | (2 << 7) | 0x03;
        let pc = s.pc;
        execute_insn(&mut s, insn, pc);
        assert_eq!(s.regs[2], 0xffff_ffff_ffff_ffff);
    }

    #[test]
    fn lbu_zero_extends() {
        let mut s = new_state_at(0x7000_0000);
        s.regs[1] = 0x7000_0100;
        s.ram[0x100 / 8] = 0xff;
        // LBU x2, 0(x1)
        let insn = (0 << 20) | (1 << 15) | (4 << 12) | (2 << 7) | 0x03;
        let pc = s.pc;
        execute_insn(&mut s, insn, pc);
        assert_eq!(s.regs[2], 0x00ff);
    }

    #[test]
    fn addiw_sign_extends_from_bit_31() {
        let mut s = new_state_at(0x7000_0000);
        s.regs[1] = 0x7fff_ffff;
        // ADDIW x2, x1, 1 -> overflow into bit 31, must sign-extend.
        let insn = (1 << 20) | (1 << 15) | (0 << 12) | (2 << 7) | 0x1b;
        let pc = s.pc;
        execute_insn(&mut s, insn, pc);
        assert_eq!(s.regs[2], 0xffff_ffff_8000_0000);
    }
}
