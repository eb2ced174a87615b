//! 6502 opcode table: mnemonic -> addressing mode -> opcode

use std::collections::HashMap;

use crate::addressing::AddressingMode::{self, *};

pub struct OpcodeTable {
    table: HashMap<&'static str, HashMap<AddressingMode, u8>>,
}

fn modes(entries: &[(AddressingMode, u8)]) -> HashMap<AddressingMode, u8> {
    entries.iter().copied().collect()
}

impl OpcodeTable {
    pub fn new() -> Self {
        // Shared layout of the eight-mode ALU group: imm, zp, zp,X, abs, abs,X, abs,Y, (zp,X), (zp),Y
        let alu = |op: [u8; 8]| {
            modes(&[
                (Immediate, op[0]), (ZeroPage, op[1]), (ZeroPageX, op[2]),
                (Absolute, op[3]), (AbsoluteX, op[4]), (AbsoluteY, op[5]),
                (IndirectX, op[6]), (IndirectY, op[7]),
            ])
        };
        // ASL/LSR/ROL/ROR: A, zp, zp,X, abs, abs,X
        let shift = |op: [u8; 5]| {
            modes(&[
                (Accumulator, op[0]), (ZeroPage, op[1]), (ZeroPageX, op[2]),
                (Absolute, op[3]), (AbsoluteX, op[4]),
            ])
        };
        let implied = |op: u8| modes(&[(Implied, op)]);
        let branch = |op: u8| modes(&[(Relative, op)]);

        let table = HashMap::from([
            ("ADC", alu([0x69, 0x65, 0x75, 0x6D, 0x7D, 0x79, 0x61, 0x71])),
            ("AND", alu([0x29, 0x25, 0x35, 0x2D, 0x3D, 0x39, 0x21, 0x31])),
            ("CMP", alu([0xC9, 0xC5, 0xD5, 0xCD, 0xDD, 0xD9, 0xC1, 0xD1])),
            ("EOR", alu([0x49, 0x45, 0x55, 0x4D, 0x5D, 0x59, 0x41, 0x51])),
            ("LDA", alu([0xA9, 0xA5, 0xB5, 0xAD, 0xBD, 0xB9, 0xA1, 0xB1])),
            ("ORA", alu([0x09, 0x05, 0x15, 0x0D, 0x1D, 0x19, 0x01, 0x11])),
            ("SBC", alu([0xE9, 0xE5, 0xF5, 0xED, 0xFD, 0xF9, 0xE1, 0xF1])),
            ("STA", modes(&[
                (ZeroPage, 0x85), (ZeroPageX, 0x95),
                (Absolute, 0x8D), (AbsoluteX, 0x9D), (AbsoluteY, 0x99),
                (IndirectX, 0x81), (IndirectY, 0x91),
            ])),
            ("ASL", shift([0x0A, 0x06, 0x16, 0x0E, 0x1E])),
            ("LSR", shift([0x4A, 0x46, 0x56, 0x4E, 0x5E])),
            ("ROL", shift([0x2A, 0x26, 0x36, 0x2E, 0x3E])),
            ("ROR", shift([0x6A, 0x66, 0x76, 0x6E, 0x7E])),
            ("DEC", modes(&[(ZeroPage, 0xC6), (ZeroPageX, 0xD6), (Absolute, 0xCE), (AbsoluteX, 0xDE)])),
            ("INC", modes(&[(ZeroPage, 0xE6), (ZeroPageX, 0xF6), (Absolute, 0xEE), (AbsoluteX, 0xFE)])),
            ("LDX", modes(&[
                (Immediate, 0xA2), (ZeroPage, 0xA6), (ZeroPageY, 0xB6),
                (Absolute, 0xAE), (AbsoluteY, 0xBE),
            ])),
            ("LDY", modes(&[
                (Immediate, 0xA0), (ZeroPage, 0xA4), (ZeroPageX, 0xB4),
                (Absolute, 0xAC), (AbsoluteX, 0xBC),
            ])),
            ("STX", modes(&[(ZeroPage, 0x86), (ZeroPageY, 0x96), (Absolute, 0x8E)])),
            ("STY", modes(&[(ZeroPage, 0x84), (ZeroPageX, 0x94), (Absolute, 0x8C)])),
            ("CPX", modes(&[(Immediate, 0xE0), (ZeroPage, 0xE4), (Absolute, 0xEC)])),
            ("CPY", modes(&[(Immediate, 0xC0), (ZeroPage, 0xC4), (Absolute, 0xCC)])),
            ("BIT", modes(&[(ZeroPage, 0x24), (Absolute, 0x2C)])),
            ("JMP", modes(&[(Absolute, 0x4C), (Indirect, 0x6C)])),
            ("JSR", modes(&[(Absolute, 0x20)])),
            ("BCC", branch(0x90)), ("BCS", branch(0xB0)),
            ("BEQ", branch(0xF0)), ("BMI", branch(0x30)),
            ("BNE", branch(0xD0)), ("BPL", branch(0x10)),
            ("BVC", branch(0x50)), ("BVS", branch(0x70)),
            ("BRK", implied(0x00)), ("NOP", implied(0xEA)),
            ("RTI", implied(0x40)), ("RTS", implied(0x60)),
            ("CLC", implied(0x18)), ("SEC", implied(0x38)),
            ("CLD", implied(0xD8)), ("SED", implied(0xF8)),
            ("CLI", implied(0x58)), ("SEI", implied(0x78)),
            ("CLV", implied(0xB8)),
            ("DEX", implied(0xCA)), ("DEY", implied(0x88)),
            ("INX", implied(0xE8)), ("INY", implied(0xC8)),
            ("TAX", implied(0xAA)), ("TXA", implied(0x8A)),
            ("TAY", implied(0xA8)), ("TYA", implied(0x98)),
            ("TSX", implied(0xBA)), ("TXS", implied(0x9A)),
            ("PHA", implied(0x48)), ("PLA", implied(0x68)),
            ("PHP", implied(0x08)), ("PLP", implied(0x28)),
        ]);

        Self { table }
    }

    pub fn is_mnemonic(&self, mnemonic: &str) -> bool {
        self.table.contains_key(mnemonic)
    }

    pub fn get(&self, mnemonic: &str, mode: AddressingMode) -> Option<u8> {
        self.table.get(mnemonic)?.get(&mode).copied()
    }

    /// Opcode for a mnemonic written without an operand. `ASL` alone means `ASL A`.
    pub fn implied(&self, mnemonic: &str) -> Option<u8> {
        self.get(mnemonic, Implied)
            .or_else(|| self.get(mnemonic, Accumulator))
    }

    /// Mode to encode a resolved operand with: zero-page falls back to
    /// absolute when the mnemonic has no zero-page form (`JMP $10`).
    pub fn resolved_mode(&self, mnemonic: &str, mode: AddressingMode) -> Option<AddressingMode> {
        if self.get(mnemonic, mode).is_some() {
            return Some(mode);
        }
        let promoted = mode.promoted();
        self.get(mnemonic, promoted).map(|_| promoted)
    }

    /// Mode to encode a forward reference with. Zero-page forms are widened to
    /// absolute whenever the mnemonic allows it, so the size can be fixed
    /// before the value is known; `STX ptr,Y` has no absolute form and stays
    /// zero-page.
    pub fn deferred_mode(&self, mnemonic: &str, mode: AddressingMode) -> Option<AddressingMode> {
        let promoted = mode.promoted();
        if self.get(mnemonic, promoted).is_some() {
            return Some(promoted);
        }
        self.get(mnemonic, mode).map(|_| mode)
    }
}

impl Default for OpcodeTable {
    fn default() -> Self {
        Self::new()
    }
}
