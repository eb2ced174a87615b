//! Main assembler implementation

use crate::encoder::Encoder;
use crate::error::AsmError;
use crate::opcodes::OpcodeTable;
use crate::parser::parse_source;
use crate::program::Program;
use crate::resolver::Resolver;
use crate::symbol::SymbolTable;

/// Settings applied to every run.
#[derive(Debug, Clone, Default)]
pub struct AsmConfig {
    /// Start address used until a leading `.ORG` replaces it
    pub origin: i32,
    /// Constants defined before the first line is read
    pub defines: Vec<(String, i32)>,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub bytes: Vec<u8>,
    pub symbols: SymbolTable,
    /// Address the first byte is loaded at
    pub start_address: i32,
}

pub struct Assembler {
    opcodes: OpcodeTable,
    config: AsmConfig,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self::with_config(AsmConfig::default())
    }

    pub fn with_config(config: AsmConfig) -> Self {
        Self {
            opcodes: OpcodeTable::new(),
            config,
        }
    }

    // ===== Configuration =====

    pub fn set_origin(&mut self, addr: i32) {
        self.config.origin = addr;
    }

    pub fn origin(&self) -> i32 {
        self.config.origin
    }

    pub fn define(&mut self, name: &str, value: i32) {
        self.config.defines.push((name.to_string(), value));
    }

    // ===== Public API =====

    pub fn assemble_bytes(&self, src: &str) -> Result<Vec<u8>, AsmError> {
        Ok(self.assemble(src)?.bytes)
    }

    /// Assemble a complete source text. Every call starts from a fresh state.
    pub fn assemble(&self, src: &str) -> Result<Assembly, AsmError> {
        let mut program = Program::new(self.config.origin);
        for (name, value) in &self.config.defines {
            program.symbols.define_constant(name, *value);
        }

        let encoder = Encoder::new(&self.opcodes);
        for line in parse_source(src) {
            encoder
                .encode_line(&line.tokens, &mut program)
                .map_err(|e| e.at_line(line.number))?;
        }
        tracing::debug!(
            "encoded {} items, start ${:04X}",
            program.output.len(),
            program.start_address
        );

        let bytes = Resolver::new(&self.opcodes).resolve(&mut program)?;
        Ok(Assembly {
            bytes,
            symbols: program.symbols,
            start_address: program.start_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble(src: &str) -> Vec<u8> {
        Assembler::new().assemble_bytes(src).unwrap()
    }

    fn assemble_err(src: &str) -> AsmError {
        Assembler::new().assemble_bytes(src).unwrap_err()
    }

    fn filler(count: usize) -> String {
        ".BYTE $EA\n".repeat(count)
    }

    #[test]
    fn test_immediate_and_absolute() {
        assert_eq!(assemble("LDA #$55"), vec![0xA9, 0x55]);
        assert_eq!(assemble("LDA $555"), vec![0xAD, 0x55, 0x05]);
        assert_eq!(assemble("lda $00FF"), vec![0xAD, 0xFF, 0x00]);
        assert_eq!(assemble("LDA $FF"), vec![0xA5, 0xFF]);
    }

    #[test]
    fn test_forward_jump() {
        let src = "JMP label\nDEX\nDEX\nDEX\nlabel";
        assert_eq!(assemble(src), vec![0x4C, 0x06, 0x00, 0xCA, 0xCA, 0xCA]);
    }

    #[test]
    fn test_backward_jump() {
        let src = "label\nJMP label\nDEX\nDEX\nDEX";
        assert_eq!(assemble(src), vec![0x4C, 0x00, 0x00, 0xCA, 0xCA, 0xCA]);
    }

    #[test]
    fn test_mutual_forward_references() {
        let src = "first JMP second\nsecond JMP first";
        let asm = Assembler::new().assemble(src).unwrap();
        assert_eq!(asm.bytes, vec![0x4C, 0x03, 0x00, 0x4C, 0x00, 0x00]);
        assert_eq!(asm.symbols.get("first"), Some(0));
        assert_eq!(asm.symbols.get("second"), Some(3));
    }

    #[test]
    fn test_consecutive_labels() {
        let src = "a\nb:\nJMP b\nJMP a";
        let asm = Assembler::new().assemble(src).unwrap();
        assert_eq!(asm.bytes, vec![0x4C, 0x00, 0x00, 0x4C, 0x00, 0x00]);
        assert_eq!(asm.symbols.get("a"), Some(0));
        assert_eq!(asm.symbols.get("b"), Some(0));
    }

    #[test]
    fn test_branch_loop() {
        let src = "
            LDX #$08
        loop:
            DEX
            BNE loop
            BEQ done
            NOP
        done:
            RTS
        ";
        assert_eq!(
            assemble(src),
            vec![0xA2, 0x08, 0xCA, 0xD0, 0xFD, 0xF0, 0x01, 0xEA, 0x60]
        );
    }

    #[test]
    fn test_backward_branch_limits() {
        let src = format!("target\n{}BNE target", filler(126));
        let bytes = assemble(&src);
        assert_eq!(bytes.len(), 128);
        assert_eq!(bytes[126..], [0xD0, 0x80]);

        let src = format!("target\n{}BNE target", filler(127));
        assert!(matches!(
            assemble_err(&src),
            AsmError::BranchOutOfRange { displacement: -129, .. }
        ));
    }

    #[test]
    fn test_forward_branch_limits() {
        let src = format!("BNE target\n{}target RTS", filler(127));
        let bytes = assemble(&src);
        assert_eq!(bytes[..2], [0xD0, 0x7F]);

        let src = format!("BNE target\n{}target RTS", filler(128));
        assert!(matches!(
            assemble_err(&src),
            AsmError::BranchOutOfRange { displacement: 128, .. }
        ));
    }

    #[test]
    fn test_leading_org() {
        let src = "
            .ORG $0600
        start:
            JMP end
            NOP
        end:
            JMP start
        ";
        let asm = Assembler::new().assemble(src).unwrap();
        assert_eq!(asm.start_address, 0x0600);
        assert_eq!(asm.bytes, vec![0x4C, 0x04, 0x06, 0xEA, 0x4C, 0x00, 0x06]);
    }

    #[test]
    fn test_org_after_code_pads() {
        assert_eq!(
            assemble("LDA #1\n.ORG 5\nRTS"),
            vec![0xA9, 0x01, 0x00, 0x00, 0x00, 0x60]
        );
        assert_eq!(
            assemble(".ORG $1000\nLDA #1\n.ORG $1004\nvec .WORD vec"),
            vec![0xA9, 0x01, 0x00, 0x00, 0x04, 0x10]
        );
    }

    #[test]
    fn test_org_behind_is_an_error() {
        assert!(matches!(
            assemble_err("LDA #1\nLDA #2\n.ORG 1"),
            AsmError::OrgBehind { target: 1, current: 4 }
        ));
    }

    #[test]
    fn test_star_assignment_is_a_label() {
        let src = "DEX\nhere = *\nDEX\nJMP here";
        let asm = Assembler::new().assemble(src).unwrap();
        assert_eq!(asm.bytes, vec![0xCA, 0xCA, 0x4C, 0x01, 0x00]);
        assert_eq!(asm.symbols.get("here"), Some(1));
    }

    #[test]
    fn test_constants() {
        let src = "ptr = $10\ncount = 3\nLDY #count\nLDA (ptr),Y\nSTA ptr";
        assert_eq!(assemble(src), vec![0xA0, 0x03, 0xB1, 0x10, 0x85, 0x10]);
    }

    #[test]
    fn test_constant_assigned_after_use() {
        assert_eq!(assemble("LDA value\nvalue = $10"), vec![0xAD, 0x10, 0x00]);
        assert_eq!(assemble("LDA #value\n.BYTE value\nvalue = 7"), vec![0xA9, 0x07, 0x07]);
    }

    #[test]
    fn test_forward_data() {
        let src = "table .WORD first\n.BYTE first\nfirst RTS";
        assert_eq!(assemble(src), vec![0x03, 0x00, 0x03, 0x60]);
    }

    #[test]
    fn test_partial_names_do_not_collide() {
        let src = "JMP loop2\nJMP loop\nloop\nloop2 RTS";
        assert_eq!(
            assemble(src),
            vec![0x4C, 0x06, 0x00, 0x4C, 0x06, 0x00, 0x60]
        );
    }

    #[test]
    fn test_forward_indexed_and_indirect() {
        let src = "LDA table,X\nJMP (vector)\nSTX ptr,Y\nptr = $20\ntable\nvector .WORD table";
        assert_eq!(
            assemble(src),
            vec![0xBD, 0x08, 0x00, 0x6C, 0x08, 0x00, 0x96, 0x20, 0x08, 0x00]
        );
    }

    #[test]
    fn test_accumulator_and_implied() {
        assert_eq!(assemble("ASL A\nROL\nCLC\nBRK"), vec![0x0A, 0x2A, 0x18, 0x00]);
    }

    #[test]
    fn test_comments_and_case() {
        let src = "; program\n  lda #%00001111 ; mask\n  Sta $0200\n";
        assert_eq!(assemble(src), vec![0xA9, 0x0F, 0x8D, 0x00, 0x02]);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!(matches!(
            assemble_err("Loop\nJMP loop"),
            AsmError::UndefinedSymbol(name) if name == "loop"
        ));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = assemble_err("NOP\n\nLDA ($10");
        match err {
            AsmError::Line { line, source } => {
                assert_eq!(line, 3);
                assert!(matches!(*source, AsmError::MalformedOperand(_)));
            }
            other => panic!("Expected line error, got {other:?}"),
        }
    }

    #[test]
    fn test_config() {
        let mut assembler = Assembler::with_config(AsmConfig {
            origin: 0x0800,
            defines: vec![("SCREEN".to_string(), 0x0400)],
        });
        assembler.define("border", 0xD020);
        assert_eq!(assembler.origin(), 0x0800);

        let asm = assembler.assemble("STA SCREEN\nSTA border\nloop JMP loop").unwrap();
        assert_eq!(asm.start_address, 0x0800);
        assert_eq!(
            asm.bytes,
            vec![0x8D, 0x00, 0x04, 0x8D, 0x20, 0xD0, 0x4C, 0x06, 0x08]
        );

        assembler.set_origin(0);
        let asm = assembler.assemble("loop JMP loop").unwrap();
        assert_eq!(asm.bytes, vec![0x4C, 0x00, 0x00]);
    }

    #[test]
    fn test_runs_are_independent() {
        let assembler = Assembler::new();
        assembler.assemble("x = 1\nlabel RTS").unwrap();
        let asm = assembler.assemble("RTS").unwrap();
        assert!(asm.symbols.is_empty());
    }
}
