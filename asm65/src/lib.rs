//! Two-pass 6502 assembler with forward references
//! - One instruction, directive or label per line; `;` starts a comment
//! - Mnemonics are case-insensitive, symbols are case-sensitive
//! - Forward references are reserved at their final width and backfilled
//!   once the label's address is known
//!
//! ## Features
//! - **Number syntax**: `$FF` hex, `%1010` binary, `017` octal, `42` decimal.
//! - **Directives**:
//!   - `.ORG addr`: set the origin, or pad with zeros up to `addr`.
//!   - `.BYTE v` / `.WORD v`: emit one byte / one little-endian word.
//! - **Symbols**: `name = value` constants, `name = *` and `name:` labels.
//! - **Addressing modes**: accumulator, immediate, zeropage, absolute,
//!   indexed, indirect and relative branches.
//! - **Width rule**: a four-digit hex operand (`$00FF`) always selects the
//!   absolute form.
//!
//! ## Basic Usage
//! ```rust
//! use asm65::Assembler;
//!
//! fn main() -> Result<(), asm65::AsmError> {
//!     let assembler = Assembler::new();
//!     let src = r#"
//!         .ORG $0800
//!         LDA #$42
//!         STA $0200
//!     "#;
//!
//!     let assembly = assembler.assemble(src)?;
//!     assert_eq!(assembly.start_address, 0x0800);
//!     assert_eq!(assembly.bytes, vec![0xA9, 0x42, 0x8D, 0x00, 0x02]);
//!     Ok(())
//! }
//! ```

mod error;
mod opcodes;
mod symbol;
mod parser;
mod addressing;
mod program;
mod encoder;
mod resolver;
mod assembler;

// Public exports
pub use error::AsmError;
pub use assembler::{AsmConfig, Assembler, Assembly};
pub use addressing::{AddressingMode, classify, is_branch};
pub use opcodes::OpcodeTable;
pub use symbol::{Symbol, SymbolKind, SymbolTable};
pub use program::{OutputItem, Program};
pub use encoder::Encoder;
pub use resolver::Resolver;
pub use parser::{Literal, NumberFormat, NumberParser, SourceLine, parse_source};
