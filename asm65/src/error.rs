//! Error types for the assembler

use thiserror::Error;

use crate::addressing::AddressingMode;

#[derive(Error, Debug)]
pub enum AsmError {
    #[error("Malformed operand: `{0}`")]
    MalformedOperand(String),

    #[error("Malformed number: `{0}`")]
    MalformedNumber(String),

    #[error("Invalid label name: `{0}`")]
    InvalidLabel(String),

    #[error("Missing operand for {0}")]
    MissingOperand(String),

    #[error("Unexpected token: `{0}`")]
    UnexpectedToken(String),

    #[error("Unsupported addressing mode for {mnemonic}: {mode}")]
    UnsupportedMode {
        mnemonic: String,
        mode: AddressingMode,
    },

    #[error("Value {value} does not fit in {bits} bits")]
    ValueOutOfRange { value: i32, bits: u8 },

    #[error("Undefined symbol: `{0}`")]
    UndefinedSymbol(String),

    #[error("Branch target too far: {mnemonic} {target} (offset: {displacement})")]
    BranchOutOfRange {
        mnemonic: String,
        target: String,
        displacement: i32,
    },

    #[error(".ORG ${target:04X} is behind the current address ${current:04X}")]
    OrgBehind { target: i32, current: i32 },

    #[error("Line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<AsmError>,
    },
}

impl AsmError {
    /// Attach a 1-based source line number.
    pub fn at_line(self, line: usize) -> Self {
        AsmError::Line {
            line,
            source: Box::new(self),
        }
    }

    pub(crate) fn unsupported(mnemonic: &str, mode: AddressingMode) -> Self {
        AsmError::UnsupportedMode {
            mnemonic: mnemonic.to_string(),
            mode,
        }
    }
}
