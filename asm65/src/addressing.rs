//! Addressing mode detection and operand classification

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::AsmError;
use crate::parser::Term;
use crate::symbol::SymbolTable;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// The absolute counterpart of a zero-page mode; other modes are unchanged.
    pub fn promoted(self) -> Self {
        match self {
            AddressingMode::ZeroPage => AddressingMode::Absolute,
            AddressingMode::ZeroPageX => AddressingMode::AbsoluteX,
            AddressingMode::ZeroPageY => AddressingMode::AbsoluteY,
            other => other,
        }
    }

    /// Number of operand bytes following the opcode.
    pub fn operand_len(self) -> usize {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressingMode::Implied => "implied",
            AddressingMode::Accumulator => "accumulator",
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zeropage",
            AddressingMode::ZeroPageX => "zeropage,X",
            AddressingMode::ZeroPageY => "zeropage,Y",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute,X",
            AddressingMode::AbsoluteY => "absolute,Y",
            AddressingMode::Indirect => "indirect",
            AddressingMode::IndirectX => "indirect,X",
            AddressingMode::IndirectY => "indirect,Y",
            AddressingMode::Relative => "relative",
        };
        f.write_str(name)
    }
}

/// Check if a mnemonic is a branch instruction
pub fn is_branch(mnemonic: &str) -> bool {
    matches!(
        mnemonic,
        "BCC" | "BCS" | "BEQ" | "BMI" | "BNE" | "BPL" | "BVC" | "BVS"
    )
}

// Tried in order, first match wins. Group 1 is the value term.
static OPERAND_FORMS: Lazy<Vec<(AddressingMode, Regex)>> = Lazy::new(|| {
    [
        (AddressingMode::Immediate, r"^#([^,()#]+)$"),
        (AddressingMode::ZeroPage, r"^([^,()#]+)$"),
        (AddressingMode::ZeroPageX, r"^([^,()#]+),[xX]$"),
        (AddressingMode::ZeroPageY, r"^([^,()#]+),[yY]$"),
        (AddressingMode::IndirectX, r"^\(([^,()#]+),[xX]\)$"),
        (AddressingMode::IndirectY, r"^\(([^,()#]+)\),[yY]$"),
        (AddressingMode::Indirect, r"^\(([^,()#]+)\)$"),
    ]
    .into_iter()
    .map(|(mode, pattern)| (mode, Regex::new(pattern).expect("operand pattern")))
    .collect()
});

/// Classify an operand token into its addressing mode and value.
///
/// The value is `None` when the operand names a symbol that is not defined
/// yet; the caller defers the instruction. The accumulator form `A` also
/// carries no value, so check the mode first.
///
/// Zero-page forms are promoted to absolute when the value exceeds a byte or
/// when the literal was written with four hex digits (`$00FF`). Negative
/// values wrap to their unsigned byte.
pub fn classify(
    token: &str,
    symbols: &SymbolTable,
) -> Result<(AddressingMode, Option<i32>), AsmError> {
    if token == "A" {
        return Ok((AddressingMode::Accumulator, None));
    }

    for (mode, pattern) in OPERAND_FORMS.iter() {
        let Some(caps) = pattern.captures(token) else {
            continue;
        };
        let Some(term) = Term::parse(&caps[1]) else {
            continue;
        };

        let mut mode = *mode;
        let value = match term {
            Term::Number(lit) => {
                if lit.is_wide() {
                    mode = mode.promoted();
                }
                Some(lit.value)
            }
            Term::Symbol(name) => symbols.get(name),
        };
        if value.is_some_and(|v| v > 0xFF) {
            mode = mode.promoted();
        }
        let value = value.map(|v| if v < 0 { v & 0xFF } else { v });
        return Ok((mode, value));
    }

    Err(AsmError::MalformedOperand(token.to_string()))
}

/// Name of the symbol an operand refers to, with any `#`, `(`, `,X` or `)` trimmed.
pub fn referenced_symbol(operand: &str) -> &str {
    let inner = operand.trim_start_matches(['#', '(']);
    let end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    &inner[..end]
}
