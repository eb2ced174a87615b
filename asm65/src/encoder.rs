//! First pass: turns token lines into output items

use crate::addressing::{AddressingMode, classify, is_branch};
use crate::error::AsmError;
use crate::opcodes::OpcodeTable;
use crate::parser::{Term, is_identifier};
use crate::program::{OutputItem, Program};
use crate::symbol::SymbolTable;

pub struct Encoder<'a> {
    opcodes: &'a OpcodeTable,
}

impl<'a> Encoder<'a> {
    pub fn new(opcodes: &'a OpcodeTable) -> Self {
        Self { opcodes }
    }

    /// Encode one comment-free, whitespace-split source line.
    pub fn encode_line(&self, tokens: &[&str], program: &mut Program) -> Result<(), AsmError> {
        let Some((&first, rest)) = tokens.split_first() else {
            return Ok(());
        };
        let op = first.to_ascii_uppercase();

        if self.opcodes.is_mnemonic(&op) {
            let operand = single_operand(rest)?;
            return self.encode_instruction(&op, operand, program);
        }

        match op.as_str() {
            ".BYTE" => self.encode_byte(required(rest, ".BYTE")?, program),
            ".WORD" => self.encode_word(required(rest, ".WORD")?, program),
            ".ORG" => self.encode_org(required(rest, ".ORG")?, program),
            _ => self.encode_symbol(first, rest, program),
        }
    }

    fn encode_instruction(
        &self,
        mnemonic: &str,
        operand: Option<&str>,
        program: &mut Program,
    ) -> Result<(), AsmError> {
        let Some(operand) = operand else {
            let opcode = self
                .opcodes
                .implied(mnemonic)
                .ok_or_else(|| AsmError::MissingOperand(mnemonic.to_string()))?;
            program.push_bytes(&[opcode]);
            return Ok(());
        };

        let (mode, value) = classify(operand, &program.symbols)?;

        if mode == AddressingMode::Accumulator {
            let opcode = self
                .opcodes
                .get(mnemonic, mode)
                .ok_or_else(|| AsmError::unsupported(mnemonic, mode))?;
            program.push_bytes(&[opcode]);
            return Ok(());
        }

        if is_branch(mnemonic) {
            return self.encode_branch(mnemonic, operand, mode, value, program);
        }

        match value {
            Some(value) => {
                let mode = self
                    .opcodes
                    .resolved_mode(mnemonic, mode)
                    .ok_or_else(|| AsmError::unsupported(mnemonic, mode))?;
                let bytes = encode_operand(self.opcodes, mnemonic, mode, value)?;
                program.push_bytes(&bytes);
            }
            None => {
                let mode = self
                    .opcodes
                    .deferred_mode(mnemonic, mode)
                    .ok_or_else(|| AsmError::unsupported(mnemonic, mode))?;
                program.push(OutputItem::Placeholder {
                    mnemonic: mnemonic.to_string(),
                    operand: operand.to_string(),
                    needs_high_byte: mode.operand_len() == 2,
                });
            }
        }
        Ok(())
    }

    /// A known branch operand is taken as the raw displacement byte.
    fn encode_branch(
        &self,
        mnemonic: &str,
        operand: &str,
        mode: AddressingMode,
        value: Option<i32>,
        program: &mut Program,
    ) -> Result<(), AsmError> {
        let opcode = self
            .opcodes
            .get(mnemonic, AddressingMode::Relative)
            .ok_or_else(|| AsmError::unsupported(mnemonic, AddressingMode::Relative))?;
        match (mode, value) {
            (AddressingMode::ZeroPage, Some(value)) => {
                program.push_bytes(&[opcode, to_byte(value)?]);
            }
            (AddressingMode::ZeroPage, None) => {
                program.push(OutputItem::Placeholder {
                    mnemonic: mnemonic.to_string(),
                    operand: operand.to_string(),
                    needs_high_byte: false,
                });
            }
            (AddressingMode::Absolute, Some(value)) => {
                return Err(AsmError::ValueOutOfRange { value, bits: 8 });
            }
            (mode, _) => return Err(AsmError::unsupported(mnemonic, mode)),
        }
        Ok(())
    }

    fn encode_byte(&self, token: &str, program: &mut Program) -> Result<(), AsmError> {
        match evaluate(token, &program.symbols)? {
            Some(value) => program.push_bytes(&[to_byte(value)?]),
            None => program.push(OutputItem::BytePlaceholder {
                operand: token.to_string(),
            }),
        }
        Ok(())
    }

    fn encode_word(&self, token: &str, program: &mut Program) -> Result<(), AsmError> {
        match evaluate(token, &program.symbols)? {
            Some(value) => program.push_bytes(&to_word(value)?),
            None => program.push(OutputItem::WordPlaceholder {
                operand: token.to_string(),
            }),
        }
        Ok(())
    }

    fn encode_org(&self, token: &str, program: &mut Program) -> Result<(), AsmError> {
        let target = evaluate(token, &program.symbols)?
            .ok_or_else(|| AsmError::UndefinedSymbol(token.to_string()))?;
        if program.has_emitted_bytes() {
            program.push(OutputItem::OrgMarker {
                target_address: target,
            });
        } else {
            tracing::debug!("origin set to ${:04X}", target);
            program.start_address = target;
        }
        Ok(())
    }

    /// `name = value`, `name = *`, `label:` or a bare `label`, optionally followed by code.
    fn encode_symbol(&self, first: &str, rest: &[&str], program: &mut Program) -> Result<(), AsmError> {
        if let Some((&"=", value)) = rest.split_first() {
            if !is_identifier(first) {
                return Err(AsmError::InvalidLabel(first.to_string()));
            }
            let value = single_operand(value)?
                .ok_or_else(|| AsmError::MissingOperand(first.to_string()))?;
            if value == "*" {
                program.push(OutputItem::LabelMarker {
                    name: first.to_string(),
                });
            } else {
                let value = evaluate(value, &program.symbols)?
                    .ok_or_else(|| AsmError::UndefinedSymbol(value.to_string()))?;
                program.symbols.define_constant(first, value);
            }
            return Ok(());
        }

        let name = first.strip_suffix(':').unwrap_or(first);
        if !is_identifier(name) {
            return Err(AsmError::InvalidLabel(name.to_string()));
        }
        program.push(OutputItem::LabelMarker {
            name: name.to_string(),
        });
        if !rest.is_empty() {
            self.encode_line(rest, program)?;
        }
        Ok(())
    }
}

fn single_operand<'t>(rest: &[&'t str]) -> Result<Option<&'t str>, AsmError> {
    match rest {
        [] => Ok(None),
        [operand] => Ok(Some(*operand)),
        [_, extra, ..] => Err(AsmError::UnexpectedToken(extra.to_string())),
    }
}

fn required<'t>(rest: &[&'t str], directive: &str) -> Result<&'t str, AsmError> {
    single_operand(rest)?.ok_or_else(|| AsmError::MissingOperand(directive.to_string()))
}

/// Value of a directive or assignment argument: a literal or a symbol, no
/// addressing-mode syntax. `None` means the symbol is not defined yet.
pub(crate) fn evaluate(token: &str, symbols: &SymbolTable) -> Result<Option<i32>, AsmError> {
    match Term::parse(token) {
        Some(Term::Number(lit)) => Ok(Some(lit.value)),
        Some(Term::Symbol(name)) => Ok(symbols.get(name)),
        None => Err(AsmError::MalformedNumber(token.to_string())),
    }
}

/// Opcode followed by the operand bytes `mode` calls for.
pub(crate) fn encode_operand(
    opcodes: &OpcodeTable,
    mnemonic: &str,
    mode: AddressingMode,
    value: i32,
) -> Result<Vec<u8>, AsmError> {
    let opcode = opcodes
        .get(mnemonic, mode)
        .ok_or_else(|| AsmError::unsupported(mnemonic, mode))?;
    let mut bytes = vec![opcode];
    match mode.operand_len() {
        2 => bytes.extend_from_slice(&to_word(value)?),
        1 => bytes.push(to_byte(value)?),
        _ => {}
    }
    Ok(bytes)
}

/// Negative values wrap to their two's-complement byte.
pub(crate) fn to_byte(value: i32) -> Result<u8, AsmError> {
    match value {
        v if v < 0 => Ok((v & 0xFF) as u8),
        v if v <= 0xFF => Ok(v as u8),
        v => Err(AsmError::ValueOutOfRange { value: v, bits: 8 }),
    }
}

/// Little-endian word; negative values wrap.
pub(crate) fn to_word(value: i32) -> Result<[u8; 2], AsmError> {
    match value {
        v if v <= 0xFFFF => Ok([(v & 0xFF) as u8, ((v >> 8) & 0xFF) as u8]),
        v => Err(AsmError::ValueOutOfRange { value: v, bits: 16 }),
    }
}
