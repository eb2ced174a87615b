//! Second pass: assigns label addresses and backfills deferred references
//!
//! The output sequence is walked left to right. `.ORG` markers expand into
//! zero padding; each label marker fixes the label's address and then patches
//! every pending item in the whole sequence that names it. Pending items were
//! reserved at their final width, so patching never moves a label that has
//! already been placed.
//!
//! Positions are counted in slots (see [`OutputItem::slots`]). A label marker
//! still in the sequence occupies two slots that will disappear, so a branch
//! sitting behind `n` pending markers has its address lowered by `2 * n`.
//! Unexpanded `.ORG` padding between a label and a later branch is not
//! compensated for.

use regex::Regex;

use crate::addressing::{AddressingMode, classify, is_branch, referenced_symbol};
use crate::encoder::{encode_operand, evaluate, to_byte, to_word};
use crate::error::AsmError;
use crate::opcodes::OpcodeTable;
use crate::program::{OutputItem, Program};
use crate::symbol::SymbolTable;

pub struct Resolver<'a> {
    opcodes: &'a OpcodeTable,
}

impl<'a> Resolver<'a> {
    pub fn new(opcodes: &'a OpcodeTable) -> Self {
        Self { opcodes }
    }

    /// Resolve every marker and placeholder, consuming the sequence into bytes.
    pub fn resolve(&self, program: &mut Program) -> Result<Vec<u8>, AsmError> {
        let mut index = 0;
        let mut slot = 0;

        while index < program.output.len() {
            match &program.output[index] {
                OutputItem::OrgMarker { target_address } => {
                    let target = *target_address;
                    let current = slot as i32 + program.start_address;
                    if target < current {
                        return Err(AsmError::OrgBehind { target, current });
                    }
                    let padding = (target - current) as usize;
                    tracing::debug!("padding {} bytes up to ${:04X}", padding, target);
                    program
                        .output
                        .splice(index..=index, std::iter::repeat_n(OutputItem::Byte(0), padding));
                }
                OutputItem::LabelMarker { name } => {
                    let name = name.clone();
                    let address = slot as i32 + program.start_address;
                    tracing::trace!("label {} = ${:04X}", name, address);
                    program.symbols.define_label(&name, address);

                    let matcher = reference_matcher(&name)?;
                    index = self.backfill(program, index, |operand| matcher.is_match(operand))?;
                    program.output.remove(index);
                }
                item => {
                    slot += item.slots();
                    index += 1;
                }
            }
        }

        // Whatever is still pending refers to constants assigned after their
        // first use, or to nothing at all.
        if program.output.iter().any(|item| item.pending_operand().is_some()) {
            let end = program.output.len();
            self.backfill(program, end, |_| true)?;
        }

        tracing::debug!(
            "resolved {} bytes, {} symbols",
            program.output.len(),
            program.symbols.len()
        );

        program
            .output
            .iter()
            .map(|item| match item {
                OutputItem::Byte(b) => Ok(*b),
                other => Err(AsmError::UndefinedSymbol(
                    other.pending_symbol().unwrap_or_default().to_string(),
                )),
            })
            .collect()
    }

    /// Patch every pending item whose operand satisfies `is_target`.
    ///
    /// Returns the new index of the item that was at `anchor`, which moves
    /// when items in front of it expand into several bytes.
    fn backfill(
        &self,
        program: &mut Program,
        mut anchor: usize,
        is_target: impl Fn(&str) -> bool,
    ) -> Result<usize, AsmError> {
        let mut index = 0;
        let mut slot = 0;
        let mut num_labels = 0;

        while index < program.output.len() {
            let item = &program.output[index];
            let width = item.slots();
            let patched = match item {
                OutputItem::LabelMarker { .. } => {
                    num_labels += 1;
                    None
                }
                OutputItem::Placeholder {
                    mnemonic, operand, ..
                } if is_target(operand) => {
                    let address = (slot - num_labels * 2) as i32 + program.start_address;
                    Some(self.patch_instruction(mnemonic, operand, address, &program.symbols)?)
                }
                OutputItem::BytePlaceholder { operand } if is_target(operand) => {
                    Some(vec![to_byte(value_of(operand, &program.symbols)?)?])
                }
                OutputItem::WordPlaceholder { operand } if is_target(operand) => {
                    Some(to_word(value_of(operand, &program.symbols)?)?.to_vec())
                }
                _ => None,
            };
            slot += width;

            match patched {
                Some(bytes) => {
                    debug_assert_eq!(bytes.len(), width);
                    let count = bytes.len();
                    program
                        .output
                        .splice(index..=index, bytes.into_iter().map(OutputItem::Byte));
                    if index < anchor {
                        anchor += count - 1;
                    }
                    index += count;
                }
                None => index += 1,
            }
        }

        Ok(anchor)
    }

    /// Encode a deferred instruction located at `address` now that its symbol is known.
    fn patch_instruction(
        &self,
        mnemonic: &str,
        operand: &str,
        address: i32,
        symbols: &SymbolTable,
    ) -> Result<Vec<u8>, AsmError> {
        let (mode, value) = classify(operand, symbols)?;
        let value =
            value.ok_or_else(|| AsmError::UndefinedSymbol(referenced_symbol(operand).to_string()))?;

        if is_branch(mnemonic) {
            // relative to the instruction after the branch
            let displacement = value - (address + 2);
            if !(-128..=127).contains(&displacement) {
                return Err(AsmError::BranchOutOfRange {
                    mnemonic: mnemonic.to_string(),
                    target: operand.to_string(),
                    displacement,
                });
            }
            let opcode = self
                .opcodes
                .get(mnemonic, AddressingMode::Relative)
                .ok_or_else(|| AsmError::unsupported(mnemonic, AddressingMode::Relative))?;
            return Ok(vec![opcode, displacement as u8]);
        }

        let mode = self
            .opcodes
            .deferred_mode(mnemonic, mode)
            .ok_or_else(|| AsmError::unsupported(mnemonic, mode))?;
        encode_operand(self.opcodes, mnemonic, mode, value)
    }
}

/// Matches operands that name exactly `name`: `name`, `#name`, `(name)`,
/// `(name,X)`, `(name),Y`, `name,X`. `loop2` never matches `loop`.
fn reference_matcher(name: &str) -> Result<Regex, AsmError> {
    Regex::new(&format!(r"^[(#]*{}(?:[),]|$)", regex::escape(name)))
        .map_err(|_| AsmError::InvalidLabel(name.to_string()))
}

fn value_of(operand: &str, symbols: &SymbolTable) -> Result<i32, AsmError> {
    evaluate(operand, symbols)?.ok_or_else(|| AsmError::UndefinedSymbol(operand.to_string()))
}
