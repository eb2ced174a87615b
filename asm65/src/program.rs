//! Output sequence and per-run assembly state

use crate::addressing::referenced_symbol;
use crate::symbol::SymbolTable;

/// One entry of the output sequence built by the encoder and rewritten by the resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputItem {
    Byte(u8),
    /// Instruction waiting for its operand's symbol.
    Placeholder {
        mnemonic: String,
        operand: String,
        needs_high_byte: bool,
    },
    /// `.BYTE` waiting for its value.
    BytePlaceholder { operand: String },
    /// `.WORD` waiting for its value.
    WordPlaceholder { operand: String },
    /// `.ORG` seen after code was emitted; expands to zero padding.
    OrgMarker { target_address: i32 },
    LabelMarker { name: String },
}

impl OutputItem {
    /// Slots this item occupies in the sequence.
    ///
    /// Pending instructions and data take exactly the width of their final
    /// encoding. Markers count as two slots until the resolver removes them.
    pub fn slots(&self) -> usize {
        match self {
            OutputItem::Byte(_) | OutputItem::BytePlaceholder { .. } => 1,
            OutputItem::Placeholder {
                needs_high_byte, ..
            } => 2 + usize::from(*needs_high_byte),
            OutputItem::WordPlaceholder { .. }
            | OutputItem::OrgMarker { .. }
            | OutputItem::LabelMarker { .. } => 2,
        }
    }

    /// The operand token of a deferred item.
    pub fn pending_operand(&self) -> Option<&str> {
        match self {
            OutputItem::Placeholder { operand, .. }
            | OutputItem::BytePlaceholder { operand }
            | OutputItem::WordPlaceholder { operand } => Some(operand),
            _ => None,
        }
    }

    /// Symbol a deferred item is waiting on.
    pub fn pending_symbol(&self) -> Option<&str> {
        self.pending_operand().map(referenced_symbol)
    }
}

/// Mutable state of one assembly run.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub output: Vec<OutputItem>,
    pub symbols: SymbolTable,
    pub start_address: i32,
}

impl Program {
    pub fn new(start_address: i32) -> Self {
        Self {
            output: Vec::new(),
            symbols: SymbolTable::new(),
            start_address,
        }
    }

    pub fn push(&mut self, item: OutputItem) {
        self.output.push(item);
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.output.extend(bytes.iter().map(|&b| OutputItem::Byte(b)));
    }

    /// True once any concrete byte is in the sequence.
    pub fn has_emitted_bytes(&self) -> bool {
        self.output.iter().any(|item| matches!(item, OutputItem::Byte(_)))
    }

    /// Total slots in the sequence.
    pub fn slot_len(&self) -> usize {
        self.output.iter().map(OutputItem::slots).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_widths() {
        let wide = OutputItem::Placeholder {
            mnemonic: "JMP".into(),
            operand: "end".into(),
            needs_high_byte: true,
        };
        let narrow = OutputItem::Placeholder {
            mnemonic: "BNE".into(),
            operand: "loop".into(),
            needs_high_byte: false,
        };
        assert_eq!(wide.slots(), 3);
        assert_eq!(narrow.slots(), 2);
        assert_eq!(OutputItem::BytePlaceholder { operand: "x".into() }.slots(), 1);
        assert_eq!(OutputItem::WordPlaceholder { operand: "x".into() }.slots(), 2);
        assert_eq!(OutputItem::LabelMarker { name: "x".into() }.slots(), 2);
        assert_eq!(OutputItem::OrgMarker { target_address: 9 }.slots(), 2);
    }

    #[test]
    fn test_pending_symbol() {
        let item = OutputItem::Placeholder {
            mnemonic: "LDA".into(),
            operand: "(ptr),Y".into(),
            needs_high_byte: false,
        };
        assert_eq!(item.pending_symbol(), Some("ptr"));
        assert_eq!(OutputItem::Byte(1).pending_symbol(), None);
    }

    #[test]
    fn test_has_emitted_bytes() {
        let mut program = Program::new(0);
        program.push(OutputItem::LabelMarker { name: "start".into() });
        assert!(!program.has_emitted_bytes());
        program.push_bytes(&[0xEA]);
        assert!(program.has_emitted_bytes());
        assert_eq!(program.slot_len(), 3);
    }
}
