//! Symbol table for labels and constants

use std::fmt;

use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Assigned with `name = value` or predefined by configuration
    Constant,
    /// Declared with `name:`, a bare `name`, or `name = *`
    Label,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Constant => f.write_str("const"),
            SymbolKind::Label => f.write_str("label"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub value: i32,
    pub kind: SymbolKind,
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: IndexMap::new(),
        }
    }

    pub fn define_constant(&mut self, name: &str, value: i32) {
        self.insert(name, Symbol {
            value,
            kind: SymbolKind::Constant,
        });
    }

    pub fn define_label(&mut self, name: &str, address: i32) {
        self.insert(name, Symbol {
            value: address,
            kind: SymbolKind::Label,
        });
    }

    fn insert(&mut self, name: &str, symbol: Symbol) {
        if let Some(prev) = self.symbols.insert(name.to_string(), symbol) {
            tracing::warn!(
                "re-defined {} `{}`: {} -> {}",
                symbol.kind,
                name,
                prev.value,
                symbol.value
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<i32> {
        self.symbols.get(name).map(|s| s.value)
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols.iter().map(|(name, sym)| (name.as_str(), sym))
    }
}
