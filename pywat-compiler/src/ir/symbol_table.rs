use std::collections::HashSet;

/// Names defined so far in a program.
///
/// The language has a single flat scope: a name becomes visible right after
/// its first definition and stays visible to the end of the program.
/// Redefinition is allowed and does not change anything here.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    defined: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            defined: HashSet::new(),
        }
    }

    pub fn define(&mut self, name: &str) {
        if !self.defined.contains(name) {
            self.defined.insert(name.to_string());
        }
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }
}
