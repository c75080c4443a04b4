use super::instruction::{Instr, LocalDecl, Slot};
use crate::ir::ast::{Builtin1, Builtin2};
use serde::Serialize;
use std::fmt::Write;

/// Output of code generation: slot declarations followed by the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledProgram {
    /// Scratch slot first, then one slot per defined variable.
    pub locals: Vec<LocalDecl>,
    pub instrs: Vec<Instr>,
}

impl CompiledProgram {
    /// Every declaration and instruction, one WAT form per line.
    pub fn to_lines(&self) -> Vec<String> {
        self.locals
            .iter()
            .map(ToString::to_string)
            .chain(self.instrs.iter().map(ToString::to_string))
            .collect()
    }

    /// The function body text: `to_lines()` joined with newlines.
    pub fn wat_source(&self) -> String {
        self.to_lines().join("\n")
    }

    /// Wrap the body in a complete module that imports all builtins and
    /// exports one function returning the value of the scratch slot.
    pub fn to_module(&self, options: &ModuleOptions) -> String {
        let mut out = String::from("(module\n");
        for builtin in Builtin1::ALL {
            import_line(&mut out, &options.namespace, builtin.name(), 1);
        }
        for builtin in Builtin2::ALL {
            import_line(&mut out, &options.namespace, builtin.name(), 2);
        }
        let _ = writeln!(out, "  (func (export \"{}\") (result i32)", options.entry);
        for line in self.to_lines() {
            let _ = writeln!(out, "    {line}");
        }
        let _ = writeln!(out, "    (local.get {})", Slot::Scratch);
        out.push_str("  )\n)\n");
        out
    }
}

fn import_line(out: &mut String, namespace: &str, name: &str, arity: usize) {
    let params = vec!["i32"; arity].join(" ");
    let _ = writeln!(
        out,
        "  (func ${name} (import \"{namespace}\" \"{name}\") (param {params}) (result i32))"
    );
}

/// Names used when wrapping a program into a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Import module the builtins are resolved from.
    pub namespace: String,
    /// Export name of the generated function.
    pub entry: String,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            namespace: "imports".to_string(),
            entry: "exported_func".to_string(),
        }
    }
}
