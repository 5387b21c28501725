//! Stack assembly.
//!
//! Concatenates ordered fragments between a fixed prologue and epilogue. The
//! assembler never reorders; it only checks that every fragment uses
//! identifiers defined before it.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CdkError, CdkResult};
use crate::fragment::{EmittedFragment, Import, StackOutput};
use crate::naming::SymbolTable;

const INDENT: &str = "    ";

/// Indentation of the stack body inside `__init__`.
const BODY_DEPTH: usize = 2;

const BASE_IMPORTS: [&str; 3] = [
    "import aws_cdk as cdk",
    "from aws_cdk import Stack",
    "from constructs import Construct",
];

/// A rendered stack document plus what it declares.
#[derive(Debug, Clone, Serialize)]
pub struct StackDefinition {
    stack_name: String,
    #[serde(skip)]
    source: String,
    declared: Vec<String>,
    outputs: Vec<StackOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbols: Option<SymbolTable>,
}

impl StackDefinition {
    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.symbols = Some(symbols);
        self
    }

    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// The stack program.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Every identifier the program defines, in definition order.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }

    pub fn outputs(&self) -> &[StackOutput] {
        &self.outputs
    }

    pub fn symbols(&self) -> Option<&SymbolTable> {
        self.symbols.as_ref()
    }

    /// Machine-readable JSON summary of the declared identifiers and outputs.
    pub fn report(&self) -> CdkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct StackAssembler {
    stack_class: String,
}

impl StackAssembler {
    pub fn new(stack_class: impl Into<String>) -> Self {
        Self {
            stack_class: stack_class.into(),
        }
    }

    pub fn assemble(&self, fragments: &[EmittedFragment], stack_name: &str) -> CdkResult<StackDefinition> {
        let mut defined: HashSet<&str> = HashSet::new();
        let mut declared = Vec::new();
        let mut imports: Vec<Import> = Vec::new();
        let mut outputs = Vec::new();

        for fragment in fragments {
            if let Some(missing) = fragment.references.iter().find(|r| !defined.contains(r.as_str())) {
                return Err(CdkError::UndefinedReference {
                    origin: fragment.origin.to_string(),
                    identifier: missing.clone(),
                });
            }

            for variable in &fragment.defines {
                if defined.insert(variable.as_str()) {
                    declared.push(variable.clone());
                }
            }
            for import in &fragment.imports {
                if !imports.contains(import) {
                    imports.push(*import);
                }
            }
            outputs.extend(fragment.outputs.iter().cloned());
        }

        let mut source = String::new();
        for line in BASE_IMPORTS {
            push_line(&mut source, 0, line);
        }
        for import in &imports {
            push_line(&mut source, 0, import.statement());
        }
        push_line(&mut source, 0, &format!("class {}(Stack):", self.stack_class));
        push_line(
            &mut source,
            1,
            "def __init__(self, scope: Construct, construct_id: str, **kwargs) -> None:",
        );
        push_line(&mut source, 2, "super().__init__(scope, construct_id, **kwargs)");

        for fragment in fragments {
            debug!("Assembling {} ({} line(s))", fragment.origin, fragment.lines.len());
            for line in &fragment.lines {
                push_line(&mut source, BODY_DEPTH + line.indent, &line.text);
            }
        }

        push_line(&mut source, 0, "app = cdk.App()");
        push_line(&mut source, 0, &format!("{}(app, '{}')", self.stack_class, stack_name));
        push_line(&mut source, 0, "app.synth()");

        info!(
            "Assembled stack '{}': {} identifier(s), {} output(s)",
            stack_name,
            declared.len(),
            outputs.len()
        );

        Ok(StackDefinition {
            stack_name: stack_name.to_string(),
            source,
            declared,
            outputs,
            symbols: None,
        })
    }
}

impl Default for StackAssembler {
    fn default() -> Self {
        Self::new("CdkWorkshopStack")
    }
}

fn push_line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}
