use std::collections::HashMap;

use serde::Serialize;

use crate::errors::OptimizeError;

mod evaluator;
mod resolver;
mod splitter;
mod synthesizer;

pub use splitter::split_statements;

use resolver::Resolver;
use synthesizer::synthesize;

pub type Result<T> = std::result::Result<T, OptimizeError>;

/// The reserved symbol the whole pass is rooted at.
pub const OUTPUT_NAME: &str = "output";

/// One semicolon-terminated assignment record. Identity is its index in
/// source order, which never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement<'a> {
    /// Trimmed slice of the source between semicolons.
    pub text: &'a str,
    /// Set once by the resolver when the statement is reached from `output`.
    pub live: bool,
    /// Rewritten replacement text, `<lhs through '='> <value>;`.
    pub folded: Option<String>,
    /// Cached result of evaluating the right-hand side, so a resolved
    /// definition is never re-resolved.
    pub value: Option<i64>,
}

impl<'a> Statement<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            live: false,
            folded: None,
            value: None,
        }
    }

    /// Maximal letter-then-alphanumeric identifier runs appearing before the
    /// first `=`. A statement defines a name exactly when the name appears
    /// in this list.
    pub fn lhs_identifiers(&self) -> Vec<&'a str> {
        let bytes = self.text.as_bytes();
        let mut identifiers = Vec::new();
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'=' {
                break;
            }
            if bytes[i].is_ascii_alphabetic() {
                let start = i;
                while i < bytes.len() && bytes[i].is_ascii_alphanumeric() {
                    i += 1;
                }
                identifiers.push(&self.text[start..i]);
            } else {
                i += 1;
            }
        }

        identifiers
    }
}

/// The statement table plus an index from each identifier to the statements
/// that define it, in ascending source order. Definition lookup is a
/// nearest-preceding walk of the index rather than a rescan of the text.
#[derive(Debug, Serialize)]
pub struct Program<'a> {
    pub statements: Vec<Statement<'a>>,
    definitions: HashMap<&'a str, Vec<usize>>,
}

impl<'a> Program<'a> {
    pub fn parse(source: &'a str) -> Result<Self> {
        let statements = split_statements(source)?;

        let mut definitions: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (index, statement) in statements.iter().enumerate() {
            for name in statement.lhs_identifiers() {
                let candidates = definitions.entry(name).or_default();
                if candidates.last() != Some(&index) {
                    candidates.push(index);
                }
            }
        }

        Ok(Self {
            statements,
            definitions,
        })
    }

    /// Nearest definition of `name` strictly before `before`, if any.
    fn nearest_definition(&self, before: usize, name: &str) -> Option<usize> {
        self.definitions
            .get(name)?
            .iter()
            .rev()
            .find(|&&index| index < before)
            .copied()
    }

    fn candidate_definitions(&self, name: &str) -> &[usize] {
        self.definitions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Pull constants backward from `output`, settling the liveness flags
    /// and folded text of every reachable statement.
    pub fn fold(&mut self) -> Result<()> {
        Resolver::fold_output(self)
    }

    /// Reassemble the kept statements into the final program text.
    pub fn synthesize(&self) -> String {
        synthesize(self)
    }
}

/// Run the whole pass over a source buffer.
pub fn optimize(source: &str) -> Result<String> {
    let mut program = Program::parse(source)?;
    program.fold()?;
    Ok(program.synthesize())
}
