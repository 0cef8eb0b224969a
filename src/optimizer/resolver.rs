use std::collections::HashSet;

use super::evaluator::{tokenize, Evaluator};
use super::{Program, Result, OUTPUT_NAME};
use crate::errors::OptimizeError;

/// Demand-driven backward constant propagation. Resolution starts at the
/// reserved `output` symbol and pulls values through the def-use chain,
/// marking every definition it touches as live and rewriting its text to a
/// folded constant.
pub(super) struct Resolver<'p, 'a> {
    program: &'p mut Program<'a>,
    /// Statement indices currently being resolved somewhere up the call
    /// stack. Re-entering one of these means the program defines a variable
    /// in terms of itself.
    in_progress: HashSet<usize>,
}

impl<'p, 'a> Resolver<'p, 'a> {
    pub(super) fn fold_output(program: &'p mut Program<'a>) -> Result<()> {
        let root = program.statements.len();
        let mut resolver = Self {
            program,
            in_progress: HashSet::new(),
        };

        match resolver.resolve(root, OUTPUT_NAME) {
            Ok(_) => Ok(()),
            Err(OptimizeError::UnresolvedVariable(name)) if name == OUTPUT_NAME => {
                Err(OptimizeError::EmptyProgram)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve `name` to a constant, searching definitions strictly before
    /// statement `before`.
    pub(super) fn resolve(&mut self, before: usize, name: &str) -> Result<i64> {
        let index = self.find_definition(before, name)?;

        if self.in_progress.contains(&index) {
            return Err(OptimizeError::CyclicDefinition(name.to_owned()));
        }
        if let Some(value) = self.program.statements[index].value {
            return Ok(value);
        }

        let text = self.program.statements[index].text;
        let equals = text.find('=').ok_or_else(|| {
            OptimizeError::MalformedStatement(index, "definition has no '='".to_owned())
        })?;

        self.program.statements[index].live = true;

        let tokens = tokenize(&text[equals + 1..], index)?;
        self.in_progress.insert(index);
        let value = Evaluator::new(tokens, index, self).evaluate()?;
        self.in_progress.remove(&index);

        let statement = &mut self.program.statements[index];
        statement.folded = Some(format!("{} {};", &text[..=equals], value));
        statement.value = Some(value);

        Ok(value)
    }

    fn find_definition(&self, before: usize, name: &str) -> Result<usize> {
        if let Some(index) = self.program.nearest_definition(before, name) {
            return Ok(index);
        }

        // The scan exhausted every earlier statement. If a definition of
        // this name is in progress higher up the stack, the reference can
        // only be satisfied by re-entering it, so the definition is cyclic.
        let cyclic = self
            .program
            .candidate_definitions(name)
            .iter()
            .any(|index| self.in_progress.contains(index));

        if cyclic {
            Err(OptimizeError::CyclicDefinition(name.to_owned()))
        } else {
            Err(OptimizeError::UnresolvedVariable(name.to_owned()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn folded_program(source: &str) -> Program<'_> {
        let mut program = Program::parse(source).unwrap();
        program.fold().unwrap();
        program
    }

    #[test]
    fn test_marks_reachable_statements_live() {
        let program = folded_program("int y = 99; int x = 5; output = x;");

        let live: Vec<bool> = program.statements.iter().map(|s| s.live).collect();
        assert_eq!(live, vec![false, true, true]);
    }

    #[test]
    fn test_folds_definition_text() {
        let program = folded_program("int x = 2 + 3; output = x;");

        assert_eq!(program.statements[0].folded.as_deref(), Some("int x = 5;"));
        assert_eq!(program.statements[1].folded.as_deref(), Some("output = 5;"));
    }

    #[test]
    fn test_nearest_preceding_definition_wins() {
        let program = folded_program("int x = 1; x = 2; output = x;");

        assert!(!program.statements[0].live);
        assert_eq!(program.statements[1].value, Some(2));
    }

    #[test]
    fn test_reassignment_sees_older_definition() {
        let program = folded_program("int x = 1; x = x + 2; output = x;");

        assert_eq!(program.statements[0].value, Some(1));
        assert_eq!(program.statements[1].value, Some(3));
        assert_eq!(program.statements[2].value, Some(3));
    }

    #[test]
    fn test_shared_definition_resolved_once() {
        let program = folded_program("int x = 4; output = x + x * x;");

        assert_eq!(program.statements[0].value, Some(4));
        assert_eq!(program.statements[1].value, Some(20));
    }

    #[test]
    fn test_mutual_cycle_detected() {
        let mut program = Program::parse("b = c; c = b; output = c;").unwrap();
        assert_eq!(
            program.fold(),
            Err(OptimizeError::CyclicDefinition("c".to_owned()))
        );
    }

    #[test]
    fn test_self_cycle_past_first_statement() {
        let mut program = Program::parse("int x = 1; a = a + 1; output = a;").unwrap();
        assert_eq!(
            program.fold(),
            Err(OptimizeError::CyclicDefinition("a".to_owned()))
        );
    }

    #[test]
    fn test_definition_after_use_is_unresolved() {
        let mut program = Program::parse("output = b; b = 3;").unwrap();
        assert_eq!(
            program.fold(),
            Err(OptimizeError::UnresolvedVariable("b".to_owned()))
        );
    }

    #[test]
    fn test_definition_missing_equals() {
        let mut program = Program::parse("int output;").unwrap();
        assert_eq!(
            program.fold(),
            Err(OptimizeError::MalformedStatement(
                0,
                "definition has no '='".to_owned()
            ))
        );
    }
}
