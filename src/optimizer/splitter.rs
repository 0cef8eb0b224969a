use super::{Result, Statement};
use crate::errors::OptimizeError;

/// Partition the source buffer into one trimmed statement record per `;`
/// boundary. Text after the final `;` must be blank; a non-empty dangling
/// fragment is a malformed statement, not a silent drop.
pub fn split_statements(source: &str) -> Result<Vec<Statement<'_>>> {
    let mut statements = Vec::new();
    let mut remainder = source;

    while let Some(position) = remainder.find(';') {
        statements.push(Statement::new(remainder[..position].trim()));
        remainder = &remainder[position + 1..];
    }

    if !remainder.trim().is_empty() {
        return Err(OptimizeError::MalformedStatement(
            statements.len(),
            "statement is not terminated by ';'".to_owned(),
        ));
    }

    if statements.is_empty() {
        return Err(OptimizeError::EmptyProgram);
    }

    Ok(statements)
}

#[cfg(test)]
mod test {
    use super::*;

    fn texts(source: &str) -> Vec<&str> {
        split_statements(source)
            .unwrap()
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_split_basic() {
        assert_eq!(
            texts("int x = 5; output = x;"),
            vec!["int x = 5", "output = x"]
        );
    }

    #[test]
    fn test_split_trims_whitespace() {
        assert_eq!(
            texts("  int x = 5 ;\n\toutput = x ;\n"),
            vec!["int x = 5", "output = x"]
        );
    }

    #[test]
    fn test_split_keeps_empty_records() {
        assert_eq!(texts("x = 1;; output = x;"), vec!["x = 1", "", "output = x"]);
    }

    #[test]
    fn test_dangling_fragment() {
        assert_eq!(
            split_statements("x = 1; output = x"),
            Err(OptimizeError::MalformedStatement(
                1,
                "statement is not terminated by ';'".to_owned()
            ))
        );
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(split_statements(""), Err(OptimizeError::EmptyProgram));
        assert_eq!(split_statements(" \n "), Err(OptimizeError::EmptyProgram));
    }

    #[test]
    fn test_new_statements_start_dead() {
        let statements = split_statements("output = 1;").unwrap();
        assert!(!statements[0].live);
        assert!(statements[0].folded.is_none());
    }
}
