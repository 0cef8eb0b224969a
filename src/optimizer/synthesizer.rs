use std::collections::HashSet;

use super::Program;

const TYPE_KEYWORDS: [&str; 2] = ["int", "bool"];

/// Reassemble the live statements, in source order, into the final program
/// text. Variables reassigned without a surviving declaration get an `int`
/// prefix so the result stays parseable by the downstream front end.
pub(super) fn synthesize(program: &Program) -> String {
    let mut declared: HashSet<String> = HashSet::new();

    let lines: Vec<String> = program
        .statements
        .iter()
        .filter(|statement| statement.live)
        .map(|statement| {
            let text = statement.folded.as_deref().unwrap_or(statement.text);
            with_declaration(text, &mut declared)
        })
        .collect();

    lines.join("\n")
}

fn with_declaration(text: &str, declared: &mut HashSet<String>) -> String {
    let mut tokens = text.split_whitespace();

    while let Some(token) = tokens.next() {
        if TYPE_KEYWORDS.contains(&token) {
            if let Some(name) = tokens.next() {
                declared.insert(name.trim_end_matches('=').to_owned());
            }
            return text.to_owned();
        }
        if token.contains('=') {
            break;
        }
    }

    // Bare reassignment. The membership check is against the assignment
    // target only; an identifier on the right-hand side that happens to
    // collide with a declared name must not suppress the prefix.
    let target = assignment_target(text);
    if declared.contains(target) {
        text.to_owned()
    } else {
        declared.insert(target.to_owned());
        format!("int {}", text)
    }
}

/// Identifier prefix of the first token, i.e. the left-hand-side variable.
fn assignment_target(text: &str) -> &str {
    let token = text.split_whitespace().next().unwrap_or("");
    let end = token
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(token.len());
    &token[..end]
}
