use derive_more::Display;
use logos::Logos;

use super::resolver::Resolver;
use super::Result;
use crate::errors::OptimizeError;

/// Token alphabet of the right-hand-side expression grammar.
#[derive(Logos, Debug, Clone, PartialEq, Display)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(super) enum ExprToken {
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    #[display("number {_0}")]
    Number(i64),

    #[regex(r"[a-zA-Z][a-zA-Z0-9]*", |lex| lex.slice().to_owned())]
    #[display("identifier {_0}")]
    Identifier(String),

    #[token("+")]
    #[display("'+'")]
    Plus,
    #[token("-")]
    #[display("'-'")]
    Minus,
    #[token("*")]
    #[display("'*'")]
    Star,
    #[token("/")]
    #[display("'/'")]
    Slash,
    #[token("(")]
    #[display("'('")]
    LeftParen,
    #[token(")")]
    #[display("')'")]
    RightParen,
    #[token("<")]
    #[display("'<'")]
    Less,
    #[token("<=")]
    #[display("'<='")]
    LessEqual,
    #[token(">")]
    #[display("'>'")]
    Greater,
    #[token(">=")]
    #[display("'>='")]
    GreaterEqual,
    #[token("==")]
    #[display("'=='")]
    EqualEqual,
    #[token("!=")]
    #[display("'!='")]
    BangEqual,
}

/// Tokenize the text after a definition's `=` in one shot, so evaluation
/// consumes a finite positional sequence rather than threading a character
/// pointer through every grammar level.
pub(super) fn tokenize(expression: &str, statement: usize) -> Result<Vec<ExprToken>> {
    let mut lexer = ExprToken::lexer(expression);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(OptimizeError::MalformedStatement(
                    statement,
                    format!("unrecognized token {:?} in expression", lexer.slice()),
                ));
            }
        }
    }

    Ok(tokens)
}

/// Recursive-descent evaluator over the tokenized right-hand side. Variable
/// references re-enter the resolver with the owning statement's index as the
/// search bound, which is what pulls whole def-use chains down to constants.
pub(super) struct Evaluator<'r, 'p, 'a> {
    tokens: Vec<ExprToken>,
    position: usize,
    statement: usize,
    resolver: &'r mut Resolver<'p, 'a>,
}

impl<'r, 'p, 'a> Evaluator<'r, 'p, 'a> {
    pub(super) fn new(
        tokens: Vec<ExprToken>,
        statement: usize,
        resolver: &'r mut Resolver<'p, 'a>,
    ) -> Self {
        Self {
            tokens,
            position: 0,
            statement,
            resolver,
        }
    }

    pub(super) fn evaluate(mut self) -> Result<i64> {
        let value = self.relational()?;

        match self.peek() {
            None => Ok(value),
            Some(token) => Err(self.malformed(format!("unexpected {} after expression", token))),
        }
    }

    fn malformed(&self, message: String) -> OptimizeError {
        OptimizeError::MalformedStatement(self.statement, message)
    }

    fn peek(&self) -> Option<&ExprToken> {
        self.tokens.get(self.position)
    }

    fn take(&mut self) -> Result<ExprToken> {
        let token = self
            .tokens
            .get(self.position)
            .cloned()
            .ok_or_else(|| self.malformed("expression ends early".to_owned()))?;
        self.position += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: ExprToken) -> Result<()> {
        let token = self.take()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.malformed(format!("expected {}, found {}", expected, token)))
        }
    }

    // Comparisons associate left to right and do not chain; each yields 0 or
    // 1 and feeds the next as an ordinary operand.
    fn relational(&mut self) -> Result<i64> {
        use ExprToken::*;

        let mut value = self.additive()?;

        while matches!(
            self.peek(),
            Some(Less | LessEqual | Greater | GreaterEqual | EqualEqual | BangEqual)
        ) {
            let comparison: fn(i64, i64) -> bool = match self.take()? {
                Less => |a, b| a < b,
                LessEqual => |a, b| a <= b,
                Greater => |a, b| a > b,
                GreaterEqual => |a, b| a >= b,
                EqualEqual => |a, b| a == b,
                _ => |a, b| a != b,
            };
            let rhs = self.additive()?;
            value = i64::from(comparison(value, rhs));
        }

        Ok(value)
    }

    fn additive(&mut self) -> Result<i64> {
        use ExprToken::*;

        let mut value = self.multiplicative()?;

        while matches!(self.peek(), Some(Plus | Minus)) {
            let op = self.take()?;
            let rhs = self.multiplicative()?;
            value = match op {
                Plus => value.wrapping_add(rhs),
                _ => value.wrapping_sub(rhs),
            };
        }

        Ok(value)
    }

    fn multiplicative(&mut self) -> Result<i64> {
        use ExprToken::*;

        let mut value = self.unary()?;

        while matches!(self.peek(), Some(Star | Slash)) {
            let op = self.take()?;
            let rhs = self.unary()?;
            value = match op {
                Star => value.wrapping_mul(rhs),
                _ => {
                    if rhs == 0 {
                        return Err(OptimizeError::DivisionByZero(self.statement));
                    }
                    value.wrapping_div(rhs)
                }
            };
        }

        Ok(value)
    }

    fn unary(&mut self) -> Result<i64> {
        if matches!(self.peek(), Some(ExprToken::Minus)) {
            self.take()?;
            return Ok(self.unary()?.wrapping_neg());
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<i64> {
        match self.take()? {
            ExprToken::Number(n) => Ok(n),
            ExprToken::Identifier(name) => match name.as_str() {
                "true" => Ok(1),
                "false" => Ok(0),
                _ => self.resolver.resolve(self.statement, &name),
            },
            ExprToken::LeftParen => {
                let value = self.relational()?;
                self.expect(ExprToken::RightParen)?;
                Ok(value)
            }
            token => Err(self.malformed(format!("unexpected {} in expression", token))),
        }
    }
}
