//! Recursive-descent parser for normalized expressions.
//!
//! The grammar is strict: implicit multiplication (`2x`, `2(x+1)`)
//! and doubled operators are rejected here and handled by the normalizer, so
//! a failed parse is the signal that normalization should be retried.
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?
//! primary := NUMBER | IDENT | IDENT '(' args ')' | '(' sum ')'
//! ```
//!
//! Nesting (parentheses, call arguments, signs, exponents) is capped at
//! [`MAX_DEPTH`] levels.

use crate::error::ParseError;
use crate::expr::Expr;
use crate::functions::FunctionTable;
use crate::lexer::{tokenize, SpannedToken, Token};

/// Deepest nesting the parser accepts before giving up with
/// [`ParseError::TooDeep`].
pub const MAX_DEPTH: usize = 64;

/// Parse a full expression using the given function table.
pub fn parse(input: &str, functions: &FunctionTable) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        functions,
    };
    let expr = parser.parse_sum()?;
    if let Some(tok) = parser.peek() {
        return Err(ParseError::UnexpectedToken {
            position: tok.start,
            found: tok.lexeme.clone(),
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
    functions: &'a FunctionTable,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn peek_token(&self) -> Option<Token> {
        self.peek().map(|t| t.token)
    }

    fn next(&mut self) -> Result<SpannedToken, ParseError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        let tok = self.next()?;
        if tok.token == token {
            Ok(())
        } else {
            Err(unexpected(&tok))
        }
    }

    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        let mut terms = vec![self.parse_product()?];
        while let Some(tok) = self.peek_token() {
            match tok {
                Token::Plus => {
                    self.pos += 1;
                    terms.push(self.parse_product()?);
                }
                Token::Minus => {
                    self.pos += 1;
                    terms.push(Expr::neg(self.parse_product()?));
                }
                _ => break,
            }
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Add(terms)
        })
    }

    fn parse_product(&mut self) -> Result<Expr, ParseError> {
        let mut factors = vec![self.parse_unary()?];
        while let Some(tok) = self.peek_token() {
            match tok {
                Token::Star => {
                    self.pos += 1;
                    factors.push(self.parse_unary()?);
                }
                Token::Slash => {
                    self.pos += 1;
                    let divisor = self.parse_unary()?;
                    factors.push(Expr::pow(divisor, Expr::Num(-1.0)));
                }
                _ => break,
            }
        }
        Ok(if factors.len() == 1 {
            factors.remove(0)
        } else {
            Expr::Mul(factors)
        })
    }

    // Every nested construct passes through here, so this is where depth is counted.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        let result = self.parse_signed();
        self.depth -= 1;
        result
    }

    fn parse_signed(&mut self) -> Result<Expr, ParseError> {
        match self.peek_token() {
            Some(Token::Minus) => {
                self.pos += 1;
                let operand = self.parse_unary()?;
                Ok(match operand {
                    Expr::Num(v) => Expr::Num(-v),
                    other => Expr::neg(other),
                })
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_primary()?;
        if self.peek_token() == Some(Token::Caret) {
            self.pos += 1;
            // Right-associative, and the exponent may carry its own sign: x^-2.
            let exponent = self.parse_unary()?;
            return Ok(Expr::pow(base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let tok = self.next()?;
        match tok.token {
            Token::Number => tok
                .lexeme
                .parse::<f64>()
                .map(Expr::Num)
                .map_err(|_| unexpected(&tok)),
            Token::Ident => {
                if self.peek_token() == Some(Token::LParen) {
                    self.parse_call(tok.lexeme)
                } else if self.functions.contains(&tok.lexeme) {
                    // A bare function name (`sin x`) is not an operand.
                    Err(unexpected(&tok))
                } else {
                    Ok(Expr::Sym(tok.lexeme))
                }
            }
            Token::LParen => {
                let inner = self.parse_sum()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            _ => Err(unexpected(&tok)),
        }
    }

    fn parse_call(&mut self, name: String) -> Result<Expr, ParseError> {
        let Some(function) = self.functions.get(&name).copied() else {
            return Err(ParseError::UnknownFunction(name));
        };
        self.expect(Token::LParen)?;
        let mut args = vec![self.parse_sum()?];
        while self.peek_token() == Some(Token::Comma) {
            self.pos += 1;
            args.push(self.parse_sum()?);
        }
        self.expect(Token::RParen)?;
        if args.len() != function.arity {
            return Err(ParseError::WrongArity {
                name,
                expected: function.arity,
                found: args.len(),
            });
        }
        Ok(Expr::Func(name, args))
    }
}

fn unexpected(tok: &SpannedToken) -> ParseError {
    ParseError::UnexpectedToken {
        position: tok.start,
        found: tok.lexeme.clone(),
    }
}
