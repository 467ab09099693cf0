use logos::Logos;

use crate::error::ParseError;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+")]
    Number,
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub lexeme: String,
    pub start: usize,
}

/// Split an expression into tokens, failing on the first unknown character.
pub fn tokenize(input: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut lex = Token::lexer(input);
    let mut out = Vec::new();
    while let Some(res) = lex.next() {
        let span = lex.span();
        match res {
            Ok(token) => out.push(SpannedToken {
                token,
                lexeme: lex.slice().to_string(),
                start: span.start,
            }),
            Err(()) => {
                return Err(ParseError::UnexpectedCharacter {
                    position: span.start,
                    found: lex.slice().to_string(),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn tokenizes_arithmetic() {
        assert_eq!(
            kinds("2*x + 1.5"),
            vec![Token::Number, Token::Star, Token::Ident, Token::Plus, Token::Number]
        );
    }

    #[test]
    fn keeps_scientific_notation_in_one_token() {
        let tokens = tokenize("1.5e3").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].lexeme, "1.5e3");
    }

    #[test]
    fn rejects_unknown_characters() {
        let err = tokenize("x = 2").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedCharacter { position: 2, .. }));
    }
}
