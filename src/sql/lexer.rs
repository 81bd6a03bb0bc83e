//! SQL Lexer (Tokenizer)
//!
//! This module converts SQL strings into a stream of tokens.

use super::token::Token;
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input; the last token is always `Token::Eof`
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '*' => Some(Token::Asterisk),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        match ch {
            '<' => {
                self.advance();
                Ok(match self.current_char() {
                    Some('=') => {
                        self.advance();
                        Token::Lte
                    }
                    Some('>') => {
                        self.advance();
                        Token::Neq
                    }
                    _ => Token::Lt,
                })
            }
            '>' => {
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    return Ok(Token::Gte);
                }
                Ok(Token::Gt)
            }
            '!' => {
                let start = self.position;
                self.advance();
                if self.current_char() == Some('=') {
                    self.advance();
                    return Ok(Token::Neq);
                }
                Err(Error::UnexpectedCharacter('!', start))
            }
            '-' if self.peek_char().map_or(false, |c| c.is_ascii_digit()) => {
                self.advance();
                Ok(match self.read_number()? {
                    Token::IntegerLiteral(n) => Token::IntegerLiteral(-n),
                    Token::FloatLiteral(n) => Token::FloatLiteral(-n),
                    other => other,
                })
            }
            '\'' => self.read_string(),
            '"' => self.read_quoted_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier()),
            c => Err(Error::UnexpectedCharacter(c, self.position)),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip whitespace and `--` comments
    fn skip_trivia(&mut self) {
        loop {
            while self.current_char().map_or(false, char::is_whitespace) {
                self.advance();
            }
            if self.current_char() == Some('-') && self.peek_char() == Some('-') {
                while self.current_char().map_or(false, |c| c != '\n') {
                    self.advance();
                }
            } else {
                return;
            }
        }
    }

    /// Read text up to `quote`, where a doubled quote stands for itself
    fn read_quoted(&mut self, quote: char) -> Result<String> {
        let start = self.position;
        self.advance();

        let mut value = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch != quote {
                value.push(ch);
            } else if self.current_char() == Some(quote) {
                value.push(quote);
                self.advance();
            } else {
                return Ok(value);
            }
        }
        Err(Error::UnterminatedString(start))
    }

    /// Read a string literal (single-quoted)
    fn read_string(&mut self) -> Result<Token> {
        self.read_quoted('\'').map(Token::StringLiteral)
    }

    /// Read a quoted identifier (double-quoted)
    fn read_quoted_identifier(&mut self) -> Result<Token> {
        self.read_quoted('"').map(Token::Identifier)
    }

    /// Read a number (integer or float)
    fn read_number(&mut self) -> Result<Token> {
        let start = self.position;
        let mut value = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                value.push(ch);
            } else if ch == '.' && !is_float && self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                is_float = true;
                value.push(ch);
            } else {
                break;
            }
            self.advance();
        }

        if is_float {
            value
                .parse::<f64>()
                .map(Token::FloatLiteral)
                .map_err(|_| Error::InvalidNumber(start))
        } else {
            value
                .parse::<i64>()
                .map(Token::IntegerLiteral)
                .map_err(|_| Error::InvalidNumber(start))
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();
        while let Some(ch) = self.current_char() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            value.push(ch);
            self.advance();
        }
        Token::from_keyword(&value).unwrap_or(Token::Identifier(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_select() {
        let mut lexer = Lexer::new("SELECT * FROM goober");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Asterisk,
                Token::From,
                Token::Identifier("goober".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_select_with_where() {
        let mut lexer = Lexer::new("select x, y from foo where x = -12 and y = 'q'");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Identifier("x".to_string()),
                Token::Comma,
                Token::Identifier("y".to_string()),
                Token::From,
                Token::Identifier("foo".to_string()),
                Token::Where,
                Token::Identifier("x".to_string()),
                Token::Eq,
                Token::IntegerLiteral(-12),
                Token::And,
                Token::Identifier("y".to_string()),
                Token::Eq,
                Token::StringLiteral("q".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_show_statements() {
        let tokens = Lexer::new("SHOW COLUMNS FROM foo;").tokenize().unwrap();
        assert_eq!(tokens[0], Token::Show);
        assert_eq!(tokens[1], Token::Columns);
        assert_eq!(tokens[4], Token::Semicolon);
    }

    #[test]
    fn test_escaped_string() {
        let tokens = Lexer::new("'it''s a test'").tokenize().unwrap();
        assert_eq!(tokens[0], Token::StringLiteral("it's a test".to_string()));
        assert!(matches!(
            Lexer::new("'open").tokenize(),
            Err(Error::UnterminatedString(0))
        ));
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = Lexer::new("a < b <= c > d >= e <> f != g").tokenize().unwrap();
        assert!(tokens.contains(&Token::Lt));
        assert!(tokens.contains(&Token::Lte));
        assert!(tokens.contains(&Token::Gt));
        assert!(tokens.contains(&Token::Gte));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Neq).count(), 2);
    }

    #[test]
    fn test_float_literal() {
        let tokens = Lexer::new("3.5").tokenize().unwrap();
        assert_eq!(tokens[0], Token::FloatLiteral(3.5));
    }

    #[test]
    fn test_comments() {
        let tokens = Lexer::new("SHOW -- everything\nTABLES").tokenize().unwrap();
        assert_eq!(tokens, vec![Token::Show, Token::Tables, Token::Eof]);
    }

    #[test]
    fn test_unexpected_character() {
        assert!(matches!(
            Lexer::new("SELECT @").tokenize(),
            Err(Error::UnexpectedCharacter('@', 7))
        ));
    }
}
