//! SQL Token definitions
//!
//! This module defines the tokens of the heapsql dialect.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // DDL Keywords
    Create,
    Drop,
    Table,
    Index,
    Show,
    Tables,
    Columns,

    // DML Keywords
    Select,
    Insert,
    Update,
    Delete,
    Into,
    Values,
    Set,
    From,
    Where,

    // Clauses
    And,
    Or,
    Not,
    On,
    Using,
    If,
    Exists,

    // Constraints
    Unique,
    Null,

    // Data Types
    Int,
    Integer,
    BigInt,
    SmallInt,
    Float,
    Double,
    Varchar,
    Char,
    Text,
    Boolean,
    Bool,
    Date,
    Timestamp,

    // Boolean Literals
    True,
    False,

    // ========== Literals ==========
    /// Integer literal
    IntegerLiteral(i64),
    /// Float literal
    FloatLiteral(f64),
    /// String literal (single-quoted)
    StringLiteral(String),
    /// Identifier (table name, column name, etc.)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Try to parse a keyword from a string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "TABLE" => Some(Token::Table),
            "INDEX" => Some(Token::Index),
            "SHOW" => Some(Token::Show),
            "TABLES" => Some(Token::Tables),
            "COLUMNS" => Some(Token::Columns),

            "SELECT" => Some(Token::Select),
            "INSERT" => Some(Token::Insert),
            "UPDATE" => Some(Token::Update),
            "DELETE" => Some(Token::Delete),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "SET" => Some(Token::Set),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),

            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "ON" => Some(Token::On),
            "USING" => Some(Token::Using),
            "IF" => Some(Token::If),
            "EXISTS" => Some(Token::Exists),

            "UNIQUE" => Some(Token::Unique),
            "NULL" => Some(Token::Null),

            "INT" => Some(Token::Int),
            "INTEGER" => Some(Token::Integer),
            "BIGINT" => Some(Token::BigInt),
            "SMALLINT" => Some(Token::SmallInt),
            "FLOAT" => Some(Token::Float),
            "DOUBLE" => Some(Token::Double),
            "VARCHAR" => Some(Token::Varchar),
            "CHAR" => Some(Token::Char),
            "TEXT" => Some(Token::Text),
            "BOOLEAN" => Some(Token::Boolean),
            "BOOL" => Some(Token::Bool),
            "DATE" => Some(Token::Date),
            "TIMESTAMP" => Some(Token::Timestamp),

            "TRUE" => Some(Token::True),
            "FALSE" => Some(Token::False),

            _ => None,
        }
    }

    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            Token::IntegerLiteral(_)
                | Token::FloatLiteral(_)
                | Token::StringLiteral(_)
                | Token::Identifier(_)
                | Token::Eq
                | Token::Neq
                | Token::Lt
                | Token::Gt
                | Token::Lte
                | Token::Gte
                | Token::Asterisk
                | Token::LParen
                | Token::RParen
                | Token::Comma
                | Token::Semicolon
                | Token::Eof
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Token::Create => "CREATE",
            Token::Drop => "DROP",
            Token::Table => "TABLE",
            Token::Index => "INDEX",
            Token::Show => "SHOW",
            Token::Tables => "TABLES",
            Token::Columns => "COLUMNS",
            Token::Select => "SELECT",
            Token::Insert => "INSERT",
            Token::Update => "UPDATE",
            Token::Delete => "DELETE",
            Token::Into => "INTO",
            Token::Values => "VALUES",
            Token::Set => "SET",
            Token::From => "FROM",
            Token::Where => "WHERE",
            Token::And => "AND",
            Token::Or => "OR",
            Token::Not => "NOT",
            Token::On => "ON",
            Token::Using => "USING",
            Token::If => "IF",
            Token::Exists => "EXISTS",
            Token::Unique => "UNIQUE",
            Token::Null => "NULL",
            Token::Int => "INT",
            Token::Integer => "INTEGER",
            Token::BigInt => "BIGINT",
            Token::SmallInt => "SMALLINT",
            Token::Float => "FLOAT",
            Token::Double => "DOUBLE",
            Token::Varchar => "VARCHAR",
            Token::Char => "CHAR",
            Token::Text => "TEXT",
            Token::Boolean => "BOOLEAN",
            Token::Bool => "BOOL",
            Token::Date => "DATE",
            Token::Timestamp => "TIMESTAMP",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::IntegerLiteral(n) => return write!(f, "{}", n),
            Token::FloatLiteral(n) => return write!(f, "{}", n),
            Token::StringLiteral(s) => return write!(f, "'{}'", s),
            Token::Identifier(s) => return write!(f, "{}", s),
            Token::Eq => "=",
            Token::Neq => "<>",
            Token::Lt => "<",
            Token::Gt => ">",
            Token::Lte => "<=",
            Token::Gte => ">=",
            Token::Asterisk => "*",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Comma => ",",
            Token::Semicolon => ";",
            Token::Eof => "EOF",
        };
        f.write_str(keyword)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing() {
        assert_eq!(Token::from_keyword("SHOW"), Some(Token::Show));
        assert_eq!(Token::from_keyword("tables"), Some(Token::Tables));
        assert_eq!(Token::from_keyword("SeLeCt"), Some(Token::Select));
        assert_eq!(Token::from_keyword("btree"), None);
    }

    #[test]
    fn test_is_keyword() {
        assert!(Token::Select.is_keyword());
        assert!(Token::Columns.is_keyword());
        assert!(!Token::Asterisk.is_keyword());
        assert!(!Token::IntegerLiteral(42).is_keyword());
    }
}
