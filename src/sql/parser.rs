//! SQL Parser
//!
//! This module parses SQL tokens into an AST. It is a hand-written
//! recursive-descent parser over the token stream produced by the lexer.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::DataType;
use crate::error::{Error, Result};

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single SQL statement; anything after it but a `;` is an error
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }
        if !self.is_at_end() {
            return Err(self.unexpected("end of statement"));
        }

        Ok(stmt)
    }

    /// Parse a semicolon-separated script
    pub fn parse_all(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
            if self.check(&Token::Semicolon) {
                self.advance();
            } else if !self.is_at_end() {
                return Err(self.unexpected(";"));
            }
        }

        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Create => self.parse_create(),
            Token::Drop => self.parse_drop(),
            Token::Show => self.parse_show().map(Statement::Show),
            _ => Err(self.unexpected("SELECT, INSERT, UPDATE, DELETE, CREATE, DROP, or SHOW")),
        }
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let columns = if self.check(&Token::Asterisk) {
            self.advance();
            vec![SelectItem::Wildcard]
        } else {
            self.parse_identifier_list()?
                .into_iter()
                .map(SelectItem::Column)
                .collect()
        };

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_where()?;

        Ok(SelectStatement {
            columns,
            table_name,
            where_clause,
        })
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table_name = self.expect_identifier()?;

        let columns = if self.check(&Token::LParen) {
            self.advance();
            let cols = self.parse_identifier_list()?;
            self.expect(&Token::RParen)?;
            Some(cols)
        } else {
            None
        };

        self.expect(&Token::Values)?;
        self.expect(&Token::LParen)?;
        let values = self.parse_expr_list()?;
        self.expect(&Token::RParen)?;

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_expr()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let where_clause = self.parse_where()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            where_clause,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;

        let table_name = self.expect_identifier()?;
        let where_clause = self.parse_where()?;

        Ok(DeleteStatement {
            table_name,
            where_clause,
        })
    }

    fn parse_where(&mut self) -> Result<Option<Expr>> {
        if self.check(&Token::Where) {
            self.advance();
            Ok(Some(self.parse_expr()?))
        } else {
            Ok(None)
        }
    }

    // ========== CREATE Statement ==========

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(&Token::Create)?;

        match self.current() {
            Token::Table => self.parse_create_table().map(Statement::CreateTable),
            Token::Index | Token::Unique => self.parse_create_index().map(Statement::CreateIndex),
            _ => Err(self.unexpected("TABLE or INDEX")),
        }
    }

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Table)?;

        let if_not_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Not)?;
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;
        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }
        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
            if_not_exists,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let mut not_null = false;
        loop {
            match self.current() {
                Token::Not => {
                    self.advance();
                    self.expect(&Token::Null)?;
                    not_null = true;
                }
                Token::Null => {
                    self.advance();
                    not_null = false;
                }
                _ => break,
            }
        }

        Ok(ColumnDef {
            name,
            data_type,
            not_null,
        })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let data_type = match self.current() {
            Token::Int | Token::Integer => DataType::Integer,
            Token::BigInt => DataType::BigInt,
            Token::SmallInt => DataType::SmallInt,
            Token::Float => DataType::Float,
            Token::Double => DataType::Double,
            Token::Text => DataType::Text,
            Token::Boolean | Token::Bool => DataType::Boolean,
            Token::Date => DataType::Date,
            Token::Timestamp => DataType::Timestamp,
            Token::Varchar | Token::Char => {
                let is_varchar = self.check(&Token::Varchar);
                self.advance();
                self.expect(&Token::LParen)?;
                let len = self.expect_integer()?;
                self.expect(&Token::RParen)?;
                let len = usize::try_from(len).map_err(|_| Error::UnexpectedToken {
                    expected: "a non-negative length".to_string(),
                    found: len.to_string(),
                })?;
                return Ok(if is_varchar {
                    DataType::Varchar(len)
                } else {
                    DataType::Char(len)
                });
            }
            _ => return Err(self.unexpected("data type")),
        };
        self.advance();
        Ok(data_type)
    }

    fn parse_create_index(&mut self) -> Result<CreateIndexStatement> {
        let unique = if self.check(&Token::Unique) {
            self.advance();
            true
        } else {
            false
        };
        self.expect(&Token::Index)?;

        let index_name = self.expect_identifier()?;
        self.expect(&Token::On)?;
        let table_name = self.expect_identifier()?;

        let index_type = if self.check(&Token::Using) {
            self.advance();
            let name = self.expect_identifier()?;
            IndexType::from_name(&name).ok_or_else(|| Error::UnexpectedToken {
                expected: "BTREE or HASH".to_string(),
                found: name.clone(),
            })?
        } else {
            IndexType::BTree
        };
        if unique && !index_type.is_unique() {
            return Err(Error::UnexpectedToken {
                expected: "BTREE for a UNIQUE index".to_string(),
                found: index_type.as_str().to_string(),
            });
        }

        self.expect(&Token::LParen)?;
        let columns = self.parse_identifier_list()?;
        self.expect(&Token::RParen)?;

        Ok(CreateIndexStatement {
            index_name,
            table_name,
            columns,
            index_type,
        })
    }

    // ========== DROP Statement ==========

    fn parse_drop(&mut self) -> Result<Statement> {
        self.expect(&Token::Drop)?;

        match self.current() {
            Token::Table => {
                self.advance();
                let table_name = self.expect_identifier()?;
                Ok(Statement::DropTable(DropTableStatement { table_name }))
            }
            Token::Index => {
                self.advance();
                let index_name = self.expect_identifier()?;
                if self.check(&Token::From) || self.check(&Token::On) {
                    self.advance();
                } else {
                    return Err(self.unexpected("FROM or ON"));
                }
                let table_name = self.expect_identifier()?;
                Ok(Statement::DropIndex(DropIndexStatement {
                    index_name,
                    table_name,
                }))
            }
            _ => Err(self.unexpected("TABLE or INDEX")),
        }
    }

    // ========== SHOW Statement ==========

    fn parse_show(&mut self) -> Result<ShowStatement> {
        self.expect(&Token::Show)?;

        match self.current() {
            Token::Tables => {
                self.advance();
                Ok(ShowStatement::Tables)
            }
            Token::Columns => {
                self.advance();
                let table_name = if self.check(&Token::From) {
                    self.advance();
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                Ok(ShowStatement::Columns { table_name })
            }
            Token::Index => {
                self.advance();
                self.expect(&Token::From)?;
                let table_name = self.expect_identifier()?;
                Ok(ShowStatement::Index { table_name })
            }
            _ => Err(self.unexpected("TABLES, COLUMNS, or INDEX")),
        }
    }

    // ========== Expressions ==========

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_or_expr()
    }

    fn parse_or_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_and_expr()?;

        while self.check(&Token::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Expr::binary(left, BinaryOperator::Or, right);
        }

        Ok(left)
    }

    fn parse_and_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_not_expr()?;

        while self.check(&Token::And) {
            self.advance();
            let right = self.parse_not_expr()?;
            left = Expr::binary(left, BinaryOperator::And, right);
        }

        Ok(left)
    }

    fn parse_not_expr(&mut self) -> Result<Expr> {
        if self.check(&Token::Not) {
            self.advance();
            let expr = self.parse_not_expr()?;
            Ok(Expr::UnaryOp {
                op: UnaryOperator::Not,
                expr: Box::new(expr),
            })
        } else {
            self.parse_comparison_expr()
        }
    }

    fn parse_comparison_expr(&mut self) -> Result<Expr> {
        let left = self.parse_primary_expr()?;

        let op = match self.current() {
            Token::Eq => BinaryOperator::Eq,
            Token::Neq => BinaryOperator::Neq,
            Token::Lt => BinaryOperator::Lt,
            Token::Gt => BinaryOperator::Gt,
            Token::Lte => BinaryOperator::Lte,
            Token::Gte => BinaryOperator::Gte,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_primary_expr()?;

        Ok(Expr::binary(left, op, right))
    }

    fn parse_primary_expr(&mut self) -> Result<Expr> {
        let literal = match self.current().clone() {
            Token::IntegerLiteral(n) => Literal::Integer(n),
            Token::FloatLiteral(n) => Literal::Float(n),
            Token::StringLiteral(s) => Literal::String(s),
            Token::True => Literal::Boolean(true),
            Token::False => Literal::Boolean(false),
            Token::Null => Literal::Null,
            Token::Identifier(name) => {
                self.advance();
                return Ok(Expr::Column(name));
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                return Ok(Expr::Nested(Box::new(expr)));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance();
        Ok(Expr::Literal(literal))
    }

    fn parse_expr_list(&mut self) -> Result<Vec<Expr>> {
        let mut exprs = Vec::new();

        loop {
            exprs.push(self.parse_expr()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(exprs)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();

        loop {
            identifiers.push(self.expect_identifier()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    // ========== Token helpers ==========

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn unexpected(&self, expected: &str) -> Error {
        if self.is_at_end() {
            Error::UnexpectedEof(expected.to_string())
        } else {
            Error::UnexpectedToken {
                expected: expected.to_string(),
                found: self.current().to_string(),
            }
        }
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&token.to_string()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            _ => Err(self.unexpected("integer")),
        }
    }
}
