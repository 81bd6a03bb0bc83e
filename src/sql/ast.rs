//! SQL Abstract Syntax Tree (AST)
//!
//! This module defines the AST nodes for heapsql statements. Every node
//! implements `Display`, which renders it back as SQL.

use std::fmt;

use crate::catalog::DataType;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// SELECT statement
    Select(SelectStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// CREATE INDEX statement
    CreateIndex(CreateIndexStatement),
    /// DROP INDEX statement
    DropIndex(DropIndexStatement),
    /// SHOW statement
    Show(ShowStatement),
}

/// SELECT statement over a single table
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Select list
    pub columns: Vec<SelectItem>,
    /// FROM table
    pub table_name: String,
    /// WHERE clause
    pub where_clause: Option<Expr>,
}

/// A single item in the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    /// All columns (*)
    Wildcard,
    /// A named column
    Column(String),
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// Column names (optional)
    pub columns: Option<Vec<String>>,
    /// Values to insert
    pub values: Vec<Expr>,
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = value pairs)
    pub assignments: Vec<Assignment>,
    /// WHERE clause
    pub where_clause: Option<Expr>,
}

/// Column assignment (for UPDATE)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: String,
    /// New value
    pub value: Expr,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE clause
    pub where_clause: Option<Expr>,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnDef>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// NOT NULL constraint
    pub not_null: bool,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
}

/// Physical index kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// Ordered, unique
    BTree,
    /// Non-unique
    Hash,
}

impl IndexType {
    /// Name stored in the `index_type` column of `_indices`
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::BTree => "BTREE",
            IndexType::Hash => "HASH",
        }
    }

    /// BTREE indices reject duplicate keys
    pub fn is_unique(&self) -> bool {
        matches!(self, IndexType::BTree)
    }

    /// Parse an index type name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "BTREE" => Some(IndexType::BTree),
            "HASH" => Some(IndexType::Hash),
            _ => None,
        }
    }
}

/// CREATE INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStatement {
    /// Index name
    pub index_name: String,
    /// Table name
    pub table_name: String,
    /// Column names in key order
    pub columns: Vec<String>,
    /// Index kind
    pub index_type: IndexType,
}

/// DROP INDEX statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropIndexStatement {
    /// Index name
    pub index_name: String,
    /// Table name
    pub table_name: String,
}

/// SHOW statement
#[derive(Debug, Clone, PartialEq)]
pub enum ShowStatement {
    /// SHOW TABLES
    Tables,
    /// SHOW COLUMNS [FROM table]
    Columns { table_name: Option<String> },
    /// SHOW INDEX FROM table
    Index { table_name: String },
}

/// SQL Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(String),
    /// Literal value
    Literal(Literal),
    /// Binary operation
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// Unary operation
    UnaryOp { op: UnaryOperator, expr: Box<Expr> },
    /// Nested expression (in parentheses)
    Nested(Box<Expr>),
}

impl Expr {
    /// Build `left op right`
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// NULL
    Null,
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    // Comparison
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    // Logical
    And,
    Or,
}

impl BinaryOperator {
    /// Get the precedence of this operator (higher = binds tighter)
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Or => 1,
            BinaryOperator::And => 2,
            _ => 3,
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    /// NOT
    Not,
}

// ========== SQL rendering ==========

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn where_suffix(f: &mut fmt::Formatter<'_>, where_clause: &Option<Expr>) -> fmt::Result {
    match where_clause {
        Some(expr) => write!(f, " WHERE {}", expr),
        None => Ok(()),
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => {
                write!(f, "SELECT ")?;
                comma_list(f, &s.columns)?;
                write!(f, " FROM {}", s.table_name)?;
                where_suffix(f, &s.where_clause)
            }
            Statement::Insert(s) => {
                write!(f, "INSERT INTO {} ", s.table_name)?;
                if let Some(columns) = &s.columns {
                    write!(f, "(")?;
                    comma_list(f, columns)?;
                    write!(f, ") ")?;
                }
                write!(f, "VALUES (")?;
                comma_list(f, &s.values)?;
                write!(f, ")")
            }
            Statement::Update(s) => {
                write!(f, "UPDATE {} SET ", s.table_name)?;
                for (i, assignment) in s.assignments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", assignment.column, assignment.value)?;
                }
                where_suffix(f, &s.where_clause)
            }
            Statement::Delete(s) => {
                write!(f, "DELETE FROM {}", s.table_name)?;
                where_suffix(f, &s.where_clause)
            }
            Statement::CreateTable(s) => {
                write!(f, "CREATE TABLE ")?;
                if s.if_not_exists {
                    write!(f, "IF NOT EXISTS ")?;
                }
                write!(f, "{} (", s.table_name)?;
                comma_list(f, &s.columns)?;
                write!(f, ")")
            }
            Statement::DropTable(s) => write!(f, "DROP TABLE {}", s.table_name),
            Statement::CreateIndex(s) => {
                write!(
                    f,
                    "CREATE INDEX {} ON {} USING {} (",
                    s.index_name,
                    s.table_name,
                    s.index_type.as_str()
                )?;
                comma_list(f, &s.columns)?;
                write!(f, ")")
            }
            Statement::DropIndex(s) => {
                write!(f, "DROP INDEX {} FROM {}", s.index_name, s.table_name)
            }
            Statement::Show(ShowStatement::Tables) => write!(f, "SHOW TABLES"),
            Statement::Show(ShowStatement::Columns { table_name }) => match table_name {
                Some(table_name) => write!(f, "SHOW COLUMNS FROM {}", table_name),
                None => write!(f, "SHOW COLUMNS"),
            },
            Statement::Show(ShowStatement::Index { table_name }) => {
                write!(f, "SHOW INDEX FROM {}", table_name)
            }
        }
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItem::Wildcard => write!(f, "*"),
            SelectItem::Column(name) => write!(f, "{}", name),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)?;
        if self.not_null {
            write!(f, " NOT NULL")?;
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => write!(f, "{}", name),
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::BinaryOp { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Expr::UnaryOp {
                op: UnaryOperator::Not,
                expr,
            } => write!(f, "NOT {}", expr),
            Expr::Nested(expr) => write!(f, "({})", expr),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "NULL"),
            Literal::Boolean(true) => write!(f, "TRUE"),
            Literal::Boolean(false) => write!(f, "FALSE"),
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::Neq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Lte => "<=",
            BinaryOperator::Gte => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        };
        f.write_str(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_type() {
        assert!(IndexType::BTree.is_unique());
        assert!(!IndexType::Hash.is_unique());
        assert_eq!(IndexType::from_name("hash"), Some(IndexType::Hash));
        assert_eq!(IndexType::from_name("gist"), None);
    }

    #[test]
    fn test_render_select() {
        let stmt = Statement::Select(SelectStatement {
            columns: vec![SelectItem::Column("a".into()), SelectItem::Column("b".into())],
            table_name: "foo".into(),
            where_clause: Some(Expr::binary(
                Expr::binary(
                    Expr::Column("a".into()),
                    BinaryOperator::Eq,
                    Expr::Literal(Literal::Integer(1)),
                ),
                BinaryOperator::And,
                Expr::binary(
                    Expr::Column("b".into()),
                    BinaryOperator::Eq,
                    Expr::Literal(Literal::String("it's".into())),
                ),
            )),
        });
        assert_eq!(
            stmt.to_string(),
            "SELECT a, b FROM foo WHERE a = 1 AND b = 'it''s'"
        );
    }

    #[test]
    fn test_render_ddl() {
        let stmt = Statement::CreateTable(CreateTableStatement {
            table_name: "foo".into(),
            columns: vec![
                ColumnDef {
                    name: "id".into(),
                    data_type: DataType::Integer,
                    not_null: true,
                },
                ColumnDef {
                    name: "name".into(),
                    data_type: DataType::Text,
                    not_null: false,
                },
            ],
            if_not_exists: true,
        });
        assert_eq!(
            stmt.to_string(),
            "CREATE TABLE IF NOT EXISTS foo (id INT NOT NULL, name TEXT)"
        );

        let stmt = Statement::DropIndex(DropIndexStatement {
            index_name: "fx".into(),
            table_name: "foo".into(),
        });
        assert_eq!(stmt.to_string(), "DROP INDEX fx FROM foo");
    }
}
