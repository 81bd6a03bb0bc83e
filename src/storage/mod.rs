//! Storage engine module
//!
//! This module contains the storage engine components:
//! - Slotted pages and block files
//! - Heap relations
//! - Ordered indices
//! - The relation and index interfaces the executor works against

pub mod btree;
pub mod disk;
pub mod heap;
pub mod page;
pub mod relation;
pub mod value;

pub use btree::{BTreeIndex, IndexKey};
pub use disk::BlockFile;
pub use heap::HeapTable;
pub use page::{BlockId, RecordId, SlottedPage, BLOCK_SIZE};
pub use relation::{DbIndex, DbRelation, Handle};
pub use value::{row, row_matches, Row, Value};
