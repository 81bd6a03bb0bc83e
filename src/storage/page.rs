//! Slotted pages for heapsql
//!
//! Each block is a fixed-size buffer. The block header and the slot entries
//! grow from the front; record bytes grow from the back.
//!
//! Layout (all integers little-endian u16):
//! - offset 0: number of records, offset 2: last free byte (`end_free`)
//! - offset 4*id: size of record `id`, offset 4*id+2: its location
//!
//! Record ids start at 1. A deleted record keeps its id with size and
//! location zeroed, so ids are never reused within a block.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Block size in bytes (4KB)
pub const BLOCK_SIZE: usize = 4096;

/// Block ID type (blocks are numbered from 1)
pub type BlockId = u32;

/// Record ID type (records are numbered from 1 within a block)
pub type RecordId = u16;

/// A slotted page
#[derive(Debug, Clone)]
pub struct SlottedPage {
    block_id: BlockId,
    data: Vec<u8>,
    num_records: u16,
    end_free: u16,
}

impl SlottedPage {
    /// Create a new empty page
    pub fn new(block_id: BlockId) -> Self {
        let mut page = Self {
            block_id,
            data: vec![0u8; BLOCK_SIZE],
            num_records: 0,
            end_free: (BLOCK_SIZE - 1) as u16,
        };
        page.put_block_header();
        page
    }

    /// Create a page from raw bytes read from disk
    pub fn from_bytes(block_id: BlockId, bytes: &[u8]) -> Self {
        let mut data = vec![0u8; BLOCK_SIZE];
        let len = bytes.len().min(BLOCK_SIZE);
        data[..len].copy_from_slice(&bytes[..len]);

        let num_records = LittleEndian::read_u16(&data[0..2]);
        let end_free = LittleEndian::read_u16(&data[2..4]);
        Self {
            block_id,
            data,
            num_records,
            end_free,
        }
    }

    /// Get block ID
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// Raw bytes to write back to disk
    pub fn to_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of record ids ever handed out by this block
    pub fn num_records(&self) -> u16 {
        self.num_records
    }

    /// Can a record of `size` bytes (plus its slot entry) still fit?
    pub fn has_room(&self, size: usize) -> bool {
        let slots_end = 4 * (self.num_records as usize + 2);
        slots_end + size <= self.end_free as usize + 1
    }

    /// Add a record and return its id
    pub fn add(&mut self, record: &[u8]) -> Result<RecordId> {
        if !self.has_room(record.len()) {
            return Err(Error::NoRoom(self.block_id, record.len()));
        }

        self.num_records += 1;
        let id = self.num_records;
        let size = record.len() as u16;
        self.end_free -= size;
        let loc = self.end_free + 1;

        self.put_block_header();
        self.put_header(id, size, loc);
        let start = loc as usize;
        self.data[start..start + record.len()].copy_from_slice(record);
        Ok(id)
    }

    /// Get a record's bytes, `None` if it was deleted or never existed
    pub fn get(&self, id: RecordId) -> Option<&[u8]> {
        if id == 0 || id > self.num_records {
            return None;
        }
        let (size, loc) = self.get_header(id);
        if loc == 0 {
            return None;
        }
        let start = loc as usize;
        Some(&self.data[start..start + size as usize])
    }

    /// Delete a record. Returns false if there was nothing to delete.
    pub fn del(&mut self, id: RecordId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.put_header(id, 0, 0);
        true
    }

    /// Ids of the live records, ascending
    pub fn ids(&self) -> Vec<RecordId> {
        (1..=self.num_records)
            .filter(|&id| self.get_header(id).1 != 0)
            .collect()
    }

    fn get_header(&self, id: RecordId) -> (u16, u16) {
        let offset = 4 * id as usize;
        (
            LittleEndian::read_u16(&self.data[offset..offset + 2]),
            LittleEndian::read_u16(&self.data[offset + 2..offset + 4]),
        )
    }

    fn put_header(&mut self, id: RecordId, size: u16, loc: u16) {
        let offset = 4 * id as usize;
        LittleEndian::write_u16(&mut self.data[offset..offset + 2], size);
        LittleEndian::write_u16(&mut self.data[offset + 2..offset + 4], loc);
    }

    fn put_block_header(&mut self) {
        LittleEndian::write_u16(&mut self.data[0..2], self.num_records);
        LittleEndian::write_u16(&mut self.data[2..4], self.end_free);
    }
}
