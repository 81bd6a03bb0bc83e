//! Block files for heapsql
//!
//! Every relation lives in its own file of `BLOCK_SIZE` blocks. Block `n` is
//! stored at byte offset `(n - 1) * BLOCK_SIZE`.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::page::{BlockId, SlottedPage, BLOCK_SIZE};
use crate::error::{Error, Result};

/// A file of slotted pages
#[derive(Debug)]
pub struct BlockFile {
    /// Relation name, for error messages
    name: String,
    /// Backing file path
    path: PathBuf,
    /// Open file handle, `None` while closed
    file: Option<File>,
    /// Last allocated block id (0 when the file is empty)
    last: BlockId,
}

impl BlockFile {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
            file: None,
            last: 0,
        }
    }

    /// Does the backing file exist?
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Is the file currently open?
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Create the file with one empty block. Fails if the file already exists.
    pub fn create(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => {
                    Error::relation(format!("relation {} already exists", self.name))
                }
                _ => Error::Io(e),
            })?;
        self.file = Some(file);
        self.last = 0;
        self.get_new()?;
        debug!(relation = %self.name, path = %self.path.display(), "created block file");
        Ok(())
    }

    /// Open an existing file. Opening an open file is a no-op.
    pub fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    Error::relation(format!("relation {} does not exist", self.name))
                }
                _ => Error::Io(e),
            })?;
        let len = file.metadata()?.len();
        self.last = (len / BLOCK_SIZE as u64) as BlockId;
        self.file = Some(file);
        trace!(relation = %self.name, blocks = self.last, "opened block file");
        Ok(())
    }

    pub fn close(&mut self) {
        self.file = None;
    }

    /// Close and remove the file. A missing file is not an error.
    pub fn drop(&mut self) -> Result<()> {
        self.close();
        self.last = 0;
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(relation = %self.name, "removed block file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(relation = %self.name, "block file already absent");
                Ok(())
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Id of the last block
    pub fn last_block_id(&self) -> BlockId {
        self.last
    }

    /// All block ids, ascending
    pub fn block_ids(&self) -> Vec<BlockId> {
        (1..=self.last).collect()
    }

    /// Allocate, initialize and write out a new block
    pub fn get_new(&mut self) -> Result<SlottedPage> {
        let block_id = self.last + 1;
        let page = SlottedPage::new(block_id);
        self.write_block(block_id, page.to_bytes())?;
        self.last = block_id;
        trace!(relation = %self.name, block_id, "allocated block");
        Ok(page)
    }

    /// Read a block
    pub fn get(&mut self, block_id: BlockId) -> Result<SlottedPage> {
        if block_id == 0 || block_id > self.last {
            return Err(Error::relation(format!(
                "block {} out of range for relation {}",
                block_id, self.name
            )));
        }
        let file = self.file_mut()?;
        let mut bytes = vec![0u8; BLOCK_SIZE];
        file.seek(SeekFrom::Start(Self::offset(block_id)))?;
        file.read_exact(&mut bytes)?;
        Ok(SlottedPage::from_bytes(block_id, &bytes))
    }

    /// Write a block back
    pub fn put(&mut self, page: &SlottedPage) -> Result<()> {
        self.write_block(page.block_id(), page.to_bytes())
    }

    fn write_block(&mut self, block_id: BlockId, bytes: &[u8]) -> Result<()> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(Self::offset(block_id)))?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(())
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        let name = &self.name;
        self.file
            .as_mut()
            .ok_or_else(|| Error::relation(format!("relation {} is not open", name)))
    }

    fn offset(block_id: BlockId) -> u64 {
        (block_id as u64 - 1) * BLOCK_SIZE as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_is_exclusive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let mut file = BlockFile::new("t", &path);
        file.create().unwrap();
        assert_eq!(file.last_block_id(), 1);

        let mut again = BlockFile::new("t", &path);
        let err = again.create().unwrap_err();
        assert_eq!(err.to_string(), "relation t already exists");
    }

    #[test]
    fn test_blocks_persist_across_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let mut file = BlockFile::new("t", &path);
        file.create().unwrap();
        let mut page = file.get(1).unwrap();
        page.add(b"abc").unwrap();
        file.put(&page).unwrap();
        file.get_new().unwrap();
        file.close();

        let mut reopened = BlockFile::new("t", &path);
        reopened.open().unwrap();
        assert_eq!(reopened.block_ids(), vec![1, 2]);
        assert_eq!(reopened.get(1).unwrap().get(1), Some(&b"abc"[..]));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut file = BlockFile::new("nope", dir.path().join("nope.db"));
        let err = file.open().unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let mut file = BlockFile::new("t", &path);
        file.create().unwrap();
        file.drop().unwrap();
        assert!(!path.exists());
        file.drop().unwrap();
    }
}
