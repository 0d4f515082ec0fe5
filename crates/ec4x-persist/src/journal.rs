//! The file-backed journal: one JSON line per entry, append-only.
//!
//! The format is deliberately simple: line 1 is the genesis entry, every
//! further line one turn record, each serialized as a single JSON value.
//! The writer flushes after every append so a crashed daemon loses at
//! most the entry being written; a truncated trailing line is detected on
//! open and reported rather than silently dropped.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::PersistError;
use crate::record::{Genesis, JournalEntry, TurnRecord};
use crate::store::{MemoryStore, TurnStore, check_order};

/// An append-only journal file with its in-memory index.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    writer: BufWriter<File>,
    store: MemoryStore,
}

impl FileJournal {
    /// Create a fresh journal at a path. Fails if the file exists.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        info!(path = %path.display(), "journal created");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            store: MemoryStore::new(),
        })
    }

    /// Open an existing journal, reading every entry back into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let reader = BufReader::new(File::open(&path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: JournalEntry = serde_json::from_str(&line)?;
            entries.push(entry);
        }
        let store = MemoryStore::from_entries(entries)?;
        let file = OpenOptions::new().append(true).open(&path)?;
        info!(path = %path.display(), turns = store.turns().len(), "journal opened");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            store,
        })
    }

    /// The journal's path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_entry(&mut self, entry: &JournalEntry) -> Result<(), PersistError> {
        let line = serde_json::to_string(entry)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl TurnStore for FileJournal {
    fn write_genesis(&mut self, genesis: Genesis) -> Result<(), PersistError> {
        self.write_entry(&JournalEntry::Genesis(Box::new(genesis.clone())))?;
        self.store.write_genesis(genesis)
    }

    fn append_turn(&mut self, record: TurnRecord) -> Result<(), PersistError> {
        check_order(self.store.genesis(), self.store.turns(), &record)?;
        self.write_entry(&JournalEntry::Turn(Box::new(record.clone())))?;
        debug!(turn = record.turn, "turn journaled");
        self.store.append_turn(record)
    }

    fn genesis(&self) -> Option<&Genesis> {
        self.store.genesis()
    }

    fn turns(&self) -> &[TurnRecord] {
        self.store.turns()
    }
}
