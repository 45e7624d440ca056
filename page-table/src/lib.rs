mod iter;
mod page_table_entry;

use std::fmt;

use memory::{ChunkId, UnitId};

pub use iter::{Entries, EntriesMut};
pub use page_table_entry::PageTableEntry;

pub type PageId = UnitId;
pub type FrameId = UnitId;

/// A group of entries covering up to one secondary-table span of a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecondaryPageTable {
    entries: Vec<PageTableEntry>,
    span: u64,
}

impl SecondaryPageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes of the process covered by this table.
    pub fn span(&self) -> u64 {
        self.span
    }

    pub fn is_full(&self, limit: u64) -> bool {
        self.span >= limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PageTableEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [PageTableEntry] {
        &mut self.entries
    }

    pub fn push_entry(&mut self, entry: PageTableEntry) {
        self.span += entry.bytes();
        self.entries.push(entry);
    }

    /// Widens the last entry by `bytes`. Returns `false` when the table is empty.
    pub fn extend_last(&mut self, bytes: u64, chunks: Vec<ChunkId>) -> bool {
        match self.entries.last_mut() {
            Some(entry) => {
                entry.extend(bytes, chunks);
                self.span += bytes;
                true
            }
            None => false,
        }
    }

    pub fn find(&self, page: PageId) -> Option<&PageTableEntry> {
        self.entries.iter().find(|e| e.page_num() == page)
    }
}

/// Ordered secondary tables of one process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterPageTable {
    tables: Vec<SecondaryPageTable>,
}

impl MasterPageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(&self) -> &[SecondaryPageTable] {
        &self.tables
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn push_table(&mut self, table: SecondaryPageTable) -> &mut SecondaryPageTable {
        self.tables.push(table);
        let last = self.tables.len() - 1;
        &mut self.tables[last]
    }

    /// First table whose span is still below `limit`, appending an empty one when
    /// every table is full.
    pub fn open_table_mut(&mut self, limit: u64) -> &mut SecondaryPageTable {
        match self.tables.iter().position(|t| !t.is_full(limit)) {
            Some(i) => &mut self.tables[i],
            None => self.push_table(SecondaryPageTable::new()),
        }
    }

    pub fn last_table_mut(&mut self) -> Option<&mut SecondaryPageTable> {
        self.tables.last_mut()
    }

    pub fn last_entry(&self) -> Option<&PageTableEntry> {
        self.tables.last().and_then(|t| t.entries().last())
    }

    pub fn entries(&self) -> Entries<'_> {
        Entries::new(&self.tables)
    }

    pub fn entries_mut(&mut self) -> EntriesMut<'_> {
        EntriesMut::new(&mut self.tables)
    }

    pub fn entry_count(&self) -> usize {
        self.tables.iter().map(SecondaryPageTable::len).sum()
    }

    /// Linear search across every secondary table.
    pub fn find(&self, page: PageId) -> Option<&PageTableEntry> {
        self.tables.iter().find_map(|t| t.find(page))
    }
}

impl fmt::Display for MasterPageTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MasterPageTable {{")?;
        for (i, table) in self.tables.iter().enumerate() {
            writeln!(f, "    {}: SecondaryPageTable ({} bytes) {{", i + 1, table.span())?;
            for entry in table.entries() {
                let frame = match entry.frame() {
                    Some(frame) => frame.to_string(),
                    None => String::from("unmapped"),
                };
                writeln!(
                    f,
                    "        page {} -> frame {}, valid: {}, bytes: {}, chunks: {:?}",
                    entry.page_num(),
                    frame,
                    entry.is_valid(),
                    entry.bytes(),
                    entry.chunk_ids()
                )?;
            }
            writeln!(f, "    }}")?;
        }
        write!(f, "}}")
    }
}
