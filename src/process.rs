use std::fmt;

use page_table::{FrameId, MasterPageTable, PageId};

pub type ProcessId = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: ProcessId,
    memory_size: u64,
    table: MasterPageTable,
}

impl Process {
    pub(crate) fn new(id: ProcessId, memory_size: u64, table: MasterPageTable) -> Self {
        Process {
            id,
            memory_size,
            table,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn memory_size(&self) -> u64 {
        self.memory_size
    }

    pub fn table(&self) -> &MasterPageTable {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut MasterPageTable {
        &mut self.table
    }

    pub(crate) fn grow(&mut self, bytes: u64) {
        self.memory_size += bytes;
    }

    pub fn frame_of(&self, page: PageId) -> Option<Option<FrameId>> {
        self.table.find(page).map(|e| e.frame())
    }

    /// Bytes currently backed by a frame.
    pub fn resident_bytes(&self) -> u64 {
        self.table
            .entries()
            .filter(|e| e.is_mapped())
            .map(|e| e.bytes())
            .sum()
    }

    /// Bytes still waiting for a frame.
    pub fn pending_bytes(&self) -> u64 {
        self.memory_size - self.resident_bytes()
    }

    pub fn is_fully_mapped(&self) -> bool {
        self.table.entries().all(|e| e.is_mapped())
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Process {} ({} bytes)", self.id, self.memory_size)?;
        write!(f, "{}", self.table)
    }
}
