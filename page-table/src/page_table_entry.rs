use memory::ChunkId;

use crate::{FrameId, PageId};

/// Maps one virtual page of a process to the frame holding it, if any.
///
/// `bytes` is the share of the process's memory the page covers; only the last
/// page of a process is ever partial. `chunk_ids` is the page's chunk footprint
/// and is mirrored onto the frame while the entry is mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTableEntry {
    page_num: PageId,
    frame_num: Option<FrameId>,
    valid: bool,
    chunk_ids: Vec<ChunkId>,
    bytes: u64,
}

impl PageTableEntry {
    pub fn new(page_num: PageId, bytes: u64, chunk_ids: Vec<ChunkId>) -> Self {
        PageTableEntry {
            page_num,
            frame_num: None,
            valid: true,
            chunk_ids,
            bytes,
        }
    }

    pub fn page_num(&self) -> PageId {
        self.page_num
    }

    pub fn frame(&self) -> Option<FrameId> {
        self.frame_num
    }

    pub fn is_mapped(&self) -> bool {
        self.frame_num.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn chunk_ids(&self) -> &[ChunkId] {
        &self.chunk_ids
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn map_to_frame(&mut self, frame: FrameId) {
        self.frame_num = Some(frame);
    }

    /// Drops the frame mapping and returns the frame that held the page.
    pub fn unmap(&mut self) -> Option<FrameId> {
        self.frame_num.take()
    }

    /// Marks the entry as no longer backed by a reserved page.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.frame_num = None;
        self.chunk_ids.clear();
    }

    /// Widens the page's share of the process by `bytes`, adding `chunks` to its
    /// footprint.
    pub fn extend(&mut self, bytes: u64, chunks: Vec<ChunkId>) {
        self.bytes += bytes;
        self.chunk_ids.extend(chunks);
    }
}
