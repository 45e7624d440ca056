use crate::{ChunkId, UnitId};

/// Sub-unit allocation slot. `offset` is the byte offset inside the page or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub allocated: bool,
}

/// A page of virtual memory or a frame of physical memory.
///
/// `allocated` is set when the unit is handed out by its pool and is not derived
/// from the chunk states: a unit can be allocated while only some of its chunks are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    chunks: Box<[Chunk]>,
    allocated: bool,
}

impl Unit {
    pub(crate) fn new(id: UnitId, chunks_per_unit: usize, chunk_size: u64) -> Self {
        let chunks = (0..chunks_per_unit)
            .map(|i| Chunk {
                offset: i as u64 * chunk_size,
                allocated: false,
            })
            .collect();
        Unit {
            id,
            chunks,
            allocated: false,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn allocated_chunks(&self) -> impl Iterator<Item = (ChunkId, &Chunk)> {
        self.chunks.iter().enumerate().filter(|(_, c)| c.allocated)
    }

    pub(crate) fn set_allocated(&mut self, allocated: bool) {
        self.allocated = allocated;
    }

    /// First-fit over the chunk array, marking at most `count` free chunks.
    pub(crate) fn take_chunks(&mut self, count: usize) -> Vec<ChunkId> {
        let mut taken = Vec::with_capacity(count.min(self.chunks.len()));
        for (i, chunk) in self.chunks.iter_mut().enumerate() {
            if taken.len() == count {
                break;
            }
            if !chunk.allocated {
                chunk.allocated = true;
                taken.push(i);
            }
        }
        taken
    }

    pub(crate) fn mark_chunks(&mut self, ids: &[ChunkId]) {
        for &i in ids {
            self.chunks[i].allocated = true;
        }
    }

    pub(crate) fn clear_chunks(&mut self) {
        for chunk in self.chunks.iter_mut() {
            chunk.allocated = false;
        }
    }
}
