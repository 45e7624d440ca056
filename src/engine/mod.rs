//! The paging engine: owns both pools, every process and the access counters.
//!
//! Byte ledgers are settled here, not in the pools. A process is charged
//! `memory_size` against virtual memory for its whole life, and against physical
//! memory for exactly the bytes of its entries that currently hold a frame.

mod fault;
mod growth;
mod mapping;

use std::{collections::BTreeMap, fmt};

use log::{info, warn};
use memory::{Kind, MemoryError, PhysicalPool, Pool, Space, UnitId, VirtualPool};
use page_table::{MasterPageTable, PageId, PageTableEntry, SecondaryPageTable};

use crate::{
    address::{AddressError, VirtualAddress},
    config::MemoryConfig,
    process::{Process, ProcessId},
    stats::{Counters, PoolUsage, Statistics},
};

pub use fault::{Access, FaultDecision, PageFault};
pub use mapping::AllocationReport;

#[derive(Debug, PartialEq)]
pub enum EngineError {
    InitializationFailure(String),
    InsufficientVirtualMemory { requested: u64, remaining: u64 },
    InsufficientPhysicalMemory { requested: u64, remaining: u64 },
    VirtualMemoryExhausted,
    PhysicalMemoryExhausted,
    InvalidPage { process: ProcessId, page: PageId },
    ProcessNotFound(ProcessId),
    DuplicateProcess(ProcessId),
    MalformedAddress(AddressError),
    TranslationAborted(VirtualAddress),
}

impl From<MemoryError> for EngineError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::InvalidGeometry { .. } => {
                EngineError::InitializationFailure(err.to_string())
            }
            MemoryError::InsufficientMemory {
                space: Space::Virtual,
                requested,
                remaining,
            } => EngineError::InsufficientVirtualMemory {
                requested,
                remaining,
            },
            MemoryError::InsufficientMemory {
                space: Space::Physical,
                requested,
                remaining,
            } => EngineError::InsufficientPhysicalMemory {
                requested,
                remaining,
            },
            MemoryError::Exhausted(Space::Virtual) => EngineError::VirtualMemoryExhausted,
            MemoryError::Exhausted(Space::Physical) => EngineError::PhysicalMemoryExhausted,
        }
    }
}

impl From<AddressError> for EngineError {
    fn from(err: AddressError) -> Self {
        EngineError::MalformedAddress(err)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InitializationFailure(reason) => {
                write!(f, "failed to initialize memory: {}", reason)
            }
            EngineError::InsufficientVirtualMemory {
                requested,
                remaining,
            } => write!(
                f,
                "insufficient virtual memory: requested {} bytes, {} remaining",
                requested, remaining
            ),
            EngineError::InsufficientPhysicalMemory {
                requested,
                remaining,
            } => write!(
                f,
                "insufficient physical memory: requested {} bytes, {} remaining",
                requested, remaining
            ),
            EngineError::VirtualMemoryExhausted => write!(f, "no free pages left"),
            EngineError::PhysicalMemoryExhausted => write!(f, "no free frames left"),
            EngineError::InvalidPage { process, page } => {
                write!(f, "page {} does not belong to process {}", page, process)
            }
            EngineError::ProcessNotFound(id) => write!(f, "process {} not found", id),
            EngineError::DuplicateProcess(id) => write!(f, "process {} already exists", id),
            EngineError::MalformedAddress(err) => write!(f, "malformed address: {}", err),
            EngineError::TranslationAborted(va) => write!(f, "translation of {} aborted", va),
        }
    }
}

impl std::error::Error for EngineError {}

pub struct Engine {
    config: MemoryConfig,
    virtual_pool: VirtualPool,
    physical_pool: PhysicalPool,
    processes: BTreeMap<ProcessId, Process>,
    counters: Counters,
}

impl Engine {
    pub fn new(config: MemoryConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let virtual_pool =
            VirtualPool::init(config.virtual_space_size, config.page_size, config.chunk_size)?;
        let physical_pool =
            PhysicalPool::init(config.physical_space_size, config.page_size, config.chunk_size)?;
        info!(
            "Engine initialized: {} pages, {} frames",
            config.num_pages(),
            config.num_frames()
        );
        Ok(Self {
            config,
            virtual_pool,
            physical_pool,
            processes: BTreeMap::new(),
            counters: Counters::default(),
        })
    }

    /// Reserves virtual pages for a new process and builds its page table. Every
    /// entry starts unmapped.
    pub fn create_process(
        &mut self,
        id: ProcessId,
        memory_size: u64,
    ) -> Result<&Process, EngineError> {
        if self.processes.contains_key(&id) {
            return Err(EngineError::DuplicateProcess(id));
        }
        if memory_size == 0 {
            return Err(EngineError::InsufficientVirtualMemory {
                requested: 0,
                remaining: self.virtual_pool.remaining(),
            });
        }
        self.virtual_pool.reserve(memory_size)?;
        let pages = match stage_units(&mut self.virtual_pool, self.config.pages_for(memory_size)) {
            Ok(pages) => pages,
            Err(err) => {
                self.virtual_pool.restore(memory_size);
                warn!("Process {} not created: {}", id, err);
                return Err(err.into());
            }
        };

        let mut table = MasterPageTable::new();
        let mut pages = pages.into_iter();
        for span in self.config.table_spans(memory_size) {
            let secondary = table.push_table(SecondaryPageTable::new());
            fill_table(
                &mut self.virtual_pool,
                &self.config,
                secondary,
                span,
                &mut pages,
            );
        }

        info!(
            "Process {} created with {} bytes in {} secondary tables",
            id,
            memory_size,
            table.table_count()
        );
        let process = Process::new(id, memory_size, table);
        Ok(self.processes.entry(id).or_insert(process))
    }

    /// Releases every page and frame of a process and removes it.
    pub fn destroy_process(&mut self, id: ProcessId) -> Result<Process, EngineError> {
        let mut process = self
            .processes
            .remove(&id)
            .ok_or(EngineError::ProcessNotFound(id))?;
        let mut frames = 0;
        for entry in process.table_mut().entries_mut() {
            if let Some(frame) = entry.unmap() {
                self.physical_pool.release_unit(frame);
                self.physical_pool.restore(entry.bytes());
                frames += 1;
            }
            self.virtual_pool.release_unit(entry.page_num());
            entry.invalidate();
        }
        self.virtual_pool.restore(process.memory_size());
        info!("Process {} destroyed, {} frames freed", id, frames);
        Ok(process)
    }

    pub fn statistics_snapshot(&self) -> Statistics {
        Statistics {
            counters: self.counters,
            virtual_memory: PoolUsage::of(&self.virtual_pool),
            physical_memory: PoolUsage::of(&self.physical_pool),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn virtual_pool(&self) -> &VirtualPool {
        &self.virtual_pool
    }

    pub fn physical_pool(&self) -> &PhysicalPool {
        &self.physical_pool
    }

    pub fn process(&self, id: ProcessId) -> Option<&Process> {
        self.processes.get(&id)
    }

    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.values()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Takes `count` units from the pool, all or nothing.
fn stage_units<K: Kind>(pool: &mut Pool<K>, count: u64) -> Result<Vec<UnitId>, MemoryError> {
    let mut staged = Vec::with_capacity(count as usize);
    for _ in 0..count {
        match pool.allocate_unit() {
            Ok(id) => staged.push(id),
            Err(err) => {
                for id in staged {
                    pool.release_unit(id);
                }
                return Err(err);
            }
        }
    }
    Ok(staged)
}

/// Appends entries covering `bytes` to `table`, one staged page per entry.
fn fill_table(
    pool: &mut VirtualPool,
    config: &MemoryConfig,
    table: &mut SecondaryPageTable,
    bytes: u64,
    pages: &mut impl Iterator<Item = PageId>,
) {
    let mut left = bytes;
    while left > 0 {
        let Some(page) = pages.next() else {
            break;
        };
        let page_bytes = left.min(config.page_size);
        let chunks = pool.allocate_chunks(page, config.chunks_for(page_bytes) as usize);
        table.push_entry(PageTableEntry::new(page, page_bytes, chunks));
        left -= page_bytes;
    }
}
