use std::fmt;

pub mod pool;
pub mod unit;

pub use pool::{PhysicalPool, Pool, VirtualPool};
pub use unit::{Chunk, Unit};

pub type UnitId = usize;
pub type ChunkId = usize;

/// Which address space a pool models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Virtual,
    Physical,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::Virtual => write!(f, "virtual"),
            Space::Physical => write!(f, "physical"),
        }
    }
}

/// Marker for the address space a `Pool` belongs to, so a page id can never be
/// handed to the frame pool by accident.
pub trait Kind {
    const SPACE: Space;
    /// Name of one unit in this space, used in logs and dumps.
    const UNIT: &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct Virtual;

#[derive(Debug, Clone, Copy)]
pub struct Physical;

impl Kind for Virtual {
    const SPACE: Space = Space::Virtual;
    const UNIT: &'static str = "Page";
}

impl Kind for Physical {
    const SPACE: Space = Space::Physical;
    const UNIT: &'static str = "Frame";
}

#[derive(Debug, PartialEq)]
pub enum MemoryError {
    /// Capacity, unit size and chunk size do not tile each other.
    InvalidGeometry {
        capacity: u64,
        unit_size: u64,
        chunk_size: u64,
    },
    /// The byte ledger cannot cover the request.
    InsufficientMemory {
        space: Space,
        requested: u64,
        remaining: u64,
    },
    /// Every unit of the pool is handed out.
    Exhausted(Space),
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::InvalidGeometry {
                capacity,
                unit_size,
                chunk_size,
            } => write!(
                f,
                "invalid pool geometry: capacity {} / unit {} / chunk {}",
                capacity, unit_size, chunk_size
            ),
            MemoryError::InsufficientMemory {
                space,
                requested,
                remaining,
            } => write!(
                f,
                "insufficient {} memory: requested {} bytes, {} remaining",
                space, requested, remaining
            ),
            MemoryError::Exhausted(space) => write!(f, "no free units left in {} memory", space),
        }
    }
}

impl std::error::Error for MemoryError {}
