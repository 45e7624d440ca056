use std::{fmt, marker::PhantomData};

use log::{debug, warn};

use crate::{ChunkId, Kind, MemoryError, Physical, Unit, UnitId, Virtual};

pub type VirtualPool = Pool<Virtual>;
pub type PhysicalPool = Pool<Physical>;

/// Fixed set of equally sized units plus a byte ledger of what is still free.
///
/// Units are handed out first-fit. The ledger (`remaining`) is kept in bytes and
/// settled by the caller through `reserve`/`restore`, because a process is
/// charged for the bytes it asked for and not for whole units. `free_unit` is the
/// one exception: it returns a whole unit to both the array and the ledger.
#[derive(Debug, Clone)]
pub struct Pool<K: Kind> {
    unit_size: u64,
    chunk_size: u64,
    units: Vec<Unit>,
    remaining: u64,
    _kind: PhantomData<K>,
}

impl<K: Kind> Pool<K> {
    pub fn init(capacity: u64, unit_size: u64, chunk_size: u64) -> Result<Self, MemoryError> {
        if capacity == 0
            || unit_size == 0
            || chunk_size == 0
            || capacity % unit_size != 0
            || unit_size % chunk_size != 0
        {
            return Err(MemoryError::InvalidGeometry {
                capacity,
                unit_size,
                chunk_size,
            });
        }
        let count = (capacity / unit_size) as usize;
        let chunks_per_unit = (unit_size / chunk_size) as usize;
        let units = (0..count)
            .map(|id| Unit::new(id, chunks_per_unit, chunk_size))
            .collect();
        debug!(
            "{} pool initialized: {} units of {} bytes",
            K::SPACE,
            count,
            unit_size
        );
        Ok(Self {
            unit_size,
            chunk_size,
            units,
            remaining: capacity,
            _kind: PhantomData,
        })
    }

    /// Hands out the lowest free unit.
    pub fn allocate_unit(&mut self) -> Result<UnitId, MemoryError> {
        match self.units.iter_mut().find(|u| !u.is_allocated()) {
            Some(unit) => {
                unit.set_allocated(true);
                debug!("{} {} allocated", K::UNIT, unit.id());
                Ok(unit.id())
            }
            None => {
                warn!("No free {} left in {} memory", K::UNIT, K::SPACE);
                Err(MemoryError::Exhausted(K::SPACE))
            }
        }
    }

    /// Returns a unit to the pool and credits one unit size to the ledger.
    ///
    /// # Panics
    /// If `id` is not a unit of this pool.
    pub fn free_unit(&mut self, id: UnitId) {
        self.release_unit(id);
        self.restore(self.unit_size);
    }

    /// Returns a unit to the pool without touching the ledger.
    ///
    /// # Panics
    /// If `id` is not a unit of this pool.
    pub fn release_unit(&mut self, id: UnitId) {
        let unit = self.unit_mut(id);
        unit.set_allocated(false);
        unit.clear_chunks();
        debug!("{} {} released", K::UNIT, id);
    }

    /// Marks up to `count` free chunks of a unit, first-fit, and returns their ids
    /// in order. A short result means the unit ran out of free chunks.
    pub fn allocate_chunks(&mut self, id: UnitId, count: usize) -> Vec<ChunkId> {
        let taken = self.unit_mut(id).take_chunks(count);
        if taken.len() < count {
            warn!(
                "{} {}: wanted {} chunks, got {}",
                K::UNIT,
                id,
                count,
                taken.len()
            );
        }
        taken
    }

    /// Marks exactly the given chunks, used to mirror a page's footprint on a frame.
    pub fn mark_chunks(&mut self, id: UnitId, chunks: &[ChunkId]) {
        self.unit_mut(id).mark_chunks(chunks);
    }

    pub fn clear_chunks(&mut self, id: UnitId) {
        self.unit_mut(id).clear_chunks();
    }

    /// Debits the ledger, refusing to go below zero.
    pub fn reserve(&mut self, bytes: u64) -> Result<(), MemoryError> {
        match self.remaining.checked_sub(bytes) {
            Some(left) => {
                self.remaining = left;
                Ok(())
            }
            None => Err(MemoryError::InsufficientMemory {
                space: K::SPACE,
                requested: bytes,
                remaining: self.remaining,
            }),
        }
    }

    /// Credits the ledger. The ledger never exceeds the pool capacity.
    pub fn restore(&mut self, bytes: u64) {
        let capacity = self.capacity_bytes();
        debug_assert!(
            self.remaining + bytes <= capacity,
            "{} ledger overflow",
            K::SPACE
        );
        self.remaining = (self.remaining + bytes).min(capacity);
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.units.len() as u64 * self.unit_size
    }

    pub fn used_bytes(&self) -> u64 {
        self.capacity_bytes() - self.remaining
    }

    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn free_units(&self) -> usize {
        self.units.iter().filter(|u| !u.is_allocated()).count()
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn allocated_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_allocated())
    }

    /// Dump of the allocated units only.
    pub fn allocated(&self) -> AllocatedDump<'_, K> {
        AllocatedDump { pool: self }
    }

    fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        let count = self.units.len();
        match self.units.get_mut(id) {
            Some(unit) => unit,
            None => panic!("{} {} out of range (pool has {})", K::UNIT, id, count),
        }
    }
}

pub struct AllocatedDump<'a, K: Kind> {
    pool: &'a Pool<K>,
}

impl<K: Kind> fmt::Display for AllocatedDump<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut found = false;
        for unit in self.pool.allocated_units() {
            found = true;
            writeln!(f, "Allocated {} {}", K::UNIT, unit.id())?;
            for (i, chunk) in unit.allocated_chunks() {
                writeln!(f, "\tchunk {} (offset {})", i, chunk.offset)?;
            }
        }
        if !found {
            writeln!(f, "No allocated {}s in {} memory.", K::UNIT, K::SPACE)?;
        }
        Ok(())
    }
}
