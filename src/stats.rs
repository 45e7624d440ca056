use std::fmt;

use memory::{Kind, Pool};

/// Engine-wide access and fault counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    accesses: u64,
    faults: u64,
}

impl Counters {
    pub(crate) fn record_access(&mut self) {
        self.accesses += 1;
    }

    pub(crate) fn record_fault(&mut self) {
        self.faults += 1;
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    pub fn faults(&self) -> u64 {
        self.faults
    }

    /// Percentage of accesses that did not fault, `None` before the first access.
    pub fn hit_rate(&self) -> Option<f64> {
        if self.accesses == 0 {
            return None;
        }
        Some((self.accesses - self.faults) as f64 / self.accesses as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub remaining_bytes: u64,
    pub allocated_units: usize,
    pub total_units: usize,
}

impl PoolUsage {
    pub fn of<K: Kind>(pool: &Pool<K>) -> Self {
        PoolUsage {
            total_bytes: pool.capacity_bytes(),
            used_bytes: pool.used_bytes(),
            remaining_bytes: pool.remaining(),
            allocated_units: pool.unit_count() - pool.free_units(),
            total_units: pool.unit_count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub counters: Counters,
    pub virtual_memory: PoolUsage,
    pub physical_memory: PoolUsage,
}

impl Statistics {
    pub fn hit_rate(&self) -> Option<f64> {
        self.counters.hit_rate()
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = &self.virtual_memory;
        let p = &self.physical_memory;
        writeln!(f, "Memory management statistics:")?;
        writeln!(f, "Allocated pages: {} / {}", v.allocated_units, v.total_units)?;
        writeln!(f, "Allocated frames: {} / {}", p.allocated_units, p.total_units)?;
        writeln!(f, "Accesses: {}", self.counters.accesses())?;
        writeln!(f, "Page faults: {}", self.counters.faults())?;
        match self.hit_rate() {
            Some(rate) => writeln!(f, "Hit rate: {:.2}%", rate)?,
            None => writeln!(f, "Hit rate: n/a")?,
        }
        writeln!(
            f,
            "Virtual memory used: {} of {} bytes ({} remaining)",
            v.used_bytes, v.total_bytes, v.remaining_bytes
        )?;
        write!(
            f,
            "Physical memory used: {} of {} bytes ({} remaining)",
            p.used_bytes, p.total_bytes, p.remaining_bytes
        )
    }
}
