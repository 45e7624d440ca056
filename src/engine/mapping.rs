use log::{debug, info, warn};
use memory::PhysicalPool;

use super::{Engine, EngineError};
use crate::process::{Process, ProcessId};

/// Outcome of one mapping pass, counted in entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationReport {
    pub mapped: usize,
    /// Entries left unmapped because physical memory ran out.
    pub pending: usize,
}

impl Engine {
    /// Gives a frame to every valid, unmapped entry of the process, in table order.
    ///
    /// Running out of frames is not an error: the remaining entries stay unmapped
    /// and are reported as pending, to be picked up by a later call.
    pub fn allocate_to_physical(&mut self, id: ProcessId) -> Result<AllocationReport, EngineError> {
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(EngineError::ProcessNotFound(id))?;
        Ok(map_process(&mut self.physical_pool, process))
    }

    /// Takes every frame back from the process. Returns the number of frames freed.
    pub fn deallocate_from_physical(&mut self, id: ProcessId) -> Result<usize, EngineError> {
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(EngineError::ProcessNotFound(id))?;
        Ok(unmap_process(&mut self.physical_pool, process))
    }
}

pub(super) fn map_process(pool: &mut PhysicalPool, process: &mut Process) -> AllocationReport {
    let mut report = AllocationReport::default();
    let mut exhausted = false;
    for entry in process.table_mut().entries_mut() {
        if !entry.is_valid() || entry.is_mapped() {
            continue;
        }
        if exhausted {
            report.pending += 1;
            continue;
        }
        let frame = match pool.allocate_unit() {
            Ok(frame) => frame,
            Err(_) => {
                exhausted = true;
                report.pending += 1;
                continue;
            }
        };
        if pool.reserve(entry.bytes()).is_err() {
            pool.release_unit(frame);
            exhausted = true;
            report.pending += 1;
            continue;
        }
        pool.mark_chunks(frame, entry.chunk_ids());
        entry.map_to_frame(frame);
        debug!("Page {} -> frame {}", entry.page_num(), frame);
        report.mapped += 1;
    }

    if report.pending > 0 {
        warn!(
            "Process {}: {} pages left unmapped, physical memory exhausted",
            process.id(),
            report.pending
        );
    }
    if report.mapped > 0 {
        info!(
            "Process {}: {} pages mapped to physical memory",
            process.id(),
            report.mapped
        );
    }
    report
}

pub(super) fn unmap_process(pool: &mut PhysicalPool, process: &mut Process) -> usize {
    let mut freed = 0;
    for entry in process.table_mut().entries_mut() {
        if let Some(frame) = entry.unmap() {
            pool.release_unit(frame);
            pool.restore(entry.bytes());
            freed += 1;
        }
    }
    info!(
        "Process {}: {} frames returned to physical memory",
        process.id(),
        freed
    );
    freed
}
