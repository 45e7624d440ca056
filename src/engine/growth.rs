use log::{info, warn};

use super::{fill_table, mapping, stage_units, Engine, EngineError};
use crate::process::{Process, ProcessId};

impl Engine {
    /// Grows a process by `extra` bytes and re-packs its physical mapping.
    ///
    /// The partial last page is topped up first, then new pages go into the first
    /// secondary table that is not full, opening new tables as spans fill up. New
    /// pages are staged before anything is touched, so a failure leaves the process
    /// and both pools as they were.
    pub fn request_additional_memory(
        &mut self,
        id: ProcessId,
        extra: u64,
    ) -> Result<&Process, EngineError> {
        let config = self.config;
        let limit = config.secondary_table_span;
        let process = self
            .processes
            .get_mut(&id)
            .ok_or(EngineError::ProcessNotFound(id))?;

        let virtual_left = self.virtual_pool.remaining();
        if extra == 0 || extra > virtual_left {
            return Err(EngineError::InsufficientVirtualMemory {
                requested: extra,
                remaining: virtual_left,
            });
        }
        let physical_left = self.physical_pool.remaining();
        if extra > physical_left {
            return Err(EngineError::InsufficientPhysicalMemory {
                requested: extra,
                remaining: physical_left,
            });
        }

        let last = process
            .table()
            .last_entry()
            .map(|e| (e.page_num(), e.bytes()));
        let room = last.map_or(0, |(_, bytes)| config.page_size - bytes);
        let top_up = extra.min(room);
        let spill = extra - top_up;

        self.virtual_pool.reserve(extra)?;
        let staged = match stage_units(&mut self.virtual_pool, config.pages_for(spill)) {
            Ok(pages) => pages,
            Err(err) => {
                self.virtual_pool.restore(extra);
                warn!("Process {} not grown: {}", id, err);
                return Err(err.into());
            }
        };

        // Frames are charged by entry size, so settle them before any entry grows.
        mapping::unmap_process(&mut self.physical_pool, process);

        if let Some((page, bytes)) = last.filter(|_| top_up > 0) {
            let more = config.chunks_for(bytes + top_up) - config.chunks_for(bytes);
            let chunks = self.virtual_pool.allocate_chunks(page, more as usize);
            if let Some(table) = process.table_mut().last_table_mut() {
                table.extend_last(top_up, chunks);
            }
        }

        let mut pages = staged.into_iter();
        let mut left = spill;
        while left > 0 {
            let table = process.table_mut().open_table_mut(limit);
            let take = left.min(limit - table.span());
            fill_table(&mut self.virtual_pool, &config, table, take, &mut pages);
            left -= take;
        }
        process.grow(extra);

        mapping::map_process(&mut self.physical_pool, process);
        info!(
            "Process {} grown by {} bytes to {} bytes",
            id,
            extra,
            process.memory_size()
        );
        Ok(process)
    }
}
