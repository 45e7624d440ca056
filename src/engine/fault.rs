use log::{debug, warn};
use page_table::{FrameId, PageId};

use super::{Engine, EngineError};
use crate::{
    address::{PhysicalAddress, VirtualAddress},
    process::ProcessId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Hit(FrameId),
    /// The page belongs to the process but holds no frame.
    Fault,
}

/// Handed to the caller of `translate` when the page is not resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFault {
    pub process: ProcessId,
    pub address: VirtualAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultDecision {
    /// Map the whole process, then finish the translation.
    Allocate,
    Abort,
}

impl Engine {
    /// Looks a page up in the process's table and counts the access.
    ///
    /// Every hit or fault counts as one access; faults are also counted as faults.
    /// A page the process never reserved is an error and is not counted.
    pub fn access(&mut self, id: ProcessId, page: PageId) -> Result<Access, EngineError> {
        let process = self
            .processes
            .get(&id)
            .ok_or(EngineError::ProcessNotFound(id))?;
        let entry = process
            .table()
            .find(page)
            .ok_or(EngineError::InvalidPage { process: id, page })?;

        self.counters.record_access();
        match entry.frame() {
            Some(frame) => {
                debug!("Process {}: page {} hit in frame {}", id, page, frame);
                Ok(Access::Hit(frame))
            }
            None => {
                self.counters.record_fault();
                warn!("Page fault on page {} of process {}", page, id);
                Ok(Access::Fault)
            }
        }
    }

    /// Translates `0vp<page>s<offset>` into `0pf<frame>s<offset>`.
    ///
    /// On a page fault `on_fault` decides whether the process gets mapped now or
    /// the translation is abandoned.
    pub fn translate<F>(
        &mut self,
        address: &str,
        id: ProcessId,
        on_fault: F,
    ) -> Result<PhysicalAddress, EngineError>
    where
        F: FnOnce(&PageFault) -> FaultDecision,
    {
        let va: VirtualAddress = address.parse()?;
        va.check_offset(self.config.page_size)?;

        match self.access(id, va.page)? {
            Access::Hit(frame) => Ok(PhysicalAddress::new(frame, va.offset)),
            Access::Fault => {
                let fault = PageFault {
                    process: id,
                    address: va,
                };
                match on_fault(&fault) {
                    FaultDecision::Abort => Err(EngineError::TranslationAborted(va)),
                    FaultDecision::Allocate => {
                        self.allocate_to_physical(id)?;
                        let frame = self
                            .processes
                            .get(&id)
                            .and_then(|p| p.frame_of(va.page))
                            .flatten()
                            .ok_or(EngineError::PhysicalMemoryExhausted)?;
                        Ok(PhysicalAddress::new(frame, va.offset))
                    }
                }
            }
        }
    }
}
