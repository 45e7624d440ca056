//! A two-level paging simulator: processes reserve virtual pages, get them mapped
//! onto physical frames, fault, translate addresses and grow.

pub mod address;
pub mod command;
pub mod config;
pub mod engine;
pub mod meta_commands;
pub mod process;
pub mod repl;
pub mod stats;

pub use address::{AddressError, PhysicalAddress, VirtualAddress};
pub use config::MemoryConfig;
pub use engine::{Access, AllocationReport, Engine, EngineError, FaultDecision, PageFault};
pub use process::{Process, ProcessId};
pub use stats::Statistics;
