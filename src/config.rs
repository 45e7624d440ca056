use crate::engine::EngineError;

pub const KB: u64 = 1024;
pub const MB: u64 = 1024 * KB;

pub const CHUNK_SIZE: u64 = KB;
pub const PAGE_SIZE: u64 = 4 * KB;
pub const FRAME_SIZE: u64 = PAGE_SIZE;
pub const VIRTUAL_MEMORY_SIZE: u64 = 256 * MB;
pub const PHYSICAL_MEMORY_SIZE: u64 = 128 * MB;
pub const SECONDARY_TABLE_SPAN: u64 = 16 * MB;

/// Geometry of the simulated machine. `Default` is the stock configuration above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    pub chunk_size: u64,
    pub page_size: u64,
    pub virtual_space_size: u64,
    pub physical_space_size: u64,
    pub secondary_table_span: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            chunk_size: CHUNK_SIZE,
            page_size: PAGE_SIZE,
            virtual_space_size: VIRTUAL_MEMORY_SIZE,
            physical_space_size: PHYSICAL_MEMORY_SIZE,
            secondary_table_span: SECONDARY_TABLE_SPAN,
        }
    }
}

impl MemoryConfig {
    pub fn num_pages(&self) -> u64 {
        self.virtual_space_size / self.page_size
    }

    pub fn num_frames(&self) -> u64 {
        self.physical_space_size / self.page_size
    }

    pub fn chunks_per_page(&self) -> u64 {
        self.page_size / self.chunk_size
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let fail = |reason: &str| -> Result<(), EngineError> {
            Err(EngineError::InitializationFailure(reason.to_string()))
        };
        if self.chunk_size == 0 || self.page_size == 0 {
            return fail("chunk and page size must be non-zero");
        }
        if self.page_size % self.chunk_size != 0 {
            return fail("page size must be a multiple of the chunk size");
        }
        if self.virtual_space_size == 0 || self.virtual_space_size % self.page_size != 0 {
            return fail("virtual space must be a non-zero multiple of the page size");
        }
        if self.physical_space_size == 0 || self.physical_space_size % self.page_size != 0 {
            return fail("physical space must be a non-zero multiple of the page size");
        }
        if self.secondary_table_span == 0 || self.secondary_table_span % self.page_size != 0 {
            return fail("secondary table span must be a non-zero multiple of the page size");
        }
        Ok(())
    }

    /// Splits `bytes` into secondary-table spans: full spans, then the remainder.
    pub fn table_spans(&self, bytes: u64) -> Vec<u64> {
        let span = self.secondary_table_span;
        let mut spans = vec![span; (bytes / span) as usize];
        if bytes % span != 0 {
            spans.push(bytes % span);
        }
        spans
    }

    pub fn pages_for(&self, bytes: u64) -> u64 {
        bytes.div_ceil(self.page_size)
    }

    pub fn chunks_for(&self, bytes: u64) -> u64 {
        bytes.div_ceil(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry() {
        let config = MemoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_pages(), 65536);
        assert_eq!(config.num_frames(), 32768);
        assert_eq!(config.chunks_per_page(), 4);
    }

    #[test]
    fn rejects_span_not_page_aligned() {
        let config = MemoryConfig {
            secondary_table_span: 4 * MB + 1,
            ..MemoryConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(EngineError::InitializationFailure(_))
        ));
    }

    #[test]
    fn rejects_chunk_not_dividing_page() {
        let config = MemoryConfig {
            chunk_size: 3000,
            ..MemoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn table_spans_split_with_remainder() {
        let config = MemoryConfig {
            secondary_table_span: 4 * MB,
            ..MemoryConfig::default()
        };
        assert_eq!(config.table_spans(10000), vec![10000]);
        assert_eq!(config.table_spans(8 * MB), vec![4 * MB, 4 * MB]);
        assert_eq!(config.table_spans(9 * MB), vec![4 * MB, 4 * MB, MB]);
    }

    #[test]
    fn pages_and_chunks_round_up() {
        let config = MemoryConfig::default();
        assert_eq!(config.pages_for(10000), 3);
        assert_eq!(config.pages_for(4096), 1);
        assert_eq!(config.chunks_for(1808), 2);
    }
}
