use paging_sim::{
    config::{MemoryConfig, KB, MB},
    Access, AllocationReport, Engine, EngineError, FaultDecision,
};
use rand::Rng;

#[test]
fn general() {
    let mut engine = Engine::new(MemoryConfig::default()).unwrap();
    let config = *engine.config();
    assert_eq!(config.num_pages(), 65536);
    assert_eq!(config.num_frames(), 32768);

    // 40 MB spans three secondary tables of at most 16 MB.
    let process = engine.create_process(1, 40 * MB).unwrap();
    let spans: Vec<u64> = process.table().tables().iter().map(|t| t.span()).collect();
    assert_eq!(spans, vec![16 * MB, 16 * MB, 8 * MB]);
    assert_eq!(process.table().entry_count(), 10240);

    engine.create_process(2, 10000).unwrap();
    assert_eq!(
        engine.virtual_pool().remaining(),
        256 * MB - 40 * MB - 10000
    );

    assert_eq!(
        engine.allocate_to_physical(1).unwrap(),
        AllocationReport {
            mapped: 10240,
            pending: 0
        }
    );
    let pa = engine
        .translate("0vp10241s100", 2, |_| FaultDecision::Allocate)
        .unwrap();
    assert_eq!(pa.to_string(), "0pf10241s100");
    assert_eq!(engine.access(2, 10241).unwrap(), Access::Hit(10241));

    let stats = engine.statistics_snapshot();
    assert_eq!(stats.counters.accesses(), 2);
    assert_eq!(stats.counters.faults(), 1);
    assert_eq!(stats.hit_rate(), Some(50.0));
    assert_eq!(stats.physical_memory.used_bytes, 40 * MB + 10000);

    engine.request_additional_memory(2, 3 * MB).unwrap();
    let process = engine.process(2).unwrap();
    assert_eq!(process.memory_size(), 3 * MB + 10000);
    assert!(process.is_fully_mapped());

    engine.destroy_process(1).unwrap();
    engine.destroy_process(2).unwrap();
    assert_eq!(engine.virtual_pool().remaining(), 256 * MB);
    assert_eq!(engine.physical_pool().remaining(), 128 * MB);
    assert_eq!(
        engine.destroy_process(2).unwrap_err(),
        EngineError::ProcessNotFound(2)
    );
}

#[test]
fn churn() {
    let mut engine = Engine::new(MemoryConfig {
        virtual_space_size: 2 * MB,
        physical_space_size: 512 * KB,
        secondary_table_span: 64 * KB,
        ..MemoryConfig::default()
    })
    .unwrap();
    let mut rng = rand::thread_rng();

    for round in 0..200u32 {
        let id = round % 8;
        if engine.process(id).is_some() {
            engine.destroy_process(id).unwrap();
            continue;
        }
        let bytes = rng.gen_range(1..128 * KB);
        match engine.create_process(id, bytes) {
            Ok(_) => {
                let report = engine.allocate_to_physical(id).unwrap();
                let process = engine.process(id).unwrap();
                assert_eq!(report.mapped + report.pending, process.table().entry_count());
            }
            Err(EngineError::InsufficientVirtualMemory { .. })
            | Err(EngineError::VirtualMemoryExhausted) => {}
            Err(err) => panic!("unexpected error: {}", err),
        }

        let resident: u64 = engine.processes().map(|p| p.resident_bytes()).sum();
        assert_eq!(engine.physical_pool().used_bytes(), resident);
        let reserved: u64 = engine.processes().map(|p| p.memory_size()).sum();
        assert_eq!(engine.virtual_pool().used_bytes(), reserved);
    }
}
