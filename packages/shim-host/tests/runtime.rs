use runtime_shim::{HeapStats, EINVAL, ENOMEM, WASM_PAGE};
use shim_host::{HostConfig, HostError, RandomConfig, Runtime};

/// A guest that calls the host imports the way runtime-shim's exports do.
/// The pointer slot for `posix_memalign` lives at address 0.
const GUEST: &str = r#"
(module
  (import "env" "impl_posix_memalign" (func $memalign (param i32 i32 i32) (result i32)))
  (import "env" "impl_free" (func $free (param i32)))
  (import "env" "impl_arc4random" (func $random (result i32)))
  (import "env" "impl_arc4random_buf" (func $random_buf (param i32 i32)))
  (import "env" "log" (func $log (param i32 i32)))
  (import "env" "warn" (func $warn (param i32 i32)))
  (memory (export "memory") 1)
  (data (i32.const 64) "hello from guest")
  (global $frames (mut i32) (i32.const 0))

  (func (export "alloc") (param $align i32) (param $size i32) (result i32)
    (call $memalign (i32.const 0) (local.get $align) (local.get $size)))
  (func (export "alloc_into") (param $slot i32) (param $align i32) (param $size i32) (result i32)
    (call $memalign (local.get $slot) (local.get $align) (local.get $size)))
  (func (export "last_pointer") (result i32)
    (i32.load (i32.const 0)))
  (func (export "release") (param $ptr i32)
    (call $free (local.get $ptr)))
  (func (export "random") (result i32)
    (call $random))
  (func (export "fill") (param $buf i32) (param $count i32)
    (call $random_buf (local.get $buf) (local.get $count)))
  (func (export "main")
    (call $log (i32.const 64) (i32.const 16)))
  (func (export "resume")
    (global.set $frames (i32.add (global.get $frames) (i32.const 1))))
  (func (export "frames") (result i32)
    (global.get $frames))
  (func (export "complain")
    (call $warn (i32.const 64) (i32.const 16)))
  (func (export "log_out_of_bounds")
    (call $log (i32.const 65530) (i32.const 100)))
)
"#;

const PAGE: i32 = WASM_PAGE as i32;

fn runtime(config: HostConfig) -> Runtime {
    Runtime::new(GUEST, &config).unwrap()
}

fn seeded(seed: u64) -> HostConfig {
    HostConfig {
        random: RandomConfig::Seeded { seed },
        ..HostConfig::default()
    }
}

fn alloc(runtime: &mut Runtime, align: i32, size: i32) -> i32 {
    runtime.call_typed::<(i32, i32), i32>("alloc", (align, size)).unwrap()
}

fn last_pointer(runtime: &mut Runtime) -> i32 {
    runtime.call_typed::<(), i32>("last_pointer", ()).unwrap()
}

#[test]
fn first_allocation_grows_past_committed_memory() {
    let mut rt = runtime(HostConfig::default());

    assert_eq!(alloc(&mut rt, 8, 24), 0);
    assert_eq!(last_pointer(&mut rt), PAGE);
    assert_eq!(rt.memory_pages(), 2);

    let stats = rt.heap_stats();
    assert_eq!(stats.allocations, 1);
    assert_eq!(stats.bytes_allocated, 24);
    assert_eq!(stats.pages_grown, 1);
}

#[test]
fn later_allocations_are_aligned() {
    let mut rt = runtime(HostConfig::default());
    alloc(&mut rt, 8, 24);

    assert_eq!(alloc(&mut rt, 16, 10), 0);
    let pointer = last_pointer(&mut rt);
    assert_eq!(pointer % 16, 0);
    assert_eq!(pointer, PAGE + 32);
    assert_eq!(rt.memory_pages(), 2);
}

#[test]
fn bad_alignment_returns_einval_and_leaves_slot() {
    let mut rt = runtime(HostConfig::default());

    assert_eq!(alloc(&mut rt, 3, 8), EINVAL);
    assert_eq!(last_pointer(&mut rt), 0);
    assert_eq!(rt.memory_pages(), 1);
}

#[test]
fn unwritable_slot_traps_before_the_heap_moves() {
    let mut rt = runtime(HostConfig::default());

    let err = rt
        .call_typed::<(i32, i32, i32), i32>("alloc_into", (-4, 8, 100_000))
        .unwrap_err();
    assert!(matches!(err, HostError::Trap { ref name, .. } if name == "alloc_into"));
    assert_eq!(rt.memory_pages(), 1);
    assert_eq!(rt.heap_stats(), HeapStats::default());

    // The cursor never moved, so the next allocation starts the heap.
    assert_eq!(alloc(&mut rt, 8, 24), 0);
    assert_eq!(last_pointer(&mut rt), PAGE);
}

#[test]
fn max_pages_turns_growth_into_enomem() {
    let config = HostConfig {
        max_pages: Some(1),
        ..HostConfig::default()
    };
    let mut rt = runtime(config);

    assert_eq!(alloc(&mut rt, 8, 8), ENOMEM);
    assert_eq!(rt.memory_pages(), 1);
    assert_eq!(rt.heap_stats().allocations, 0);
}

#[test]
fn heap_start_from_config_is_honoured() {
    let config = HostConfig {
        heap_start: Some(1024),
        ..HostConfig::default()
    };
    let mut rt = runtime(config);

    assert_eq!(alloc(&mut rt, 8, 8), 0);
    assert_eq!(last_pointer(&mut rt), 1024);
    assert_eq!(rt.memory_pages(), 1);
}

#[test]
fn free_counts_only_non_null_pointers() {
    let mut rt = runtime(HostConfig::default());
    alloc(&mut rt, 8, 8);
    let pointer = last_pointer(&mut rt);

    rt.call_typed::<i32, ()>("release", 0).unwrap();
    rt.call_typed::<i32, ()>("release", pointer).unwrap();

    assert_eq!(rt.heap_stats().frees, 1);
}

#[test]
fn seeded_random_is_reproducible() {
    let mut a = runtime(seeded(11));
    let mut b = runtime(seeded(11));

    for _ in 0..4 {
        let x = a.call_typed::<(), i32>("random", ()).unwrap();
        let y = b.call_typed::<(), i32>("random", ()).unwrap();
        assert_eq!(x, y);
    }
}

#[test]
fn random_buf_fills_exactly_count_bytes() {
    let mut a = runtime(seeded(3));
    let mut b = runtime(seeded(3));

    a.call_typed::<(i32, i32), ()>("fill", (256, 32)).unwrap();
    b.call_typed::<(i32, i32), ()>("fill", (256, 32)).unwrap();

    let bytes = a.read_memory(256, 40).unwrap();
    assert_eq!(bytes[..32], b.read_memory(256, 32).unwrap()[..]);
    assert!(bytes[..32].iter().any(|&byte| byte != 0));
    assert!(bytes[32..].iter().all(|&byte| byte == 0));
}

#[test]
fn random_buf_out_of_bounds_traps() {
    let mut rt = runtime(HostConfig::default());

    let err = rt
        .call_typed::<(i32, i32), ()>("fill", (PAGE - 6, 100))
        .unwrap_err();
    assert!(matches!(err, HostError::Trap { ref name, .. } if name == "fill"));
}

#[test]
fn guest_logging_reads_guest_memory() {
    let mut rt = runtime(HostConfig::default());

    rt.call("main").unwrap();
    rt.call("complain").unwrap();
    assert!(matches!(
        rt.call("log_out_of_bounds"),
        Err(HostError::Trap { .. })
    ));
}

#[test]
fn run_calls_entries_then_resume_frames() {
    let config = HostConfig {
        frames: 3,
        ..HostConfig::default()
    };
    let mut rt = runtime(config.clone());

    rt.run(&config).unwrap();
    assert_eq!(rt.call_typed::<(), i32>("frames", ()).unwrap(), 3);
}

#[test]
fn missing_entry_is_reported() {
    let mut rt = runtime(HostConfig::default());

    let err = rt.call("nope").unwrap_err();
    assert!(matches!(err, HostError::MissingEntry { ref name, .. } if name == "nope"));
}

#[test]
fn module_without_memory_export_is_rejected() {
    let err = Runtime::new(r#"(module (func (export "main")))"#, &HostConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, HostError::MissingMemory));
}

#[test]
fn unresolvable_import_fails_instantiation() {
    let wat = r#"
        (module
          (import "env" "impl_realloc" (func (param i32 i32) (result i32)))
          (memory (export "memory") 1))
    "#;
    let err = Runtime::new(wat, &HostConfig::default()).err().unwrap();
    assert!(matches!(err, HostError::Instantiate(_)));
}

#[test]
fn invalid_module_fails_to_compile() {
    let err = Runtime::new("(module", &HostConfig::default()).err().unwrap();
    assert!(matches!(err, HostError::Compile(_)));
}
