use tessera_ir::Module;

use crate::error::Error;
use crate::registry::{ensure_pattern, matcher_target, pattern_name, PATTERN_CONTAINER};
use crate::schedule::open_schedule_region;

#[test]
fn pattern_name_replaces_dots() {
    assert_eq!(pattern_name("matmul_f32", "linalg.matmul"), "match_linalg_matmul_in_matmul_f32");
}

#[test]
fn first_request_emits_the_pattern() {
    let mut module = Module::new();
    let (body, _) = open_schedule_region(&mut module);

    let name = ensure_pattern(&mut module, body, "main", "linalg.matmul").unwrap();
    assert_eq!(name, "match_linalg_matmul_in_main");

    let container = module.find_in_block(module.body(), PATTERN_CONTAINER).unwrap();
    let pattern = module.lookup_symbol(container, &name).unwrap();
    assert_eq!(module.op(pattern).name, "pdl.pattern");
}

#[test]
fn repeated_requests_reuse_the_pattern() {
    let mut module = Module::new();
    let (body, _) = open_schedule_region(&mut module);
    let container = module.find_in_block(module.body(), PATTERN_CONTAINER).unwrap();
    let container_body = module.op(container).regions[0][0];

    let first = ensure_pattern(&mut module, body, "main", "linalg.matmul").unwrap();
    let ops_after_first = module.block(container_body).ops.len();
    let second = ensure_pattern(&mut module, body, "main", "linalg.matmul").unwrap();

    assert_eq!(first, second);
    assert_eq!(module.block(container_body).ops.len(), ops_after_first);
}

#[test]
fn distinct_pairs_get_distinct_patterns() {
    let mut module = Module::new();
    let (body, _) = open_schedule_region(&mut module);

    let a = ensure_pattern(&mut module, body, "main", "linalg.matmul").unwrap();
    let b = ensure_pattern(&mut module, body, "main", "linalg.fill").unwrap();
    let c = ensure_pattern(&mut module, body, "other", "linalg.matmul").unwrap();

    assert_ne!(a, b);
    assert_ne!(a, c);
    assert_ne!(b, c);
}

#[test]
fn missing_container_is_an_error() {
    let mut module = Module::new();
    let body = module.body();
    let err = ensure_pattern(&mut module, body, "main", "linalg.matmul").unwrap_err();
    assert!(matches!(err, Error::MissingContext { expected: PATTERN_CONTAINER }), "got {err:?}");
}

#[test]
fn matcher_target_reads_back_the_pair() {
    let mut module = Module::new();
    let (body, _) = open_schedule_region(&mut module);
    let name = ensure_pattern(&mut module, body, "main", "linalg.matmul").unwrap();

    let container = module.find_in_block(module.body(), PATTERN_CONTAINER).unwrap();
    let pattern = module.lookup_symbol(container, &name).unwrap();
    assert_eq!(matcher_target(&module, pattern), Some(("linalg.matmul".to_owned(), "main".to_owned())));
}
