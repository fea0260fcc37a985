use tessera_ir::{Attr, Module};

use crate::error::Error;
use crate::passes::{run_pass, DROP_SCHEDULE, INTERPRET_SCHEDULE};
use crate::registry::PATTERN_CONTAINER;
use crate::schedule::{Schedule, ScheduleOptions};
use crate::test::helpers::{find_ops, matmul_module};
use crate::transforms::{Bufferize, Tile, Vectorize};
use crate::variables::Overrides;

#[test]
fn empty_schedule_leaves_the_module_untouched() {
    let mut module = matmul_module("main");
    let before = module.to_string();
    Schedule::new().apply(&mut module).unwrap();
    assert_eq!(module.to_string(), before);
}

#[test]
fn apply_tiles_and_cleans_up() {
    let mut module = matmul_module("main");
    let tile = Tile::new("main", "linalg.matmul", Overrides::new().set("tile_sizes", vec![8i64, 16])).unwrap();
    Schedule::new().add(tile).apply(&mut module).unwrap();

    // Two nonzero sizes materialize a two-deep loop nest around the matmul.
    let loops = find_ops(&module, "scf.for");
    assert_eq!(loops.len(), 2);
    let matmul = find_ops(&module, "linalg.matmul")[0];
    assert_eq!(module.op(matmul).attr("tiled"), Some(&Attr::Bool(true)));
    assert_eq!(module.parent_op(matmul).map(|op| module.op(op).name.clone()), Some("scf.for".to_owned()));

    // The schedule region is gone.
    assert!(module.find_in_block(module.body(), PATTERN_CONTAINER).is_none());
}

#[test]
fn transforms_share_one_schedule_region() {
    let mut module = matmul_module("main");
    let tile = Tile::new("main", "linalg.matmul", Overrides::new().set("tile_sizes", vec![8i64])).unwrap();
    let schedule = Schedule::new()
        .add(tile)
        .add(Vectorize::new("main", None, Overrides::new()).unwrap())
        .add(Bufferize::new());
    schedule.apply(&mut module).unwrap();

    // Interpretation and cleanup only see the first schedule region, so all
    // three effects landing proves the transforms shared one.
    assert_eq!(module.op(module.root()).attr("vectorized"), Some(&Attr::Bool(true)));
    assert_eq!(module.op(module.root()).attr("bufferized"), Some(&Attr::Bool(true)));
    assert_eq!(find_ops(&module, "scf.for").len(), 1);
    assert!(module.find_in_block(module.body(), PATTERN_CONTAINER).is_none());
}

#[test]
fn dump_writes_the_pre_interpretation_module() {
    let mut module = matmul_module("main");
    let tile = Tile::new("main", "linalg.matmul", Overrides::new().set("tile_sizes", vec![8i64])).unwrap();
    let path = std::env::temp_dir().join(format!("tessera-dump-{}.mlir", std::process::id()));

    let options = ScheduleOptions::builder().dump_module_to(path.clone()).build();
    Schedule::new().add(tile).apply_with_options(&mut module, &options).unwrap();

    let dumped = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();
    // The dump is taken before interpretation, so the schedule region is visible.
    assert!(dumped.contains(PATTERN_CONTAINER), "dump: {dumped}");
    assert!(dumped.contains("transform.structured.tile"), "dump: {dumped}");
}

#[test]
fn dump_to_an_unwritable_path_fails() {
    let mut module = matmul_module("main");
    let options = ScheduleOptions::builder().dump_module_to("/nonexistent-dir/dump.mlir").build();
    let tile = Tile::new("main", "linalg.matmul", Overrides::new()).unwrap();
    let err = Schedule::new().add(tile).apply_with_options(&mut module, &options).unwrap_err();
    assert!(matches!(err, Error::Dump { .. }), "got {err:?}");
}

#[test]
fn options_default_to_no_dump() {
    assert!(ScheduleOptions::default().dump_module_to.is_none());
}

#[test]
fn unknown_pass_fails() {
    let mut module = Module::new();
    let err = run_pass(&mut module, "fold-everything").unwrap_err();
    match err {
        Error::PassFailed { pass, .. } => assert_eq!(pass, "fold-everything"),
        other => panic!("expected PassFailed, got {other:?}"),
    }
}

#[test]
fn passes_without_a_schedule_region_are_no_ops() {
    let mut module = matmul_module("main");
    let before = module.to_string();
    run_pass(&mut module, INTERPRET_SCHEDULE).unwrap();
    run_pass(&mut module, DROP_SCHEDULE).unwrap();
    assert_eq!(module.to_string(), before);
}
