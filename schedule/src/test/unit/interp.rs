use tessera_ir::{Attr, Builder, Module, OpSpec};

use crate::error::Error;
use crate::schedule::Schedule;
use crate::test::helpers::{find_ops, matmul_module};
use crate::transforms::{
    Generalize, Interchange, LinalgExtInParallelToAsync, LinalgExtTile, LinalgExtTileToInParallel, LowerVectors,
    OutlineOneParentLoop, Tile, UnrollOneParentLoop,
};
use crate::variables::Overrides;

fn tile(fun: &str, sizes: Vec<i64>) -> Tile {
    Tile::new(fun, "linalg.matmul", Overrides::new().set("tile_sizes", sizes)).unwrap()
}

#[test]
fn tiling_nests_loops_outermost_first() {
    let mut module = matmul_module("main");
    Schedule::new().add(tile("main", vec![8, 16, 32])).apply(&mut module).unwrap();

    let loops = find_ops(&module, "scf.for");
    assert_eq!(loops.len(), 3);
    // Preorder: each loop contains the next, the matmul sits innermost.
    assert_eq!(module.parent_op(loops[1]), Some(loops[0]));
    assert_eq!(module.parent_op(loops[2]), Some(loops[1]));
    let matmul = find_ops(&module, "linalg.matmul")[0];
    assert_eq!(module.parent_op(matmul), Some(loops[2]));

    // The fill next to the matmul is untouched.
    let fill = find_ops(&module, "linalg.fill")[0];
    assert_eq!(module.op(fill).attrs, vec![]);
}

#[test]
fn matching_is_scoped_to_the_named_function() {
    let mut module = matmul_module("main");
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let other = b.build(OpSpec::new("func").attr("sym_name", Attr::str("other")).regions(1));
    let other_body = module.append_block(other, 0, 0);
    let mut b = Builder::at_end(&mut module, other_body);
    b.build(OpSpec::new("linalg.matmul").results(1));

    Schedule::new().add(tile("main", vec![8])).apply(&mut module).unwrap();

    // Only main's matmul got a loop; other's is untouched.
    assert_eq!(find_ops(&module, "scf.for").len(), 1);
    let untouched = find_ops(&module, "linalg.matmul")
        .into_iter()
        .filter(|&op| module.op(op).attr("tiled").is_none())
        .count();
    assert_eq!(untouched, 1);
}

#[test]
fn peel_marks_the_requested_loop_levels() {
    let overrides = Overrides::new().set("tile_sizes", vec![8i64, 16, 32]).set("peel", vec![0i64, 2]);
    let mut module = matmul_module("main");
    Schedule::new()
        .add(Tile::new("main", "linalg.matmul", overrides).unwrap())
        .apply(&mut module)
        .unwrap();

    let loops = find_ops(&module, "scf.for");
    assert_eq!(module.op(loops[0]).attr("peeled"), Some(&Attr::Bool(true)));
    assert_eq!(module.op(loops[1]).attr("peeled"), None);
    assert_eq!(module.op(loops[2]).attr("peeled"), Some(&Attr::Bool(true)));
}

#[test]
fn generalize_then_interchange_rewrites_the_generic_form() {
    let mut module = matmul_module("main");
    let interchange = Interchange::new("main", Overrides::new().set("iterator_interchange", vec![1i64, 0])).unwrap();
    Schedule::new()
        .add(Generalize::new("main", "linalg.matmul", Overrides::new()).unwrap())
        .add(interchange)
        .apply(&mut module)
        .unwrap();

    assert!(find_ops(&module, "linalg.matmul").is_empty());
    let generic = find_ops(&module, "linalg.generic")[0];
    assert_eq!(module.op(generic).attr("iterator_interchange"), Some(&Attr::IntArray(vec![1, 0])));
}

#[test]
fn unroll_annotates_the_enclosing_loop() {
    let mut module = matmul_module("main");
    let unroll =
        UnrollOneParentLoop::new("main", "linalg.matmul", Overrides::new().set("unroll_factor", 4i64)).unwrap();
    Schedule::new().add(tile("main", vec![0, 8])).add(unroll).apply(&mut module).unwrap();

    let loops = find_ops(&module, "scf.for");
    assert_eq!(loops.len(), 1);
    assert_eq!(module.op(loops[0]).attr("unroll_factor"), Some(&Attr::Int(4)));
}

#[test]
fn unroll_without_an_enclosing_loop_fails() {
    let mut module = matmul_module("main");
    let unroll = UnrollOneParentLoop::new("main", "linalg.matmul", Overrides::new()).unwrap();
    let err = Schedule::new().add(unroll).apply(&mut module).unwrap_err();
    assert!(matches!(err, Error::PassFailed { .. }), "got {err:?}");
}

#[test]
fn outline_moves_the_loop_into_a_new_function() {
    let mut module = matmul_module("main");
    let outline = OutlineOneParentLoop::new("main", "linalg.matmul", "outlined", Overrides::new()).unwrap();
    Schedule::new().add(tile("main", vec![8])).add(outline).apply(&mut module).unwrap();

    let funcs = find_ops(&module, "func");
    assert_eq!(funcs.len(), 2);
    let outlined = funcs.into_iter().find(|&f| module.op(f).sym_name() == Some("outlined")).unwrap();
    let loops = find_ops(&module, "scf.for");
    assert_eq!(loops.len(), 1);
    assert_eq!(module.parent_op(loops[0]), Some(outlined));
}

#[test]
fn lower_vectors_records_the_stage_prefix() {
    let mut module = matmul_module("main");
    let lower = LowerVectors::new(Overrides::new().set("stages", vec![2i64])).unwrap();
    Schedule::new().add(lower).apply(&mut module).unwrap();

    assert_eq!(module.op(module.root()).attr("lower_vectors_stages"), Some(&Attr::IntArray(vec![1, 2, 3])));
}

#[test]
fn linalg_ext_pipeline_rewrites_the_wrapper() {
    let mut module = matmul_module("main");
    let ext_tile =
        LinalgExtTile::new("main", "linalg.matmul", Overrides::new().set("tile_sizes", vec![8i64])).unwrap();
    Schedule::new()
        .add(ext_tile)
        .add(LinalgExtTileToInParallel::new("main"))
        .add(LinalgExtInParallelToAsync::new("main"))
        .apply(&mut module)
        .unwrap();

    // The wrapper went tile -> in_parallel -> async, keeping the matmul inside.
    let wrapper = find_ops(&module, "async.execute")[0];
    assert_eq!(module.op(wrapper).attr("sizes"), Some(&Attr::IntArray(vec![8])));
    let matmul = find_ops(&module, "linalg.matmul")[0];
    assert_eq!(module.parent_op(matmul), Some(wrapper));
}

#[test]
fn interpreting_an_unscheduled_module_changes_nothing() {
    let mut module = Module::new();
    crate::interp::interpret_schedule(&mut module).unwrap();
    crate::interp::drop_schedule(&mut module);
    assert_eq!(module.to_string(), "module {}");
}
