use crate::{Attr, Builder, Module, OpSpec};

#[test]
fn empty_module_prints_exactly() {
    assert_eq!(Module::new().to_string(), "module {}");
}

#[test]
fn func_with_op_prints_nested() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let func = b.build(OpSpec::new("func").attr("sym_name", Attr::str("main")).regions(1));
    let func_body = module.append_block(func, 0, 0);
    let mut b = Builder::at_end(&mut module, func_body);
    b.build(OpSpec::new("linalg.matmul"));

    assert_eq!(module.to_string(), "module {\n  func @main {\n    linalg.matmul\n  }\n}");
}

#[test]
fn attrs_print_in_insertion_order() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    b.build(
        OpSpec::new("transform.structured.tile")
            .attr("sizes", Attr::IntArray(vec![4, 4, 4]))
            .attr("interchange", Attr::IntArray(vec![1, 0]))
            .attr("scalarize", Attr::Bool(false)),
    );

    let text = module.to_string();
    assert!(text.contains("transform.structured.tile {sizes = [4, 4, 4], interchange = [1, 0], scalarize = false}"));
}

#[test]
fn results_and_operand_references_number_sequentially() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let producer = b.build(OpSpec::new("transform.pdl_match").results(1));
    let handle = b.result(producer, 0);
    let tiled = b.build(OpSpec::new("transform.structured.tile").operand(handle).results(3));
    let loop1 = module.result(tiled, 1);
    let mut b = Builder::at_end(&mut module, body);
    b.build(OpSpec::new("transform.loop.peel").operand(loop1));

    let text = module.to_string();
    assert!(text.contains("%0 = transform.pdl_match"));
    assert!(text.contains("%1:3 = transform.structured.tile(%0)"));
    assert!(text.contains("transform.loop.peel(%1#1)"));
}

#[test]
fn block_arguments_print_with_header() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let seq = b.build(OpSpec::new("transform.sequence").regions(1));
    let seq_body = module.append_block(seq, 0, 1);
    let arg = module.arg(seq_body, 0);
    let mut b = Builder::at_end(&mut module, seq_body);
    b.build(OpSpec::new("transform.pdl_match").operand(arg).results(1));

    let text = module.to_string();
    assert!(text.contains("^(%0):"));
    assert!(text.contains("transform.pdl_match(%0)"));
}

#[test]
fn string_and_symbol_attrs_print_escaped() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    b.build(
        OpSpec::new("pdl.apply_native_constraint")
            .attr("name", Attr::str("nestedInFunc"))
            .attr("fun", Attr::symbol("main")),
    );

    let text = module.to_string();
    assert!(text.contains("{name = \"nestedInFunc\", fun = @main}"));
}
