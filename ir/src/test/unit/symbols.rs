use crate::{Attr, Builder, Module, OpSpec};

#[test]
fn lookup_finds_direct_children() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let f = b.build(OpSpec::new("func").attr("sym_name", Attr::str("main")).regions(1));
    let g = b.build(OpSpec::new("func").attr("sym_name", Attr::str("helper")).regions(1));

    assert_eq!(module.lookup_symbol(module.root(), "main"), Some(f));
    assert_eq!(module.lookup_symbol(module.root(), "helper"), Some(g));
    assert_eq!(module.lookup_symbol(module.root(), "missing"), None);
}

#[test]
fn lookup_does_not_recurse_into_nested_scopes() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let outer = b.build(OpSpec::new("func").attr("sym_name", Attr::str("outer")).regions(1));
    let outer_body = module.append_block(outer, 0, 0);
    let mut b = Builder::at_end(&mut module, outer_body);
    b.build(OpSpec::new("func").attr("sym_name", Attr::str("nested")).regions(1));

    assert_eq!(module.lookup_symbol(module.root(), "nested"), None);
    assert!(module.lookup_symbol(outer, "nested").is_some());
}

#[test]
fn sym_name_reads_string_attr() {
    let mut module = Module::new();
    let body = module.body();
    let mut b = Builder::at_end(&mut module, body);
    let op = b.build(OpSpec::new("pdl.pattern").attr("sym_name", Attr::str("match_x_in_f")));
    assert_eq!(module.op(op).sym_name(), Some("match_x_in_f"));
}
