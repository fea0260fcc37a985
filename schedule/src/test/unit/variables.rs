use test_case::test_case;

use crate::error::Error;
use crate::variables::{bind, Overrides, VarKind, VarSpec};

fn tile_specs() -> Vec<VarSpec> {
    vec![
        VarSpec::new("tile_sizes", VarKind::SizeList, Vec::<i64>::new()),
        VarSpec::new("peel", VarKind::IndexList, Vec::<i64>::new()),
        VarSpec::new("scalarize_dyn_dims", VarKind::Bool, false),
    ]
}

#[test]
fn defaults_fill_unset_variables() {
    let vars = bind("Tile", &tile_specs(), Overrides::new()).unwrap();
    assert_eq!(vars.int_list("tile_sizes").unwrap(), Vec::<i64>::new());
    assert!(!vars.boolean("scalarize_dyn_dims").unwrap());
}

#[test]
fn override_replaces_default() {
    let overrides = Overrides::new().set("tile_sizes", vec![8i64, 16, 32]);
    let vars = bind("Tile", &tile_specs(), overrides).unwrap();
    assert_eq!(vars.int_list("tile_sizes").unwrap(), vec![8, 16, 32]);
    assert_eq!(vars.int_list("peel").unwrap(), Vec::<i64>::new());
}

#[test]
fn unknown_variable_is_rejected() {
    let overrides = Overrides::new().set("tile_szies", vec![8i64]);
    let err = bind("Tile", &tile_specs(), overrides).unwrap_err();
    match err {
        Error::UnknownVariable { transform, name } => {
            assert_eq!(transform, "Tile");
            assert_eq!(name, "tile_szies");
        }
        other => panic!("expected UnknownVariable, got {other:?}"),
    }
}

#[test]
fn last_write_wins_for_repeated_overrides() {
    let overrides = Overrides::new().set("tile_sizes", vec![1i64]).set("tile_sizes", vec![2i64]);
    let vars = bind("Tile", &tile_specs(), overrides).unwrap();
    assert_eq!(vars.int_list("tile_sizes").unwrap(), vec![2]);
}

#[test]
fn kind_mismatch_is_rejected() {
    let overrides = Overrides::new().set("scalarize_dyn_dims", 1i64);
    let err = bind("Tile", &tile_specs(), overrides).unwrap_err();
    assert!(matches!(err, Error::InvalidValue { .. }), "got {err:?}");
}

#[test]
fn negative_size_is_rejected() {
    let overrides = Overrides::new().set("tile_sizes", vec![8i64, -1]);
    let err = bind("Tile", &tile_specs(), overrides).unwrap_err();
    match err {
        Error::InvalidValue { name, reason } => {
            assert_eq!(name, "tile_sizes");
            assert!(reason.contains("-1"), "reason: {reason}");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test]
fn choice_outside_option_set_is_rejected() {
    let specs = [VarSpec::new("split_transfers", VarKind::Choice(&["none", "linalg-copy"]), "none")];
    let err = bind("LowerVectors", &specs, Overrides::new().set("split_transfers", "sideways")).unwrap_err();
    match err {
        Error::InvalidValue { reason, .. } => {
            assert!(reason.contains("linalg-copy"), "reason lists options: {reason}");
        }
        other => panic!("expected InvalidValue, got {other:?}"),
    }
}

#[test_case(vec![vec![0, 1, 2]], true; "identity")]
#[test_case(vec![vec![2, 0, 1]], true; "rotation")]
#[test_case(vec![], true; "empty list")]
#[test_case(vec![vec![1, 2]], false; "missing zero")]
#[test_case(vec![vec![0, 0]], false; "duplicate entry")]
#[test_case(vec![vec![0, 1], vec![1, 1]], false; "second row invalid")]
fn permutation_rows_are_validated(rows: Vec<Vec<i64>>, ok: bool) {
    let specs = [VarSpec::new("transpose_paddings", VarKind::PermutationList, Vec::<Vec<i64>>::new())];
    let result = bind("Pad", &specs, Overrides::new().set("transpose_paddings", rows));
    assert_eq!(result.is_ok(), ok);
}
