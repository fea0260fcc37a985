use proptest::prelude::*;
use tessera_ir::Module;

use crate::registry::{ensure_pattern, pattern_name, PATTERN_CONTAINER};
use crate::schedule::open_schedule_region;
use crate::test::helpers::build_transform;
use crate::transforms::LowerVectors;
use crate::variables::{bind, Overrides, VarKind, VarSpec};

fn fun_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,7}"
}

fn op_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}\\.[a-z]{1,6}"
}

proptest! {
    #[test]
    fn ensure_pattern_is_idempotent(fun in fun_name(), op in op_name()) {
        let mut module = Module::new();
        let (body, _) = open_schedule_region(&mut module);
        let container = module.find_in_block(module.body(), PATTERN_CONTAINER).unwrap();
        let container_body = module.op(container).regions[0][0];

        let first = ensure_pattern(&mut module, body, &fun, &op).unwrap();
        let ops_after_first = module.block(container_body).ops.len();
        let second = ensure_pattern(&mut module, body, &fun, &op).unwrap();

        prop_assert_eq!(first, second);
        prop_assert_eq!(module.block(container_body).ops.len(), ops_after_first);
    }

    #[test]
    fn distinct_pairs_have_distinct_pattern_names(
        a in (fun_name(), op_name()),
        b in (fun_name(), op_name()),
    ) {
        prop_assume!(a != b);
        prop_assert_ne!(pattern_name(&a.0, &a.1), pattern_name(&b.0, &b.1));
    }

    #[test]
    fn requesting_a_stage_implies_all_earlier_stages(stages in prop::collection::vec(0i64..7, 1..6)) {
        let max = *stages.iter().max().unwrap();
        let subset = LowerVectors::new(Overrides::new().set("stages", stages)).unwrap();
        let singleton = LowerVectors::new(Overrides::new().set("stages", vec![max])).unwrap();

        let (from_subset, _) = build_transform(subset).unwrap();
        let (from_singleton, _) = build_transform(singleton).unwrap();
        prop_assert_eq!(from_subset.to_string(), from_singleton.to_string());
    }

    #[test]
    fn any_permutation_row_is_accepted(
        row in (1usize..6).prop_flat_map(|n| Just((0..n as i64).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let specs = [VarSpec::new("transpose_paddings", VarKind::PermutationList, Vec::<Vec<i64>>::new())];
        let overrides = Overrides::new().set("transpose_paddings", vec![row]);
        prop_assert!(bind("Pad", &specs, overrides).is_ok());
    }

    #[test]
    fn duplicated_entries_are_never_a_permutation(
        mut row in (2usize..6).prop_flat_map(|n| Just((0..n as i64).collect::<Vec<_>>()).prop_shuffle())
    ) {
        row[1] = row[0];
        let specs = [VarSpec::new("transpose_paddings", VarKind::PermutationList, Vec::<Vec<i64>>::new())];
        let overrides = Overrides::new().set("transpose_paddings", vec![row]);
        prop_assert!(bind("Pad", &specs, overrides).is_err());
    }
}
