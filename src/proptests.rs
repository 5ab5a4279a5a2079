use super::*;

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(i16),
    Remove(i16),
    Select(isize),
    Slice(Option<isize>, Option<isize>, isize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let bound = proptest::option::of(-80isize..80);
    prop_oneof![
        4 => (-32i16..32).prop_map(Op::Insert),
        3 => (-32i16..32).prop_map(Op::Remove),
        1 => (-80isize..80).prop_map(Op::Select),
        1 => (bound.clone(), bound, prop_oneof![-5isize..0, 1isize..6])
            .prop_map(|(start, end, step)| Op::Slice(start, end, step)),
    ]
}

/// Expands a key -> multiplicity model into its sorted sequence
fn sorted_model(model: &BTreeMap<i16, usize>) -> Vec<i16> {
    model
        .iter()
        .flat_map(|(&key, &n)| core::iter::repeat_n(key, n))
        .collect()
}

proptest! {
    #[test]
    fn prop_matches_sorted_model(ops in prop::collection::vec(op_strategy(), 0..300)) {
        let mut tree = RbTree::new();
        let mut model: BTreeMap<i16, usize> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    tree.insert(key);
                    *model.entry(key).or_default() += 1;
                }
                Op::Remove(key) => {
                    let expected = match model.get_mut(&key) {
                        Some(n) => {
                            *n -= 1;
                            if *n == 0 {
                                model.remove(&key);
                            }
                            Ok(key)
                        }
                        None => Err(TreeError::KeyNotFound),
                    };
                    prop_assert_eq!(tree.remove(&key), expected);
                }
                Op::Select(index) => {
                    let sorted = sorted_model(&model);
                    let len = sorted.len() as isize;
                    let expected = if (-len..len).contains(&index) {
                        let rank = if index < 0 { index + len } else { index };
                        Ok(&sorted[rank as usize])
                    } else {
                        Err(TreeError::IndexOutOfRange { index, len: sorted.len() })
                    };
                    prop_assert_eq!(tree.select(index), expected);
                }
                Op::Slice(start, end, step) => {
                    let sorted = sorted_model(&model);
                    let sliced = tree.range_select(start, end, Some(step)).unwrap();
                    let mut expected: Vec<i16> = SliceIndices::new(start, end, Some(step), sorted.len())
                        .unwrap()
                        .map(|rank| sorted[rank])
                        .collect();
                    expected.sort_unstable();
                    prop_assert_eq!(sliced.iter().copied().collect::<Vec<_>>(), expected);
                    prop_assert_eq!(sliced.check_invariants(), Ok(()));
                }
            }

            prop_assert_eq!(tree.check_invariants(), Ok(()));
            prop_assert_eq!(tree.len(), model.values().sum::<usize>());
        }

        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), sorted_model(&model));
    }

    #[test]
    fn prop_ranks_agree_with_counts(
        keys in prop::collection::vec(-50i32..50, 0..200),
        probe in -60i32..60,
    ) {
        let tree: RbTree<i32> = keys.iter().copied().collect();
        let below = keys.iter().filter(|&&key| key < probe).count();
        let equal = keys.iter().filter(|&&key| key == probe).count();

        prop_assert_eq!(tree.rank_lower(&probe), below);
        prop_assert_eq!(tree.rank_lower_or_equal(&probe), below + equal);
        prop_assert_eq!(tree.count(&probe), equal);
        if equal > 0 {
            prop_assert_eq!(tree.select(below as isize), Ok(&probe));
        }
    }

    #[test]
    fn prop_insert_then_remove_all_empties(keys in prop::collection::vec(any::<i32>(), 0..200)) {
        let mut tree: RbTree<i32> = keys.iter().copied().collect();
        prop_assert_eq!(tree.len(), keys.len());

        for key in keys.iter().rev() {
            prop_assert_eq!(tree.remove(key), Ok(*key));
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.len(), 0);
        prop_assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn prop_into_iter_matches_iter(keys in prop::collection::vec(-1000i64..1000, 0..200)) {
        let tree: RbTree<i64> = keys.into_iter().collect();
        let borrowed: Vec<i64> = tree.iter().copied().collect();
        let owned: Vec<i64> = tree.into_iter().collect();
        prop_assert_eq!(borrowed, owned);
    }
}
