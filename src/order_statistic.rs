use core::borrow::Borrow;
use core::cmp::Ordering;

use crate::node::NIL;
use crate::utils::SliceIndices;
use crate::{RbTree, TreeError};

impl<K> RbTree<K> {
    /// Returns the key at sorted position `index`.
    ///
    /// Negative indices count back from the end, so `-1` is the largest key.
    ///
    /// # Arguments
    ///
    /// * `index` - Zero-based position, or a negative offset from the end
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IndexOutOfRange`] unless `-len <= index < len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn select(&self, index: isize) -> Result<&K, TreeError> {
        let len = self.len();
        let rank = if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };

        match rank.and_then(|rank| self.get(rank)) {
            Some(key) => Ok(key),
            None => {
                log::debug!("select: index {index} outside tree of {len} keys");
                Err(TreeError::IndexOutOfRange { index, len })
            }
        }
    }

    /// Returns the key at zero-based sorted position `rank`, or `None` if
    /// `rank >= len`.
    pub fn get(&self, rank: usize) -> Option<&K> {
        let mut current = self.root;
        let mut offset = 0;

        while current != NIL {
            let node = self.node_at(current);
            let mid = offset + self.size_of(node.left);

            match rank.cmp(&mid) {
                Ordering::Equal => return Some(&node.key),
                Ordering::Less => current = node.left,
                Ordering::Greater => {
                    offset = mid + 1;
                    current = node.right;
                }
            }
        }
        None
    }

    /// Returns the number of stored keys strictly less than `key`.
    ///
    /// `key` need not be present.
    pub fn rank_lower<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count_before(|node_key| key.cmp(node_key.borrow()).is_le())
    }

    /// Returns the number of stored keys less than or equal to `key`.
    pub fn rank_lower_or_equal<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count_before(|node_key| key.cmp(node_key.borrow()).is_lt())
    }

    /// Returns how many stored keys are equal to `key`.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.rank_lower_or_equal(key) - self.rank_lower(key)
    }

    /// Descends from the root, going left wherever `goes_left` holds and
    /// counting everything passed over on the way right.
    fn count_before(&self, goes_left: impl Fn(&K) -> bool) -> usize {
        let mut current = self.root;
        let mut total = 0;

        while current != NIL {
            let node = self.node_at(current);
            if goes_left(&node.key) {
                current = node.left;
            } else {
                total += self.size_of(node.left) + 1;
                current = node.right;
            }
        }
        total
    }

    /// Builds a new tree from the keys at the positions a Python-style slice
    /// `[start:end:step]` selects.
    ///
    /// Bounds are clamped the way Python clamps them, so out-of-range bounds
    /// simply select fewer keys. The result is an independent tree and is
    /// iterated in sorted order whatever the sign of `step`.
    ///
    /// # Arguments
    ///
    /// * `start` - First position, `None` for the natural start
    /// * `end` - Exclusive end position, `None` for the natural end
    /// * `step` - Stride, `None` for 1; negative walks from the back
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ZeroStep`] if `step` is `Some(0)`.
    ///
    /// # Complexity
    ///
    /// O(m log n) for m selected keys
    pub fn range_select(
        &self,
        start: Option<isize>,
        end: Option<isize>,
        step: Option<isize>,
    ) -> Result<RbTree<K>, TreeError>
    where
        K: Ord + Clone,
    {
        let len = self.len();
        let indices = SliceIndices::new(start, end, step, len)?;
        let mut sliced = RbTree::with_capacity(indices.len());

        log::trace!("range_select: materializing {} of {len} keys", indices.len());

        for rank in indices {
            let key = self.get(rank).ok_or(TreeError::IndexOutOfRange {
                index: rank as isize,
                len,
            })?;
            sliced.insert(key.clone());
        }
        Ok(sliced)
    }

    /// Returns the smallest key, or `None` if the tree is empty.
    pub fn first(&self) -> Option<&K> {
        if self.root == NIL {
            return None;
        }
        Some(&self.node_at(self.find_minimum(self.root)).key)
    }

    /// Returns the largest key, or `None` if the tree is empty.
    pub fn last(&self) -> Option<&K> {
        if self.root == NIL {
            return None;
        }
        Some(&self.node_at(self.find_maximum(self.root)).key)
    }

    /// Returns the key at quantile `q` by nearest rank, rounding down.
    ///
    /// `q` is clamped to `[0, 1]`.
    ///
    /// # Arguments
    ///
    /// * `q` - The quantile to look up
    ///
    /// # Returns
    ///
    /// * `Option<&K>` - The key, or `None` if the tree is empty
    pub fn quantile(&self, q: f64) -> Option<&K> {
        let len = self.len();
        if len == 0 {
            return None;
        }

        let clamped_q = q.clamp(0.0, 1.0);
        let target_index = if clamped_q >= 1.0 {
            len - 1
        } else if clamped_q <= 0.0 {
            0
        } else {
            // truncation is floor for a non-negative position
            (clamped_q * (len - 1) as f64) as usize
        };

        self.get(target_index)
    }

    /// Returns the lower median key, or `None` if the tree is empty.
    pub fn median(&self) -> Option<&K> {
        self.quantile(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn keys<K: Copy>(tree: &RbTree<K>) -> Vec<K> {
        tree.iter().copied().collect()
    }

    /// Reverse load of 0..100, 20..60 removed, then 10 inserted twenty more times
    fn with_duplicates() -> RbTree<i32> {
        let mut tree: RbTree<i32> = (0..100).rev().collect();
        for key in 20..60 {
            tree.remove(&key).unwrap();
        }
        for _ in 0..20 {
            tree.insert(10);
        }
        tree
    }

    #[test]
    fn test_select_positive_and_negative() {
        let tree: RbTree<i32> = (0..10).map(|k| k * 10).collect();

        assert_eq!(tree.select(0), Ok(&0));
        assert_eq!(tree.select(4), Ok(&40));
        assert_eq!(tree.select(9), Ok(&90));
        assert_eq!(tree.select(-1), Ok(&90));
        assert_eq!(tree.select(-10), Ok(&0));
        assert_eq!(tree.get(3), Some(&30));
        assert_eq!(tree.get(10), None);
    }

    #[test]
    fn test_select_out_of_range() {
        let tree: RbTree<i32> = (0..5).collect();

        assert_eq!(
            tree.select(5),
            Err(TreeError::IndexOutOfRange { index: 5, len: 5 })
        );
        assert_eq!(
            tree.select(-6),
            Err(TreeError::IndexOutOfRange { index: -6, len: 5 })
        );
        assert_eq!(
            tree.select(isize::MIN),
            Err(TreeError::IndexOutOfRange {
                index: isize::MIN,
                len: 5
            })
        );

        let empty = RbTree::<i32>::new();
        assert_eq!(
            empty.select(0),
            Err(TreeError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert_eq!(
            empty.select(-1),
            Err(TreeError::IndexOutOfRange { index: -1, len: 0 })
        );
    }

    #[test]
    fn test_select_last_with_duplicates() {
        let tree = with_duplicates();
        assert_eq!(tree.len(), 80);
        assert_eq!(tree.select(-1), Ok(&99));
        assert_eq!(tree.select(0), Ok(&0));
    }

    #[test]
    fn test_ranks_with_duplicates() {
        let tree = with_duplicates();

        assert_eq!(tree.rank_lower(&10), 10);
        assert_eq!(tree.rank_lower_or_equal(&10), 31);
        assert_eq!(tree.count(&10), 21);
        assert_eq!(tree.count(&11), 1);
        assert_eq!(tree.count(&30), 0);

        assert_eq!(tree.select(tree.rank_lower(&10) as isize), Ok(&10));
        assert_eq!(tree.select(tree.rank_lower(&60) as isize), Ok(&60));
    }

    #[test]
    fn test_ranks_of_absent_keys() {
        let tree = with_duplicates();

        assert_eq!(tree.rank_lower(&-5), 0);
        assert_eq!(tree.rank_lower_or_equal(&-5), 0);
        assert_eq!(tree.rank_lower(&40), 40);
        assert_eq!(tree.rank_lower_or_equal(&40), 40);
        assert_eq!(tree.rank_lower(&1000), 80);
        assert_eq!(tree.rank_lower_or_equal(&1000), 80);
    }

    #[test]
    fn test_range_select_reverse_stride() {
        let tree = with_duplicates();
        let all = keys(&tree);

        let sliced = tree.range_select(None, None, Some(-2)).unwrap();

        let mut expected: Vec<i32> = all.iter().rev().step_by(2).copied().collect();
        expected.sort_unstable();
        assert_eq!(sliced.len(), all.len().div_ceil(2));
        assert_eq!(keys(&sliced), expected);
        assert_eq!(sliced.check_invariants(), Ok(()));
    }

    #[test]
    fn test_range_select_odd_length_reverse_stride() {
        let tree: RbTree<i32> = (0..7).collect();
        let sliced = tree.range_select(None, None, Some(-2)).unwrap();
        assert_eq!(keys(&sliced), [0, 2, 4, 6]);
    }

    #[test]
    fn test_range_select_bounds() {
        let tree: RbTree<i32> = (0..10).collect();

        let middle = tree.range_select(Some(2), Some(5), None).unwrap();
        assert_eq!(keys(&middle), [2, 3, 4]);

        let tail = tree.range_select(Some(-3), None, None).unwrap();
        assert_eq!(keys(&tail), [7, 8, 9]);

        let clamped = tree.range_select(Some(-100), Some(100), Some(4)).unwrap();
        assert_eq!(keys(&clamped), [0, 4, 8]);

        let empty = tree.range_select(Some(5), Some(2), None).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_range_select_is_independent() {
        let mut tree: RbTree<i32> = (0..10).collect();
        let sliced = tree.range_select(None, None, None).unwrap();
        tree.remove(&3).unwrap();

        assert_eq!(sliced.len(), 10);
        assert!(sliced.contains(&3));
        assert!(!tree.contains(&3));
    }

    #[test]
    fn test_range_select_zero_step() {
        let tree: RbTree<i32> = (0..10).collect();
        assert_eq!(
            tree.range_select(None, None, Some(0)).err(),
            Some(TreeError::ZeroStep)
        );
    }

    #[test]
    fn test_first_last() {
        let empty = RbTree::<i32>::new();
        assert!(empty.first().is_none());
        assert!(empty.last().is_none());

        let tree = with_duplicates();
        assert_eq!(tree.first(), Some(&0));
        assert_eq!(tree.last(), Some(&99));
    }

    #[test]
    fn test_quantiles() {
        let tree: RbTree<i32> = (1..=5).collect();

        assert_eq!(tree.quantile(0.0), Some(&1));
        assert_eq!(tree.quantile(0.25), Some(&2));
        assert_eq!(tree.quantile(0.5), Some(&3));
        assert_eq!(tree.quantile(0.75), Some(&4));
        assert_eq!(tree.quantile(1.0), Some(&5));
        assert_eq!(tree.quantile(-0.5), Some(&1));
        assert_eq!(tree.quantile(1.5), Some(&5));
        assert_eq!(tree.median(), Some(&3));

        let even: RbTree<i32> = (1..=4).collect();
        assert_eq!(even.median(), Some(&2));

        assert!(RbTree::<i32>::new().median().is_none());
    }
}
