use alloc::vec::Vec;
use core::{fmt, iter::FusedIterator};

use crate::RbTree;
use crate::node::NIL;

/// In-order iterator over the keys of an [`RbTree`].
///
/// Walks the tree lazily with an explicit stack of pending ancestors, so
/// memory use is bounded by the tree height rather than its size.
#[derive(Debug, Clone)]
pub struct Iter<'a, K> {
    tree: &'a RbTree<K>,
    /// Nodes whose key is still due, innermost last
    stack: Vec<usize>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    fn new(tree: &'a RbTree<K>) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
            remaining: tree.len(),
        };
        iter.push_left_spine(tree.root);
        iter
    }

    fn push_left_spine(&mut self, mut node: usize) {
        while node != NIL {
            self.stack.push(node);
            node = self.tree.left(node);
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let idx = self.stack.pop()?;
        let tree = self.tree;
        self.push_left_spine(tree.right(idx));
        self.remaining -= 1;
        Some(&tree.node_at(idx).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

/// Owning in-order iterator over the keys of an [`RbTree`].
///
/// Each key is moved out of the arena as it is yielded; keys not yet reached
/// are dropped with the iterator.
pub struct IntoIter<K> {
    tree: RbTree<K>,
    stack: Vec<usize>,
    remaining: usize,
}

impl<K> IntoIter<K> {
    fn new(tree: RbTree<K>) -> Self {
        let root = tree.root;
        let mut iter = Self {
            remaining: tree.len(),
            tree,
            stack: Vec::new(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: usize) {
        while node != NIL {
            self.stack.push(node);
            node = self.tree.left(node);
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let idx = self.stack.pop()?;
        self.push_left_spine(self.tree.right(idx));
        self.remaining -= 1;
        // Its left subtree is already drained and nothing pending links here.
        Some(self.tree.deallocate_node(idx).key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> fmt::Debug for IntoIter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The arena is half drained, so only the count is safe to show.
        f.debug_struct("IntoIter")
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}

impl<K> FusedIterator for IntoIter<K> {}

impl<K> RbTree<K> {
    /// Returns an iterator over the keys in sorted order.
    ///
    /// Equal keys are yielded contiguously. Each call starts a fresh walk.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self)
    }
}

impl<'a, K> IntoIterator for &'a RbTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K> IntoIterator for RbTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        IntoIter::new(self)
    }
}

impl<K: Ord> FromIterator<K> for RbTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = RbTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RbTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: PartialEq> PartialEq for RbTree<K> {
    /// Trees are equal when they hold the same sorted key sequence, whatever
    /// their shape.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq> Eq for RbTree<K> {}

impl<K: fmt::Debug> fmt::Debug for RbTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display> fmt::Display for RbTree<K> {
    /// Renders the sorted keys as `[k0, k1, ...]`, for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, key) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    #[test]
    fn test_iter_sorted_and_exact() {
        let tree: RbTree<i32> = [5, 1, 4, 1, 3, 9, 2, 6].into_iter().collect();
        let mut iter = tree.iter();

        assert_eq!(iter.len(), 8);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 9]);
    }

    #[test]
    fn test_iter_restarts_fresh() {
        let tree: RbTree<i32> = (0..50).rev().collect();
        let prefix: Vec<i32> = tree.iter().take(3).copied().collect();
        assert_eq!(prefix, [0, 1, 2]);
        assert_eq!(tree.iter().count(), 50);
        assert_eq!((&tree).into_iter().last(), Some(&49));
    }

    #[test]
    fn test_iter_empty() {
        let tree = RbTree::<i32>::new();
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.into_iter().next(), None);
    }

    #[test]
    fn test_into_iter_moves_keys() {
        let tree: RbTree<String> = ["delta", "alpha", "charlie", "bravo", "alpha"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let words: Vec<String> = tree.into_iter().collect();
        assert_eq!(words, ["alpha", "alpha", "bravo", "charlie", "delta"]);
    }

    #[test]
    fn test_into_iter_partial_then_drop() {
        let tree: RbTree<String> = (0..20).map(|i| format!("{i:02}")).collect();
        let mut iter = tree.into_iter();
        assert_eq!(iter.next().as_deref(), Some("00"));
        assert_eq!(iter.next().as_deref(), Some("01"));
        assert_eq!(iter.len(), 18);
    }

    #[test]
    fn test_extend_and_eq() {
        let mut left: RbTree<i32> = (0..10).collect();
        let right: RbTree<i32> = (0..10).rev().collect();
        assert_eq!(left, right);

        left.extend([10, 11]);
        assert_ne!(left, right);
        assert_eq!(left.len(), 12);
    }

    #[test]
    fn test_debug_and_display() {
        let tree: RbTree<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(format!("{tree:?}"), "[1, 2, 3]");
        assert_eq!(tree.to_string(), "[1, 2, 3]");
        assert_eq!(RbTree::<i32>::new().to_string(), "[]");
    }
}
