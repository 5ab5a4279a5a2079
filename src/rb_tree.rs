use alloc::vec::Vec;
use core::{borrow::Borrow, cmp::Ordering, mem};

use crate::TreeError;
use crate::node::{Color, NIL, Node, Slot};

/// An order-statistic Red-Black tree.
///
/// The tree keeps its keys sorted and answers insertion, removal, lookup,
/// rank and positional queries in O(log n). Every node carries the size of
/// the subtree below it, which rotations and splices keep current without a
/// rescan.
///
/// Nodes live in a growable arena and are linked by index. Slots freed by
/// removals are chained into a free list and reused by later insertions.
///
/// Duplicate keys are accepted. A key that does not compare strictly less
/// than a node descends to its right, so equal keys stay contiguous in sorted
/// order and later copies sort after earlier ones.
#[derive(Clone)]
pub struct RbTree<K> {
    /// Arena of live nodes and free-list links
    nodes: Vec<Slot<K>>,

    /// Head of the free list threaded through vacant slots (`NIL` if none)
    free_head: usize,

    /// Index of the root node in the arena
    /// Equal to `NIL` when tree is empty
    pub(crate) root: usize,
}

impl<K> RbTree<K> {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_head: NIL,
            root: NIL,
        }
    }

    /// Creates an empty tree whose arena can hold `capacity` nodes before it
    /// reallocates.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of nodes to reserve up front
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_head: NIL,
            root: NIL,
        }
    }

    /// Returns the number of keys stored in the tree, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.size_of(self.root)
    }

    /// Returns `true` if the tree holds no keys.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.root == NIL
    }

    /// Returns the number of nodes the arena can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Removes every key, keeping the arena allocation for reuse.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_head = NIL;
        self.root = NIL;
    }

    /// Returns a reference to the key equal to `key`, if one is stored.
    ///
    /// The search stops at the first equal key on its descent path. With
    /// duplicates present, which copy is returned is unspecified.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to look up
    pub fn find<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find_node(key).map(|idx| &self.node_at(idx).key)
    }

    /// Returns `true` if a key equal to `key` is stored.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.find_node(key).is_some()
    }

    /// Inserts `key`, keeping any equal keys already present.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to insert
    pub fn insert(&mut self, key: K)
    where
        K: Ord,
    {
        let mut parent = NIL;
        let mut current = self.root;
        let mut goes_left = false;

        // The new leaf lands below every node on this path.
        while current != NIL {
            parent = current;
            let node = self.node_at_mut(current);
            node.size += 1;
            goes_left = key < node.key;
            current = if goes_left { node.left } else { node.right };
        }

        let new_idx = self.allocate_node(Node::leaf(key, parent));
        if parent == NIL {
            self.root = new_idx;
        } else if goes_left {
            self.node_at_mut(parent).left = new_idx;
        } else {
            self.node_at_mut(parent).right = new_idx;
        }

        self.fix_insertion_violations(new_idx);

        debug_assert_eq!(
            self.check_invariants(),
            Ok(()),
            "RB tree invariants violated after insertion"
        );
    }

    /// Removes one key equal to `key` and returns the stored copy.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to remove
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeyNotFound`] if no equal key is stored. The tree
    /// is left untouched in that case.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<K, TreeError>
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord,
    {
        let Some(node_idx) = self.find_node(key) else {
            log::debug!("remove: key not found among {} keys", self.len());
            return Err(TreeError::KeyNotFound);
        };

        let removed = self.delete_node(node_idx);

        debug_assert_eq!(
            self.check_invariants(),
            Ok(()),
            "RB tree invariants violated after removal"
        );

        Ok(removed)
    }

    fn find_node<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root;

        while current != NIL {
            let node = self.node_at(current);
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Some(current),
                Ordering::Less => current = node.left,
                Ordering::Greater => current = node.right,
            }
        }
        None
    }

    pub(crate) fn find_minimum(&self, mut node: usize) -> usize {
        while node != NIL {
            let left = self.left(node);
            if left == NIL {
                break;
            }
            node = left;
        }
        node
    }

    pub(crate) fn find_maximum(&self, mut node: usize) -> usize {
        while node != NIL {
            let right = self.right(node);
            if right == NIL {
                break;
            }
            node = right;
        }
        node
    }

    fn allocate_node(&mut self, node: Node<K>) -> usize {
        if self.free_head == NIL {
            self.nodes.push(Slot::Occupied(node));
            return self.nodes.len() - 1;
        }

        let idx = self.free_head;
        let Slot::Vacant { next_free } = mem::replace(&mut self.nodes[idx], Slot::Occupied(node))
        else {
            unreachable!("free list points at live node {idx}");
        };
        self.free_head = next_free;
        idx
    }

    pub(crate) fn deallocate_node(&mut self, idx: usize) -> Node<K> {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };
        let Slot::Occupied(node) = mem::replace(&mut self.nodes[idx], vacant) else {
            unreachable!("node {idx} released twice");
        };
        self.free_head = idx;
        node
    }

    #[inline]
    pub(crate) fn node_at(&self, idx: usize) -> &Node<K> {
        match self.nodes.get(idx).and_then(Slot::as_node) {
            Some(node) => node,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    #[inline]
    fn node_at_mut(&mut self, idx: usize) -> &mut Node<K> {
        match self.nodes.get_mut(idx).and_then(Slot::as_node_mut) {
            Some(node) => node,
            None => unreachable!("link to vacant slot {idx}"),
        }
    }

    #[inline]
    pub(crate) fn parent(&self, node: usize) -> usize {
        if node == NIL {
            NIL
        } else {
            self.node_at(node).parent
        }
    }

    #[inline]
    pub(crate) fn left(&self, node: usize) -> usize {
        if node == NIL {
            NIL
        } else {
            self.node_at(node).left
        }
    }

    #[inline]
    pub(crate) fn right(&self, node: usize) -> usize {
        if node == NIL {
            NIL
        } else {
            self.node_at(node).right
        }
    }

    #[inline]
    pub(crate) fn size_of(&self, node: usize) -> usize {
        if node == NIL {
            0
        } else {
            self.node_at(node).size
        }
    }

    #[inline]
    fn color(&self, node: usize) -> Color {
        if node == NIL {
            Color::Black
        } else {
            self.node_at(node).color
        }
    }

    #[inline]
    fn set_color(&mut self, node: usize, color: Color) {
        if node != NIL {
            self.node_at_mut(node).color = color;
        }
    }

    #[inline]
    fn is_red(&self, node: usize) -> bool {
        self.color(node) == Color::Red
    }

    #[inline]
    fn is_black(&self, node: usize) -> bool {
        self.color(node) == Color::Black
    }

    fn recalculate_size(&mut self, node: usize) {
        if node == NIL {
            return;
        }
        let size = self.size_of(self.left(node)) + self.size_of(self.right(node)) + 1;
        self.node_at_mut(node).size = size;
    }

    /// Points `parent`'s link to `old` at `new` instead, or makes `new` the
    /// root when `old` has no parent.
    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            debug_assert_eq!(self.root, old, "parentless node is not the root");
            self.root = new;
        } else if old == self.left(parent) {
            self.node_at_mut(parent).left = new;
        } else {
            debug_assert_eq!(self.right(parent), old, "node is not a child of its parent");
            self.node_at_mut(parent).right = new;
        }
    }

    fn rotate_left(&mut self, x: usize) {
        let y = self.right(x);
        debug_assert_ne!(y, NIL, "left rotation without a right child");

        let y_left = self.left(y);
        self.node_at_mut(x).right = y_left;
        if y_left != NIL {
            self.node_at_mut(y_left).parent = x;
        }

        let x_parent = self.parent(x);
        self.node_at_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, y);

        self.node_at_mut(y).left = x;
        self.node_at_mut(x).parent = y;

        // x is now below y, so its size must be settled first.
        self.recalculate_size(x);
        self.recalculate_size(y);
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.left(x);
        debug_assert_ne!(y, NIL, "right rotation without a left child");

        let y_right = self.right(y);
        self.node_at_mut(x).left = y_right;
        if y_right != NIL {
            self.node_at_mut(y_right).parent = x;
        }

        let x_parent = self.parent(x);
        self.node_at_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, y);

        self.node_at_mut(y).right = x;
        self.node_at_mut(x).parent = y;

        self.recalculate_size(x);
        self.recalculate_size(y);
    }

    fn fix_insertion_violations(&mut self, mut node: usize) {
        while node != self.root && self.is_red(self.parent(node)) {
            let parent = self.parent(node);
            let grandparent = self.parent(parent);

            if parent == self.left(grandparent) {
                let uncle = self.right(grandparent);

                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.right(parent) {
                        node = parent;
                        self.rotate_left(node);
                    }
                    let updated_parent = self.parent(node);
                    let updated_grandparent = self.parent(updated_parent);
                    self.set_color(updated_parent, Color::Black);
                    self.set_color(updated_grandparent, Color::Red);
                    self.rotate_right(updated_grandparent);
                    log::trace!("insert: rotated right at node {updated_grandparent}");
                }
            } else {
                let uncle = self.left(grandparent);

                if self.is_red(uncle) {
                    self.set_color(parent, Color::Black);
                    self.set_color(uncle, Color::Black);
                    self.set_color(grandparent, Color::Red);
                    node = grandparent;
                } else {
                    if node == self.left(parent) {
                        node = parent;
                        self.rotate_right(node);
                    }
                    let updated_parent = self.parent(node);
                    let updated_grandparent = self.parent(updated_parent);
                    self.set_color(updated_parent, Color::Black);
                    self.set_color(updated_grandparent, Color::Red);
                    self.rotate_left(updated_grandparent);
                    log::trace!("insert: rotated left at node {updated_grandparent}");
                }
            }
        }
        self.set_color(self.root, Color::Black);
    }

    /// Splices out the node holding the key at `node_to_delete` and returns
    /// that key.
    ///
    /// With two children the in-order successor is the node that leaves the
    /// arena; its key moves into `node_to_delete` first.
    fn delete_node(&mut self, node_to_delete: usize) -> K {
        let left = self.left(node_to_delete);
        let right = self.right(node_to_delete);

        let (spliced, replacement) = if left == NIL {
            (node_to_delete, right)
        } else if right == NIL {
            (node_to_delete, left)
        } else {
            let successor = self.find_minimum(right);
            (successor, self.right(successor))
        };

        let original_color = self.color(spliced);
        let replacement_parent = self.transplant(spliced, replacement);
        let spliced_node = self.deallocate_node(spliced);

        let removed = if spliced == node_to_delete {
            spliced_node.key
        } else {
            mem::replace(&mut self.node_at_mut(node_to_delete).key, spliced_node.key)
        };

        if original_color == Color::Black {
            self.fix_deletion_violations(replacement, replacement_parent);
        }

        removed
    }

    /// Moves `new` into `old`'s position and returns their shared parent.
    ///
    /// Every ancestor above the splice loses one node, so sizes are
    /// recomputed all the way to the root.
    fn transplant(&mut self, old: usize, new: usize) -> usize {
        let parent = self.parent(old);
        self.replace_child(parent, old, new);

        if new != NIL {
            self.node_at_mut(new).parent = parent;
        }

        let mut ancestor = parent;
        while ancestor != NIL {
            self.recalculate_size(ancestor);
            ancestor = self.parent(ancestor);
        }
        parent
    }

    /// Restores black-height after a black node left the tree.
    ///
    /// `fixup_node` may be `NIL`, so its parent travels alongside it.
    fn fix_deletion_violations(&mut self, mut fixup_node: usize, mut fixup_parent: usize) {
        while fixup_node != self.root && self.is_black(fixup_node) {
            if fixup_node == self.left(fixup_parent) {
                let mut sibling = self.right(fixup_parent);

                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(fixup_parent, Color::Red);
                    self.rotate_left(fixup_parent);
                    sibling = self.right(fixup_parent);
                }

                if self.is_black(self.left(sibling)) && self.is_black(self.right(sibling)) {
                    self.set_color(sibling, Color::Red);
                    fixup_node = fixup_parent;
                    fixup_parent = self.parent(fixup_node);
                } else {
                    if self.is_black(self.right(sibling)) {
                        self.set_color(self.left(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_right(sibling);
                        sibling = self.right(fixup_parent);
                    }

                    self.set_color(sibling, self.color(fixup_parent));
                    self.set_color(fixup_parent, Color::Black);
                    self.set_color(self.right(sibling), Color::Black);
                    self.rotate_left(fixup_parent);
                    log::trace!("remove: rebalanced with left rotation at node {fixup_parent}");
                    fixup_node = self.root;
                }
            } else {
                let mut sibling = self.left(fixup_parent);

                if self.is_red(sibling) {
                    self.set_color(sibling, Color::Black);
                    self.set_color(fixup_parent, Color::Red);
                    self.rotate_right(fixup_parent);
                    sibling = self.left(fixup_parent);
                }

                if self.is_black(self.right(sibling)) && self.is_black(self.left(sibling)) {
                    self.set_color(sibling, Color::Red);
                    fixup_node = fixup_parent;
                    fixup_parent = self.parent(fixup_node);
                } else {
                    if self.is_black(self.left(sibling)) {
                        self.set_color(self.right(sibling), Color::Black);
                        self.set_color(sibling, Color::Red);
                        self.rotate_left(sibling);
                        sibling = self.left(fixup_parent);
                    }

                    self.set_color(sibling, self.color(fixup_parent));
                    self.set_color(fixup_parent, Color::Black);
                    self.set_color(self.left(sibling), Color::Black);
                    self.rotate_right(fixup_parent);
                    log::trace!("remove: rebalanced with right rotation at node {fixup_parent}");
                    fixup_node = self.root;
                }
            }
        }

        self.set_color(fixup_node, Color::Black);
    }

    /// Checks every structural invariant of the tree.
    ///
    /// Returns a description of the first violation found.
    pub(crate) fn check_invariants(&self) -> Result<(), &'static str>
    where
        K: Ord,
    {
        if self.root == NIL {
            return if self.nodes.iter().all(|slot| slot.as_node().is_none()) {
                Ok(())
            } else {
                Err("empty tree still owns live nodes")
            };
        }

        if self.is_red(self.root) {
            return Err("root is red");
        }
        if self.parent(self.root) != NIL {
            return Err("root has a parent");
        }

        self.verify_black_height(self.root)?;

        let live = self.nodes.iter().filter(|slot| slot.as_node().is_some()).count();
        if live != self.len() {
            return Err("live node count differs from root size");
        }

        let mut keys = self.iter();
        if let Some(mut prev) = keys.next() {
            for key in keys {
                if key < prev {
                    return Err("in-order keys are not sorted");
                }
                prev = key;
            }
        }
        Ok(())
    }

    fn verify_black_height(&self, node: usize) -> Result<usize, &'static str> {
        if node == NIL {
            return Ok(1);
        }

        let node_ref = self.node_at(node);

        for child in [node_ref.left, node_ref.right] {
            if child != NIL && self.parent(child) != node {
                return Err("child does not link back to its parent");
            }
        }

        if node_ref.color == Color::Red && (self.is_red(node_ref.left) || self.is_red(node_ref.right)) {
            return Err("red node has a red child");
        }

        if node_ref.size != self.size_of(node_ref.left) + self.size_of(node_ref.right) + 1 {
            return Err("subtree size is stale");
        }

        let left_height = self.verify_black_height(node_ref.left)?;
        let right_height = self.verify_black_height(node_ref.right)?;

        if left_height != right_height {
            return Err("black height differs between subtrees");
        }

        Ok(left_height + usize::from(node_ref.color == Color::Black))
    }
}

impl<K> Default for RbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}
