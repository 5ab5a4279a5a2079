/// Index of the absent link.
///
/// Every empty child link, and the parent link of the root, holds this value.
/// It never addresses a slot, so it is never written through.
pub(crate) const NIL: usize = usize::MAX;

/// Red-Black tree node colors used to maintain tree balance properties.
///
/// Red-Black trees maintain balance by ensuring:
/// - Red nodes have black children
/// - All paths from root to leaves have equal black node counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    /// Red node - must have black children, cannot be adjacent to other red nodes
    Red,
    /// Black node - can have children of any color, contributes to black height
    Black,
}

/// A node in the Red-Black tree containing a key and structural information.
#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    /// The stored key
    pub(crate) key: K,

    /// Index of parent node in the arena (`NIL` if this is root)
    pub(crate) parent: usize,

    /// Index of left child node in the arena (`NIL` if no left child)
    pub(crate) left: usize,

    /// Index of right child node in the arena (`NIL` if no right child)
    pub(crate) right: usize,

    /// Color of this node (Red or Black) used for Red-Black tree balancing
    pub(crate) color: Color,

    /// Number of nodes in the subtree rooted here, this node included.
    /// Used for rank and select queries
    pub(crate) size: usize,
}

impl<K> Node<K> {
    /// Creates a fresh red leaf hanging below `parent`
    pub(crate) const fn leaf(key: K, parent: usize) -> Self {
        Self {
            key,
            parent,
            left: NIL,
            right: NIL,
            color: Color::Red,
            size: 1,
        }
    }
}

/// One arena cell: either a live node or a link in the free list.
#[derive(Debug, Clone)]
pub(crate) enum Slot<K> {
    Occupied(Node<K>),
    Vacant { next_free: usize },
}

impl<K> Slot<K> {
    #[inline]
    pub(crate) const fn as_node(&self) -> Option<&Node<K>> {
        match self {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    #[inline]
    pub(crate) const fn as_node_mut(&mut self) -> Option<&mut Node<K>> {
        match self {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }
}
