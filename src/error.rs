use core::fmt;

/// Errors returned by fallible tree operations.
///
/// Every error is raised before the tree is touched, so a failed call leaves
/// the tree exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// `remove` was asked for a key that is not stored in the tree
    KeyNotFound,
    /// A positional index fell outside `[-len, len)`
    IndexOutOfRange {
        /// The index as supplied by the caller
        index: isize,
        /// Number of keys in the tree at the time of the call
        len: usize,
    },
    /// A slice was requested with a step of zero
    ZeroStep,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::KeyNotFound => f.write_str("key not found in tree"),
            TreeError::IndexOutOfRange { index, len } => write!(
                f,
                "index should be within [-{len}, {len}), but index = {index}"
            ),
            TreeError::ZeroStep => f.write_str("slice step cannot be zero"),
        }
    }
}

impl core::error::Error for TreeError {}
