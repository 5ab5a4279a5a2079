pub mod helper;

mod slice;
pub use slice::SliceIndices;
