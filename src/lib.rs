#![doc = include_str!("../README.md")]
#![no_std]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![allow(clippy::len_without_is_empty)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub(crate) type Kbn<T> = compensated_summation::KahanBabuskaNeumaier<T>;

mod utils;
pub use utils::SliceIndices;

mod node;

mod error;
pub use error::TreeError;

mod rb_tree;
pub use rb_tree::RbTree;

mod order_statistic;

mod iter;
pub use iter::{IntoIter, Iter};

mod float_tree;
pub use float_tree::FloatRbTree;

#[cfg(test)]
mod proptests;
