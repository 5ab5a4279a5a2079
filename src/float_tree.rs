use core::fmt;

use num_traits::Float;
use ordered_float::{OrderedFloat, PrimitiveFloat};

use crate::utils::helper::{lerp, quantile_bracket};
use crate::{Kbn, RbTree, TreeError};

/// An order-statistic tree of floating point samples.
///
/// Floats only have a partial order, so samples are stored as
/// [`OrderedFloat`], which places NaN above every other value and treats all
/// NaNs as equal. Values go in and come out as plain `T`.
///
/// Besides the rank and select queries of [`RbTree`], the float tree offers
/// interpolated quantiles and a compensated sum and mean.
///
/// # Type Parameters
///
/// * `T` - A floating point type that implements the `PrimitiveFloat` trait
pub struct FloatRbTree<T> {
    tree: RbTree<OrderedFloat<T>>,
}

impl<T: Float + PrimitiveFloat> FloatRbTree<T> {
    /// Creates an empty tree.
    pub const fn new() -> Self {
        Self {
            tree: RbTree::new(),
        }
    }

    /// Creates an empty tree with room for `capacity` samples.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of samples to reserve up front
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: RbTree::with_capacity(capacity),
        }
    }

    /// Returns the number of samples, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree holds no samples.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Removes every sample.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Returns the underlying tree of ordered samples.
    pub const fn as_tree(&self) -> &RbTree<OrderedFloat<T>> {
        &self.tree
    }

    /// Inserts a sample.
    ///
    /// # Arguments
    ///
    /// * `value` - The sample to insert
    pub fn insert(&mut self, value: T) {
        self.tree.insert(OrderedFloat(value));
    }

    /// Removes one sample equal to `value`.
    ///
    /// # Arguments
    ///
    /// * `value` - The sample to remove
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeyNotFound`] if no equal sample is stored.
    pub fn remove(&mut self, value: T) -> Result<T, TreeError> {
        self.tree
            .remove(&OrderedFloat(value))
            .map(|value| value.0)
    }

    /// Returns `true` if a sample equal to `value` is stored.
    pub fn contains(&self, value: T) -> bool {
        self.tree.contains(&OrderedFloat(value))
    }

    /// Returns the sample at sorted position `index`; negative indices count
    /// back from the end.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::IndexOutOfRange`] unless `-len <= index < len`.
    pub fn select(&self, index: isize) -> Result<T, TreeError> {
        self.tree.select(index).map(|value| value.0)
    }

    /// Returns the number of samples strictly less than `value`.
    pub fn rank_lower(&self, value: T) -> usize {
        self.tree.rank_lower(&OrderedFloat(value))
    }

    /// Returns the number of samples less than or equal to `value`.
    pub fn rank_lower_or_equal(&self, value: T) -> usize {
        self.tree.rank_lower_or_equal(&OrderedFloat(value))
    }

    /// Returns how many samples equal `value`.
    pub fn count(&self, value: T) -> usize {
        self.tree.count(&OrderedFloat(value))
    }

    /// Builds a new tree from the samples a Python-style slice
    /// `[start:end:step]` selects.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ZeroStep`] if `step` is `Some(0)`.
    pub fn range_select(
        &self,
        start: Option<isize>,
        end: Option<isize>,
        step: Option<isize>,
    ) -> Result<Self, TreeError> {
        let tree = self.tree.range_select(start, end, step)?;
        Ok(Self { tree })
    }

    /// Returns the smallest sample, or `None` if the tree is empty.
    pub fn min(&self) -> Option<T> {
        self.tree.first().map(|value| value.0)
    }

    /// Returns the largest sample, or `None` if the tree is empty.
    pub fn max(&self) -> Option<T> {
        self.tree.last().map(|value| value.0)
    }

    /// Returns the sample at quantile `q` by nearest rank, rounding down.
    pub fn quantile(&self, q: f64) -> Option<T> {
        self.tree.quantile(q).map(|value| value.0)
    }

    /// Returns the value at quantile `q`, interpolating linearly between the
    /// two samples that bracket it.
    ///
    /// # Arguments
    ///
    /// * `q` - The quantile, clamped to `[0, 1]`
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The quantile, or `None` if the tree is empty
    pub fn interpolated_quantile(&self, q: f64) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }

        let (lower_index, upper_index, weight) = quantile_bracket(q.clamp(0.0, 1.0), len);
        let lower = self.tree.get(lower_index)?.0;
        if lower_index == upper_index {
            return Some(lower);
        }

        let upper = self.tree.get(upper_index)?.0;
        lerp(lower, upper, weight)
    }

    /// Returns the median, averaging the two middle samples when the count
    /// is even.
    pub fn median(&self) -> Option<T> {
        self.interpolated_quantile(0.5)
    }

    /// Returns the sum of all samples.
    ///
    /// The sum is calculated using the Kahan-Babuska-Neumaier (Kbn) algorithm
    /// for numerical stability.
    pub fn sum(&self) -> T
    where
        T: Default,
    {
        let mut sum = Kbn::default();
        for value in self.iter() {
            sum += value;
        }
        sum.total()
    }

    /// Returns the mean of all samples, or `None` if the tree is empty.
    pub fn mean(&self) -> Option<T>
    where
        T: Default,
    {
        if self.is_empty() {
            return None;
        }
        let n = T::from(self.len())?;
        Some(self.sum() / n)
    }

    /// Returns the samples in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.tree.iter().map(|value| value.0)
    }
}

impl<T: Float + PrimitiveFloat> Default for FloatRbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for FloatRbTree<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T: Float + PrimitiveFloat> PartialEq for FloatRbTree<T> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Float + PrimitiveFloat + fmt::Debug> fmt::Debug for FloatRbTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Float + PrimitiveFloat> FromIterator<T> for FloatRbTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Float + PrimitiveFloat> Extend<T> for FloatRbTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tree.extend(iter.into_iter().map(OrderedFloat));
    }
}
