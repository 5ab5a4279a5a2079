use num_traits::Float;

/// Locates quantile `q` among `len` sorted positions
///
/// # Arguments
///
/// * `q` - The quantile, expected within `[0, 1]`
/// * `len` - Number of sorted values, must be non-zero
///
/// # Returns
///
/// * `(usize, usize, f64)` - The positions just below and just above the
///   quantile, and how far the quantile lies between them
#[inline]
pub fn quantile_bracket(q: f64, len: usize) -> (usize, usize, f64) {
    let pos = q * (len - 1) as f64;
    let lower_index = Float::floor(pos) as usize;
    let upper_index = Float::ceil(pos) as usize;
    (lower_index, upper_index, pos - lower_index as f64)
}

/// Returns the value `weight` of the way from `lower` to `upper`
///
/// # Arguments
///
/// * `lower` - The value at weight 0
/// * `upper` - The value at weight 1
/// * `weight` - Fraction of the distance to travel
///
/// # Returns
///
/// * `Option<T>` - The interpolated value, or `None` if `weight` does not fit in `T`
#[inline]
pub fn lerp<T: Float>(lower: T, upper: T, weight: f64) -> Option<T> {
    let weight = T::from(weight)?;
    Some(lower + weight * (upper - lower))
}
