use crate::TreeError;

/// The positions selected by a Python-style slice `[start:end:step]` over a
/// sequence of `len` items.
///
/// Bounds follow Python's `slice.indices`: negative bounds count from the
/// end, and anything past either end is clamped rather than rejected. The
/// positions are produced lazily, in slice order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceIndices {
    /// Clamped start position
    start: isize,
    /// Clamped exclusive stop position
    stop: isize,
    /// Stride between positions, never zero
    step: isize,
    /// Next position to yield
    next: isize,
    /// Positions left to yield
    remaining: usize,
}

impl SliceIndices {
    /// Resolves a slice against a sequence of `len` items.
    ///
    /// # Arguments
    ///
    /// * `start` - First position, `None` for the natural start
    /// * `end` - Exclusive end position, `None` for the natural end
    /// * `step` - Stride, `None` for 1
    /// * `len` - Length of the sequence being sliced
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ZeroStep`] if `step` is `Some(0)`.
    pub fn new(
        start: Option<isize>,
        end: Option<isize>,
        step: Option<isize>,
        len: usize,
    ) -> Result<Self, TreeError> {
        let step = step.unwrap_or(1);
        if step == 0 {
            log::debug!("slice: rejected zero step over {len} items");
            return Err(TreeError::ZeroStep);
        }

        let len = isize::try_from(len).unwrap_or(isize::MAX);
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(bound) if bound < 0 => bound.saturating_add(len).max(lower),
            Some(bound) => bound.min(upper),
        };

        let (start, stop) = if step < 0 {
            (clamp(start, upper), clamp(end, lower))
        } else {
            (clamp(start, lower), clamp(end, upper))
        };

        let span = if step < 0 { start - stop } else { stop - start };
        let remaining = if span > 0 {
            (span.unsigned_abs() - 1) / step.unsigned_abs() + 1
        } else {
            0
        };

        Ok(Self {
            start,
            stop,
            step,
            next: start,
            remaining,
        })
    }

    /// Returns the clamped `(start, stop, step)` triple, as Python's
    /// `slice.indices` would report it.
    pub const fn bounds(&self) -> (isize, isize, isize) {
        (self.start, self.stop, self.step)
    }
}

impl Iterator for SliceIndices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.remaining -= 1;
        // may overshoot past the last position, which is never yielded
        self.next = self.next.wrapping_add(self.step);
        Some(current.unsigned_abs())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SliceIndices {}

impl core::iter::FusedIterator for SliceIndices {}
