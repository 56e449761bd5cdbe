//! Jump points for drag reordering.
//!
//! A jump point is the midpoint of one sibling's extent along the drag
//! axis. Dragging an entity past a neighbour's jump point moves its
//! candidate index by one.

/// Midpoints of a row of siblings laid end to end from 0.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpPoints {
    points: Vec<f64>,
}

impl JumpPoints {
    /// Builds jump points from each sibling's extent, in sibling order.
    pub fn from_extents(extents: &[f64]) -> Self {
        let mut start = 0.0;
        let points = extents
            .iter()
            .map(|extent| {
                let midpoint = start + extent / 2.0;
                start += extent;
                midpoint
            })
            .collect();
        Self { points }
    }

    /// Siblings of equal extent.
    pub fn uniform(count: usize, extent: f64) -> Self {
        Self::from_extents(&vec![extent; count])
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    /// Candidate insertion index for the sibling at `original` after it has
    /// been dragged by `displacement` in total.
    ///
    /// Moving forwards only lands on a slot once the dragged midpoint passes
    /// that slot's jump point, so the scanned count is one too high and is
    /// decremented.
    pub fn candidate_index(&self, original: usize, displacement: f64) -> usize {
        let Some(&origin) = self.points.get(original) else {
            return original;
        };
        let position = origin + displacement;
        let passed = self.points.iter().filter(|point| **point < position).count();
        let index = if displacement > 0.0 {
            passed.saturating_sub(1)
        } else {
            passed
        };
        index.min(self.points.len() - 1)
    }
}
