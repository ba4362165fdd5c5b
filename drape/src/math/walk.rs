//! Fixed-interval walk along a planar line string.

use geo::{Coord, CoordFloat};
use num_traits::FromPrimitive;

/// Iterates over positions at every multiple of `spacing` along a
/// line, measured from its first vertex, followed by the last vertex.
///
/// A multiple that lands on the end (within a relative tolerance) is
/// represented by the end vertex alone, so the end is never repeated.
pub struct LineWalk<'a, T: CoordFloat = f64> {
    coords: &'a [Coord<T>],
    spacing: T,
    /// Index of the segment containing the previous position.
    segment: usize,
    /// Distance from the start to `coords[segment]`.
    segment_start: T,
    /// Number of positions before the end vertex.
    steps: usize,
    current_point: usize,
}

impl<'a, T> LineWalk<'a, T>
where
    T: CoordFloat + FromPrimitive,
{
    /// `coords` must hold at least two vertices and `spacing` must be
    /// positive; both are checked by the caller.
    pub fn new(coords: &'a [Coord<T>], spacing: T) -> Self {
        let total = length(coords);
        let tolerance = spacing * T::from_f64(1e-9).unwrap_or_else(T::epsilon);
        let mut steps = (total / spacing).floor().to_usize().unwrap_or(0) + 1;
        let last_multiple = T::from_usize(steps - 1).unwrap_or_else(T::infinity) * spacing;
        if steps > 1 && last_multiple >= total - tolerance {
            steps -= 1;
        }
        Self {
            coords,
            spacing,
            segment: 0,
            segment_start: T::zero(),
            steps,
            current_point: 0,
        }
    }

    /// Position at `distance` from the start, advancing the segment
    /// cursor as needed.
    fn locate(&mut self, distance: T) -> Coord<T> {
        let last_segment = self.coords.len() - 2;
        loop {
            let start = self.coords[self.segment];
            let end = self.coords[self.segment + 1];
            let len = (end.x - start.x).hypot(end.y - start.y);
            if self.segment < last_segment && self.segment_start + len < distance {
                self.segment += 1;
                self.segment_start = self.segment_start + len;
                continue;
            }
            if len == T::zero() {
                return start;
            }
            let f = (distance - self.segment_start) / len;
            return Coord {
                x: start.x + (end.x - start.x) * f,
                y: start.y + (end.y - start.y) * f,
            };
        }
    }
}

impl<'a, T> Iterator for LineWalk<'a, T>
where
    T: CoordFloat + FromPrimitive,
{
    type Item = Coord<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let point = if self.current_point == 0 {
            self.coords.first().copied()
        } else if self.current_point < self.steps {
            // Multiply rather than accumulate so long lines do not drift.
            let distance = T::from_usize(self.current_point)? * self.spacing;
            Some(self.locate(distance))
        } else if self.current_point == self.steps {
            self.coords.last().copied()
        } else {
            None
        };
        if point.is_some() {
            self.current_point += 1;
        }
        point
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len();
        (remaining, Some(remaining))
    }
}

impl<'a, T> ExactSizeIterator for LineWalk<'a, T>
where
    T: CoordFloat + FromPrimitive,
{
    fn len(&self) -> usize {
        (self.steps + 1).saturating_sub(self.current_point)
    }
}

/// Planar length of the line through `coords`.
pub fn length<T: CoordFloat>(coords: &[Coord<T>]) -> T {
    coords
        .windows(2)
        .map(|pair| (pair[1].x - pair[0].x).hypot(pair[1].y - pair[0].y))
        .fold(T::zero(), |acc, len| acc + len)
}
