use std::iter::FusedIterator;

use super::Point;

/// Pixels crossed by the straight segment between two integer points, both
/// endpoints included.
///
/// Stepping is integer-only error accumulation along the major axis (the one
/// with the larger extent, `x` on equal extents). Each step advances the major
/// axis by one pixel and the minor axis by at most one, so the sequence is
/// 8-connected and holds exactly `max(|dx|, |dy|) + 1` points.
///
/// When the ideal line passes exactly half way between two candidate pixels,
/// the one with the smaller absolute minor coordinate is taken. That tie rule
/// does not depend on the walking direction, so `Line::new(a, b)` and
/// `Line::new(b, a)` cover the same pixels in opposite order.
#[derive(Clone, Debug)]
pub struct Line {
    point: Point,
    major_step: Point,
    minor_step: Point,
    error: isize,
    major_delta: isize,
    minor_delta: isize,
    remaining: usize,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        let dx = end.x - start.x;
        let dy = end.y - start.y;
        let (adx, ady) = (dx.abs(), dy.abs());
        let sx = if dx < 0 { -1 } else { 1 };
        let sy = if dy < 0 { -1 } else { 1 };

        let (major, minor, major_step, minor_step, minor_sign) = if adx >= ady {
            (adx, ady, Point::new(sx, 0), Point::new(0, sy), sy)
        } else {
            (ady, adx, Point::new(0, sy), Point::new(sx, 0), sx)
        };
        // Half-way ties round towards the lower absolute coordinate: down when
        // walking up the minor axis, up when walking down it.
        let bias = if minor_sign > 0 { 1 } else { 0 };

        Self {
            point: start,
            major_step,
            minor_step,
            error: major - bias,
            major_delta: 2 * major,
            minor_delta: 2 * minor,
            remaining: major as usize + 1,
        }
    }
}

impl Iterator for Line {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.point;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.point += self.major_step;
            self.error += self.minor_delta;
            if self.error >= self.major_delta {
                self.error -= self.major_delta;
                self.point += self.minor_step;
            }
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Line {}

impl FusedIterator for Line {}

/// Eager form of [`Line`].
pub fn rasterize(a: Point, b: Point) -> Vec<Point> {
    Line::new(a, b).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn p(x: isize, y: isize) -> Point {
        Point::new(x, y)
    }

    fn assert_well_formed(a: Point, b: Point) {
        let points = rasterize(a, b);
        assert_eq!(points.first(), Some(&a));
        assert_eq!(points.last(), Some(&b));
        let expected_len = (b.x - a.x).abs().max((b.y - a.y).abs()) as usize + 1;
        assert_eq!(points.len(), expected_len, "{a} -> {b}");
        for pair in points.windows(2) {
            let step = pair[1] - pair[0];
            assert!(step.x.abs() <= 1 && step.y.abs() <= 1, "gap in {a} -> {b}");
            assert_ne!(pair[0], pair[1], "duplicate in {a} -> {b}");
        }
    }

    #[test]
    fn degenerate_line_is_a_single_point() {
        assert_eq!(rasterize(p(3, 4), p(3, 4)), vec![p(3, 4)]);
        assert_eq!(Line::new(p(3, 4), p(3, 4)).len(), 1);
    }

    #[test]
    fn axis_aligned_lines() {
        assert_eq!(rasterize(p(0, 0), p(3, 0)), vec![p(0, 0), p(1, 0), p(2, 0), p(3, 0)]);
        assert_eq!(rasterize(p(2, 2), p(2, -1)), vec![p(2, 2), p(2, 1), p(2, 0), p(2, -1)]);
    }

    #[test]
    fn diagonal_lines_step_both_axes() {
        assert_eq!(
            rasterize(p(10, 5), p(5, 10)),
            vec![p(10, 5), p(9, 6), p(8, 7), p(7, 8), p(6, 9), p(5, 10)]
        );
    }

    #[test]
    fn ties_resolve_to_lower_coordinate_in_both_directions() {
        assert_eq!(rasterize(p(0, 0), p(2, 1)), vec![p(0, 0), p(1, 0), p(2, 1)]);
        assert_eq!(rasterize(p(2, 1), p(0, 0)), vec![p(2, 1), p(1, 0), p(0, 0)]);
        assert_eq!(rasterize(p(0, 0), p(1, 2)), vec![p(0, 0), p(0, 1), p(1, 2)]);
    }

    #[test]
    fn shallow_line_rounds_to_nearest_pixel() {
        assert_eq!(
            rasterize(p(0, 0), p(4, 1)),
            vec![p(0, 0), p(1, 0), p(2, 0), p(3, 1), p(4, 1)]
        );
    }

    #[test]
    fn every_octant_is_connected_and_symmetric() {
        let origin = p(0, 0);
        for x in -7..=7 {
            for y in -7..=7 {
                let end = p(x, y);
                assert_well_formed(origin, end);
                assert_well_formed(end, origin);
                let forward: HashSet<_> = Line::new(origin, end).collect();
                let backward: HashSet<_> = Line::new(end, origin).collect();
                assert_eq!(forward, backward, "{origin} <-> {end}");
            }
        }
    }

    #[test]
    fn symmetry_holds_away_from_the_origin() {
        let pairs = [
            (p(13, 2), p(-4, 9)),
            (p(100, 50), p(0, 17)),
            (p(1999, 1000), p(1, 1000)),
            (p(-3, -8), p(6, 1)),
        ];
        for (a, b) in pairs {
            assert_well_formed(a, b);
            let forward: HashSet<_> = Line::new(a, b).collect();
            let backward: HashSet<_> = Line::new(b, a).collect();
            assert_eq!(forward, backward);
        }
    }
}
