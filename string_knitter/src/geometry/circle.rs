use std::f64::consts::TAU;

use super::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Circle {
    pub center: Point,
    pub radius: usize,
}

impl Circle {
    pub fn new(center: Point, radius: usize) -> Self {
        Self { center, radius }
    }

    /// Position of the `index`-th of `count` evenly spaced points, starting at
    /// angle zero on the positive x axis and rounded to the nearest pixel.
    pub fn point_at(&self, index: usize, count: usize) -> Point {
        let theta = TAU * index as f64 / count as f64;
        let radius = self.radius as f64;
        let offset = Point::new(radius * theta.cos(), radius * theta.sin()).round();
        // |offset| <= radius, which already fits in an isize.
        self.center + offset.as_::<isize>()
    }

    pub fn points(&self, count: usize) -> impl ExactSizeIterator<Item = Point> + '_ {
        (0..count).map(move |index| self.point_at(index, count))
    }
}
