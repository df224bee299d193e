use crate::geometry::{Line, Point};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub height: usize,
    pub width: usize,
}

impl Grid {
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, point: Point) -> bool {
        self.index_of(point).is_some()
    }

    /// Row-major index of `point`, `None` outside the grid.
    pub fn index_of(&self, point: Point) -> Option<usize> {
        let point = point.cast::<usize>()?;
        if point.x < self.width && point.y < self.height {
            Some(point.y * self.width + point.x)
        } else {
            None
        }
    }

    /// Indexes of the pixels crossed by the segment `a`-`b`, skipping those
    /// outside the grid.
    pub fn get_pixel_indexes_in_segment(&self, a: Point, b: Point) -> impl Iterator<Item = usize> + '_ {
        Line::new(a, b).filter_map(|point| self.index_of(point))
    }
}
