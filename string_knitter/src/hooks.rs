use std::ops::Index;

use crate::{
    error::{ConfigError, Error, Result},
    geometry::{Circle, Point},
    verboser::{Message, Verboser},
    Grid,
};

/// A point on the frame the string is wound around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hook {
    pub index: usize,
    pub position: Point,
}

/// `count` hooks evenly spaced on the circle of `radius` around `center`.
/// Hook 0 sits at angle zero, on the positive x axis.
pub fn hooks(count: usize, center: Point, radius: usize) -> Result<Vec<Hook>> {
    if count == 0 {
        return Err(ConfigError::NoHooks.into());
    }
    if radius == 0 {
        return Err(ConfigError::ZeroRadius.into());
    }
    let circle = Circle::new(center, radius);
    Ok(circle
        .points(count)
        .enumerate()
        .map(|(index, position)| Hook { index, position })
        .collect())
}

/// Hook positions computed once for a run, all checked to lie inside the
/// field they will be scored against.
#[derive(Clone, Debug)]
pub struct HookTable {
    hooks: Vec<Hook>,
    circle: Circle,
}

impl HookTable {
    pub fn circular(
        count: usize,
        circle: Circle,
        grid: Grid,
        verboser: &mut impl Verboser,
    ) -> Result<Self> {
        let hooks = hooks(count, circle.center, circle.radius)?
            .into_iter()
            .map(|hook| {
                verboser.verbose(Message::CreatingHook(hook.index));
                if grid.contains(hook.position) {
                    Ok(hook)
                } else {
                    Err(Error::out_of_bounds(hook.position, grid))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        verboser.verbose(Message::CreatingHook(count));
        tracing::debug!(count, center = %circle.center, radius = circle.radius, "hook table built");
        Ok(Self { hooks, circle })
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Hook> {
        self.hooks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Hook> {
        self.hooks.iter()
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = Point> + '_ {
        self.hooks.iter().map(|hook| hook.position)
    }

    pub fn circle(&self) -> Circle {
        self.circle
    }

    /// `OutOfBounds` for the first hook outside `grid`.
    pub(crate) fn check_within(&self, grid: Grid) -> Result<()> {
        match self.positions().find(|&position| !grid.contains(position)) {
            Some(position) => Err(Error::out_of_bounds(position, grid)),
            None => Ok(()),
        }
    }
}

impl Index<usize> for HookTable {
    type Output = Hook;

    fn index(&self, index: usize) -> &Self::Output {
        &self.hooks[index]
    }
}
