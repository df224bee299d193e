use std::{ops::Range, path::Path};

use image::{imageops::FilterType, DynamicImage, GrayImage};
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    darkness::{Darkness, Whiten},
    error::{ConfigError, Result},
    geometry::Point,
    hooks::HookTable,
    raster,
    verboser::{Message, Verboser},
    Grid, LuminanceField,
};

/// Validates `config`, turns `image` into a field of the configured
/// resolution, and winds `config.string_count` strings around it.
pub fn compute(config: &Config, image: &DynamicImage, verboser: &mut impl Verboser) -> Result<Computation> {
    config.validate()?;
    verboser.verbose(Message::Loading);
    let size = config.resolution();
    let field = raster::field_from_image(image, size, FilterType::Triangle)?;
    let mut algorithm = Algorithm::from_config(config, field, verboser)?;
    algorithm.compute(config.string_count, verboser);
    Ok(algorithm.into_computation())
}

/// How the candidates of one iteration are scored. Both modes pick the same
/// hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Sequential,
    /// Candidates are split in one contiguous chunk per CPU and scored on the
    /// rayon pool against a shared read-only field.
    Parallel,
}

/// One drawn string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    /// 1-based number of the string within the run.
    pub string: usize,
    pub from: usize,
    pub to: usize,
    pub score: u64,
}

impl Step {
    /// Nothing dark was reachable from `from`; the string was drawn anyway.
    pub fn is_saturated(&self) -> bool {
        self.score == 0
    }
}

/// Greedy path builder.
///
/// Starting at hook 0, every step scores the chord from the current hook to
/// each hook (itself included), draws the darkest one, lightens the pixels
/// under it and moves on. The run is deterministic: ties go to the lowest hook
/// index, and when every chord scores zero hook 0 is chosen.
pub struct Algorithm<D = Whiten> {
    field: LuminanceField,
    table: HookTable,
    darkness: D,
    selection: Selection,
    path: Vec<usize>,
    scores: Vec<u64>,
    buffers: Vec<BatchBuffer>,
    saturation_reported: bool,
}

impl Algorithm<Whiten> {
    pub fn new(field: LuminanceField, table: HookTable) -> Result<Self> {
        if table.is_empty() {
            return Err(ConfigError::NoHooks.into());
        }
        table.check_within(field.grid())?;
        Ok(Self {
            field,
            table,
            darkness: Whiten,
            selection: Selection::Sequential,
            path: vec![0],
            scores: Vec::new(),
            buffers: BatchBuffer::new(),
            saturation_reported: false,
        })
    }
}

impl Algorithm<Box<dyn Darkness>> {
    /// Places `config.hook_count` hooks on the circle inscribed in `field` and
    /// applies the configured darkness and selection.
    pub fn from_config(config: &Config, field: LuminanceField, verboser: &mut impl Verboser) -> Result<Self> {
        config.validate()?;
        let circle = Config::circle(field.size())?;
        let table = HookTable::circular(config.hook_count, circle, field.grid(), verboser)?;
        Ok(Algorithm::new(field, table)?
            .with_darkness(config.darkness.build())
            .with_selection(config.selection))
    }
}

impl<D: Darkness> Algorithm<D> {
    pub fn with_darkness<E: Darkness>(self, darkness: E) -> Algorithm<E> {
        Algorithm {
            field: self.field,
            table: self.table,
            darkness,
            selection: self.selection,
            path: self.path,
            scores: self.scores,
            buffers: self.buffers,
            saturation_reported: self.saturation_reported,
        }
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn current(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    /// Number of strings drawn so far.
    pub fn strings(&self) -> usize {
        self.scores.len()
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn scores(&self) -> &[u64] {
        &self.scores
    }

    pub fn field(&self) -> &LuminanceField {
        &self.field
    }

    pub fn hooks(&self) -> &HookTable {
        &self.table
    }

    /// Best hook to go to from the current one, with its score. The field is
    /// left untouched.
    pub fn next_hook(&mut self) -> (usize, u64) {
        let from = self.current();
        match self.selection {
            Selection::Sequential => self.select_sequential(from),
            Selection::Parallel => self.select_parallel(from),
        }
    }

    /// Draws one string. Scoring finishes before the field is touched, so a
    /// host may stop between any two calls.
    pub fn step(&mut self) -> Step {
        let from = self.current();
        let (to, score) = self.next_hook();
        let (a, b) = (self.table[from].position, self.table[to].position);
        self.field.lighten_chord(a, b, &self.darkness);
        self.path.push(to);
        self.scores.push(score);
        let step = Step {
            string: self.scores.len(),
            from,
            to,
            score,
        };
        tracing::debug!("string #{} -> next hook: {} (score {})", step.string, to, score);
        step
    }

    /// Draws strings until `strings` have been drawn in total. Calling it
    /// again with a larger target continues the same run.
    pub fn compute(&mut self, strings: usize, verboser: &mut impl Verboser) -> &[usize] {
        if self.strings() < strings {
            tracing::info!(
                drawn = self.strings(),
                target = strings,
                hooks = self.table.len(),
                "computing strings"
            );
        }
        while self.strings() < strings {
            verboser.verbose(Message::Computing(self.strings()));
            let step = self.step();
            if step.is_saturated() {
                verboser.verbose(Message::Saturated(step.string));
                if !self.saturation_reported {
                    self.saturation_reported = true;
                    tracing::warn!(
                        string = step.string,
                        hook = step.from,
                        "no dark pixels reachable, drawing zero-score strings"
                    );
                }
            }
        }
        verboser.verbose(Message::Computing(self.strings()));
        &self.path
    }

    /// Copy of the current state, leaving the run free to continue.
    pub fn snapshot(&self) -> Computation {
        Computation {
            table: self.table.clone(),
            path: self.path.clone(),
            scores: self.scores.clone(),
            field: self.field.clone(),
        }
    }

    pub fn into_computation(self) -> Computation {
        tracing::info!(
            strings = self.scores.len(),
            luminance = self.field.total_luminance(),
            "computation finished"
        );
        Computation {
            table: self.table,
            path: self.path,
            scores: self.scores,
            field: self.field,
        }
    }

    fn select_sequential(&self, from: usize) -> (usize, u64) {
        let start = self.table[from].position;
        pick_best(
            self.table
                .positions()
                .enumerate()
                .map(|(to, end)| (to, self.field.chord_score(start, end))),
        )
    }

    fn select_parallel(&mut self, from: usize) -> (usize, u64) {
        let hook_count = self.table.len();
        let chunk_size = hook_count.div_ceil(self.buffers.len());
        for (index, buffer) in self.buffers.iter_mut().enumerate() {
            let start = (index * chunk_size).min(hook_count);
            buffer.range = start..hook_count.min(start + chunk_size);
        }

        let field = &self.field;
        let table = &self.table;
        let start = table[from].position;
        self.buffers.par_iter_mut().for_each(|buffer| {
            buffer.best = pick_best(
                buffer
                    .range
                    .clone()
                    .map(|to| (to, field.chord_score(start, table[to].position))),
            );
        });
        // Chunks are contiguous and visited in ascending order, so the strict
        // comparison keeps the same winner as the sequential scan.
        pick_best(self.buffers.iter().map(|buffer| buffer.best))
    }
}

/// Strictly greater wins: on equal scores the earliest candidate stays, and
/// when nothing scores above zero the result is `(0, 0)`.
fn pick_best(candidates: impl Iterator<Item = (usize, u64)>) -> (usize, u64) {
    candidates.fold((0, 0), |best, candidate| {
        if candidate.1 > best.1 {
            candidate
        } else {
            best
        }
    })
}

struct BatchBuffer {
    range: Range<usize>,
    best: (usize, u64),
}

impl BatchBuffer {
    fn new() -> Vec<Self> {
        (0..num_cpus::get().max(1))
            .map(|_| Self {
                range: 0..0,
                best: (0, 0),
            })
            .collect()
    }
}

/// Result of a run: the hook sequence and everything needed to draw it.
#[derive(Clone, Debug)]
pub struct Computation {
    table: HookTable,
    path: Vec<usize>,
    scores: Vec<u64>,
    field: LuminanceField,
}

impl Computation {
    /// Hook indexes in winding order, starting with hook 0.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn into_path(self) -> Vec<usize> {
        self.path
    }

    /// Score of each string at the moment it was chosen.
    pub fn scores(&self) -> &[u64] {
        &self.scores
    }

    /// The field after every string has lightened it.
    pub fn field(&self) -> &LuminanceField {
        &self.field
    }

    pub fn hooks(&self) -> &HookTable {
        &self.table
    }

    pub fn chords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.path.windows(2).map(|pair| (pair[0], pair[1]))
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.chords()
            .map(|(from, to)| (self.table[from].position, self.table[to].position))
    }

    pub fn saturated_strings(&self) -> usize {
        self.scores.iter().filter(|&&score| score == 0).count()
    }

    /// White canvas `scale` times the field size with every string drawn in
    /// black, in winding order.
    pub fn build_image(&self, scale: u32) -> Result<GrayImage> {
        let scale = scale.max(1);
        let size = self.field.size();
        let side = u32::try_from(size)
            .ok()
            .and_then(|side| side.checked_mul(scale))
            .ok_or(ConfigError::ScaleTooLarge { size, scale })?;
        let grid = Grid::square(side as usize);
        let factor = scale as isize;
        let mut buffer = vec![u8::MAX; grid.len()];
        for (a, b) in self.segments() {
            for index in grid.get_pixel_indexes_in_segment(a * factor, b * factor) {
                buffer[index] = 0;
            }
        }
        Ok(GrayImage::from_fn(side, side, |x, y| {
            image::Luma([buffer[y as usize * grid.width + x as usize]])
        }))
    }

    pub fn build_svg(&self, line_thickness: f32) -> svg::Document {
        let size = self.field.size() as f32;
        let mut doc = svg::Document::new()
            .set("viewBox", (0.0, 0.0, size, size))
            .add(
                svg::node::element::Rectangle::new()
                    .set("width", size)
                    .set("height", size)
                    .set("fill", "white"),
            );
        for hook in self.table.iter() {
            doc = doc.add(
                svg::node::element::Circle::new()
                    .set("cx", hook.position.x as f32)
                    .set("cy", hook.position.y as f32)
                    .set("r", line_thickness)
                    .set("fill", "black"),
            );
        }
        for (a, b) in self.segments() {
            doc = doc.add(
                svg::node::element::Line::new()
                    .set("x1", a.x as f32)
                    .set("y1", a.y as f32)
                    .set("x2", b.x as f32)
                    .set("y2", b.y as f32)
                    .set("stroke", "black")
                    .set("stroke-width", format!("{:.4}", line_thickness)),
            );
        }
        doc
    }

    pub fn build_instructions(&self) -> String {
        let mut instructions = format!("Start at hook {}\n", self.path.first().copied().unwrap_or(0));
        instructions.extend(
            self.chords()
                .enumerate()
                .map(|(string, (from, to))| format!("String #{}: {} -> {}\n", string + 1, from, to)),
        );
        instructions
    }

    pub fn save_image(&self, path: impl AsRef<Path>, scale: u32) -> Result<()> {
        self.build_image(scale)?.save(path)?;
        Ok(())
    }

    pub fn save_svg(&self, path: impl AsRef<Path>, line_thickness: f32) -> Result<()> {
        svg::save(path, &self.build_svg(line_thickness))?;
        Ok(())
    }

    pub fn save_instructions(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.build_instructions())?;
        Ok(())
    }
}
