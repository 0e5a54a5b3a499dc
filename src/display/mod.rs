// src/display/mod.rs
pub mod colormap;

use std::io::{self, Write};

use crate::error::Result;
use crate::raster::IndexArray;

pub use colormap::{DivergingScale, Rgb};

/// Presents a computed index to the user. Nothing it does feeds back into
/// the pipeline.
pub trait IndexViewer {
    fn show(&self, index: &IndexArray, title: &str) -> Result<()>;
}

const UPPER_HALF_BLOCK: char = '\u{2580}';
const FULL_BLOCK: char = '\u{2588}';
const RESET: &str = "\x1b[0m";

/// Draws the index in a 24-bit color terminal, two pixel rows per text line,
/// followed by a colorbar legend.
#[derive(Debug, Clone)]
pub struct TerminalViewer {
    scale: DivergingScale,
    max_columns: usize,
    legend_width: usize,
    label: String,
}

impl Default for TerminalViewer {
    fn default() -> Self {
        Self {
            scale: DivergingScale::default(),
            max_columns: 80,
            legend_width: 41,
            label: "NDVI".to_string(),
        }
    }
}

impl TerminalViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }

    pub fn with_max_columns(self, max_columns: usize) -> Self {
        Self {
            max_columns: max_columns.max(1),
            ..self
        }
    }

    /// Write the picture, the colorbar and its ticks to `out`.
    pub fn render<W: Write>(&self, index: &IndexArray, title: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "{title}")?;

        let (height, width) = index.shape();
        if height == 0 || width == 0 {
            writeln!(out, "(empty raster)")?;
        } else {
            // Square cells: one step in both directions
            let step = width.div_ceil(self.max_columns).max(1);
            let cells = downsample(index, step);
            let columns = width.div_ceil(step);

            for pair in cells.chunks(2 * columns) {
                let (upper, lower) = pair.split_at(columns.min(pair.len()));
                for (col, &top) in upper.iter().enumerate() {
                    let fg = self.scale.color(top);
                    match lower.get(col) {
                        Some(&bottom) => {
                            let bg = self.scale.color(bottom);
                            write!(
                                out,
                                "\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m{UPPER_HALF_BLOCK}",
                                fg.r, fg.g, fg.b, bg.r, bg.g, bg.b
                            )?;
                        }
                        None => {
                            write!(
                                out,
                                "{RESET}\x1b[38;2;{};{};{}m{UPPER_HALF_BLOCK}",
                                fg.r, fg.g, fg.b
                            )?;
                        }
                    }
                }
                writeln!(out, "{RESET}")?;
            }
        }

        self.render_legend(out)
    }

    fn render_legend<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let width = self.legend_width.max(3);
        for i in 0..width {
            let t = i as f64 / (width - 1) as f64;
            let c = self.scale.color(self.scale.value_at(t));
            write!(out, "\x1b[38;2;{};{};{}m{FULL_BLOCK}", c.r, c.g, c.b)?;
        }
        writeln!(out, "{RESET} {}", self.label)?;

        let low = format!("{:.1}", self.scale.min);
        let mid = format!("{:.1}", self.scale.value_at(0.5));
        let high = format!("{:.1}", self.scale.max);
        let center = width / 2;
        let mid_start = center.saturating_sub(mid.len() / 2).max(low.len() + 1);
        let high_start = width.saturating_sub(high.len()).max(mid_start + mid.len() + 1);

        let mut ticks = low;
        ticks.push_str(&" ".repeat(mid_start - ticks.len()));
        ticks.push_str(&mid);
        ticks.push_str(&" ".repeat(high_start - ticks.len()));
        ticks.push_str(&high);
        writeln!(out, "{ticks}")
    }
}

impl IndexViewer for TerminalViewer {
    fn show(&self, index: &IndexArray, title: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        self.render(index, title, &mut stdout)?;
        stdout.flush()?;
        Ok(())
    }
}

/// Mean of each `step` x `step` block, row-major. Non-finite values are
/// skipped; a block with none left is NaN.
fn downsample(index: &IndexArray, step: usize) -> Vec<f64> {
    let (height, width) = index.shape();
    let rows = height.div_ceil(step);
    let columns = width.div_ceil(step);
    let data = index.data();

    let mut cells = Vec::with_capacity(rows * columns);
    for block_row in 0..rows {
        for block_col in 0..columns {
            let mut sum = 0.0;
            let mut count = 0usize;
            for row in block_row * step..((block_row + 1) * step).min(height) {
                for col in block_col * step..((block_col + 1) * step).min(width) {
                    let value = f64::from(data[row * width + col]);
                    if value.is_finite() {
                        sum += value;
                        count += 1;
                    }
                }
            }
            cells.push(if count == 0 { f64::NAN } else { sum / count as f64 });
        }
    }
    cells
}
