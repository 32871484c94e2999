use crate::chart::scalable::Scalable;
use std::ops::Range;

const DEFAULT_WIDTH: usize = 60;
const DEFAULT_HEIGHT: usize = 12;
const MARKERS: [char; 8] = ['●', '▲', '■', '◆', '★', '✚', '○', '△'];
const TRAIL: char = '·';

/// One named line: `(x, y)` points, x usually a unix timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<(i64, f64)>,
}

/// Multi-series line chart drawn on a character grid.
/// Each series gets its own marker glyph; consecutive points are joined with a dotted trail.
pub struct LineChart<'a> {
    series: &'a [Series],
    width: Option<usize>,
    height: Option<usize>,
    x_render: Option<&'a dyn Fn(i64) -> String>,
}

impl<'a> LineChart<'a> {
    pub fn new(series: &'a [Series]) -> LineChart<'a> {
        LineChart {
            series,
            width: None,
            height: None,
            x_render: None,
        }
    }

    pub fn set_width(mut self, width: usize) -> LineChart<'a> {
        self.width = Some(width.max(2));
        self
    }

    pub fn set_height(mut self, height: usize) -> LineChart<'a> {
        self.height = Some(height.max(2));
        self
    }

    /// how x values are labelled under the axis
    pub fn set_x_render(mut self, render: &'a dyn Fn(i64) -> String) -> LineChart<'a> {
        self.x_render = Some(render);
        self
    }

    pub fn marker(index: usize) -> char {
        MARKERS[index % MARKERS.len()]
    }

    pub fn render(&self) -> String {
        let width = self.width.unwrap_or(DEFAULT_WIDTH);
        let height = self.height.unwrap_or(DEFAULT_HEIGHT);

        let all_points = self.series.iter().flat_map(|s| s.points.iter());
        let (x_range, y_range) = match bounds(all_points) {
            Some(bounds) => bounds,
            None => return "(no data)\n".to_string(),
        };

        let mut grid = vec![vec![' '; width]; height];
        let to_cell = |(x, y): (i64, f64)| -> (usize, usize) {
            let col = if x_range.start == x_range.end {
                (width - 1) as f64 / 2.0
            } else {
                (x as f64).scale_between_ranges(&x_range, &(0.0..(width - 1) as f64))
            };
            let row = y.scale_between_ranges(&y_range, &((height - 1) as f64..0.0));
            (col.round() as usize, row.round() as usize)
        };

        for (index, series) in self.series.iter().enumerate() {
            let mut points = series.points.clone();
            points.sort_by_key(|(x, _)| *x);
            let cells: Vec<(usize, usize)> = points.into_iter().map(&to_cell).collect();

            for pair in cells.windows(2) {
                draw_trail(&mut grid, pair[0], pair[1]);
            }
            for (col, row) in cells {
                grid[row][col] = Self::marker(index);
            }
        }

        let mut out = String::new();
        let mid_row = (height - 1) / 2;
        let mid_value = (y_range.start + y_range.end) / 2.0;
        for (row, cells) in grid.iter().enumerate() {
            let label = match row {
                0 => format!("{:.1}", y_range.end),
                r if r == height - 1 => format!("{:.1}", y_range.start),
                r if r == mid_row => format!("{:.1}", mid_value),
                _ => String::new(),
            };
            let line: String = cells.iter().collect();
            out.push_str(&format!("{:>7} ┤{}\n", label, line.trim_end()));
        }
        out.push_str(&format!("{:>7} └{}\n", "", "─".repeat(width)));

        if let Some(render) = self.x_render {
            let first = render(x_range.start as i64);
            let last = render(x_range.end as i64);
            let gap = width.saturating_sub(first.chars().count() + last.chars().count()).max(1);
            if x_range.start == x_range.end {
                out.push_str(&format!("{:>7}  {}\n", "", first));
            } else {
                out.push_str(&format!("{:>7}  {}{}{}\n", "", first, " ".repeat(gap), last));
            }
        }

        let legend: Vec<String> = self
            .series
            .iter()
            .enumerate()
            .map(|(index, series)| format!("{} {}", Self::marker(index), series.name))
            .collect();
        out.push_str(&format!("{:>7}  {}\n", "", legend.join("   ")));
        out
    }
}

/// x and y ranges over every point; a flat y range is widened so the line sits mid-chart
fn bounds<'p>(points: impl Iterator<Item = &'p (i64, f64)>) -> Option<(Range<f64>, Range<f64>)> {
    let mut result: Option<(Range<f64>, Range<f64>)> = None;
    for &(x, y) in points {
        let x = x as f64;
        result = Some(match result {
            None => (x..x, y..y),
            Some((xs, ys)) => (xs.start.min(x)..xs.end.max(x), ys.start.min(y)..ys.end.max(y)),
        });
    }

    result.map(|(xs, ys)| {
        if ys.start == ys.end {
            (xs, ys.start - 1.0..ys.end + 1.0)
        } else {
            (xs, ys)
        }
    })
}

/// Joins two cells with trail dots without overwriting anything already drawn
fn draw_trail(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize)) {
    let (c0, r0) = (from.0 as f64, from.1 as f64);
    let (c1, r1) = (to.0 as f64, to.1 as f64);
    let steps = (c1 - c0).abs().max((r1 - r0).abs()) as usize;

    for step in 1..steps {
        let t = step as f64 / steps as f64;
        let col = (c0 + (c1 - c0) * t).round() as usize;
        let row = (r0 + (r1 - r0) * t).round() as usize;
        if grid[row][col] == ' ' {
            grid[row][col] = TRAIL;
        }
    }
}
