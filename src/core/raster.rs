use crate::core::aggregate::BoundingBox;
use crate::domain::model::DistrictRecord;
use serde::{Deserialize, Serialize};

pub const CAPITAL_GLYPH: char = '●';
pub const DISTRICT_GLYPH: char = '·';
pub const EMPTY_CELL: char = ' ';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterOptions {
    pub height: usize,
    pub width: usize,
    pub capital_glyph: char,
    pub district_glyph: char,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            height: 20,
            width: 40,
            capital_glyph: CAPITAL_GLYPH,
            district_glyph: DISTRICT_GLYPH,
        }
    }
}

/// Character grid, row 0 is the northernmost.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub cells: Vec<Vec<char>>,
    pub bounds: Option<BoundingBox>,
    pub plotted: usize,
}

impl Grid {
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn width(&self) -> usize {
        self.cells.first().map(Vec::len).unwrap_or(0)
    }

    pub fn glyph_at(&self, row: usize, col: usize) -> Option<char> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    pub fn row_text(&self, row: usize) -> String {
        self.cells.get(row).map(|r| r.iter().collect()).unwrap_or_default()
    }

    /// Rows holding at least one glyph.
    pub fn occupied_rows(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&c| c != EMPTY_CELL))
            .map(|(i, _)| i)
            .collect()
    }
}

fn normalize(value: f64, min: f64, span: f64) -> f64 {
    // zero-width axis: everything on the low edge
    if span > 0.0 {
        (value - min) / span
    } else {
        0.0
    }
}

/// Grid cell `(row, col)` of a coordinate inside `bounds`. Fractions are truncated.
pub fn cell_for(lat: f64, lon: f64, bounds: &BoundingBox, height: usize, width: usize) -> (usize, usize) {
    let lat_norm = normalize(lat, bounds.lat_min, bounds.lat_span());
    let lon_norm = normalize(lon, bounds.lon_min, bounds.lon_span());

    let max_row = height.saturating_sub(1);
    let max_col = width.saturating_sub(1);
    let row = ((1.0 - lat_norm) * max_row as f64) as usize;
    let col = (lon_norm * max_col as f64) as usize;
    (row.min(max_row), col.min(max_col))
}

pub fn rasterize(records: &[DistrictRecord], height: usize, width: usize) -> Grid {
    rasterize_with(
        records,
        &RasterOptions {
            height,
            width,
            ..RasterOptions::default()
        },
    )
}

/// Plots one glyph per record with coordinates. A later record landing on an
/// occupied cell overwrites it.
pub fn rasterize_with(records: &[DistrictRecord], options: &RasterOptions) -> Grid {
    let mut cells = vec![vec![EMPTY_CELL; options.width]; options.height];
    let bounds = BoundingBox::of(records);

    let mut plotted = 0;
    if let (Some(bounds), true) = (bounds, options.height > 0 && options.width > 0) {
        for record in records {
            let Some((lat, lon)) = record.coordinates() else {
                continue;
            };
            let (row, col) = cell_for(lat, lon, &bounds, options.height, options.width);
            cells[row][col] = if record.is_capital() {
                options.capital_glyph
            } else {
                options.district_glyph
            };
            plotted += 1;
        }
    }

    Grid {
        cells,
        bounds,
        plotted,
    }
}
