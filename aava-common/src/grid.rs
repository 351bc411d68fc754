//! Spatial grid codec
//!
//! Maps a latitude/longitude pair to a 10-symbol grid code and back by
//! recursive 4×4 subdivision of a fixed bounding box. Each level picks one
//! of 16 cells; after 10 levels a cell is roughly 3.4e-5° on a side.
//!
//! Encoding is lossy: `decode` returns the centroid of the final cell, so
//! `encode(decode(code)) == code` holds but `decode(encode(p))` only
//! recovers `p` to within half a cell.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Number of symbols in a grid code (dashes excluded)
pub const CODE_LENGTH: usize = 10;

/// Subdivisions per axis at each level
const DIVISIONS: usize = 4;

/// Decimal places kept on decoded centroids
const CENTROID_DECIMALS: i32 = 7;

/// Root bounding box covered by the grid
pub const ROOT_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 2.5,
    max_lat: 38.5,
    min_lon: 63.5,
    max_lon: 99.5,
};

/// Standard symbol table. Row 0 is the northern band, column 0 the western one.
pub const SYMBOL_GRID: SymbolGrid = SymbolGrid::new([
    ['F', 'C', '9', '8'],
    ['J', '3', '2', '7'],
    ['K', '4', '5', '6'],
    ['L', 'M', 'P', 'T'],
]);

/// Grid codec errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Code does not have exactly [`CODE_LENGTH`] symbols after dash stripping
    #[error("Grid code must be {expected} characters excluding dashes, got {length}", expected = CODE_LENGTH)]
    InvalidLength { length: usize },

    /// Character not present in the symbol grid
    #[error("Invalid grid code character: {0}")]
    InvalidSymbol(char),

    /// Coordinate outside the root bounding box (or not finite)
    #[error("Latitude/longitude ({lat}, {lon}) out of grid bounds")]
    OutOfBounds { lat: f64, lon: f64 },

    /// Bounding box with non-finite or inverted bounds
    #[error("Invalid bounding box: {0}")]
    InvalidBounds(String),
}

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Midpoint of a final-level grid cell
pub type Centroid = Coordinate;

/// Axis-aligned latitude/longitude box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a bounding box, rejecting non-finite or inverted bounds
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Result<Self, CodecError> {
        let all_finite = [min_lat, max_lat, min_lon, max_lon]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(CodecError::InvalidBounds("bounds must be finite".to_string()));
        }
        if min_lat >= max_lat || min_lon >= max_lon {
            return Err(CodecError::InvalidBounds(format!(
                "expected min < max, got lat [{}, {}] lon [{}, {}]",
                min_lat, max_lat, min_lon, max_lon
            )));
        }
        Ok(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    /// Inclusive containment on all four edges
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.min_lat <= lat && lat <= self.max_lat && self.min_lon <= lon && lon <= self.max_lon
    }

    /// Arithmetic midpoint (unrounded)
    pub fn centroid(&self) -> Coordinate {
        Coordinate {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lon: (self.min_lon + self.max_lon) / 2.0,
        }
    }

    /// Band height and width of one subdivision of this box
    fn divisions(&self) -> (f64, f64) {
        (
            (self.max_lat - self.min_lat) / DIVISIONS as f64,
            (self.max_lon - self.min_lon) / DIVISIONS as f64,
        )
    }

    /// Sub-cell at (row, column). Row 0 is the northern band.
    fn cell(&self, row: usize, col: usize) -> BoundingBox {
        let (lat_div, lon_div) = self.divisions();
        let max_lat = self.max_lat - lat_div * row as f64;
        let min_lon = self.min_lon + lon_div * col as f64;
        BoundingBox {
            min_lat: max_lat - lat_div,
            max_lat,
            min_lon,
            max_lon: min_lon + lon_div,
        }
    }
}

/// Immutable 4×4 table of unique symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolGrid([[char; DIVISIONS]; DIVISIONS]);

impl SymbolGrid {
    pub const fn new(rows: [[char; DIVISIONS]; DIVISIONS]) -> Self {
        Self(rows)
    }

    /// Symbol at (row, column)
    pub fn symbol(&self, row: usize, col: usize) -> char {
        self.0[row][col]
    }

    /// Locate a symbol, scanning rows top to bottom
    pub fn position(&self, symbol: char) -> Option<(usize, usize)> {
        self.0.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|&c| c == symbol)
                .map(|col| (row, col))
        })
    }

    /// All 16 symbols in row-major order
    pub fn alphabet(&self) -> Vec<char> {
        self.0.iter().flatten().copied().collect()
    }
}

/// Normalized 10-symbol grid code
///
/// Deserialization goes through [`GridCode::parse`], so every value holds
/// exactly [`CODE_LENGTH`] grid symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridCode(String);

impl GridCode {
    /// Normalize and validate a code against the standard symbol grid
    ///
    /// Dashes are removed, surrounding whitespace trimmed and letters
    /// uppercased before validation.
    pub fn parse(input: &str) -> Result<Self, CodecError> {
        GridCodec::STANDARD.parse(input)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dashed 3-3-4 presentation form, e.g. `39J-438-TJC7`
    pub fn formatted(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        let group = |range: std::ops::Range<usize>| chars[range].iter().collect::<String>();
        format!("{}-{}-{}", group(0..3), group(3..6), group(6..chars.len()))
    }
}

impl fmt::Display for GridCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for GridCode {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GridCode> for String {
    fn from(code: GridCode) -> Self {
        code.0
    }
}

impl AsRef<str> for GridCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Bidirectional codec over a symbol grid and root box
///
/// Both tables are plain values; [`GridCodec::STANDARD`] is the process-wide
/// instance used by the free [`encode`] and [`decode`] functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCodec {
    grid: SymbolGrid,
    root: BoundingBox,
}

impl GridCodec {
    pub const STANDARD: GridCodec = GridCodec {
        grid: SYMBOL_GRID,
        root: ROOT_BOUNDS,
    };

    pub fn new(grid: SymbolGrid, root: BoundingBox) -> Self {
        Self { grid, root }
    }

    pub fn grid(&self) -> &SymbolGrid {
        &self.grid
    }

    pub fn root(&self) -> &BoundingBox {
        &self.root
    }

    /// Normalize and validate a code without decoding it
    pub fn parse(&self, input: &str) -> Result<GridCode, CodecError> {
        let cleaned: String = input.replace('-', "").trim().to_uppercase();

        let length = cleaned.chars().count();
        if length != CODE_LENGTH {
            return Err(CodecError::InvalidLength { length });
        }
        if let Some(bad) = cleaned.chars().find(|&c| self.grid.position(c).is_none()) {
            return Err(CodecError::InvalidSymbol(bad));
        }

        Ok(GridCode(cleaned))
    }

    /// Final-level cell for a code (unrounded)
    pub fn decode_bounds(&self, code: &str) -> Result<BoundingBox, CodecError> {
        let code = self.parse(code)?;
        let mut bounds = self.root;
        for ch in code.as_str().chars() {
            let (row, col) = self
                .grid
                .position(ch)
                .ok_or(CodecError::InvalidSymbol(ch))?;
            bounds = bounds.cell(row, col);
        }
        Ok(bounds)
    }

    /// Decode a code into the centroid of its cell, rounded to 7 decimals
    pub fn decode(&self, code: &str) -> Result<Centroid, CodecError> {
        let center = self.decode_bounds(code)?.centroid();
        Ok(Coordinate {
            lat: round_to(center.lat, CENTROID_DECIMALS),
            lon: round_to(center.lon, CENTROID_DECIMALS),
        })
    }

    /// Encode a coordinate into a 10-symbol code
    ///
    /// Rows use half-open `[min, max)` intervals; the last column is also
    /// closed at its upper edge. A latitude equal to the root maximum matches
    /// no row and falls back to the bottom-right cell at every level.
    pub fn encode(&self, lat: f64, lon: f64) -> Result<GridCode, CodecError> {
        if !self.root.contains(lat, lon) {
            return Err(CodecError::OutOfBounds { lat, lon });
        }

        let mut bounds = self.root;
        let mut code = String::with_capacity(CODE_LENGTH);

        for level in 0..CODE_LENGTH {
            let (row, col, cell) = match select_cell(&bounds, lat, lon) {
                Some(hit) => hit,
                None => {
                    trace!(level, lat, lon, "No cell matched, clamping to bottom-right");
                    let (row, col) = (DIVISIONS - 1, DIVISIONS - 1);
                    (row, col, bounds.cell(row, col))
                }
            };
            code.push(self.grid.symbol(row, col));
            bounds = cell;
        }

        Ok(GridCode(code))
    }
}

impl Default for GridCodec {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Find the (row, column) cell of `bounds` holding the point
fn select_cell(bounds: &BoundingBox, lat: f64, lon: f64) -> Option<(usize, usize, BoundingBox)> {
    for row in 0..DIVISIONS {
        for col in 0..DIVISIONS {
            let cell = bounds.cell(row, col);
            if !(cell.min_lat <= lat && lat < cell.max_lat) {
                break;
            }
            let in_lon = cell.min_lon <= lon && lon < cell.max_lon;
            let on_east_edge = col == DIVISIONS - 1 && lon == cell.max_lon;
            if in_lon || on_east_edge {
                return Some((row, col, cell));
            }
        }
    }
    None
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Encode with the standard codec
pub fn encode(lat: f64, lon: f64) -> Result<GridCode, CodecError> {
    GridCodec::STANDARD.encode(lat, lon)
}

/// Decode with the standard codec
pub fn decode(code: &str) -> Result<Centroid, CodecError> {
    GridCodec::STANDARD.decode(code)
}
