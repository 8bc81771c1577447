//! The piece catalog.
//!
//! Every piece is authored as a small ASCII pattern: `X` marks an occupied
//! cell, anything else is empty, rows are separated by `\n`. Patterns are
//! parsed once into offset lists and shared for the life of the process.

use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Index of a shape in the catalog
pub type PieceId = usize;

/// Character marking an occupied cell in a piece pattern
pub const MARKER: char = 'X';

/// Largest width or height of any shape in the catalog
pub const MAX_NUM_PIECE_BLOCKS: usize = 5;

/// The shipped piece patterns, in catalog order
pub const PIECE_PATTERNS: [&str; 19] = [
    "XXXXX",                // 0: 5-block horizontal line
    "X\nX\nX\nX\nX",        // 1: 5-block vertical line
    "XXXX",                 // 2: 4-block horizontal line
    "X\nX\nX\nX",           // 3: 4-block vertical line
    "XXX\nXXX\nXXX",        // 4: 3x3 square
    "X__\nX__\nXXX",        // 5: big L
    "__X\n__X\nXXX",        // 6
    "XXX\nX__\nX__",        // 7
    "XXX\n__X\n__X",        // 8
    "X\nX\nX",              // 9: 3-block vertical line
    "XXX",                  // 10: 3-block horizontal line
    "X_\nXX",               // 11: small L
    "_X\nXX",               // 12
    "XX\nX_",               // 13
    "XX\n_X",               // 14
    "X\nX",                 // 15: 2-block vertical line
    "XX",                   // 16: 2-block horizontal line
    "XX\nXX",               // 17: 2x2 square
    "X",                    // 18: single block
];

/// Number of shapes in the standard catalog
pub const CATALOG_SIZE: usize = PIECE_PATTERNS.len();

/// A cell position relative to a piece's anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellOffset {
    pub x: i32,
    pub y: i32,
}

impl CellOffset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An immutable piece shape: the cells it covers relative to its anchor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceShape {
    offsets: Vec<CellOffset>,
}

impl PieceShape {
    /// Parse a pattern, reading rows top to bottom and columns left to right
    pub fn parse(pattern: &str) -> Self {
        let offsets = pattern
            .split('\n')
            .enumerate()
            .flat_map(|(y, line)| {
                line.chars()
                    .enumerate()
                    .filter(|&(_, c)| c == MARKER)
                    .map(move |(x, _)| CellOffset::new(x as i32, y as i32))
            })
            .collect();

        Self { offsets }
    }

    /// Offsets in pattern reading order
    pub fn offsets(&self) -> &[CellOffset] {
        &self.offsets
    }

    /// Number of cells the piece covers
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Width of the bounding box
    pub fn width(&self) -> usize {
        self.offsets
            .iter()
            .map(|o| o.x as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Height of the bounding box
    pub fn height(&self) -> usize {
        self.offsets
            .iter()
            .map(|o| o.y as usize + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Ordered, read-only list of piece shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    shapes: Vec<PieceShape>,
}

impl Catalog {
    /// Build a catalog from patterns
    pub fn from_patterns(patterns: &[&str]) -> Self {
        Self {
            shapes: patterns.iter().map(|p| PieceShape::parse(p)).collect(),
        }
    }

    /// The shared standard catalog, parsed on first use
    pub fn standard() -> &'static Catalog {
        static CATALOG: OnceLock<Catalog> = OnceLock::new();
        CATALOG.get_or_init(|| Catalog::from_patterns(&PIECE_PATTERNS))
    }

    /// Look up a shape by index
    pub fn shape_for(&self, index: PieceId) -> Result<&PieceShape, GameError> {
        self.shapes.get(index).ok_or(GameError::InvalidIndex {
            index,
            len: self.shapes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceShape> {
        self.shapes.iter()
    }
}

/// Shape lookup in the standard catalog
pub fn shape_for(index: PieceId) -> Result<&'static PieceShape, GameError> {
    Catalog::standard().shape_for(index)
}

/// Number of shapes in the standard catalog
pub fn catalog_size() -> usize {
    Catalog::standard().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(index: PieceId) -> Vec<(i32, i32)> {
        shape_for(index)
            .unwrap()
            .offsets()
            .iter()
            .map(|o| (o.x, o.y))
            .collect()
    }

    #[test]
    fn test_catalog_has_19_shapes() {
        assert_eq!(catalog_size(), 19);
        assert_eq!(CATALOG_SIZE, 19);
    }

    #[test]
    fn test_horizontal_line_offsets() {
        assert_eq!(offsets(0), vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_vertical_line_offsets() {
        assert_eq!(offsets(1), vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
    }

    #[test]
    fn test_underscores_are_empty() {
        // "__X\n__X\nXXX"
        assert_eq!(
            offsets(6),
            vec![(2, 0), (2, 1), (0, 2), (1, 2), (2, 2)]
        );
        // "_X\nXX"
        assert_eq!(offsets(12), vec![(1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn test_parsing_is_repeatable() {
        for pattern in PIECE_PATTERNS {
            assert_eq!(PieceShape::parse(pattern), PieceShape::parse(pattern));
        }
    }

    #[test]
    fn test_shape_dimensions() {
        let square = shape_for(4).unwrap();
        assert_eq!(square.len(), 9);
        assert_eq!((square.width(), square.height()), (3, 3));

        let single = shape_for(18).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!((single.width(), single.height()), (1, 1));
    }

    #[test]
    fn test_no_shape_exceeds_max_blocks() {
        for shape in Catalog::standard().iter() {
            assert!(!shape.is_empty());
            assert!(shape.width() <= MAX_NUM_PIECE_BLOCKS);
            assert!(shape.height() <= MAX_NUM_PIECE_BLOCKS);
        }
    }

    #[test]
    fn test_invalid_index() {
        assert_eq!(
            shape_for(19),
            Err(GameError::InvalidIndex { index: 19, len: 19 })
        );
    }
}
