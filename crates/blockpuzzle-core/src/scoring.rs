//! Scoring rules.

/// Points for any successful placement
pub const PLACEMENT_POINTS: u64 = 5;

/// Base points per line, multiplied by the number of lines cleared squared
pub const LINE_CLEAR_POINTS: u64 = 20;

/// Points for clearing `lines` rows and columns in one placement
pub fn line_clear_points(lines: u32) -> u64 {
    let lines = u64::from(lines);
    LINE_CLEAR_POINTS * lines * lines
}
