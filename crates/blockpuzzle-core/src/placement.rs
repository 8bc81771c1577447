//! Placement legality and application.

use crate::board::Board;
use crate::error::GameError;
use crate::pieces::{CellOffset, PieceShape};

/// Board coordinate an offset lands on, `None` if it overflows `i32`
fn target(anchor_x: i32, anchor_y: i32, offset: &CellOffset) -> Option<(i32, i32)> {
    Some((
        anchor_x.checked_add(offset.x)?,
        anchor_y.checked_add(offset.y)?,
    ))
}

/// Whether `shape` fits with its anchor at (`anchor_x`, `anchor_y`)
///
/// Every covered cell must be on the board and unoccupied. Stops at the
/// first cell that fails.
pub fn can_place(shape: &PieceShape, anchor_x: i32, anchor_y: i32, board: &Board) -> bool {
    shape.offsets().iter().all(|offset| match target(anchor_x, anchor_y, offset) {
        Some((x, y)) => board.in_bounds(x, y) && !board.is_occupied(x, y).unwrap_or(true),
        None => false,
    })
}

/// Occupy every cell `shape` covers at the given anchor
///
/// Callers must have checked [`can_place`] first; no overlap check is made
/// here. Returns the row-major indices of the cells that were filled.
pub fn apply_placement(
    shape: &PieceShape,
    anchor_x: i32,
    anchor_y: i32,
    board: &mut Board,
) -> Result<Vec<usize>, GameError> {
    debug_assert!(can_place(shape, anchor_x, anchor_y, board));

    let mut placed = Vec::with_capacity(shape.len());
    for offset in shape.offsets() {
        let (x, y) = target(anchor_x, anchor_y, offset).ok_or(GameError::OutOfBounds {
            x: anchor_x,
            y: anchor_y,
            size: board.size(),
        })?;
        board.set_occupied(x, y, true)?;
        placed.push(board.cell_index(x, y) as usize);
    }
    Ok(placed)
}

/// Every anchor where `shape` can be placed, in row-major order
pub fn legal_anchors<'a>(
    shape: &'a PieceShape,
    board: &'a Board,
) -> impl Iterator<Item = (i32, i32)> + 'a {
    let size = board.size() as i32;
    (0..size)
        .flat_map(move |y| (0..size).map(move |x| (x, y)))
        .filter(move |&(x, y)| can_place(shape, x, y, board))
}

/// Whether `shape` fits anywhere on the board
pub fn has_legal_anchor(shape: &PieceShape, board: &Board) -> bool {
    legal_anchors(shape, board).next().is_some()
}
