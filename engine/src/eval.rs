//! Static evaluation and successor generation.
use crate::board::{Board, Cell, Player, SEGMENT};

/// Weight of a window by how many of its cells one side holds.
pub const WEIGHTS: [i32; SEGMENT + 1] = [0, 1, 4, 24, 1000];

/// Scores `board` from `player`'s point of view.
///
/// Every window free of adversary discs counts towards `player`, bucketed by
/// how many discs `player` has in it; the adversary is tallied the same way and
/// the two weighted sums are subtracted. Open threes and completed lines
/// dominate, so search leans towards forcing wins and blocking near-wins.
pub fn evaluate(player: Player, board: &Board) -> i32 {
    let mut mine = [0i32; SEGMENT + 1];
    let mut theirs = [0i32; SEGMENT + 1];

    for window in board.windows().iter() {
        let mut own = 0;
        let mut other = 0;
        for &(row, col) in window {
            match board.cell(row, col) {
                Cell::Disc(p) if p == player => own += 1,
                Cell::Disc(_) => other += 1,
                Cell::Empty => {}
            }
        }
        if other == 0 {
            mine[own] += 1;
        }
        if own == 0 {
            theirs[other] += 1;
        }
    }

    weighted(&mine) - weighted(&theirs)
}

fn weighted(buckets: &[i32; SEGMENT + 1]) -> i32 {
    buckets.iter().zip(WEIGHTS).map(|(count, weight)| count * weight).sum()
}

/// One fresh board per placeable column, left to right, with `player`'s disc
/// dropped in. Empty iff the board is full.
pub fn children(player: Player, board: &Board) -> Vec<(usize, Board)> {
    board
        .legal_columns()
        .into_iter()
        .filter_map(|col| {
            let mut child = board.clone();
            child.place(player, col).ok()?;
            Some((col, child))
        })
        .collect()
}
