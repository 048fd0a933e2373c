//! Win detection: a card has a bingo when any winning line is fully covered.

use std::borrow::Borrow;

use serde::Serialize;

use crate::card::BingoCard;
use crate::play_data::CalledValues;

/// House rules for what counts as a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinRules {
    /// Both full diagonals are winning lines.
    pub diagonals: bool,
    /// The free-space cell is always covered.
    pub free_space_counts_as_called: bool,
}

impl Default for WinRules {
    fn default() -> Self {
        Self {
            diagonals: true,
            free_space_counts_as_called: true,
        }
    }
}

/// A winning line on a square card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
pub enum Line {
    Row(usize),
    Column(usize),
    Diagonal,
    AntiDiagonal,
}

impl Line {
    /// Cell indices (row-major) this line covers.
    pub fn cells(self, grid_size: usize) -> impl Iterator<Item = usize> {
        let (start, step) = match self {
            Line::Row(row) => (row * grid_size, 1),
            Line::Column(column) => (column, grid_size),
            Line::Diagonal => (0, grid_size + 1),
            Line::AntiDiagonal => (grid_size.saturating_sub(1), grid_size.saturating_sub(1)),
        };
        (0..grid_size).map(move |k| start + k * step)
    }
}

/// All lines that can win on a `grid_size` card under `rules`.
pub fn winning_patterns(grid_size: usize, rules: WinRules) -> Vec<Line> {
    let mut lines: Vec<Line> = (0..grid_size)
        .map(Line::Row)
        .chain((0..grid_size).map(Line::Column))
        .collect();
    if rules.diagonals && grid_size > 0 {
        lines.push(Line::Diagonal);
        lines.push(Line::AntiDiagonal);
    }
    lines
}

pub fn is_covered(card: &BingoCard, cell: usize, called: &CalledValues, rules: WinRules) -> bool {
    if card.is_free(cell) {
        rules.free_space_counts_as_called
    } else {
        called.contains(card.cells()[cell])
    }
}

/// Lines of `card` that are complete.
pub fn winning_lines(card: &BingoCard, called: &CalledValues, rules: WinRules) -> Vec<Line> {
    let grid_size = card.grid_size();
    winning_patterns(grid_size, rules)
        .into_iter()
        .filter(|line| {
            line.cells(grid_size)
                .all(|cell| is_covered(card, cell, called, rules))
        })
        .collect()
}

pub fn has_bingo(card: &BingoCard, called: &CalledValues, rules: WinRules) -> bool {
    let grid_size = card.grid_size();
    winning_patterns(grid_size, rules).into_iter().any(|line| {
        line.cells(grid_size)
            .all(|cell| is_covered(card, cell, called, rules))
    })
}

/// Indices of every card with at least one complete line, ascending.
pub fn find_cards_with_bingo<I>(cards: I, called: &CalledValues, rules: WinRules) -> Vec<u32>
where
    I: IntoIterator,
    I::Item: Borrow<BingoCard>,
{
    let mut winners: Vec<u32> = cards
        .into_iter()
        .filter_map(|card| {
            let card: &BingoCard = card.borrow();
            has_bingo(card, called, rules).then(|| card.index())
        })
        .collect();
    winners.sort_unstable();
    winners.dedup();
    winners
}
