use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::error::{BingoError, BingoResult};
use crate::seed::{WHOLE_POOL_STREAM, card_rng, sample_indices};

/// Value stored in the free-space cell. Pools never contain it.
pub const FREE_SPACE: u32 = 0;

/// Upper bound on the values a pool (or one classic column) may hold.
pub const MAX_POOL_SIZE: usize = 100_000;

/// The universe of callable values for an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePool {
    /// Column `c` draws from `min + c*column_size ..`, so the default is 1-15 / 16-30 / ... / 61-75.
    Classic { min: u32, column_size: u32 },
    Range { min: u32, max: u32 },
    Values(Vec<u32>),
}

impl Default for ValuePool {
    fn default() -> Self {
        ValuePool::Classic {
            min: 1,
            column_size: 15,
        }
    }
}

impl ValuePool {
    pub fn column_range(&self, column: usize) -> Option<RangeInclusive<u32>> {
        match *self {
            ValuePool::Classic { min, column_size } => {
                let start = u32::try_from(column)
                    .ok()?
                    .checked_mul(column_size)?
                    .checked_add(min)?;
                let end = start.checked_add(column_size.checked_sub(1)?)?;
                Some(start..=end)
            }
            _ => None,
        }
    }

    // well formed and large enough for a `grid_size` card
    pub fn check(&self, grid_size: usize, free_space: bool) -> BingoResult<()> {
        let center = free_center(grid_size, free_space);
        match self {
            ValuePool::Classic { min, column_size } => {
                if *min == FREE_SPACE {
                    return Err(BingoError::InvalidConfig(
                        "classic pool must start at 1 or above".into(),
                    ));
                }
                if *column_size == 0 {
                    return Err(BingoError::InvalidConfig(
                        "classic pool column size must be positive".into(),
                    ));
                }
                if grid_size > 0 && self.column_range(grid_size - 1).is_none() {
                    return Err(BingoError::InvalidConfig(
                        "classic pool exceeds the value range".into(),
                    ));
                }
                let available = *column_size as usize;
                if available > MAX_POOL_SIZE {
                    return Err(BingoError::InvalidConfig(format!(
                        "classic column size {available} exceeds {MAX_POOL_SIZE}"
                    )));
                }
                // only the center column loses a cell to the free space
                let needed = (0..grid_size)
                    .map(|column| column_needed(grid_size, center, column))
                    .max()
                    .unwrap_or(0);
                if available < needed {
                    return Err(BingoError::InsufficientValuePool { needed, available });
                }
            }
            ValuePool::Range { min, max } => {
                if *min == FREE_SPACE {
                    return Err(BingoError::InvalidConfig(
                        "range pool must start at 1 or above".into(),
                    ));
                }
                if min > max {
                    return Err(BingoError::InvalidConfig(format!(
                        "range pool min {min} is above max {max}"
                    )));
                }
                let available = (max - min) as usize + 1;
                if available > MAX_POOL_SIZE {
                    return Err(BingoError::InvalidConfig(format!(
                        "range pool of {available} values exceeds {MAX_POOL_SIZE}"
                    )));
                }
                let needed = cells_to_draw(grid_size, center);
                if available < needed {
                    return Err(BingoError::InsufficientValuePool { needed, available });
                }
            }
            ValuePool::Values(values) => {
                if values.contains(&FREE_SPACE) {
                    return Err(BingoError::InvalidConfig(
                        "pool values must be 1 or above".into(),
                    ));
                }
                let mut seen = HashSet::with_capacity(values.len());
                if let Some(dup) = values.iter().find(|v| !seen.insert(**v)) {
                    return Err(BingoError::InvalidConfig(format!(
                        "pool value {dup} appears more than once"
                    )));
                }
                if values.len() > MAX_POOL_SIZE {
                    return Err(BingoError::InvalidConfig(format!(
                        "pool of {} values exceeds {MAX_POOL_SIZE}",
                        values.len()
                    )));
                }
                let needed = cells_to_draw(grid_size, center);
                if values.len() < needed {
                    return Err(BingoError::InsufficientValuePool {
                        needed,
                        available: values.len(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Value at `offset` of a whole pool. Classic pools have none.
    fn nth_value(&self, offset: usize) -> Option<u32> {
        match self {
            ValuePool::Classic { .. } => None,
            ValuePool::Range { min, .. } => Some(min + offset as u32),
            ValuePool::Values(values) => values.get(offset).copied(),
        }
    }

    fn whole_pool_len(&self) -> usize {
        match self {
            ValuePool::Classic { .. } => 0,
            ValuePool::Range { min, max } => (max - min) as usize + 1,
            ValuePool::Values(values) => values.len(),
        }
    }
}

fn free_center(grid_size: usize, free_space: bool) -> Option<usize> {
    (free_space && grid_size % 2 == 1).then(|| (grid_size / 2) * grid_size + grid_size / 2)
}

fn cells_to_draw(grid_size: usize, center: Option<usize>) -> usize {
    grid_size * grid_size - usize::from(center.is_some())
}

fn column_needed(grid_size: usize, center: Option<usize>, column: usize) -> usize {
    match center {
        Some(cell) if cell % grid_size == column => grid_size - 1,
        _ => grid_size,
    }
}

/// One generated card, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoCard {
    index: u32,
    grid_size: usize,
    cells: Vec<u32>,
}

impl BingoCard {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    pub fn cell(&self, row: usize, column: usize) -> u32 {
        self.cells[row * self.grid_size + column]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.grid_size.max(1))
    }

    pub fn is_free(&self, cell: usize) -> bool {
        self.cells[cell] == FREE_SPACE
    }

    /// Drawn values, free space excluded.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.iter().copied().filter(|v| *v != FREE_SPACE)
    }
}

/// Generates card `card_index` for an event. Same inputs, same grid, on any machine.
pub fn generate_card(
    seed: &str,
    card_index: u32,
    grid_size: usize,
    pool: &ValuePool,
    free_space: bool,
) -> BingoResult<BingoCard> {
    if grid_size == 0 {
        return Err(BingoError::InvalidConfig("grid size must be positive".into()));
    }
    pool.check(grid_size, free_space)?;
    Ok(layout_card(seed, card_index, grid_size, pool, free_space))
}

/// Fills a card from a pool that has already passed [`ValuePool::check`].
fn layout_card(
    seed: &str,
    card_index: u32,
    grid_size: usize,
    pool: &ValuePool,
    free_space: bool,
) -> BingoCard {
    let center = free_center(grid_size, free_space);
    let mut cells = vec![FREE_SPACE; grid_size * grid_size];

    if let ValuePool::Classic { column_size, .. } = *pool {
        for column in 0..grid_size {
            let Some(range) = pool.column_range(column) else {
                continue;
            };
            let mut rng = card_rng(seed, card_index, column as u64);
            let needed = column_needed(grid_size, center, column);
            let offsets = sample_indices(&mut rng, column_size as usize, needed);
            let slots = (0..grid_size)
                .map(|row| row * grid_size + column)
                .filter(|cell| Some(*cell) != center);
            for (cell, offset) in slots.zip(offsets) {
                cells[cell] = range.start() + offset as u32;
            }
        }
    } else {
        let mut rng = card_rng(seed, card_index, WHOLE_POOL_STREAM);
        let needed = cells_to_draw(grid_size, center);
        let offsets = sample_indices(&mut rng, pool.whole_pool_len(), needed);
        let slots = (0..cells.len()).filter(|cell| Some(*cell) != center);
        for (cell, offset) in slots.zip(offsets) {
            if let Some(value) = pool.nth_value(offset) {
                cells[cell] = value;
            }
        }
    }

    BingoCard {
        index: card_index,
        grid_size,
        cells,
    }
}

/// Every card of an event, generated on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDeck {
    seed: String,
    number_of_cards: u32,
    grid_size: usize,
    pool: ValuePool,
    free_space: bool,
}

impl CardDeck {
    pub fn new(
        seed: impl Into<String>,
        number_of_cards: u32,
        grid_size: usize,
        pool: ValuePool,
        free_space: bool,
    ) -> BingoResult<Self> {
        if grid_size == 0 {
            return Err(BingoError::InvalidConfig("grid size must be positive".into()));
        }
        pool.check(grid_size, free_space)?;
        Ok(Self {
            seed: seed.into(),
            number_of_cards,
            grid_size,
            pool,
            free_space,
        })
    }

    pub fn len(&self) -> u32 {
        self.number_of_cards
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_cards == 0
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Card `index`, or `None` past the end of the deck.
    pub fn card(&self, index: u32) -> Option<BingoCard> {
        (index < self.number_of_cards).then(|| {
            layout_card(&self.seed, index, self.grid_size, &self.pool, self.free_space)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = BingoCard> + '_ {
        (0..self.number_of_cards)
            .map(|index| layout_card(&self.seed, index, self.grid_size, &self.pool, self.free_space))
    }

    pub fn generate_all(&self) -> Vec<BingoCard> {
        self.iter().collect()
    }
}
