//! Deterministic bingo cards and live win detection.

pub mod board_renderer;
pub mod card;
pub mod config;
pub mod error;
pub mod live;
pub mod play_data;
pub mod seed;
pub mod server;
pub mod store;
pub mod win;

pub use card::{BingoCard, CardDeck, FREE_SPACE, ValuePool, generate_card};
pub use config::{BingoConfig, ParsedConfig, parse_bingo_config, parse_bingo_config_with_seed};
pub use error::{BingoError, BingoResult};
pub use live::{BingoLiveData, BingoRecord, compute_live_data};
pub use play_data::{CalledValues, parse_bingo_play_data, serialize_bingo_play_data};
pub use store::{BingoStore, DirectoryStore, InMemoryStore};
pub use win::{Line, WinRules, find_cards_with_bingo, winning_lines};
