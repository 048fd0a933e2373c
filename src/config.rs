//! Decoding of the persisted `config` payload into a validated [`BingoConfig`].

use serde::Deserialize;
use serde_json::Value;

use crate::card::{CardDeck, ValuePool};
use crate::error::{BingoError, BingoResult};
use crate::win::WinRules;

pub const CONFIG_VERSION: u64 = 1;
pub const DEFAULT_GRID_SIZE: usize = 5;
pub const MAX_GRID_SIZE: usize = 15;
pub const MAX_NUMBER_OF_CARDS: u32 = 100_000;

fn default_grid_size() -> i64 {
    DEFAULT_GRID_SIZE as i64
}

fn default_true() -> bool {
    true
}

fn default_pool_min() -> i64 {
    1
}

fn default_column_size() -> i64 {
    15
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum PoolPayload {
    Classic {
        #[serde(default = "default_pool_min")]
        min: i64,
        #[serde(default = "default_column_size")]
        column_size: i64,
    },
    Range {
        min: i64,
        max: i64,
    },
    Values {
        values: Vec<i64>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigPayloadV1 {
    number_of_cards: i64,
    #[serde(default = "default_grid_size")]
    grid_size: i64,
    #[serde(default)]
    seed: Option<String>,
    #[serde(default)]
    value_pool: Option<PoolPayload>,
    #[serde(default = "default_true")]
    free_space: bool,
    #[serde(default = "default_true")]
    free_space_counts_as_called: bool,
    #[serde(default = "default_true")]
    diagonals: bool,
}

fn pool_value(field: &str, value: i64) -> BingoResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| BingoError::InvalidConfig(format!("{field} must be a positive integer, got {value}")))
}

impl PoolPayload {
    fn into_pool(self) -> BingoResult<ValuePool> {
        Ok(match self {
            PoolPayload::Classic { min, column_size } => ValuePool::Classic {
                min: pool_value("valuePool.min", min)?,
                column_size: pool_value("valuePool.columnSize", column_size)?,
            },
            PoolPayload::Range { min, max } => ValuePool::Range {
                min: pool_value("valuePool.min", min)?,
                max: pool_value("valuePool.max", max)?,
            },
            PoolPayload::Values { values } => ValuePool::Values(
                values
                    .into_iter()
                    .map(|v| pool_value("valuePool.values", v))
                    .collect::<BingoResult<_>>()?,
            ),
        })
    }
}

/// A validated bingo configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BingoConfig {
    pub number_of_cards: u32,
    pub grid_size: usize,
    pub seed: String,
    pub value_pool: ValuePool,
    pub free_space: bool,
    pub rules: WinRules,
}

impl BingoConfig {
    /// `fallback_seed` (normally the record id) applies when the payload has no seed.
    pub fn from_json(payload: &str, fallback_seed: Option<&str>) -> BingoResult<Self> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| BingoError::InvalidConfig(format!("malformed JSON: {e}")))?;
        let Value::Object(fields) = &value else {
            return Err(BingoError::InvalidConfig("expected a JSON object".into()));
        };

        let version = match fields.get("version") {
            None => CONFIG_VERSION,
            Some(v) => v.as_u64().ok_or_else(|| {
                BingoError::InvalidConfig(format!("version must be an integer, got {v}"))
            })?,
        };

        match version {
            1 => {
                let payload: ConfigPayloadV1 = serde_json::from_value(value)
                    .map_err(|e| BingoError::InvalidConfig(e.to_string()))?;
                Self::from_v1(payload, fallback_seed)
            }
            other => Err(BingoError::InvalidConfig(format!(
                "unsupported config version {other}"
            ))),
        }
    }

    fn from_v1(payload: ConfigPayloadV1, fallback_seed: Option<&str>) -> BingoResult<Self> {
        if payload.number_of_cards <= 0 {
            return Err(BingoError::InvalidConfig(format!(
                "numberOfCards must be positive, got {}",
                payload.number_of_cards
            )));
        }
        let number_of_cards = u32::try_from(payload.number_of_cards)
            .ok()
            .filter(|n| *n <= MAX_NUMBER_OF_CARDS)
            .ok_or_else(|| {
                BingoError::InvalidConfig(format!(
                    "numberOfCards must be at most {MAX_NUMBER_OF_CARDS}, got {}",
                    payload.number_of_cards
                ))
            })?;

        let grid_size = usize::try_from(payload.grid_size)
            .ok()
            .filter(|g| (1..=MAX_GRID_SIZE).contains(g))
            .ok_or_else(|| {
                BingoError::InvalidConfig(format!(
                    "gridSize must be between 1 and {MAX_GRID_SIZE}, got {}",
                    payload.grid_size
                ))
            })?;

        let seed = payload
            .seed
            .filter(|s| !s.is_empty())
            .or_else(|| fallback_seed.map(str::to_owned))
            .ok_or_else(|| BingoError::InvalidConfig("missing seed".into()))?;

        let value_pool = match payload.value_pool {
            Some(pool) => pool.into_pool()?,
            None => ValuePool::default(),
        };
        value_pool.check(grid_size, payload.free_space)?;

        Ok(Self {
            number_of_cards,
            grid_size,
            seed,
            value_pool,
            free_space: payload.free_space,
            rules: WinRules {
                diagonals: payload.diagonals,
                free_space_counts_as_called: payload.free_space_counts_as_called,
            },
        })
    }

    pub fn deck(&self) -> BingoResult<CardDeck> {
        CardDeck::new(
            self.seed.clone(),
            self.number_of_cards,
            self.grid_size,
            self.value_pool.clone(),
            self.free_space,
        )
    }
}

/// What the live view needs from a config: the deck and the house rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfig {
    pub number_of_cards: u32,
    pub cards: CardDeck,
    pub rules: WinRules,
}

impl TryFrom<BingoConfig> for ParsedConfig {
    type Error = BingoError;

    fn try_from(config: BingoConfig) -> BingoResult<Self> {
        Ok(Self {
            number_of_cards: config.number_of_cards,
            cards: config.deck()?,
            rules: config.rules,
        })
    }
}

/// Parses a payload that must carry its own seed.
pub fn parse_bingo_config(payload: &str) -> BingoResult<ParsedConfig> {
    parse_bingo_config_with_seed(payload, None)
}

pub fn parse_bingo_config_with_seed(
    payload: &str,
    fallback_seed: Option<&str>,
) -> BingoResult<ParsedConfig> {
    BingoConfig::from_json(payload, fallback_seed)?.try_into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_payload_uses_defaults() {
        let config = BingoConfig::from_json(r#"{"numberOfCards": 300, "seed": "event-42"}"#, None)
            .expect("parse");
        assert_eq!(config.number_of_cards, 300);
        assert_eq!(config.grid_size, 5);
        assert_eq!(config.value_pool, ValuePool::default());
        assert!(config.free_space);
        assert_eq!(config.rules, WinRules::default());
    }

    #[test]
    fn test_full_payload() {
        let payload = r#"{
            "version": 1,
            "numberOfCards": 12,
            "gridSize": 4,
            "seed": "goats",
            "valuePool": { "kind": "range", "min": 10, "max": 40 },
            "freeSpace": false,
            "freeSpaceCountsAsCalled": false,
            "diagonals": false
        }"#;
        let config = BingoConfig::from_json(payload, None).expect("parse");
        assert_eq!(config.grid_size, 4);
        assert_eq!(config.value_pool, ValuePool::Range { min: 10, max: 40 });
        assert!(!config.free_space);
        assert!(!config.rules.diagonals);
        assert!(!config.rules.free_space_counts_as_called);
    }

    #[test]
    fn test_values_pool_payload() {
        let payload = r#"{"numberOfCards": 1, "gridSize": 2, "seed": "s",
            "valuePool": {"kind": "values", "values": [4, 8, 15, 16, 23, 42]}}"#;
        let config = BingoConfig::from_json(payload, None).expect("parse");
        assert_eq!(config.value_pool, ValuePool::Values(vec![4, 8, 15, 16, 23, 42]));
    }

    #[test]
    fn test_fallback_seed() {
        let config = BingoConfig::from_json(r#"{"numberOfCards": 3}"#, Some("record-9"))
            .expect("parse");
        assert_eq!(config.seed, "record-9");

        let own = BingoConfig::from_json(r#"{"numberOfCards": 3, "seed": "mine"}"#, Some("record-9"))
            .expect("parse");
        assert_eq!(own.seed, "mine");
    }

    #[test]
    fn test_missing_seed_without_fallback() {
        let err = parse_bingo_config(r#"{"numberOfCards": 3, "seed": ""}"#).unwrap_err();
        assert!(matches!(err, BingoError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_payloads() {
        for payload in [
            "",
            "[]",
            "{",
            r#"{"seed": "x"}"#,
            r#"{"numberOfCards": "ten", "seed": "x"}"#,
            r#"{"numberOfCards": 0, "seed": "x"}"#,
            r#"{"numberOfCards": -5, "seed": "x"}"#,
            r#"{"numberOfCards": 2.5, "seed": "x"}"#,
            r#"{"numberOfCards": 5000000000, "seed": "x"}"#,
            r#"{"numberOfCards": 5, "gridSize": 0, "seed": "x"}"#,
            r#"{"numberOfCards": 5, "gridSize": 16, "seed": "x"}"#,
            r#"{"numberOfCards": 5, "seed": "x", "version": 2}"#,
            r#"{"numberOfCards": 5, "seed": "x", "version": "1"}"#,
            r#"{"numberOfCards": 5, "seed": "x", "valuePool": {"kind": "dice"}}"#,
            r#"{"numberOfCards": 5, "seed": "x", "valuePool": {"kind": "range", "min": 0, "max": 80}}"#,
            r#"{"numberOfCards": 5, "seed": "x", "valuePool": {"kind": "range", "min": 80, "max": 1}}"#,
            r#"{"numberOfCards": 5, "seed": "x", "freeSpace": "yes"}"#,
        ] {
            let err = parse_bingo_config(payload).unwrap_err();
            assert!(
                matches!(err, BingoError::InvalidConfig(_)),
                "{payload:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_number_of_cards_is_capped() {
        for count in [4_000_000_000_i64, i64::from(MAX_NUMBER_OF_CARDS) + 1] {
            let payload = format!(r#"{{"numberOfCards": {count}, "seed": "x"}}"#);
            let err = parse_bingo_config(&payload).unwrap_err();
            assert!(matches!(err, BingoError::InvalidConfig(_)), "{count} gave {err:?}");
        }

        let payload = format!(r#"{{"numberOfCards": {MAX_NUMBER_OF_CARDS}, "seed": "x"}}"#);
        let parsed = parse_bingo_config(&payload).expect("parse");
        assert_eq!(parsed.cards.len(), MAX_NUMBER_OF_CARDS);
    }

    #[test]
    fn test_small_pool_is_reported() {
        let payload = r#"{"numberOfCards": 5, "seed": "x",
            "valuePool": {"kind": "range", "min": 1, "max": 20}}"#;
        let err = parse_bingo_config(payload).unwrap_err();
        assert!(matches!(
            err,
            BingoError::InsufficientValuePool {
                needed: 24,
                available: 20
            }
        ));
    }

    #[test]
    fn test_parsed_config_deck_is_indexable() {
        let parsed = parse_bingo_config(r#"{"numberOfCards": 900, "seed": "event-42"}"#)
            .expect("parse");
        assert_eq!(parsed.number_of_cards, 900);
        assert_eq!(parsed.cards.len(), 900);
        let card = parsed.cards.card(899).expect("last card");
        assert_eq!(card.index(), 899);
        assert!(parsed.cards.card(900).is_none());
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let parsed = parse_bingo_config(r#"{"numberOfCards": 2, "seed": "x", "theme": "goats"}"#);
        assert!(parsed.is_ok());
    }
}
