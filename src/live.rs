use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ParsedConfig, parse_bingo_config_with_seed};
use crate::error::BingoResult;
use crate::play_data::{CalledValues, parse_bingo_play_data};
use crate::win::find_cards_with_bingo;

fn default_active() -> bool {
    true
}

/// A bingo record; `config` and `play_data` are opaque JSON strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BingoRecord {
    pub id: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub config: String,
    #[serde(default)]
    pub play_data: Option<String>,
}

impl BingoRecord {
    /// Config decoded with the record id as the fallback seed.
    pub fn parsed_config(&self) -> BingoResult<ParsedConfig> {
        parse_bingo_config_with_seed(&self.config, Some(&self.id))
    }

    pub fn called_values(&self) -> BingoResult<CalledValues> {
        match &self.play_data {
            Some(payload) => parse_bingo_play_data(payload),
            None => Ok(CalledValues::new()),
        }
    }
}

/// The response body of the live bingo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BingoLiveData {
    pub number_of_cards: u32,
    pub called_values: Vec<u32>,
    pub cards_with_bingo: Vec<u32>,
}

impl BingoLiveData {
    pub fn compute(config: &ParsedConfig, called: &CalledValues) -> Self {
        Self {
            number_of_cards: config.number_of_cards,
            called_values: called.as_slice().to_vec(),
            cards_with_bingo: find_cards_with_bingo(config.cards.iter(), called, config.rules),
        }
    }
}

/// Recomputes the live view of `record` from scratch.
pub fn compute_live_data(record: &BingoRecord) -> BingoResult<BingoLiveData> {
    let config = record.parsed_config()?;
    let called = record.called_values()?;
    let live = BingoLiveData::compute(&config, &called);
    debug!(
        bingo = %record.id,
        cards = live.number_of_cards,
        called = live.called_values.len(),
        winners = live.cards_with_bingo.len(),
        "computed live bingo data"
    );
    Ok(live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BingoError;

    fn record(config: &str, play_data: Option<&str>) -> BingoRecord {
        BingoRecord {
            id: "bingo-1".into(),
            slug: Some("spring-fundraiser".into()),
            active: true,
            config: config.into(),
            play_data: play_data.map(str::to_owned),
        }
    }

    #[test]
    fn test_fresh_bingo_has_no_winners() {
        let live = compute_live_data(&record(
            r#"{"numberOfCards": 100, "freeSpace": false}"#,
            None,
        ))
        .expect("live");
        assert_eq!(live.number_of_cards, 100);
        assert!(live.called_values.is_empty());
        assert!(live.cards_with_bingo.is_empty());
    }

    #[test]
    fn test_winners_follow_the_called_values() {
        let rec = record(r#"{"numberOfCards": 50, "seed": "event-42"}"#, None);
        let config = rec.parsed_config().expect("config");
        let card = config.cards.card(17).expect("card");
        let row: Vec<String> = card.rows().next().expect("row").iter().map(u32::to_string).collect();
        let play_data = format!("[{}]", row.join(","));

        let live = compute_live_data(&record(&rec.config, Some(&play_data))).expect("live");
        assert!(live.cards_with_bingo.contains(&17));
        assert!(live.cards_with_bingo.iter().all(|i| *i < 50));
        assert!(live.cards_with_bingo.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(live.called_values.len(), 5);
    }

    #[test]
    fn test_record_id_seeds_cards() {
        let a = record(r#"{"numberOfCards": 5}"#, None);
        let mut b = a.clone();
        b.id = "bingo-2".into();
        let card_a = a.parsed_config().expect("a").cards.card(0);
        let card_b = b.parsed_config().expect("b").cards.card(0);
        assert_ne!(card_a, card_b);
    }

    #[test]
    fn test_malformed_fields_fail_independently() {
        let bad_config = compute_live_data(&record("{oops", Some("[1]"))).unwrap_err();
        assert!(matches!(bad_config, BingoError::InvalidConfig(_)));

        let bad_play = compute_live_data(&record(r#"{"numberOfCards": 5}"#, Some("[\"b4\"]")))
            .unwrap_err();
        assert!(matches!(bad_play, BingoError::InvalidPlayData(_)));
    }

    #[test]
    fn test_live_data_wire_format() {
        let live = BingoLiveData {
            number_of_cards: 3,
            called_values: vec![7, 2],
            cards_with_bingo: vec![1],
        };
        let json = serde_json::to_value(&live).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "numberOfCards": 3,
                "calledValues": [7, 2],
                "cardsWithBingo": [1]
            })
        );
    }

    #[test]
    fn test_record_wire_format() {
        let rec: BingoRecord = serde_json::from_str(
            r#"{"id": "b1", "config": "{\"numberOfCards\": 2}", "playData": null}"#,
        )
        .expect("record");
        assert!(rec.active);
        assert_eq!(rec.slug, None);
        assert_eq!(rec.play_data, None);
    }
}
