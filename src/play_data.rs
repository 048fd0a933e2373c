use std::collections::HashSet;

use serde_json::{Value, json};

use crate::error::{BingoError, BingoResult};

/// Called values in first-call order, each at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalledValues {
    order: Vec<u32>,
    seen: HashSet<u32>,
}

impl CalledValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a call. Returns `false` if the value was already called.
    pub fn push(&mut self, value: u32) -> bool {
        if self.seen.insert(value) {
            self.order.push(value);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.seen.contains(&value)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.order.iter().copied()
    }
}

impl FromIterator<u32> for CalledValues {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut called = CalledValues::new();
        for value in iter {
            called.push(value);
        }
        called
    }
}

/// Accepts `[12, 5, 61]` or `{"calledValues": [12, 5, 61]}`; repeats keep the first call.
pub fn parse_bingo_play_data(payload: &str) -> BingoResult<CalledValues> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| BingoError::InvalidPlayData(format!("malformed JSON: {e}")))?;

    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(fields) => match fields.get("calledValues") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(BingoError::InvalidPlayData(
                    "calledValues must be an array".into(),
                ));
            }
            None => {
                return Err(BingoError::InvalidPlayData(
                    "missing calledValues field".into(),
                ));
            }
        },
        _ => {
            return Err(BingoError::InvalidPlayData(
                "expected an array or an object".into(),
            ));
        }
    };

    let mut called = CalledValues::new();
    for (position, entry) in entries.iter().enumerate() {
        let number = entry
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                BingoError::InvalidPlayData(format!(
                    "entry {position} is not a positive integer: {entry}"
                ))
            })?;
        called.push(number);
    }
    Ok(called)
}

pub fn serialize_bingo_play_data(called: &CalledValues) -> String {
    json!({ "calledValues": called.as_slice() }).to_string()
}
