//! Matching predicates attached to rules.

use crate::error::RuleError;
use crate::event::EventKey;
use serde::Deserialize;

/// Data-byte constraint of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSelector {
    Unconstrained,
    /// Matches when `data1 == value`.
    Exact(u8),
    /// Matches when `(data1, data2) == (v1, v2)`.
    ExactPair(u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub status: u8,
    /// 1-16. `None` matches any channel.
    pub channel: Option<u8>,
    pub data: DataSelector,
}

impl Selector {
    pub fn new(status: u8) -> Self {
        Self {
            status,
            channel: None,
            data: DataSelector::Unconstrained,
        }
    }

    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn data(mut self, data: DataSelector) -> Self {
        self.data = data;
        self
    }

    /// Status is assumed equal: tables bucket rules by status before calling this.
    #[inline]
    pub fn matches(&self, key: &EventKey) -> bool {
        if let Some(channel) = self.channel {
            if key.channel != Some(channel) {
                return false;
            }
        }

        if key.data1.is_none() && key.data2.is_none() {
            return true;
        }

        match self.data {
            DataSelector::Unconstrained => true,
            DataSelector::Exact(value) => key.data1 == Some(value),
            DataSelector::ExactPair(v1, v2) => key.data1 == Some(v1) && key.data2 == Some(v2),
        }
    }
}

/// `data` as written in a rule file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DataSpec {
    Single(i64),
    Sequence(Vec<i64>),
    /// Whitespace-separated integers, e.g. `"14 3"`.
    Text(String),
}

impl DataSpec {
    pub fn resolve(&self) -> Result<DataSelector, RuleError> {
        let values = match self {
            DataSpec::Single(v) => vec![*v],
            DataSpec::Sequence(values) => values.clone(),
            DataSpec::Text(text) => text
                .split_whitespace()
                .map(|part| {
                    part.parse::<i64>()
                        .map_err(|_| RuleError::InvalidData(format!("'{}' is not an integer", part)))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };

        let bytes = values
            .iter()
            .map(|&v| {
                u8::try_from(v)
                    .ok()
                    .filter(|b| *b <= 0x7F)
                    .ok_or_else(|| RuleError::InvalidData(format!("{} is not a data byte (0-127)", v)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match bytes.as_slice() {
            [v] => Ok(DataSelector::Exact(*v)),
            [v1, v2] => Ok(DataSelector::ExactPair(*v1, *v2)),
            _ => Err(RuleError::InvalidData(format!(
                "expected one or two values, got {}",
                bytes.len()
            ))),
        }
    }
}

/// Channel constraint as written in a rule file.
pub fn resolve_channel(channel: Option<i64>) -> Result<Option<u8>, RuleError> {
    match channel {
        None => Ok(None),
        Some(ch @ 1..=16) => Ok(Some(ch as u8)),
        Some(ch) => Err(RuleError::ChannelOutOfRange(ch)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(channel: Option<u8>, data1: Option<u8>, data2: Option<u8>) -> EventKey {
        EventKey {
            status: 0xB0,
            channel,
            data1,
            data2,
        }
    }

    #[test]
    fn test_unconstrained_matches_everything_on_channel() {
        let sel = Selector::new(0xB0).channel(16);
        assert!(sel.matches(&key(Some(16), Some(1), Some(2))));
        assert!(sel.matches(&key(Some(16), Some(127), None)));
        assert!(sel.matches(&key(Some(16), None, None)));
        assert!(!sel.matches(&key(Some(15), Some(1), Some(2))));
        assert!(!sel.matches(&key(None, Some(1), Some(2))));
    }

    #[test]
    fn test_no_channel_constraint() {
        let sel = Selector::new(0xB0);
        assert!(sel.matches(&key(Some(1), Some(1), None)));
        assert!(sel.matches(&key(None, None, None)));
    }

    #[test]
    fn test_exact() {
        let sel = Selector::new(0xB0).data(DataSelector::Exact(14));
        assert!(sel.matches(&key(Some(16), Some(14), Some(3))));
        assert!(!sel.matches(&key(Some(16), Some(15), Some(3))));
    }

    #[test]
    fn test_exact_pair() {
        let sel = Selector::new(0xB0).data(DataSelector::ExactPair(14, 3));
        assert!(sel.matches(&key(Some(16), Some(14), Some(3))));
        assert!(!sel.matches(&key(Some(16), Some(14), Some(4))));
        assert!(!sel.matches(&key(Some(16), Some(14), None)));
    }

    #[test]
    fn test_event_without_data_matches_any_data_constraint() {
        let sel = Selector::new(0xB0).data(DataSelector::ExactPair(1, 2));
        assert!(sel.matches(&key(Some(3), None, None)));
    }

    #[test]
    fn test_data_spec_forms() {
        assert_eq!(DataSpec::Single(14).resolve().unwrap(), DataSelector::Exact(14));
        assert_eq!(
            DataSpec::Sequence(vec![14, 3]).resolve().unwrap(),
            DataSelector::ExactPair(14, 3)
        );
        assert_eq!(
            DataSpec::Text("14 3".into()).resolve().unwrap(),
            DataSelector::ExactPair(14, 3)
        );
        assert_eq!(DataSpec::Text(" 7 ".into()).resolve().unwrap(), DataSelector::Exact(7));
    }

    #[test]
    fn test_data_spec_rejects() {
        assert!(DataSpec::Sequence(vec![]).resolve().is_err());
        assert!(DataSpec::Sequence(vec![1, 2, 3]).resolve().is_err());
        assert!(DataSpec::Single(128).resolve().is_err());
        assert!(DataSpec::Single(-1).resolve().is_err());
        let err = DataSpec::Text("a b".into()).resolve().unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_channel_range() {
        assert_eq!(resolve_channel(None).unwrap(), None);
        assert_eq!(resolve_channel(Some(16)).unwrap(), Some(16));
        assert!(resolve_channel(Some(0)).is_err());
        assert!(resolve_channel(Some(17)).is_err());
    }
}
