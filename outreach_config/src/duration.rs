use std::{fmt, ops::Deref, str::FromStr};

use serde::Deserialize;

/// A duration written as whitespace separated parts like `1h 30m`.
///
/// Each part is a number followed by one of the units `s`, `m`, `h` or `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDurationError(String);

impl fmt::Display for ParseDurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid duration part {:?}", self.0)
    }
}

impl std::error::Error for ParseDurationError {}

impl FromStr for Duration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace()
            .try_fold(0u64, |total, part| {
                let err = || ParseDurationError(part.into());
                let split = part.find(|c: char| !c.is_ascii_digit()).ok_or_else(err)?;
                let (value, unit) = part.split_at(split);
                let factor = match unit {
                    "s" => 1,
                    "m" => 60,
                    "h" => 60 * 60,
                    "d" => 24 * 60 * 60,
                    _ => return Err(err()),
                };
                value
                    .parse::<u64>()
                    .ok()
                    .and_then(|value| value.checked_mul(factor))
                    .and_then(|secs| total.checked_add(secs))
                    .ok_or_else(err)
            })
            .map(|secs| Self(std::time::Duration::from_secs(secs)))
    }
}

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse() {
        for (input, expected) in [
            ("13s", Some(13)),
            ("42m", Some(42 * 60)),
            ("7h", Some(7 * 60 * 60)),
            ("20d", Some(20 * 24 * 60 * 60)),
            ("1h 30m", Some(90 * 60)),
            ("  10s   5s ", Some(15)),
            ("", Some(0)),
            ("xyz", None),
            ("7dd", None),
            ("10", None),
            ("m", None),
            ("-5s", None),
            ("99999999999999999999d", None),
        ] {
            let output = input.parse::<Duration>().ok().map(|x| x.as_secs());
            assert_eq!(output, expected, "{input:?}");
        }
    }

    #[test]
    fn deserialize() {
        let output = serde_json::from_value::<Duration>("1d 2h 3m 4s".into()).unwrap();
        assert_eq!(output.as_secs(), ((24 + 2) * 60 + 3) * 60 + 4);

        let output = serde_json::from_value::<Duration>("soon".into());
        assert!(output.is_err());
    }
}
