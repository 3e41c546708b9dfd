//! Achieved maturity level and criterion code parsing.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Characters that end the criterion part of a composite sub-item code.
const SUB_ITEM_SEPARATORS: &[char] = &['-', '_', '/'];

/// Maturity level reached by a sub-criterion.
///
/// The hospital quality criteria define five levels; rows whose text
/// carries no number are `Unrated` and score 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievedLevel {
    #[default]
    Unrated,
    Level1,
    Level2,
    Level3,
    Level4,
    Level5,
}

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"))
}

impl AchievedLevel {
    /// Parses free text such as "Mức 2".
    ///
    /// Uses the first run of ASCII digits. No digits gives `Unrated`.
    /// Numbers above 5 saturate to `Level5`, so "Mức 7" scores 5 rather than 7.
    pub fn parse(text: &str) -> Self {
        match digits().find(text) {
            // A digit run too long for u32 is far above the maximum.
            Some(m) => Self::from_value(m.as_str().parse::<u32>().unwrap_or(u32::MAX)),
            None => AchievedLevel::Unrated,
        }
    }

    /// Maps a numeric level, saturating at [`AchievedLevel::Level5`].
    pub fn from_value(value: u32) -> Self {
        match value {
            0 => AchievedLevel::Unrated,
            1 => AchievedLevel::Level1,
            2 => AchievedLevel::Level2,
            3 => AchievedLevel::Level3,
            4 => AchievedLevel::Level4,
            _ => AchievedLevel::Level5,
        }
    }

    /// Numeric value used in score averages.
    pub fn value(self) -> u8 {
        match self {
            AchievedLevel::Unrated => 0,
            AchievedLevel::Level1 => 1,
            AchievedLevel::Level2 => 2,
            AchievedLevel::Level3 => 3,
            AchievedLevel::Level4 => 4,
            AchievedLevel::Level5 => 5,
        }
    }
}

impl std::fmt::Display for AchievedLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AchievedLevel::Unrated => write!(f, "Chưa đạt"),
            level => write!(f, "Mức {}", level.value()),
        }
    }
}

/// Truncates a composite sub-item code at its first separator.
///
/// `"A1.1-M2-03"` becomes `"A1.1"`. Whitespace also separates.
pub fn criterion_code(item_code: &str) -> &str {
    let trimmed = item_code.trim();
    let end = trimmed
        .find(|c: char| SUB_ITEM_SEPARATORS.contains(&c) || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_text() {
        assert_eq!(AchievedLevel::parse("Mức 1"), AchievedLevel::Level1);
        assert_eq!(AchievedLevel::parse("Mức 3"), AchievedLevel::Level3);
        assert_eq!(AchievedLevel::parse("5"), AchievedLevel::Level5);
        assert_eq!(AchievedLevel::parse("đạt mức 4 (tốt)"), AchievedLevel::Level4);
    }

    #[test]
    fn test_parse_without_digits_is_unrated() {
        assert_eq!(AchievedLevel::parse(""), AchievedLevel::Unrated);
        assert_eq!(AchievedLevel::parse("Chưa đánh giá"), AchievedLevel::Unrated);
        assert_eq!(AchievedLevel::parse("Mức 0"), AchievedLevel::Unrated);
        assert_eq!(AchievedLevel::Unrated.value(), 0);
    }

    #[test]
    fn test_parse_saturates_above_max() {
        assert_eq!(AchievedLevel::parse("Mức 7"), AchievedLevel::Level5);
        assert_eq!(
            AchievedLevel::parse("99999999999999999999"),
            AchievedLevel::Level5
        );
    }

    #[test]
    fn test_parse_uses_first_number() {
        assert_eq!(AchievedLevel::parse("Mức 2 / 5"), AchievedLevel::Level2);
    }

    #[test]
    fn test_display() {
        assert_eq!(AchievedLevel::Level2.to_string(), "Mức 2");
        assert_eq!(AchievedLevel::Unrated.to_string(), "Chưa đạt");
    }

    #[test]
    fn test_criterion_code() {
        assert_eq!(criterion_code("A1.1-M2-03"), "A1.1");
        assert_eq!(criterion_code("B2.3_05"), "B2.3");
        assert_eq!(criterion_code("C4.2/1"), "C4.2");
        assert_eq!(criterion_code(" D1.1 muc 3"), "D1.1");
        assert_eq!(criterion_code("E1.1"), "E1.1");
        assert_eq!(criterion_code(""), "");
    }
}
