//! Food catalog and glycemic categories.
//!
//! Each draggable food on the page carries `data-food`, `data-impact` and
//! `data-timing` attributes; [`FoodOption`] is the typed form of that triple.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How strongly a food is expected to raise blood glucose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlycemicImpact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown glycemic category '{0}'")]
pub struct UnknownCategory(pub String);

impl GlycemicImpact {
    pub const ALL: [GlycemicImpact; 3] = [Self::High, Self::Medium, Self::Low];

    /// Bracket for an observed rise above baseline (mg/dL):
    /// above 60 is high, above 30 is medium, anything else low.
    pub fn from_spike_size(spike_size: f64) -> Self {
        if spike_size > 60.0 {
            Self::High
        } else if spike_size > 30.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    fn rank(self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }

    /// 0 for the same category, 1 for neighbours (high/medium, medium/low), 2 otherwise.
    pub fn distance(self, other: GlycemicImpact) -> u8 {
        self.rank().abs_diff(other.rank())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Series colour used on the comparison chart.
    pub fn color(self) -> &'static str {
        match self {
            Self::High => "#e53935",
            Self::Medium => "#ff9800",
            Self::Low => "#4caf50",
        }
    }
}

impl fmt::Display for GlycemicImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlycemicImpact {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(UnknownCategory(s.to_string())),
        }
    }
}

/// Expected onset of the glucose rise after eating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingWindow {
    /// Rise expected between `from` and `to` minutes after eating.
    Range { from: u16, to: u16 },
    /// Barely raises glucose at all.
    Minimal,
    /// No onset information attached to the food.
    Unspecified,
}

impl TimingWindow {
    const MINIMAL_DELAY: f64 = 15.0;
    const DEFAULT_DELAY: f64 = 45.0;

    /// Lenient parse of a `data-timing` attribute: `"30-45"`, `"30–45 min"`,
    /// `"minimal"`. Anything unrecognised is [`TimingWindow::Unspecified`].
    pub fn parse(s: &str) -> Self {
        let text = s.trim().to_ascii_lowercase();
        if text.is_empty() {
            return Self::Unspecified;
        }
        if text == "minimal" {
            return Self::Minimal;
        }
        let numeric = text.trim_end_matches("minutes").trim_end_matches("min").trim();
        let parts: Vec<&str> = numeric.split(['-', '–']).map(str::trim).collect();
        match parts.as_slice() {
            [a, b] => match (a.parse::<u16>(), b.parse::<u16>()) {
                (Ok(a), Ok(b)) => Self::Range {
                    from: a.min(b),
                    to: a.max(b),
                },
                _ => Self::Unspecified,
            },
            _ => Self::Unspecified,
        }
    }

    /// Minutes from eating to the expected spike.
    pub fn expected_delay(self) -> f64 {
        match self {
            Self::Range { from, to } => (from as f64 + to as f64) / 2.0,
            Self::Minimal => Self::MINIMAL_DELAY,
            Self::Unspecified => Self::DEFAULT_DELAY,
        }
    }
}

impl fmt::Display for TimingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { from, to } => write!(f, "{}-{} minutes", from, to),
            Self::Minimal => f.write_str("minimal"),
            Self::Unspecified => f.write_str("unspecified"),
        }
    }
}

/// One draggable food in the game tray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodOption {
    pub name: &'static str,
    pub emoji: &'static str,
    pub impact: GlycemicImpact,
    pub timing: TimingWindow,
}

const fn range(from: u16, to: u16) -> TimingWindow {
    TimingWindow::Range { from, to }
}

pub const FOOD_OPTIONS: &[FoodOption] = &[
    FoodOption { name: "rice", emoji: "🍚", impact: GlycemicImpact::High, timing: range(30, 45) },
    FoodOption { name: "soda", emoji: "🥤", impact: GlycemicImpact::High, timing: range(15, 30) },
    FoodOption { name: "pasta", emoji: "🍝", impact: GlycemicImpact::High, timing: range(45, 60) },
    FoodOption { name: "banana", emoji: "🍌", impact: GlycemicImpact::Medium, timing: range(30, 45) },
    FoodOption { name: "apple", emoji: "🍎", impact: GlycemicImpact::Medium, timing: range(45, 60) },
    FoodOption { name: "yogurt", emoji: "🥣", impact: GlycemicImpact::Medium, timing: range(30, 45) },
    FoodOption { name: "broccoli", emoji: "🥦", impact: GlycemicImpact::Low, timing: TimingWindow::Minimal },
    FoodOption { name: "salad", emoji: "🥗", impact: GlycemicImpact::Low, timing: TimingWindow::Minimal },
];

pub fn find_food(name: &str) -> Option<&'static FoodOption> {
    let wanted = name.trim();
    FOOD_OPTIONS.iter().find(|f| f.name.eq_ignore_ascii_case(wanted))
}
