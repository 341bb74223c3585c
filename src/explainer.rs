//! Explainer tab: typed views over the food-response and daily-pattern files,
//! curve sampling for the comparison chart tooltip, the glycemic category
//! filter and the fun-fact carousel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::food::GlycemicImpact;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("{file}: {source}")]
    Json {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

// --- Food responses ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponsePoint {
    pub minutes_since_food: f64,
    pub value: f64,
}

/// Glucose trace after one logged food, minutes relative to eating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FoodResponse {
    pub food_description: String,
    pub response: Vec<ResponsePoint>,
}

impl FoodResponse {
    pub fn new(food_description: &str, points: &[(f64, f64)]) -> Self {
        Self {
            food_description: food_description.to_string(),
            response: points
                .iter()
                .map(|&(m, v)| ResponsePoint {
                    minutes_since_food: m,
                    value: v,
                })
                .collect(),
        }
    }

    /// Linear interpolation between the samples around `minute`. Outside the
    /// sampled range the nearest end value is used; `None` for an empty trace.
    pub fn value_at(&self, minute: f64) -> Option<f64> {
        let first = self.response.first()?;
        let last = self.response.last()?;
        if minute <= first.minutes_since_food {
            return Some(first.value);
        }
        if minute >= last.minutes_since_food {
            return Some(last.value);
        }
        self.response.windows(2).find_map(|w| {
            let (a, b) = (w[0], w[1]);
            if minute < a.minutes_since_food || minute > b.minutes_since_food {
                return None;
            }
            let span = b.minutes_since_food - a.minutes_since_food;
            if span <= 0.0 {
                return Some(a.value);
            }
            let t = (minute - a.minutes_since_food) / span;
            Some(a.value + (b.value - a.value) * t)
        })
    }
}

/// Contents of `food_responses.json`, keyed by glycemic category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodResponses {
    #[serde(default)]
    pub high: Vec<FoodResponse>,
    #[serde(default)]
    pub medium: Vec<FoodResponse>,
    #[serde(default)]
    pub low: Vec<FoodResponse>,
}

impl FoodResponses {
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|source| DataError::Json {
            file: "food_responses.json",
            source,
        })
    }

    pub fn for_category(&self, impact: GlycemicImpact) -> &[FoodResponse] {
        match impact {
            GlycemicImpact::High => &self.high,
            GlycemicImpact::Medium => &self.medium,
            GlycemicImpact::Low => &self.low,
        }
    }
}

/// Built-in comparison curves (white rice, apple, broccoli) shown until
/// `food_responses.json` arrives or when it has no data for a category.
pub fn reference_curves() -> FoodResponses {
    FoodResponses {
        high: vec![FoodResponse::new(
            "White Rice",
            &[(0.0, 85.0), (30.0, 140.0), (45.0, 155.0), (60.0, 148.0), (90.0, 120.0), (120.0, 100.0), (150.0, 90.0)],
        )],
        medium: vec![FoodResponse::new(
            "Apple",
            &[(0.0, 85.0), (30.0, 110.0), (60.0, 125.0), (90.0, 115.0), (120.0, 100.0), (150.0, 92.0)],
        )],
        low: vec![FoodResponse::new(
            "Broccoli",
            &[(0.0, 85.0), (30.0, 92.0), (60.0, 96.0), (90.0, 94.0), (120.0, 90.0), (150.0, 88.0)],
        )],
    }
}

// --- Daily patterns -----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HourlyReading {
    pub hour_of_day: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MealEvent {
    pub hour_of_day: f64,
    pub description: String,
    #[serde(default)]
    pub glycemic_category: String,
}

impl MealEvent {
    pub fn impact(&self) -> Option<GlycemicImpact> {
        self.glycemic_category.parse().ok()
    }
}

/// One participant-day from `daily_patterns.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPattern {
    #[serde(rename = "ParticipantID")]
    pub participant_id: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "GlucoseData", default)]
    pub glucose_data: Vec<HourlyReading>,
    #[serde(rename = "MealEvents", default)]
    pub meal_events: Vec<MealEvent>,
}

impl DailyPattern {
    pub fn highest_reading(&self) -> Option<HourlyReading> {
        self.glucose_data
            .iter()
            .copied()
            .fold(None, |best: Option<HourlyReading>, r| match best {
                Some(b) if b.value >= r.value => Some(b),
                _ => Some(r),
            })
    }

    /// Rise after each meal: highest reading within `window_hours` after the
    /// meal minus the last reading at or before it.
    pub fn meal_rises(&self, window_hours: f64) -> Vec<(&MealEvent, f64)> {
        self.meal_events
            .iter()
            .filter_map(|meal| {
                let before = self
                    .glucose_data
                    .iter()
                    .filter(|r| r.hour_of_day <= meal.hour_of_day)
                    .last()?;
                let after_peak = self
                    .glucose_data
                    .iter()
                    .filter(|r| r.hour_of_day > meal.hour_of_day && r.hour_of_day <= meal.hour_of_day + window_hours)
                    .map(|r| r.value)
                    .fold(f64::NEG_INFINITY, f64::max);
                after_peak.is_finite().then(|| (meal, after_peak - before.value))
            })
            .collect()
    }
}

pub fn parse_daily_patterns(json: &str) -> Result<Vec<DailyPattern>, DataError> {
    serde_json::from_str(json).map_err(|source| DataError::Json {
        file: "daily_patterns.json",
        source,
    })
}

// --- Category filter ------------------------------------------------------------

/// Which glycemic curves the comparison chart shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(GlycemicImpact),
}

impl CategoryFilter {
    /// `"all"` or a category name; anything else is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        s.parse().ok().map(Self::Only)
    }

    pub fn shows(self, impact: GlycemicImpact) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => c == impact,
        }
    }

    /// The chart legend is only useful with several curves on screen.
    pub fn shows_legend(self) -> bool {
        self == Self::All
    }

    /// Id of the toggle button that should be highlighted.
    pub fn button_id(self) -> String {
        match self {
            Self::All => "view-all-btn".to_string(),
            Self::Only(c) => format!("{}-btn", c),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(c) => write!(f, "{}", c),
        }
    }
}

// --- Comparison chart geometry ----------------------------------------------------

/// Plot area of the food comparison SVG: x in `[left, right]` spans
/// `0..=span_minutes`; y maps `value_low..=value_high` mg/dL onto
/// `y_low..=y_high` pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComparisonAxis {
    pub left: f64,
    pub right: f64,
    pub span_minutes: f64,
    pub y_low: f64,
    pub y_high: f64,
    pub value_low: f64,
    pub value_high: f64,
}

impl Default for ComparisonAxis {
    fn default() -> Self {
        Self {
            left: 80.0,
            right: 750.0,
            span_minutes: 150.0,
            y_low: 320.0,
            y_high: 80.0,
            value_low: 70.0,
            value_high: 160.0,
        }
    }
}

impl ComparisonAxis {
    /// Minutes since eating under pixel `x`, `None` outside the plot area.
    pub fn minute_at(&self, x: f64) -> Option<f64> {
        if x < self.left || x > self.right {
            return None;
        }
        Some((x - self.left) / (self.right - self.left) * self.span_minutes)
    }

    pub fn y_for_value(&self, value: f64) -> f64 {
        let t = (value - self.value_low) / (self.value_high - self.value_low);
        self.y_low + (self.y_high - self.y_low) * t
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipLine {
    pub impact: GlycemicImpact,
    pub label: String,
    pub value: f64,
}

impl TooltipLine {
    pub fn html(&self) -> String {
        format!(
            "<span style=\"color: {};\">{}: {:.0} mg/dL</span>",
            self.impact.color(),
            self.label,
            self.value
        )
    }
}

/// Readings of each visible curve at `minute`.
pub fn tooltip_lines(
    curves: &[(GlycemicImpact, &FoodResponse)],
    filter: CategoryFilter,
    minute: f64,
) -> Vec<TooltipLine> {
    curves
        .iter()
        .filter(|(c, _)| filter.shows(*c))
        .filter_map(|(c, r)| {
            Some(TooltipLine {
                impact: *c,
                label: r.food_description.clone(),
                value: r.value_at(minute)?,
            })
        })
        .collect()
}

// --- Fun facts ------------------------------------------------------------------

pub const GLUCOSE_FACTS: &[&str] = &[
    "Honey is mostly glucose and fructose - that's why it's so sweet!",
    "Glucose is less sweet than fructose but sweeter than lactose. Fructose is 1.7x sweeter than glucose, but glucose is 2x sweeter than lactose (milk sugar).",
    "The word \"glucose\" comes from the Greek word \"gleukos,\" meaning sweet.",
    "Glucose was first isolated from raisins in 1747 by Andreas Marggraf.",
    "Brain's VIP Fuel: Your brain uses 50% of the body's glucose despite being only 2% of its weight, requiring a constant supply to power neurons and cognitive functions.",
    "Sweet Chemistry: Glucose has the formula C₆H₁₂O₆: six carbon atoms, twelve hydrogen, and six oxygen arranged in a ring structure.",
    "Fiber Shield: Whole fruits slow glucose spikes by up to 30% compared to juices, thanks to their natural fiber.",
    "Red Blood Cell Diet: Red blood cells rely entirely on glucose for energy because they lack mitochondria to burn other fuels.",
    "Metabolic Recycling: Excess glucose becomes fat through lipogenesis, a liver process linked to weight gain.",
    "Ancient Energy: Glucose metabolism pathways evolved 2 billion years ago, making it life's universal energy currency.",
    "Stress Response: Adrenaline triggers emergency glucose release from the liver during \"fight-or-flight\" moments.",
    "Personalized Reactions: Identical meals can cause wildly different spikes in people due to unique gut microbiomes.",
];

/// Cursor over [`GLUCOSE_FACTS`] that wraps around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FunFacts {
    index: usize,
}

impl FunFacts {
    pub fn current(&self) -> &'static str {
        GLUCOSE_FACTS[self.index]
    }

    pub fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % GLUCOSE_FACTS.len();
        self.current()
    }

    /// 1-based position for the "n / total" counter.
    pub fn position(&self) -> usize {
        self.index + 1
    }

    pub fn total(&self) -> usize {
        GLUCOSE_FACTS.len()
    }
}
