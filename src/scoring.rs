//! Prediction scoring.
//!
//! A placement is judged on two things: how far before the spike the food was
//! eaten compared to the food's typical onset delay, and whether the food's
//! glycemic category fits the size of the observed rise. Timing scores inside
//! the three closest brackets are drawn at random from the bracket so there is
//! no single pixel-perfect answer; pass a seeded [`Rng`] to make them repeatable.

use serde::Serialize;

use crate::clock::{ClockError, ClockTime};
use crate::food::{GlycemicImpact, TimingWindow, UnknownCategory};
use crate::rng::Rng;

/// Placements this far or further before the spike fall in the long-tail bracket.
pub const LONG_GAP_MINUTES: i32 = 180;
pub const MAX_SCORE: u8 = 100;

const MATCH_BONUS: u8 = 15;
const ADJACENT_BONUS: u8 = 8;

/// Everything the scorer needs about one placement and the active scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreInput {
    pub placed: ClockTime,
    pub impact: GlycemicImpact,
    pub window: TimingWindow,
    pub spike_time: ClockTime,
    pub spike_value: f64,
    pub baseline_value: f64,
}

impl ScoreInput {
    pub fn spike_size(&self) -> f64 {
        self.spike_value - self.baseline_value
    }

    /// Minutes between eating and the spike, folded into (-720, 720].
    pub fn placed_time_value(&self) -> i32 {
        self.placed.minutes_until(self.spike_time)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Impossible,
    Excellent,
    Good,
    Acceptable,
    NotQuiteRight,
}

impl Verdict {
    pub fn for_score(score: u8) -> Self {
        match score {
            85.. => Self::Excellent,
            70..=84 => Self::Good,
            55..=69 => Self::Acceptable,
            _ => Self::NotQuiteRight,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Impossible => {
                "Impossible! The food was placed after the spike. Food has to be eaten before glucose can rise."
            }
            Self::Excellent => "Excellent! Your timing lines up with how quickly this food is absorbed.",
            Self::Good => "Good estimate! You're close to when this food was really eaten.",
            Self::Acceptable => "Acceptable. The timing is plausible, but a little off.",
            Self::NotQuiteRight => {
                "Not quite right. Think about how long this food takes to reach your bloodstream."
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u8,
    pub timing_score: u8,
    pub impact_bonus: u8,
    pub placed_time_value: i32,
    pub expected_delay: f64,
    pub verdict: Verdict,
    pub feedback: String,
    pub impact_feedback: String,
}

/// Score a placement.
pub fn calculate_score(input: &ScoreInput, rng: &mut Rng) -> ScoreResult {
    let expected_delay = input.window.expected_delay();
    let placed_time_value = input.placed_time_value();
    let spike_size = input.spike_size();

    if placed_time_value <= 0 {
        return ScoreResult {
            score: 0,
            timing_score: 0,
            impact_bonus: 0,
            placed_time_value,
            expected_delay,
            verdict: Verdict::Impossible,
            feedback: Verdict::Impossible.message().to_string(),
            impact_feedback: "Food eaten after a spike can't have caused it.".to_string(),
        };
    }

    let timing = timing_score(placed_time_value, expected_delay, rng);
    let bonus = impact_bonus(input.impact, spike_size);
    let score = timing.saturating_add(bonus).min(MAX_SCORE);
    let verdict = Verdict::for_score(score);
    log::debug!(
        "scored placement: ptv={} expected={} timing={} bonus={} final={}",
        placed_time_value,
        expected_delay,
        timing,
        bonus,
        score
    );

    ScoreResult {
        score,
        timing_score: timing,
        impact_bonus: bonus,
        placed_time_value,
        expected_delay,
        verdict,
        feedback: verdict.message().to_string(),
        impact_feedback: impact_feedback(input.impact, spike_size),
    }
}

/// Timing component for a placement `placed_time_value` minutes before the
/// spike, given the food's expected onset delay.
pub fn timing_score(placed_time_value: i32, expected_delay: f64, rng: &mut Rng) -> u8 {
    if placed_time_value <= 0 {
        return 0;
    }
    let ptv = placed_time_value as f64;
    let off_by = (ptv - expected_delay).abs();

    if off_by <= 10.0 {
        rng.range_inclusive(85, 100)
    } else if off_by <= 20.0 {
        rng.range_inclusive(70, 84)
    } else if off_by <= 30.0 {
        rng.range_inclusive(55, 69)
    } else if placed_time_value < LONG_GAP_MINUTES {
        let lower = expected_delay - 30.0;
        let upper = expected_delay + 30.0;
        let distance = if ptv < lower { lower - ptv } else { ptv - upper };
        let penalty = 5.0 * (distance / 5.0).floor();
        (55.0 - penalty).max(30.0) as u8
    } else {
        let steps = ((placed_time_value - LONG_GAP_MINUTES) / 30) as f64;
        (30.0 - 5.0 * steps).max(10.0) as u8
    }
}

/// +15 when the food's category matches the spike bracket, +8 for a
/// neighbouring category, nothing otherwise.
pub fn impact_bonus(impact: GlycemicImpact, spike_size: f64) -> u8 {
    match impact.distance(GlycemicImpact::from_spike_size(spike_size)) {
        0 => MATCH_BONUS,
        1 => ADJACENT_BONUS,
        _ => 0,
    }
}

fn impact_feedback(impact: GlycemicImpact, spike_size: f64) -> String {
    let observed = GlycemicImpact::from_spike_size(spike_size);
    match impact.distance(observed) {
        0 => format!(
            "Great match! A {} glycemic food fits a rise of {:.0} mg/dL.",
            impact, spike_size
        ),
        1 => format!(
            "Close. A rise of {:.0} mg/dL looks more like a {} glycemic food than a {} one.",
            spike_size, observed, impact
        ),
        _ => format!(
            "A {} glycemic food doesn't explain a rise of {:.0} mg/dL; think {} glycemic.",
            impact, spike_size, observed
        ),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error("bad placed time: {0}")]
    PlacedTime(#[source] ClockError),
    #[error("bad spike time: {0}")]
    SpikeTime(#[source] ClockError),
    #[error(transparent)]
    Category(#[from] UnknownCategory),
}

/// String-typed front door used by the page: the same arguments the DOM
/// carries in `data-*` attributes and scenario text.
pub fn score_from_strings(
    placed: &str,
    impact: &str,
    timing: &str,
    spike_time: &str,
    spike_value: f64,
    baseline_value: f64,
    rng: &mut Rng,
) -> Result<ScoreResult, PlacementError> {
    let input = ScoreInput {
        placed: ClockTime::parse(placed).map_err(PlacementError::PlacedTime)?,
        impact: impact.parse()?,
        window: TimingWindow::parse(timing),
        spike_time: ClockTime::parse(spike_time).map_err(PlacementError::SpikeTime)?,
        spike_value,
        baseline_value,
    };
    Ok(calculate_score(&input, rng))
}
