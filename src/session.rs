//! Game session: all mutable page state in one place.
//!
//! The DOM layer keeps a single `GameSession` and routes every event through
//! it: tab switches, drops on the clock, submit, "try another", explainer
//! filter changes and the fun-fact carousel.

use crate::clock::ClockTime;
use crate::explainer::{reference_curves, CategoryFilter, DailyPattern, FoodResponse, FoodResponses, FunFacts};
use crate::food::{FoodOption, GlycemicImpact, TimingWindow};
use crate::rng::Rng;
use crate::scenario::{Scenario, ScenarioPool};
use crate::scoring::{calculate_score, score_from_strings, PlacementError, ScoreInput, ScoreResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Explainer,
    Game,
}

/// The food currently sitting on the clock.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedFood {
    pub food: String,
    pub impact: GlycemicImpact,
    pub timing: TimingWindow,
    pub time: ClockTime,
}

impl PlacedFood {
    pub fn from_option(option: &FoodOption, time: ClockTime) -> Self {
        Self {
            food: option.name.to_string(),
            impact: option.impact,
            timing: option.timing,
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("scenarios are still loading")]
    NoScenario,
    #[error("place a food on the clock first")]
    NothingPlaced,
}

/// Result of moving to the next scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Next,
    /// Wrapped back to the first scenario; time to fetch a fresh pool.
    PoolExhausted,
}

const RELOAD_FAILURES_BEFORE_ALERT: u8 = 2;

pub struct GameSession {
    tab: Tab,
    pool: Option<ScenarioPool>,
    current: usize,
    placed: Option<PlacedFood>,
    last_result: Option<ScoreResult>,
    filter: CategoryFilter,
    facts: FunFacts,
    reference: FoodResponses,
    curves: FoodResponses,
    daily: Vec<DailyPattern>,
    reload_failures: u8,
    rng: Rng,
}

impl GameSession {
    pub fn new(rng: Rng) -> Self {
        Self {
            tab: Tab::default(),
            pool: None,
            current: 0,
            placed: None,
            last_result: None,
            filter: CategoryFilter::default(),
            facts: FunFacts::default(),
            reference: reference_curves(),
            curves: FoodResponses::default(),
            daily: Vec::new(),
            reload_failures: 0,
            rng,
        }
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn show(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    // --- Scenarios ---

    /// Swap in a freshly loaded pool and start from its first scenario.
    pub fn install_pool(&mut self, pool: ScenarioPool) {
        self.pool = Some(pool);
        self.current = 0;
        self.reset_round();
    }

    pub fn pool(&self) -> Option<&ScenarioPool> {
        self.pool.as_ref()
    }

    pub fn current_scenario(&self) -> Option<&Scenario> {
        self.pool.as_ref()?.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next_scenario(&mut self) -> Advance {
        self.reset_round();
        let len = self.pool.as_ref().map_or(0, ScenarioPool::len);
        self.current += 1;
        if self.current >= len {
            self.current = 0;
            Advance::PoolExhausted
        } else {
            Advance::Next
        }
    }

    /// Track consecutive failed reloads. Returns `true` when the user should
    /// be told (every second failure in a row).
    pub fn note_reload(&mut self, fetched: bool) -> bool {
        if fetched {
            self.reload_failures = 0;
            return false;
        }
        self.reload_failures += 1;
        if self.reload_failures >= RELOAD_FAILURES_BEFORE_ALERT {
            self.reload_failures = 0;
            true
        } else {
            false
        }
    }

    // --- Round ---

    /// Put a food on the clock, replacing any earlier placement.
    pub fn place_food(&mut self, food: PlacedFood) -> Option<PlacedFood> {
        self.last_result = None;
        self.placed.replace(food)
    }

    pub fn placed(&self) -> Option<&PlacedFood> {
        self.placed.as_ref()
    }

    pub fn submit(&mut self) -> Result<ScoreResult, SessionError> {
        let (input, food, scenario_name) = {
            let scenario = self.current_scenario().ok_or(SessionError::NoScenario)?;
            let placed = self.placed.as_ref().ok_or(SessionError::NothingPlaced)?;
            let input = ScoreInput {
                placed: placed.time,
                impact: placed.impact,
                window: placed.timing,
                spike_time: scenario.spike_time(),
                spike_value: scenario.spike_value(),
                baseline_value: scenario.baseline_value(),
            };
            (input, placed.food.clone(), scenario.name())
        };
        let result = calculate_score(&input, &mut self.rng);
        log::info!(
            "{} at {} for {}: {} ({:?})",
            food,
            input.placed,
            scenario_name,
            result.score,
            result.verdict
        );
        self.last_result = Some(result.clone());
        Ok(result)
    }

    /// Score a placement given as page strings, drawing from the session RNG
    /// so a seeded page scores reproducibly.
    pub fn score_strings(
        &mut self,
        placed: &str,
        impact: &str,
        timing: &str,
        spike_time: &str,
        spike_value: f64,
        baseline_value: f64,
    ) -> Result<ScoreResult, PlacementError> {
        score_from_strings(placed, impact, timing, spike_time, spike_value, baseline_value, &mut self.rng)
    }

    pub fn last_result(&self) -> Option<&ScoreResult> {
        self.last_result.as_ref()
    }

    pub fn reset_round(&mut self) {
        self.placed = None;
        self.last_result = None;
    }

    // --- Explainer ---

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: CategoryFilter) {
        self.filter = filter;
    }

    pub fn facts(&self) -> &FunFacts {
        &self.facts
    }

    pub fn facts_mut(&mut self) -> &mut FunFacts {
        &mut self.facts
    }

    pub fn set_food_responses(&mut self, curves: FoodResponses) {
        self.curves = curves;
    }

    /// One curve per category: the loaded data where present, else the
    /// built-in reference curve.
    pub fn comparison_curves(&self) -> Vec<(GlycemicImpact, &FoodResponse)> {
        GlycemicImpact::ALL
            .iter()
            .filter_map(|&c| {
                self.curves
                    .for_category(c)
                    .first()
                    .or_else(|| self.reference.for_category(c).first())
                    .map(|r| (c, r))
            })
            .collect()
    }

    pub fn set_daily_patterns(&mut self, daily: Vec<DailyPattern>) {
        self.daily = daily;
    }

    pub fn daily_patterns(&self) -> &[DailyPattern] {
        &self.daily
    }
}
