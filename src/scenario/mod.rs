//! Scenario provider for the prediction game.
//!
//! Recorded spike events come from `spike_events.json` (written by the data
//! pipeline). A record is playable when the rise over baseline is large enough
//! and the response curve has enough samples. The pool holds at most one
//! scenario per participant and is padded with the built-in mock scenarios;
//! when the file is missing or unreadable the pool is the mock set.

use chrono::NaiveDateTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::clock::ClockTime;
use crate::food::{find_food, GlycemicImpact, TimingWindow};
use crate::rng::Rng;

mod mock;

pub use mock::MOCK_SCENARIOS;

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("spike events are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One glucose reading on a response curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseSample {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// The logged meal the pipeline matched to a spike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FoodEvent {
    pub description: String,
    #[serde(default)]
    pub glycemic_category: Option<String>,
    pub timestamp: NaiveDateTime,
}

impl FoodEvent {
    /// `None` for missing or `"unknown"` categories.
    pub fn impact(&self) -> Option<GlycemicImpact> {
        self.glycemic_category.as_deref()?.parse().ok()
    }
}

/// A recorded rise in glucose above a participant's baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeEvent {
    #[serde(rename = "ParticipantID", deserialize_with = "participant_id")]
    pub participant_id: String,
    #[serde(rename = "SpikeTime")]
    pub spike_time: NaiveDateTime,
    #[serde(rename = "SpikeValue")]
    pub spike_value: f64,
    #[serde(rename = "BaselineValue")]
    pub baseline_value: f64,
    #[serde(rename = "ResponseCurve", default)]
    pub response_curve: Vec<ResponseSample>,
    #[serde(rename = "FoodEvent", default)]
    pub food_event: Option<FoodEvent>,
}

// The pipeline writes ids as "001" but older exports used bare numbers.
fn participant_id<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(de)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("unexpected ParticipantID {}", other))),
    }
}

impl SpikeEvent {
    pub fn spike_size(&self) -> f64 {
        self.spike_value - self.baseline_value
    }

    pub fn qualifies(&self, rules: &SelectionRules) -> bool {
        self.spike_size() > rules.min_rise && self.response_curve.len() > rules.min_samples
    }
}

/// Fixed demo record used when no recorded data is available.
#[derive(Debug, Clone, PartialEq)]
pub struct MockScenario {
    pub name: &'static str,
    pub food_type: &'static str,
    pub food_emoji: &'static str,
    pub glucose_impact: GlycemicImpact,
    pub timing_window: TimingWindow,
    pub spike_time: ClockTime,
    pub optimal_placement_time: ClockTime,
    pub spike_value: f64,
    pub baseline_value: f64,
    pub patient_age: u8,
    pub patient_bmi: f64,
    pub patient_a1c: f64,
}

/// A playable round. Replaced wholesale between rounds, never edited.
#[derive(Debug, Clone, PartialEq)]
pub enum Scenario {
    Recorded(SpikeEvent),
    Mock(&'static MockScenario),
}

impl Scenario {
    pub fn name(&self) -> String {
        match self {
            Self::Recorded(ev) => format!("Participant {}", ev.participant_id),
            Self::Mock(m) => m.name.to_string(),
        }
    }

    pub fn participant_id(&self) -> Option<&str> {
        match self {
            Self::Recorded(ev) => Some(&ev.participant_id),
            Self::Mock(_) => None,
        }
    }

    pub fn spike_time(&self) -> ClockTime {
        match self {
            Self::Recorded(ev) => ClockTime::from_datetime(&ev.spike_time),
            Self::Mock(m) => m.spike_time,
        }
    }

    pub fn spike_value(&self) -> f64 {
        match self {
            Self::Recorded(ev) => ev.spike_value,
            Self::Mock(m) => m.spike_value,
        }
    }

    pub fn baseline_value(&self) -> f64 {
        match self {
            Self::Recorded(ev) => ev.baseline_value,
            Self::Mock(m) => m.baseline_value,
        }
    }

    pub fn spike_size(&self) -> f64 {
        self.spike_value() - self.baseline_value()
    }

    /// Category of the food behind the spike: the logged one when known,
    /// otherwise the bracket the rise falls into.
    pub fn impact(&self) -> GlycemicImpact {
        match self {
            Self::Recorded(ev) => ev
                .food_event
                .as_ref()
                .and_then(FoodEvent::impact)
                .unwrap_or_else(|| GlycemicImpact::from_spike_size(ev.spike_size())),
            Self::Mock(m) => m.glucose_impact,
        }
    }

    pub fn food_name(&self) -> Option<&str> {
        match self {
            Self::Recorded(ev) => ev.food_event.as_ref().map(|f| f.description.as_str()),
            Self::Mock(m) => Some(m.food_type),
        }
    }

    /// When the food was actually eaten, if known.
    pub fn optimal_placement_time(&self) -> Option<ClockTime> {
        match self {
            Self::Recorded(ev) => ev
                .food_event
                .as_ref()
                .map(|f| ClockTime::from_datetime(&f.timestamp)),
            Self::Mock(m) => Some(m.optimal_placement_time),
        }
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }

    /// The answer to the round, for the results panel.
    pub fn reveal(&self) -> Reveal {
        let (emoji, window) = match self {
            Self::Mock(m) => (Some(m.food_emoji), Some(m.timing_window)),
            Self::Recorded(_) => match self.food_name().and_then(find_food) {
                Some(f) => (Some(f.emoji), Some(f.timing)),
                None => (None, None),
            },
        };
        Reveal {
            food: self.food_name().map(str::to_string),
            emoji,
            impact: self.impact(),
            window,
            eaten_at: self.optimal_placement_time(),
        }
    }
}

/// What was actually eaten before a scenario's spike.
#[derive(Debug, Clone, PartialEq)]
pub struct Reveal {
    pub food: Option<String>,
    pub emoji: Option<&'static str>,
    pub impact: GlycemicImpact,
    /// Onset window, when the food is one the game knows.
    pub window: Option<TimingWindow>,
    pub eaten_at: Option<ClockTime>,
}

impl Reveal {
    /// "🍚 White rice", "Bagel", or a fallback when nothing was logged.
    pub fn food_label(&self) -> String {
        match (&self.food, self.emoji) {
            (Some(food), Some(emoji)) => format!("{} {}", emoji, food),
            (Some(food), None) => food.clone(),
            (None, _) => "Not recorded".to_string(),
        }
    }
}

/// Qualification thresholds and pool size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRules {
    /// Spike must exceed baseline by strictly more than this (mg/dL).
    pub min_rise: f64,
    /// Response curve must have strictly more samples than this.
    pub min_samples: usize,
    pub pool_size: usize,
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            min_rise: 40.0,
            min_samples: 10,
            pool_size: 3,
        }
    }
}

impl SelectionRules {
    /// Pool size clamped so padding with mocks can always fill it.
    pub fn target_size(&self) -> usize {
        self.pool_size.clamp(1, MOCK_SCENARIOS.len())
    }
}

pub fn parse_spike_events(json: &str) -> Result<Vec<SpikeEvent>, ScenarioError> {
    Ok(serde_json::from_str(json)?)
}

/// Pick at most one qualifying event per participant (random event within the
/// participant, participants in random order), then pad with mocks.
pub fn select_scenarios(events: &[SpikeEvent], rules: &SelectionRules, rng: &mut Rng) -> Vec<Scenario> {
    let mut groups: Vec<(&str, Vec<&SpikeEvent>)> = Vec::new();
    for ev in events.iter().filter(|e| e.qualifies(rules)) {
        match groups.iter_mut().find(|(id, _)| *id == ev.participant_id) {
            Some((_, list)) => list.push(ev),
            None => groups.push((ev.participant_id.as_str(), vec![ev])),
        }
    }
    rng.shuffle(&mut groups);

    let target = rules.target_size();
    let mut picked: Vec<Scenario> = groups
        .iter()
        .take(target)
        .map(|(_, list)| Scenario::Recorded(list[rng.index(list.len())].clone()))
        .collect();
    for m in MOCK_SCENARIOS.iter() {
        if picked.len() >= target {
            break;
        }
        picked.push(Scenario::Mock(m));
    }
    picked
}

/// Where a pool's scenarios came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolSource {
    Recorded,
    /// Recorded scenarios padded with mocks.
    Padded,
    Mock,
}

/// The scenarios available for the current run of rounds.
#[derive(Debug, Clone)]
pub struct ScenarioPool {
    scenarios: Vec<Scenario>,
    source: PoolSource,
}

impl ScenarioPool {
    pub fn mock(rules: &SelectionRules) -> Self {
        Self {
            scenarios: MOCK_SCENARIOS
                .iter()
                .take(rules.target_size())
                .map(Scenario::Mock)
                .collect(),
            source: PoolSource::Mock,
        }
    }

    pub fn from_events(events: &[SpikeEvent], rules: &SelectionRules, rng: &mut Rng) -> Self {
        let scenarios = select_scenarios(events, rules, rng);
        let recorded = scenarios.iter().filter(|s| !s.is_mock()).count();
        if recorded == 0 {
            log::info!("no qualifying spike events among {}, using mock scenarios", events.len());
            return Self::mock(rules);
        }
        let source = if recorded == scenarios.len() {
            PoolSource::Recorded
        } else {
            PoolSource::Padded
        };
        log::info!("scenario pool: {} recorded, {} mock", recorded, scenarios.len() - recorded);
        Self { scenarios, source }
    }

    /// Never fails: unreadable data degrades to the mock pool.
    pub fn from_json(json: &str, rules: &SelectionRules, rng: &mut Rng) -> Self {
        match parse_spike_events(json) {
            Ok(events) => Self::from_events(&events, rules, rng),
            Err(e) => {
                log::warn!("{}; falling back to mock scenarios", e);
                Self::mock(rules)
            }
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn source(&self) -> PoolSource {
        self.source
    }
}
