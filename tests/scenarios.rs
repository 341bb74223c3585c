// Integration tests (native) for building the scenario pool from the
// pipeline's spike_events.json, including the practice-scenario fallback.

use std::collections::HashSet;

use glucose_clock::clock::ClockTime;
use glucose_clock::food::{GlycemicImpact, TimingWindow};
use glucose_clock::rng::Rng;
use glucose_clock::scenario::{PoolSource, Scenario, ScenarioPool, SelectionRules};
use serde_json::{json, Value};

fn curve(samples: usize) -> Vec<Value> {
    (0..samples)
        .map(|i| {
            json!({
                "Timestamp": format!("2023-03-01T13:{:02}:00", i * 5 % 60),
                "Value": 90.0 + i as f64,
            })
        })
        .collect()
}

fn event(participant: Value, hour: u32, spike: f64, baseline: f64, samples: usize) -> Value {
    json!({
        "ParticipantID": participant,
        "SpikeTime": format!("2023-03-01T{:02}:30:00", hour),
        "SpikeValue": spike,
        "BaselineValue": baseline,
        "ResponseCurve": curve(samples),
        "FoodEvent": {
            "Description": "toast with jam",
            "GlycemicCategory": "high",
            "Timestamp": format!("2023-03-01T{:02}:00:00", hour),
        },
    })
}

fn names(pool: &ScenarioPool) -> Vec<String> {
    pool.scenarios().iter().map(Scenario::name).collect()
}

#[test]
fn unreadable_file_gives_the_three_practice_scenarios() {
    let rules = SelectionRules::default();
    for bad in ["", "not json", "{\"SpikeTime\": 3}", "[{\"ParticipantID\": \"001\"}]"] {
        let pool = ScenarioPool::from_json(bad, &rules, &mut Rng::new(5));
        assert_eq!(pool.source(), PoolSource::Mock);
        assert_eq!(names(&pool), ["Maria Chen", "James Rodriguez", "Aisha Patel"]);
    }
}

#[test]
fn one_scenario_per_participant() {
    let events = json!([
        event(json!("001"), 8, 160.0, 90.0, 20),
        event(json!("001"), 13, 170.0, 90.0, 20),
        event(json!("002"), 9, 150.0, 95.0, 15),
        event(json!(3), 18, 140.0, 80.0, 12),
        event(json!("004"), 12, 180.0, 85.0, 30),
    ])
    .to_string();

    for seed in 0..20 {
        let pool = ScenarioPool::from_json(&events, &SelectionRules::default(), &mut Rng::new(seed));
        assert_eq!(pool.source(), PoolSource::Recorded);
        assert_eq!(pool.len(), 3);
        let ids: HashSet<_> = pool.scenarios().iter().filter_map(Scenario::participant_id).collect();
        assert_eq!(ids.len(), 3, "duplicate participant with seed {}", seed);
    }
}

#[test]
fn thresholds_are_strict_and_short_pools_are_padded() {
    let events = json!([
        // Exactly 40 mg/dL: not enough.
        event(json!("001"), 8, 130.0, 90.0, 20),
        // Exactly 10 samples: not enough.
        event(json!("002"), 9, 160.0, 90.0, 10),
        event(json!("003"), 10, 131.0, 90.0, 11),
    ])
    .to_string();

    let pool = ScenarioPool::from_json(&events, &SelectionRules::default(), &mut Rng::new(1));
    assert_eq!(pool.source(), PoolSource::Padded);
    assert_eq!(names(&pool), ["Participant 003", "Maria Chen", "James Rodriguez"]);
    let first = pool.get(0).unwrap();
    assert_eq!(first.spike_size(), 41.0);
    assert_eq!(first.food_name(), Some("toast with jam"));
}

#[test]
fn nothing_qualifying_falls_back_to_practice_set() {
    let events = json!([event(json!("001"), 8, 100.0, 90.0, 20)]).to_string();
    let pool = ScenarioPool::from_json(&events, &SelectionRules::default(), &mut Rng::new(1));
    assert_eq!(pool.source(), PoolSource::Mock);
    assert_eq!(pool.len(), 3);
}

#[test]
fn smaller_pool_size_is_respected() {
    let rules = SelectionRules { pool_size: 1, ..SelectionRules::default() };
    assert_eq!(names(&ScenarioPool::mock(&rules)), ["Maria Chen"]);
    let too_big = SelectionRules { pool_size: 10, ..SelectionRules::default() };
    assert_eq!(ScenarioPool::mock(&too_big).len(), 3);
}

#[test]
fn practice_scenario_reveals_its_food() {
    let pool = ScenarioPool::mock(&SelectionRules::default());
    let maria = pool.get(0).unwrap().reveal();
    assert_eq!(maria.food_label(), "🍚 White rice");
    assert_eq!(maria.impact, GlycemicImpact::High);
    assert_eq!(maria.window, Some(TimingWindow::Range { from: 45, to: 60 }));
    assert_eq!(maria.eaten_at, Some(ClockTime::hm(13, 8)));
}

#[test]
fn recorded_scenario_reveals_logged_meal() {
    let mut with_category = event(json!("001"), 8, 160.0, 90.0, 20);
    with_category["FoodEvent"]["GlycemicCategory"] = json!("low");
    let mut catalog_food = event(json!("002"), 12, 120.0, 70.0, 20);
    catalog_food["FoodEvent"]["Description"] = json!("Rice");
    catalog_food["FoodEvent"]["GlycemicCategory"] = json!("unknown");
    let mut no_meal = event(json!("003"), 18, 110.0, 90.0, 20);
    no_meal.as_object_mut().unwrap().remove("FoodEvent");

    let rules = SelectionRules { min_rise: 10.0, ..SelectionRules::default() };
    let json = json!([with_category, catalog_food, no_meal]).to_string();
    let pool = ScenarioPool::from_json(&json, &rules, &mut Rng::new(4));
    let reveal = |id: &str| {
        pool.scenarios()
            .iter()
            .find(|s| s.participant_id() == Some(id))
            .unwrap()
            .reveal()
    };

    // Logged category wins over the size of the rise.
    let logged = reveal("001");
    assert_eq!(logged.impact, GlycemicImpact::Low);
    assert_eq!(logged.food_label(), "toast with jam");
    assert_eq!(logged.window, None);
    assert_eq!(logged.eaten_at, Some(ClockTime::hm(8, 0)));

    // Unknown category: bracket of the +50 rise; catalog food supplies emoji and window.
    let rice = reveal("002");
    assert_eq!(rice.impact, GlycemicImpact::Medium);
    assert_eq!(rice.food_label(), "🍚 Rice");
    assert_eq!(rice.window, Some(TimingWindow::Range { from: 30, to: 45 }));

    let unknown = reveal("003");
    assert_eq!(unknown.food_label(), "Not recorded");
    assert_eq!(unknown.impact, GlycemicImpact::Low);
    assert_eq!(unknown.eaten_at, None);
}
