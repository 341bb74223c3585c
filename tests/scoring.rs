// Integration tests (native) for placement scoring.
// These exercise the pure scoring path end to end, from page strings to the
// final score, so they run under `cargo test` on the host.

use glucose_clock::clock::ClockTime;
use glucose_clock::food::{find_food, GlycemicImpact, TimingWindow};
use glucose_clock::rng::Rng;
use glucose_clock::scenario::{Scenario, MOCK_SCENARIOS};
use glucose_clock::scoring::{calculate_score, score_from_strings, PlacementError, ScoreInput, Verdict};

#[test]
fn close_placement_of_matching_food_scores_full_marks() {
    // 1:10 PM vs a 2:00 PM spike of +82: 50 minutes, inside the 45-60 window.
    for seed in 1..50 {
        let mut rng = Rng::new(seed);
        let r = score_from_strings("1:10 PM", "high", "45-60", "2:00 PM", 152.0, 70.0, &mut rng).unwrap();
        assert_eq!(r.placed_time_value, 50);
        assert!((85..=100).contains(&r.timing_score), "timing {}", r.timing_score);
        assert_eq!(r.impact_bonus, 15);
        assert_eq!(r.score, 100);
        assert_eq!(r.verdict, Verdict::Excellent);
    }
}

#[test]
fn placement_after_the_spike_scores_zero() {
    let mut rng = Rng::new(3);
    for impact in ["high", "medium", "low"] {
        let r = score_from_strings("2:05 PM", impact, "45-60", "2:00 PM", 152.0, 70.0, &mut rng).unwrap();
        assert_eq!(r.placed_time_value, -5);
        assert_eq!(r.score, 0);
        assert_eq!(r.impact_bonus, 0);
        assert_eq!(r.verdict, Verdict::Impossible);
    }
}

#[test]
fn distant_placement_on_mock_scenario_decays() {
    let james = Scenario::Mock(&MOCK_SCENARIOS[1]);
    assert_eq!(james.name(), "James Rodriguez");
    assert_eq!(james.spike_size(), 50.0);

    let mut rng = Rng::new(9);
    let input = |food: &str| {
        let option = find_food(food).unwrap();
        ScoreInput {
            placed: ClockTime::hm(10, 0),
            impact: option.impact,
            window: option.timing,
            spike_time: james.spike_time(),
            spike_value: james.spike_value(),
            baseline_value: james.baseline_value(),
        }
    };

    // 75 minutes before; 7.5 past the end of the banana's +-30 window.
    let banana = calculate_score(&input("banana"), &mut rng);
    assert_eq!(banana.placed_time_value, 75);
    assert_eq!(banana.timing_score, 50);
    assert_eq!(banana.impact_bonus, 15);
    assert_eq!(banana.score, 65);

    // Rice is one category off a +50 rise.
    let rice = calculate_score(&input("rice"), &mut rng);
    assert_eq!(rice.timing_score, 50);
    assert_eq!(rice.impact_bonus, 8);
    assert_eq!(rice.score, 58);
}

#[test]
fn score_never_exceeds_one_hundred_and_bonus_is_discrete() {
    let mut rng = Rng::new(77);
    for placed in (0..24 * 60).step_by(7) {
        for impact in GlycemicImpact::ALL {
            for spike_value in [90.0, 120.0, 160.0, 220.0] {
                let input = ScoreInput {
                    placed: ClockTime::from_minutes(placed),
                    impact,
                    window: TimingWindow::parse("30-45"),
                    spike_time: ClockTime::hm(14, 0),
                    spike_value,
                    baseline_value: 80.0,
                };
                let r = calculate_score(&input, &mut rng);
                assert!(r.score <= 100);
                assert!([0, 8, 15].contains(&r.impact_bonus));
                if r.placed_time_value <= 0 {
                    assert_eq!(r.score, 0);
                } else {
                    assert!(r.score >= 10, "{} min before scored {}", r.placed_time_value, r.score);
                }
            }
        }
    }
}

#[test]
fn malformed_inputs_are_typed_errors() {
    let mut rng = Rng::new(1);
    assert!(matches!(
        score_from_strings("lunchtime", "high", "30-45", "2:00 PM", 150.0, 80.0, &mut rng),
        Err(PlacementError::PlacedTime(_))
    ));
    assert!(matches!(
        score_from_strings("1:00 PM", "high", "30-45", "25:99", 150.0, 80.0, &mut rng),
        Err(PlacementError::SpikeTime(_))
    ));
    assert!(matches!(
        score_from_strings("1:00 PM", "spicy", "30-45", "2:00 PM", 150.0, 80.0, &mut rng),
        Err(PlacementError::Category(_))
    ));
}

#[test]
fn placement_just_before_midnight_counts_toward_early_spike() {
    // 11:50 PM -> 12:30 AM is 40 minutes, not -1400.
    for seed in 1..20 {
        let mut rng = Rng::new(seed);
        let r = score_from_strings("11:50 PM", "high", "30-45", "12:30 AM", 160.0, 80.0, &mut rng).unwrap();
        assert_eq!(r.placed_time_value, 40);
        assert!((85..=100).contains(&r.timing_score), "timing {}", r.timing_score);
        assert_eq!(r.impact_bonus, 15);
        assert_eq!(r.score, 100);
    }
    // And the other way round: eaten at 12:10 AM for an 11:55 PM spike.
    let mut rng = Rng::new(2);
    let r = score_from_strings("12:10 AM", "high", "30-45", "11:55 PM", 160.0, 80.0, &mut rng).unwrap();
    assert_eq!(r.placed_time_value, -15);
    assert_eq!(r.score, 0);
}

#[test]
fn wasm_entrypoint_returns_full_result() {
    let json = glucose_clock::score_placement("1:10 PM", "high", "45-60", "2:00 PM", 152.0, 70.0).unwrap();
    let result: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(result["score"], 100);
    assert_eq!(result["impact_bonus"], 15);
    assert_eq!(result["verdict"], "excellent");
    assert_eq!(result["feedback"], Verdict::Excellent.message());
    assert!(result["impact_feedback"].as_str().unwrap().starts_with("Great match!"));

    let json = glucose_clock::score_placement("2:30 PM", "low", "minimal", "2:00 PM", 152.0, 70.0).unwrap();
    let result: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(result["score"], 0);
    assert_eq!(result["verdict"], "impossible");
    assert_eq!(glucose_clock::clock_time_at_angle(0.0), "12:00 AM");
    assert_eq!(glucose_clock::clock_time_at_angle(180.0), "12:00 PM");
}
