// Built-in scenarios.
// These keep the game playable when the recorded spike file is missing,
// unparseable, or has nothing that qualifies. Order is fixed.
use super::MockScenario;
use crate::clock::ClockTime;
use crate::food::{GlycemicImpact, TimingWindow};

pub static MOCK_SCENARIOS: [MockScenario; 3] = [
    MockScenario {
        name: "Maria Chen",
        food_type: "White rice",
        food_emoji: "🍚",
        glucose_impact: GlycemicImpact::High,
        timing_window: TimingWindow::Range { from: 45, to: 60 },
        spike_time: ClockTime::hm(14, 0),
        optimal_placement_time: ClockTime::hm(13, 8),
        spike_value: 152.0,
        baseline_value: 70.0,
        patient_age: 34,
        patient_bmi: 23.1,
        patient_a1c: 5.2,
    },
    MockScenario {
        name: "James Rodriguez",
        food_type: "Apple",
        food_emoji: "🍎",
        glucose_impact: GlycemicImpact::Medium,
        timing_window: TimingWindow::Range { from: 30, to: 45 },
        spike_time: ClockTime::hm(11, 15),
        optimal_placement_time: ClockTime::hm(10, 38),
        spike_value: 142.0,
        baseline_value: 92.0,
        patient_age: 52,
        patient_bmi: 27.4,
        patient_a1c: 5.9,
    },
    MockScenario {
        name: "Aisha Patel",
        food_type: "Broccoli",
        food_emoji: "🥦",
        glucose_impact: GlycemicImpact::Low,
        timing_window: TimingWindow::Minimal,
        spike_time: ClockTime::hm(19, 45),
        optimal_placement_time: ClockTime::hm(19, 30),
        spike_value: 118.0,
        baseline_value: 96.0,
        patient_age: 45,
        patient_bmi: 24.8,
        patient_a1c: 5.4,
    },
];
