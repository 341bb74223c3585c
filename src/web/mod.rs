//! Browser glue. Everything in here touches the DOM; the rules themselves live
//! in the pure modules and are driven through one thread-local [`GameSession`].

mod drag;
mod fetch;

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent, ScrollBehavior, ScrollIntoViewOptions, SvgElement, window};

use crate::config::GameConfig;
use crate::explainer::{parse_daily_patterns, tooltip_lines, CategoryFilter, ComparisonAxis, FoodResponses};
use crate::food::GlycemicImpact;
use crate::rng::{entropy_seed, Rng};
use crate::scenario::{PoolSource, Reveal, Scenario, ScenarioPool};
use crate::scoring::ScoreResult;
use crate::session::{Advance, GameSession, PlacedFood, SessionError, Tab};

const ACTIVE_TAB_COLOR: &str = "#0066CC";
const INACTIVE_TAB_COLOR: &str = "#cccccc";
const FACT_HIGHLIGHT_MS: i32 = 8000;
/// Hours after a meal searched for its peak in the daily summary.
const MEAL_WINDOW_HOURS: f64 = 2.0;

thread_local! {
    static SESSION: RefCell<Option<GameSession>> = const { RefCell::new(None) };
    static CONFIG: RefCell<Option<GameConfig>> = const { RefCell::new(None) };
}

/// Run `f` against the live session. `None` before `start_game`.
/// Never call back into this from inside `f`.
pub(crate) fn with_session<R>(f: impl FnOnce(&mut GameSession) -> R) -> Option<R> {
    SESSION.with(|cell| cell.borrow_mut().as_mut().map(f))
}

pub(crate) fn config() -> GameConfig {
    CONFIG.with(|c| c.borrow().clone().unwrap_or_default())
}

// --- DOM helpers ------------------------------------------------------------------

pub(crate) fn document() -> Result<Document, JsValue> {
    window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

pub(crate) fn html_by_id(doc: &Document, id: &str) -> Option<HtmlElement> {
    doc.get_element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

pub(crate) fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

pub(crate) fn set_display(el: &HtmlElement, value: &str) {
    set_style(el, "display", value);
}

/// Show or hide an HTML or SVG element.
pub(crate) fn set_visible(el: &Element, visible: bool) {
    let value = if visible { "block" } else { "none" };
    if let Some(h) = el.dyn_ref::<HtmlElement>() {
        set_display(h, value);
    } else if let Some(s) = el.dyn_ref::<SvgElement>() {
        let _ = s.style().set_property("display", value);
    }
}

pub(crate) fn set_visible_by_id(doc: &Document, id: &str, visible: bool) {
    if let Some(el) = doc.get_element_by_id(id) {
        set_visible(&el, visible);
    }
}

pub(crate) fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub(crate) fn for_each_html(doc: &Document, selector: &str, mut f: impl FnMut(HtmlElement)) {
    let Ok(list) = doc.query_selector_all(selector) else {
        return;
    };
    for i in 0..list.length() {
        if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) {
            f(el);
        }
    }
}

/// Run `f` once after `ms` milliseconds.
pub(crate) fn after(ms: i32, f: impl FnOnce() + 'static) {
    let Some(win) = window() else {
        return;
    };
    let cb = Closure::once_into_js(f);
    if let Err(e) = win.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms) {
        log::warn!("setTimeout failed: {:?}", e);
    }
}

/// Attach a click handler to `#id`. `Ok(false)` when the element is absent.
fn on_click(doc: &Document, id: &str, mut handler: impl FnMut() + 'static) -> Result<bool, JsValue> {
    let Some(el) = doc.get_element_by_id(id) else {
        return Ok(false);
    };
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| handler()) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(true)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// --- Startup ----------------------------------------------------------------------

pub fn start_game(config: GameConfig) -> Result<(), JsValue> {
    let doc = document()?;
    let seed = config.seed.unwrap_or_else(entropy_seed);
    CONFIG.with(|c| *c.borrow_mut() = Some(config.clone()));
    SESSION.with(|cell| *cell.borrow_mut() = Some(GameSession::new(Rng::new(seed))));

    hide_results(&doc);
    render_tab(&doc, Tab::Explainer);
    wire_tabs(&doc)?;
    wire_round_buttons(&doc)?;
    wire_fun_facts(&doc)?;
    wire_comparison_tooltip(&doc)?;
    drag::wire_food_options(&doc)?;
    apply_filter(&doc, CategoryFilter::All);

    wasm_bindgen_futures::spawn_local(load_scenarios(config.clone(), false));
    wasm_bindgen_futures::spawn_local(load_explainer_data(config));
    log::info!("glucose clock started (seed {})", seed);
    Ok(())
}

// --- Tabs -------------------------------------------------------------------------

fn render_tab(doc: &Document, tab: Tab) {
    let game = tab == Tab::Game;
    set_visible_by_id(doc, "explainer-content", !game);
    set_visible_by_id(doc, "game-content", game);
    let (explainer_bg, game_bg) = if game {
        (INACTIVE_TAB_COLOR, ACTIVE_TAB_COLOR)
    } else {
        (ACTIVE_TAB_COLOR, INACTIVE_TAB_COLOR)
    };
    if let Some(el) = html_by_id(doc, "explainer-tab") {
        set_style(&el, "background-color", explainer_bg);
    }
    if let Some(el) = html_by_id(doc, "game-tab") {
        set_style(&el, "background-color", game_bg);
    }
}

fn switch_tab(tab: Tab) {
    with_session(|s| s.show(tab));
    if let Ok(doc) = document() {
        render_tab(&doc, tab);
    }
}

fn wire_tabs(doc: &Document) -> Result<(), JsValue> {
    on_click(doc, "explainer-tab", || switch_tab(Tab::Explainer))?;
    on_click(doc, "game-tab", || switch_tab(Tab::Game))?;
    on_click(doc, "start-game-btn", || switch_tab(Tab::Game))?;
    Ok(())
}

// --- Rounds -----------------------------------------------------------------------

fn wire_round_buttons(doc: &Document) -> Result<(), JsValue> {
    if !on_click(doc, "submit-analysis-btn", submit_analysis)? {
        log::error!("#submit-analysis-btn not found; predictions cannot be submitted");
    }
    on_click(doc, "try-another-btn", try_another)?;
    Ok(())
}

fn submit_analysis() {
    let Ok(doc) = document() else {
        return;
    };
    let outcome = with_session(|s| {
        let result = s.submit()?;
        let placed = s.placed().cloned().ok_or(SessionError::NothingPlaced)?;
        let reveal = s.current_scenario().map(Scenario::reveal).ok_or(SessionError::NoScenario)?;
        Ok::<_, SessionError>((placed, reveal, result))
    });
    match outcome {
        Some(Ok((placed, reveal, result))) => show_results(&doc, &placed, &reveal, &result),
        Some(Err(e)) => log::warn!("submit ignored: {}", e),
        None => log::error!("submit before the game started"),
    }
}

fn show_results(doc: &Document, placed: &PlacedFood, reveal: &Reveal, result: &ScoreResult) {
    set_text(doc, "placed-food-name", &capitalize(&placed.food));
    set_text(doc, "placed-food-time", &placed.time.to_string());
    set_text(doc, "food-timing", &placed.timing.to_string());
    set_text(doc, "glycemic-impact", &capitalize(placed.impact.as_str()));
    set_text(doc, "score-value", &result.score.to_string());
    set_text(doc, "score-feedback", &result.feedback);
    set_text(doc, "impact-feedback", &result.impact_feedback);

    // What was actually eaten.
    set_text(doc, "actual-food", &reveal.food_label());
    set_text(doc, "actual-impact", &capitalize(reveal.impact.as_str()));
    set_text(
        doc,
        "actual-timing",
        &reveal.window.map_or_else(|| "unknown".to_string(), |w| w.to_string()),
    );
    set_text(
        doc,
        "optimal-time",
        &reveal.eaten_at.map_or_else(|| "not recorded".to_string(), |t| t.to_string()),
    );

    let Some(panel) = results_panel(doc) else {
        log::warn!("no results panel on the page");
        return;
    };
    set_display(&panel, "block");
    let opts = ScrollIntoViewOptions::new();
    opts.set_behavior(ScrollBehavior::Smooth);
    panel.scroll_into_view_with_scroll_into_view_options(&opts);
}

fn results_panel(doc: &Document) -> Option<HtmlElement> {
    doc.query_selector(".results-panel")
        .ok()
        .flatten()
        .or_else(|| doc.get_element_by_id("results-panel"))?
        .dyn_into::<HtmlElement>()
        .ok()
}

pub(super) fn hide_results(doc: &Document) {
    if let Some(panel) = results_panel(doc) {
        set_display(&panel, "none");
    }
    if let Some(btn) = html_by_id(doc, "submit-analysis-btn") {
        set_display(&btn, "none");
    }
}

fn try_another() {
    let Ok(doc) = document() else {
        return;
    };
    drag::clear_placed_foods(&doc);
    drag::reset_food_options(&doc);
    hide_results(&doc);
    match with_session(GameSession::next_scenario) {
        Some(Advance::Next) => render_current_scenario(&doc),
        Some(Advance::PoolExhausted) => {
            log::info!("scenario pool exhausted, reloading");
            wasm_bindgen_futures::spawn_local(load_scenarios(config(), true));
        }
        None => log::error!("try another before the game started"),
    }
}

/// Text shown for the active scenario.
struct ScenarioText {
    name: String,
    spike_time: String,
    spike_value: String,
    baseline: String,
    details: String,
}

impl ScenarioText {
    fn describe(s: &Scenario) -> Self {
        let details = match s {
            Scenario::Mock(m) => format!(
                "Age {} · BMI {:.1} · A1C {:.1}%",
                m.patient_age, m.patient_bmi, m.patient_a1c
            ),
            Scenario::Recorded(ev) => format!("{} readings recorded around the spike", ev.response_curve.len()),
        };
        Self {
            name: s.name(),
            spike_time: s.spike_time().to_string(),
            spike_value: format!("{:.0} mg/dL", s.spike_value()),
            baseline: format!("{:.0} mg/dL", s.baseline_value()),
            details,
        }
    }
}

fn render_current_scenario(doc: &Document) {
    let Some(text) = with_session(|s| s.current_scenario().map(ScenarioText::describe)).flatten() else {
        log::warn!("no scenario to show");
        return;
    };
    set_text(doc, "scenario-name", &text.name);
    set_text(doc, "scenario-spike-time", &text.spike_time);
    set_text(doc, "scenario-spike-value", &text.spike_value);
    set_text(doc, "scenario-baseline", &text.baseline);
    set_text(doc, "scenario-details", &text.details);
    log::debug!("showing scenario {}", text.name);
}

async fn load_scenarios(config: GameConfig, reloading: bool) {
    let rules = config.selection_rules();
    let fetched = fetch::fetch_text(&config.spike_events_url).await;
    if let Err(e) = &fetched {
        log::warn!("could not fetch {}: {:?}; using practice scenarios", config.spike_events_url, e);
    }

    let alert = with_session(|s| {
        let pool = match &fetched {
            Ok(text) => ScenarioPool::from_json(text, &rules, s.rng_mut()),
            Err(_) => ScenarioPool::mock(&rules),
        };
        let loaded = pool.source() != PoolSource::Mock;
        log::info!("{} scenarios ready ({:?})", pool.len(), pool.source());
        s.install_pool(pool);
        reloading && s.note_reload(loaded)
    });

    if alert == Some(true) {
        if let Some(win) = window() {
            let _ = win.alert_with_message("Couldn't load new scenarios, replaying the practice ones.");
        }
    }
    if let Ok(doc) = document() {
        render_current_scenario(&doc);
    }
}

// --- Explainer ----------------------------------------------------------------------

async fn load_explainer_data(config: GameConfig) {
    match fetch::fetch_text(&config.food_responses_url).await {
        Ok(text) => match FoodResponses::from_json(&text) {
            Ok(curves) => {
                with_session(|s| s.set_food_responses(curves));
            }
            Err(e) => log::warn!("{}; keeping reference curves", e),
        },
        Err(e) => log::warn!("could not fetch {}: {:?}", config.food_responses_url, e),
    }

    match fetch::fetch_text(&config.daily_patterns_url).await {
        Ok(text) => match parse_daily_patterns(&text) {
            Ok(days) => {
                with_session(|s| s.set_daily_patterns(days));
                if let Ok(doc) = document() {
                    render_daily_summary(&doc);
                }
            }
            Err(e) => log::warn!("{}", e),
        },
        Err(e) => log::warn!("could not fetch {}: {:?}", config.daily_patterns_url, e),
    }
}

fn render_daily_summary(doc: &Document) {
    let summary = with_session(|s| {
        let days = s.daily_patterns();
        let peak = days
            .iter()
            .filter_map(|d| d.highest_reading())
            .map(|r| r.value)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
        let biggest = days
            .iter()
            .flat_map(|d| d.meal_rises(MEAL_WINDOW_HOURS))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(meal, rise)| format!("{} (+{:.0} mg/dL)", meal.description, rise));
        match (peak, biggest) {
            (Some(p), Some(meal)) => format!(
                "{} days recorded. Highest reading {:.0} mg/dL. Biggest meal spike: {}.",
                days.len(),
                p,
                meal
            ),
            (Some(p), None) => format!("{} days recorded. Highest reading {:.0} mg/dL.", days.len(), p),
            _ => String::new(),
        }
    });
    if let Some(text) = summary.filter(|t| !t.is_empty()) {
        set_text(doc, "daily-pattern-summary", &text);
    }
}

pub fn select_food_category(category: &str) -> Result<(), JsValue> {
    let filter = CategoryFilter::parse(category)
        .ok_or_else(|| JsValue::from_str(&format!("unknown food category '{}'", category)))?;
    with_session(|s| s.set_filter(filter));
    apply_filter(&document()?, filter);
    Ok(())
}

fn apply_filter(doc: &Document, filter: CategoryFilter) {
    for_each_html(doc, ".food-toggle-btn", |btn| {
        set_style(&btn, "background-color", "#f5f5f7");
        set_style(&btn, "color", "#333");
    });
    for_each_html(doc, ".food-category", |card| {
        set_style(&card, "border-color", "#f0f0f0");
        set_style(&card, "transform", "scale(1)");
        set_style(&card, "box-shadow", "0 2px 8px rgba(0,0,0,0.05)");
    });
    if let Some(btn) = html_by_id(doc, &filter.button_id()) {
        set_style(&btn, "background-color", ACTIVE_TAB_COLOR);
        set_style(&btn, "color", "white");
    }
    if let CategoryFilter::Only(c) = filter {
        for_each_html(doc, &format!(".{}-glycemic", c), |card| {
            set_style(&card, "border-color", c.color());
            set_style(&card, "transform", "scale(1.05)");
            set_style(&card, "box-shadow", "0 4px 12px rgba(0,0,0,0.1)");
        });
    }

    for c in GlycemicImpact::ALL {
        let visible = filter.shows(c);
        set_visible_by_id(doc, &format!("{}-glycemic-curve", c), visible);
        // Only some categories carry an annotation.
        set_visible_by_id(doc, &format!("{}-glycemic-annotation", c), visible);
    }
    if let Ok(Some(legend)) = doc.query_selector(".legend") {
        set_visible(&legend, filter.shows_legend());
    }
    log::debug!("comparison filter: {}", filter);
}

fn hide_comparison_tooltip(doc: &Document) {
    set_visible_by_id(doc, "food-tooltip-line", false);
    set_visible_by_id(doc, "food-tooltip", false);
    for c in GlycemicImpact::ALL {
        set_visible_by_id(doc, &format!("{}-glucose-point", c), false);
    }
}

fn wire_comparison_tooltip(doc: &Document) -> Result<(), JsValue> {
    let (Some(container), Some(graph)) = (
        doc.query_selector(".graph-container")?,
        doc.get_element_by_id("food-comparison-graph"),
    ) else {
        return Ok(());
    };

    let area = container.clone();
    let on_move = Closure::wrap(Box::new(move |evt: MouseEvent| {
        let Ok(doc) = document() else {
            return;
        };
        let axis = ComparisonAxis::default();
        let x = evt.client_x() as f64 - graph.get_bounding_client_rect().left();
        let Some(minute) = axis.minute_at(x) else {
            hide_comparison_tooltip(&doc);
            return;
        };
        let lines = with_session(|s| tooltip_lines(&s.comparison_curves(), s.filter(), minute)).unwrap_or_default();

        if let Some(line) = doc.get_element_by_id("food-tooltip-line") {
            let _ = line.set_attribute("x1", &x.to_string());
            let _ = line.set_attribute("x2", &x.to_string());
            set_visible(&line, true);
        }
        for c in GlycemicImpact::ALL {
            let Some(point) = doc.get_element_by_id(&format!("{}-glucose-point", c)) else {
                continue;
            };
            match lines.iter().find(|l| l.impact == c) {
                Some(l) => {
                    let _ = point.set_attribute("cx", &x.to_string());
                    let _ = point.set_attribute("cy", &axis.y_for_value(l.value).to_string());
                    set_visible(&point, true);
                }
                None => set_visible(&point, false),
            }
        }

        if let Some(tooltip) = html_by_id(&doc, "food-tooltip") {
            let mut html = format!("<strong>{:.0} min after eating</strong>", minute);
            for l in &lines {
                html.push_str("<br>");
                html.push_str(&l.html());
            }
            tooltip.set_inner_html(&html);
            let rect = area.get_bounding_client_rect();
            set_style(&tooltip, "left", &format!("{}px", evt.client_x() as f64 - rect.left() + 15.0));
            set_style(&tooltip, "top", &format!("{}px", evt.client_y() as f64 - rect.top() - 40.0));
            set_display(&tooltip, "block");
        }
    }) as Box<dyn FnMut(_)>);
    container.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    on_move.forget();

    let on_leave = Closure::wrap(Box::new(move |_evt: MouseEvent| {
        if let Ok(doc) = document() {
            hide_comparison_tooltip(&doc);
        }
    }) as Box<dyn FnMut(_)>);
    container.add_event_listener_with_callback("mouseleave", on_leave.as_ref().unchecked_ref())?;
    on_leave.forget();
    Ok(())
}

// --- Fun facts ----------------------------------------------------------------------

fn wire_fun_facts(doc: &Document) -> Result<(), JsValue> {
    if !on_click(doc, "fun-fact-button", || show_fact_modal(true))? {
        return Ok(());
    }
    on_click(doc, "fun-fact-close", || show_fact_modal(false))?;
    on_click(doc, "fun-fact-overlay", || show_fact_modal(false))?;
    on_click(doc, "next-fact-button", next_fact)?;

    // Periodic nudge so the button gets noticed.
    let highlight = Closure::wrap(Box::new(|| {
        let Ok(doc) = document() else {
            return;
        };
        let Some(button) = doc.get_element_by_id("fun-fact-button") else {
            return;
        };
        let _ = button.class_list().add_1("highlight");
        after(1000, move || {
            let _ = button.class_list().remove_1("highlight");
        });
    }) as Box<dyn FnMut()>);
    if let Some(win) = window() {
        win.set_interval_with_callback_and_timeout_and_arguments_0(
            highlight.as_ref().unchecked_ref(),
            FACT_HIGHLIGHT_MS,
        )?;
    }
    highlight.forget();
    Ok(())
}

fn render_fact(doc: &Document, text: &str, position: usize, total: usize) {
    set_text(doc, "fun-fact-content", text);
    set_text(doc, "current-fact", &position.to_string());
    set_text(doc, "total-facts", &total.to_string());
}

fn show_fact_modal(open: bool) {
    let Ok(doc) = document() else {
        return;
    };
    if open {
        if let Some((text, pos, total)) = with_session(|s| (s.facts().current(), s.facts().position(), s.facts().total())) {
            render_fact(&doc, text, pos, total);
        }
    }
    for id in ["fun-fact-modal", "fun-fact-overlay"] {
        if let Some(el) = doc.get_element_by_id(id) {
            let classes = el.class_list();
            let _ = if open { classes.add_1("show") } else { classes.remove_1("show") };
        }
    }
}

fn next_fact() {
    let Ok(doc) = document() else {
        return;
    };
    let Some((text, pos, total)) = with_session(|s| {
        let text = s.facts_mut().advance();
        (text, s.facts().position(), s.facts().total())
    }) else {
        return;
    };
    let Some(content) = html_by_id(&doc, "fun-fact-content") else {
        return;
    };
    // Fade out, swap text, fade back in.
    set_style(&content, "opacity", "0");
    after(300, move || {
        if let Ok(doc) = document() {
            render_fact(&doc, text, pos, total);
        }
        set_style(&content, "opacity", "1");
    });
}
