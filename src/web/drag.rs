//! Dragging food icons onto the clock face.
//!
//! One pair of document-level `mousemove`/`mouseup` closures is built once and
//! kept alive in `LISTENERS`; they are added on `mousedown` and removed again
//! on `mouseup`, so there is never more than one set attached.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, MouseEvent};

use super::{
    after, config, document, for_each_html, hide_results, html_by_id, set_display, set_style, set_visible_by_id,
    with_session,
};
use crate::clock::{polar_to_cartesian, ClockTime, Dial, Point};
use crate::food::{find_food, GlycemicImpact, TimingWindow};
use crate::session::PlacedFood;

// Clock face artwork is a 600x600 SVG.
const SVG_CENTER: Point = Point::new(300.0, 300.0);
const SVG_HALF: f64 = 300.0;
const INDICATOR_RADIUS: f64 = 270.0;
const LABEL_RADIUS: f64 = 290.0;
const FOOD_RADIUS: f64 = 230.0;

/// Food carried by the pointer, read from the option's `data-*` attributes.
#[derive(Clone, Debug)]
struct DraggedFood {
    name: String,
    emoji: String,
    impact: GlycemicImpact,
    timing: TimingWindow,
}

impl DraggedFood {
    fn from_element(el: &HtmlElement) -> Option<Self> {
        let name = el.get_attribute("data-food")?;
        let catalog = find_food(&name);

        let impact = el
            .get_attribute("data-impact")
            .and_then(|s| s.parse().ok())
            .or(catalog.map(|f| f.impact));
        let Some(impact) = impact else {
            log::error!("food '{}' has no glycemic impact", name);
            return None;
        };
        let timing = match el.get_attribute("data-timing").map(|s| TimingWindow::parse(&s)) {
            Some(TimingWindow::Unspecified) | None => catalog.map_or(TimingWindow::Unspecified, |f| f.timing),
            Some(t) => t,
        };
        let emoji = el
            .text_content()
            .and_then(|t| t.split_whitespace().next().map(str::to_string))
            .or(catalog.map(|f| f.emoji.to_string()))
            .unwrap_or_default();

        Some(Self { name, emoji, impact, timing })
    }

    fn at(&self, time: ClockTime) -> PlacedFood {
        PlacedFood {
            food: self.name.clone(),
            impact: self.impact,
            timing: self.timing,
            time,
        }
    }
}

struct ActiveDrag {
    source: HtmlElement,
    ghost: HtmlElement,
    offset_x: f64,
    offset_y: f64,
    food: DraggedFood,
}

struct DragListeners {
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_up: Closure<dyn FnMut(MouseEvent)>,
}

thread_local! {
    static ACTIVE: RefCell<Option<ActiveDrag>> = const { RefCell::new(None) };
    static LISTENERS: RefCell<Option<DragListeners>> = const { RefCell::new(None) };
}

/// The clock container and its dial in client coordinates.
struct ClockFace {
    container: Element,
    dial: Dial,
    /// Dial center relative to the container.
    local_center: Point,
}

impl ClockFace {
    fn find(doc: &Document) -> Option<Self> {
        let container = doc.query_selector(".clock-container").ok().flatten()?;
        let rect = container.get_bounding_client_rect();
        Some(Self {
            dial: Dial::from_box(rect.left(), rect.top(), rect.width(), rect.height()),
            local_center: Point::new(rect.width() / 2.0, rect.height() / 2.0),
            container,
        })
    }

    /// Pixels on screen per SVG unit.
    fn scale(&self) -> f64 {
        self.dial.radius / SVG_HALF
    }
}

fn px(v: f64) -> String {
    format!("{}px", v)
}

fn client_point(evt: &MouseEvent) -> Point {
    Point::new(evt.client_x() as f64, evt.client_y() as f64)
}

pub(super) fn wire_food_options(doc: &Document) -> Result<(), JsValue> {
    LISTENERS.with(|l| {
        if l.borrow().is_none() {
            *l.borrow_mut() = Some(DragListeners {
                on_move: Closure::wrap(Box::new(move_drag) as Box<dyn FnMut(MouseEvent)>),
                on_up: Closure::wrap(Box::new(end_drag) as Box<dyn FnMut(MouseEvent)>),
            });
        }
    });

    let mut wired = 0;
    let mut failed = None;
    for_each_html(doc, ".food-option.draggable", |item| {
        let source = item.clone();
        let closure = Closure::wrap(Box::new(move |evt: MouseEvent| start_drag(&source, evt)) as Box<dyn FnMut(_)>);
        match item.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref()) {
            Ok(()) => wired += 1,
            Err(e) => failed = Some(e),
        }
        closure.forget();
    });
    if let Some(e) = failed {
        return Err(e);
    }
    log::debug!("{} draggable foods wired", wired);
    Ok(())
}

fn listen(doc: &Document, attach: bool) {
    LISTENERS.with(|l| {
        let guard = l.borrow();
        let Some(listeners) = guard.as_ref() else {
            return;
        };
        for (event, cb) in [("mousemove", &listeners.on_move), ("mouseup", &listeners.on_up)] {
            let f: &js_sys::Function = cb.as_ref().unchecked_ref();
            let res = if attach {
                doc.add_event_listener_with_callback(event, f)
            } else {
                doc.remove_event_listener_with_callback(event, f)
            };
            if let Err(e) = res {
                log::error!("{} listener ({}): {:?}", event, if attach { "attach" } else { "detach" }, e);
            }
        }
    });
}

fn start_drag(source: &HtmlElement, evt: MouseEvent) {
    evt.prevent_default();
    let Ok(doc) = document() else {
        return;
    };
    let Some(food) = DraggedFood::from_element(source) else {
        return;
    };

    // A missed mouseup (pointer released outside the window) leaves a stale drag.
    if let Some(stale) = ACTIVE.with(|a| a.borrow_mut().take()) {
        stale.ghost.remove();
        let _ = stale.source.class_list().remove_1("dragging");
        listen(&doc, false);
    }

    // Only one food on the clock at a time, and no stale score beside it.
    clear_placed_foods(&doc);
    with_session(|s| s.reset_round());
    hide_results(&doc);

    let rect = source.get_bounding_client_rect();
    let offset_x = evt.client_x() as f64 - rect.left();
    let offset_y = evt.client_y() as f64 - rect.top();
    let Some(ghost) = source
        .clone_node_with_deep(true)
        .ok()
        .and_then(|n| n.dyn_into::<HtmlElement>().ok())
    else {
        log::error!("could not clone '{}' for dragging", food.name);
        return;
    };
    ghost.set_id("drag-clone");
    set_style(&ghost, "position", "absolute");
    set_style(&ghost, "left", &px(evt.page_x() as f64 - offset_x));
    set_style(&ghost, "top", &px(evt.page_y() as f64 - offset_y));
    set_style(&ghost, "z-index", "1000");
    set_style(&ghost, "pointer-events", "none");
    set_style(&ghost, "opacity", "0.8");
    let Some(body) = doc.body() else {
        return;
    };
    if let Err(e) = body.append_child(&ghost) {
        log::error!("drag clone: {:?}", e);
        return;
    }
    let _ = source.class_list().add_1("dragging");
    set_visible_by_id(&doc, "time-indicator-line", true);
    set_visible_by_id(&doc, "time-indicator-label", true);

    log::debug!("dragging {}", food.name);
    ACTIVE.with(|a| {
        *a.borrow_mut() = Some(ActiveDrag {
            source: source.clone(),
            ghost,
            offset_x,
            offset_y,
            food,
        })
    });
    listen(&doc, true);
}

fn move_drag(evt: MouseEvent) {
    let Ok(doc) = document() else {
        return;
    };
    let dragging = ACTIVE.with(|a| {
        let guard = a.borrow();
        let Some(drag) = guard.as_ref() else {
            return false;
        };
        set_style(&drag.ghost, "left", &px(evt.page_x() as f64 - drag.offset_x));
        set_style(&drag.ghost, "top", &px(evt.page_y() as f64 - drag.offset_y));
        true
    });
    if !dragging {
        return;
    }

    let Some(face) = ClockFace::find(&doc) else {
        return;
    };
    let p = client_point(&evt);
    let Some(time) = face.dial.time_at(p) else {
        set_visible_by_id(&doc, "drop-target", false);
        return;
    };
    let angle = face.dial.angle_of(p);

    let end = polar_to_cartesian(SVG_CENTER, INDICATOR_RADIUS, angle);
    if let Some(line) = doc.get_element_by_id("time-indicator-line") {
        let _ = line.set_attribute("x2", &end.x.to_string());
        let _ = line.set_attribute("y2", &end.y.to_string());
    }
    if let Some(target) = doc.get_element_by_id("drop-target") {
        let _ = target.set_attribute("cx", &end.x.to_string());
        let _ = target.set_attribute("cy", &end.y.to_string());
    }
    set_visible_by_id(&doc, "drop-target", true);
    if let Some(label) = html_by_id(&doc, "time-indicator-label") {
        label.set_text_content(Some(&time.to_string()));
        let at = polar_to_cartesian(face.local_center, LABEL_RADIUS * face.scale(), angle);
        set_style(&label, "left", &px(at.x));
        set_style(&label, "top", &px(at.y));
    }
}

fn end_drag(evt: MouseEvent) {
    let Ok(doc) = document() else {
        return;
    };
    listen(&doc, false);
    let Some(drag) = ACTIVE.with(|a| a.borrow_mut().take()) else {
        return;
    };
    drag.ghost.remove();
    let _ = drag.source.class_list().remove_1("dragging");
    for id in ["drop-target", "time-indicator-line", "time-indicator-label"] {
        set_visible_by_id(&doc, id, false);
    }

    let Some(face) = ClockFace::find(&doc) else {
        log::error!(".clock-container not found; drop ignored");
        return;
    };
    let p = client_point(&evt);
    let Some(time) = face.dial.time_at(p) else {
        return;
    };
    if let Err(e) = place_icon(&doc, &face, &drag.food, time, face.dial.angle_of(p)) {
        log::error!("could not place {}: {:?}", drag.food.name, e);
        return;
    }
    with_session(|s| s.place_food(drag.food.at(time)));
    log::info!("{} placed at {}", drag.food.name, time);

    if let Some(btn) = html_by_id(&doc, "submit-analysis-btn") {
        set_display(&btn, "block");
    }
    notify(&doc);
}

fn place_icon(doc: &Document, face: &ClockFace, food: &DraggedFood, time: ClockTime, angle: f64) -> Result<(), JsValue> {
    clear_placed_foods(doc);
    let icon: HtmlElement = doc.create_element("div")?.dyn_into()?;
    icon.set_class_name("placed-food");
    icon.set_text_content(Some(&food.emoji));
    icon.set_attribute("data-food", &food.name)?;
    icon.set_attribute("data-time", &time.to_string())?;
    icon.set_attribute("data-impact", food.impact.as_str())?;
    icon.set_attribute("data-timing", &food.timing.to_string())?;
    let at = polar_to_cartesian(face.local_center, FOOD_RADIUS * face.scale(), angle);
    set_style(&icon, "left", &px(at.x));
    set_style(&icon, "top", &px(at.y));
    face.container.append_child(&icon)?;
    Ok(())
}

fn notify(doc: &Document) {
    let Some(note) = html_by_id(doc, "prediction-notification") else {
        return;
    };
    note.set_text_content(Some("Food placed! Submit your analysis when you're ready."));
    set_style(&note, "opacity", "1");
    set_display(&note, "block");
    after(config().notification_ms, move || {
        set_style(&note, "opacity", "0");
        after(500, move || set_display(&note, "none"));
    });
}

pub(super) fn clear_placed_foods(doc: &Document) {
    for_each_html(doc, ".placed-food", |el| el.remove());
}

pub(super) fn reset_food_options(doc: &Document) {
    for_each_html(doc, ".food-option.draggable", |el| {
        let _ = el.class_list().remove_1("dragging");
        set_style(&el, "opacity", "1");
    });
}
