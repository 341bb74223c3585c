// Browser-side smoke tests. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn dial_labels_match_clock_positions() {
    assert_eq!(glucose_clock::clock_time_at_angle(90.0), "6:00 AM");
    assert_eq!(glucose_clock::clock_time_at_angle(270.0), "6:00 PM");
}

#[wasm_bindgen_test]
fn unknown_filter_is_rejected() {
    assert!(glucose_clock::select_food_category("spicy").is_err());
}

#[wasm_bindgen_test]
fn bad_placement_is_an_error() {
    assert!(glucose_clock::score_placement("soon", "high", "30-45", "2:00 PM", 150.0, 80.0).is_err());
}

#[wasm_bindgen_test]
fn picking_up_a_food_hides_the_previous_result() {
    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    let doc = web_sys::window().unwrap().document().unwrap();
    let body = doc.body().unwrap();
    let panel: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    panel.set_class_name("results-panel");
    body.append_child(&panel).unwrap();
    let rice: HtmlElement = doc.create_element("div").unwrap().dyn_into().unwrap();
    rice.set_class_name("food-option draggable");
    rice.set_attribute("data-food", "rice").unwrap();
    rice.set_text_content(Some("🍚 Rice"));
    body.append_child(&rice).unwrap();

    glucose_clock::start_game().unwrap();
    // As left behind by a scored round.
    panel.style().set_property("display", "block").unwrap();

    let down = web_sys::MouseEvent::new("mousedown").unwrap();
    rice.dispatch_event(&down).unwrap();
    assert_eq!(panel.style().get_property_value("display").unwrap(), "none");

    let up = web_sys::MouseEvent::new("mouseup").unwrap();
    doc.dispatch_event(&up).unwrap();
}
