//! `wasm-bindgen` exports for the gift tree.
//!
//! The browser host calls `app_init` once, then `app_tick` every animation
//! frame. After each tick it reads the frame buffers through the pointer
//! accessors, re-reads the snapshot when the revision changes, performs the
//! drained backend requests and hands their results back via `app_push_reply`.

use std::cell::RefCell;

use gift_tree::{GiftId, InputEvent, MemoryId};
use wasm_bindgen::prelude::*;

pub mod runner;

pub use runner::AppRunner;

thread_local! {
    static RUNNER: RefCell<Option<AppRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut AppRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow.as_mut().expect("Gift tree not initialized. Call app_init() first.");
        f(runner)
    })
}

fn push(event: InputEvent) {
    with_runner(|r| r.push_input(event));
}

/// December 25 of the current year, local midnight, as epoch milliseconds.
fn local_christmas_ms() -> f64 {
    let year = js_sys::Date::new_0().get_full_year();
    js_sys::Date::new_with_year_month_day(year, 11, 25).get_time()
}

/// Start a session. `config_json` may be empty for defaults; `unlock_ms`
/// overrides the unlock instant (defaults to this year's Christmas, local time).
#[wasm_bindgen]
pub fn app_init(config_json: &str, seed: u32, unlock_ms: Option<f64>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let unlock_ms = unlock_ms.unwrap_or_else(local_christmas_ms);
    let mut runner =
        AppRunner::new(config_json, u64::from(seed), unlock_ms).map_err(|e| JsValue::from_str(&e))?;
    runner.init(js_sys::Date::now());

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });
    log::info!("gift-tree: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn app_tick(dt: f32) {
    let now = js_sys::Date::now();
    with_runner(|r| r.tick(dt, now));
}

#[wasm_bindgen]
pub fn app_push_reply(json: &str) -> Result<(), JsValue> {
    with_runner(|r| r.push_reply(json)).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn app_drain_requests() -> Result<String, JsValue> {
    with_runner(|r| r.drain_requests_json()).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn app_snapshot() -> Result<String, JsValue> {
    with_runner(|r| r.snapshot_json()).map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen]
pub fn app_revision() -> f64 {
    with_runner(|r| r.revision())
}

// ---- User actions ----

#[wasm_bindgen]
pub fn app_open_create_gift() {
    push(InputEvent::OpenCreateGift);
}

#[wasm_bindgen]
pub fn app_open_add_memory() {
    push(InputEvent::OpenAddMemory);
}

#[wasm_bindgen]
pub fn app_close_modal() {
    push(InputEvent::CloseModal);
}

#[wasm_bindgen]
pub fn app_dismiss_alert() {
    push(InputEvent::DismissAlert);
}

#[wasm_bindgen]
pub fn app_submit_gift(
    sender_name: String,
    recipient_name: String,
    sender_photo: Option<String>,
    message: String,
) {
    push(InputEvent::SubmitGift {
        sender_name,
        recipient_name,
        sender_photo,
        message,
    });
}

#[wasm_bindgen]
pub fn app_gift_clicked(id: String) {
    push(InputEvent::GiftClicked { id: GiftId(id) });
}

#[wasm_bindgen]
pub fn app_gift_hover(id: String, hovered: bool) {
    push(InputEvent::GiftHover {
        id: GiftId(id),
        hovered,
    });
}

#[wasm_bindgen]
pub fn app_memory_clicked(id: String) {
    push(InputEvent::MemoryClicked { id: MemoryId(id) });
}

#[wasm_bindgen]
pub fn app_memory_hover(id: String, hovered: bool) {
    push(InputEvent::MemoryHover {
        id: MemoryId(id),
        hovered,
    });
}

#[wasm_bindgen]
pub fn app_submit_memory(file_name: String, message: String, sender_name: Option<String>) {
    push(InputEvent::SubmitMemory {
        file_name,
        message,
        sender_name,
    });
}

#[wasm_bindgen]
pub fn app_clear_gifts() {
    push(InputEvent::ClearGifts);
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_header_ptr() -> *const f32 {
    with_runner(|r| r.header_ptr())
}

#[wasm_bindgen]
pub fn get_instances_ptr() -> *const f32 {
    with_runner(|r| r.instances_ptr())
}

#[wasm_bindgen]
pub fn get_instance_count() -> u32 {
    with_runner(|r| r.instance_count())
}

#[wasm_bindgen]
pub fn get_snow_ptr() -> *const f32 {
    with_runner(|r| r.snow_ptr())
}

#[wasm_bindgen]
pub fn get_snow_count() -> u32 {
    with_runner(|r| r.snow_count())
}

#[wasm_bindgen]
pub fn get_lights_ptr() -> *const f32 {
    with_runner(|r| r.lights_ptr())
}

#[wasm_bindgen]
pub fn get_light_count() -> u32 {
    with_runner(|r| r.light_count())
}

#[wasm_bindgen]
pub fn get_ambient() -> f32 {
    with_runner(|r| r.ambient())
}

// ---- Capacity accessors ----

#[wasm_bindgen]
pub fn get_max_instances() -> u32 {
    with_runner(|r| r.max_instances())
}

#[wasm_bindgen]
pub fn get_max_snow() -> u32 {
    with_runner(|r| r.max_snow())
}

#[wasm_bindgen]
pub fn get_max_lights() -> u32 {
    with_runner(|r| r.max_lights())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.buffer_total_floats())
}
