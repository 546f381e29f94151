use chrono::{DateTime, Utc};
use gift_tree::{App, BackendReply, ConfigError, InputEvent, SceneConfig, UnlockGate};

/// Owns the session and translates between host values (JSON strings,
/// epoch milliseconds) and core types.
///
/// Kept free of `wasm_bindgen` so it can be exercised by native tests; the
/// exports in `lib.rs` are thin wrappers around it.
pub struct AppRunner {
    app: App,
    initialized: bool,
}

impl AppRunner {
    pub fn new(config_json: &str, seed: u64, unlock_ms: f64) -> Result<Self, String> {
        let config = if config_json.trim().is_empty() {
            SceneConfig::default()
        } else {
            SceneConfig::from_json(config_json).map_err(|e: ConfigError| e.to_string())?
        };
        let gate = UnlockGate::from_epoch_millis(unlock_ms as i64)
            .ok_or_else(|| format!("unlock time {unlock_ms} is out of range"))?;
        Ok(Self {
            app: App::new(config, gate, seed),
            initialized: false,
        })
    }

    /// Initialize the session. Call once after construction.
    pub fn init(&mut self, now_ms: f64) {
        self.app.init(instant(now_ms));
        self.initialized = true;
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.app.push_input(event);
    }

    pub fn push_reply(&mut self, json: &str) -> Result<(), String> {
        let reply = BackendReply::from_json(json).map_err(|e| format!("bad reply: {e}"))?;
        self.app.push_input(InputEvent::Reply(reply));
        Ok(())
    }

    /// Run one frame tick.
    pub fn tick(&mut self, dt: f32, now_ms: f64) {
        if !self.initialized {
            return;
        }
        self.app.tick(dt, instant(now_ms));
    }

    /// JSON array of backend calls queued since the last drain.
    pub fn drain_requests_json(&mut self) -> Result<String, String> {
        serde_json::to_string(&self.app.drain_requests()).map_err(|e| e.to_string())
    }

    pub fn snapshot_json(&self) -> Result<String, String> {
        self.app.snapshot().to_json().map_err(|e| e.to_string())
    }

    pub fn revision(&self) -> f64 {
        self.app.revision() as f64
    }

    // ---- Pointer accessors for zero-copy reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.app.header().as_ptr()
    }

    pub fn instances_ptr(&self) -> *const f32 {
        self.app.frame().instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.app.frame().instance_count()
    }

    pub fn snow_ptr(&self) -> *const f32 {
        self.app.snow().positions_ptr()
    }

    pub fn snow_count(&self) -> u32 {
        self.app.snow().count() as u32
    }

    pub fn lights_ptr(&self) -> *const f32 {
        self.app.lights().buffer_ptr()
    }

    pub fn light_count(&self) -> u32 {
        self.app.lights().count() as u32
    }

    pub fn ambient(&self) -> f32 {
        self.app.lights().ambient()
    }

    // ---- Capacity accessors ----

    pub fn max_instances(&self) -> u32 {
        self.app.layout().max_instances as u32
    }

    pub fn max_snow(&self) -> u32 {
        self.app.layout().max_snow as u32
    }

    pub fn max_lights(&self) -> u32 {
        self.app.layout().max_lights as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.app.layout().buffer_total_floats as u32
    }
}

/// Host timestamps are finite epoch milliseconds; anything else maps to the epoch.
fn instant(ms: f64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-12-25T00:00:00Z
    const CHRISTMAS_MS: f64 = 1_735_084_800_000.0;

    fn runner() -> AppRunner {
        let mut runner = AppRunner::new(r#"{"snow": {"count": 5}}"#, 9, CHRISTMAS_MS).unwrap();
        runner.init(CHRISTMAS_MS - 60_000.0);
        runner
    }

    #[test]
    fn bad_config_is_reported() {
        assert!(AppRunner::new("{", 1, CHRISTMAS_MS).is_err());
        assert!(AppRunner::new("", 1, CHRISTMAS_MS).is_ok());
    }

    #[test]
    fn init_queues_list_requests() {
        let mut runner = runner();
        let json = runner.drain_requests_json().unwrap();
        let requests: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["op"], "list_gifts");
        assert_eq!(requests[1]["op"], "list_memories");
        assert_eq!(runner.drain_requests_json().unwrap(), "[]");
    }

    #[test]
    fn replies_flow_into_the_snapshot() {
        let mut runner = runner();
        runner.drain_requests_json().unwrap();
        runner
            .push_reply(r##"{"request_id": 1, "kind": "gifts", "rows": [{"id": "g1", "color": "#1976d2"}]}"##)
            .unwrap();
        runner.tick(1.0 / 60.0, CHRISTMAS_MS - 59_000.0);

        let snapshot: serde_json::Value = serde_json::from_str(&runner.snapshot_json().unwrap()).unwrap();
        assert_eq!(snapshot["gifts"][0]["id"], "g1");
        assert_eq!(snapshot["unlocked"], false);
        assert_eq!(runner.snow_count(), 5);
        assert!(runner.instance_count() > 0);
    }

    #[test]
    fn malformed_reply_is_rejected() {
        let mut runner = runner();
        assert!(runner.push_reply(r#"{"kind": "gifts"}"#).is_err());
    }

    #[test]
    fn unreadable_list_reply_shows_an_empty_tree() {
        let mut runner = runner();
        runner.drain_requests_json().unwrap();
        runner
            .push_reply(r#"{"request_id": 1, "kind": "gifts", "rows": [{"id": "g1", "type": "postcard"}, 42]}"#)
            .unwrap();
        runner.push_reply(r#"{"request_id": 2, "kind": "memories", "rows": {}}"#).unwrap();
        runner.tick(1.0 / 60.0, CHRISTMAS_MS - 59_000.0);

        let snapshot: serde_json::Value = serde_json::from_str(&runner.snapshot_json().unwrap()).unwrap();
        assert_eq!(snapshot["gifts"][0]["id"], "g1");
        assert_eq!(snapshot["gifts"][0]["kind"], "letter");
        assert_eq!(snapshot["memories"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn tick_before_init_is_a_no_op() {
        let mut runner = AppRunner::new("", 1, CHRISTMAS_MS).unwrap();
        runner.tick(1.0, CHRISTMAS_MS);
        assert_eq!(runner.instance_count(), 0);
    }
}
