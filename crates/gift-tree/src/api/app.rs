//! The session coordinator.
//!
//! `App` owns every piece of session state. The host drives it once per
//! animation frame with [`App::tick`]; between ticks it pushes user actions
//! and backend replies as [`InputEvent`]s. In return it exposes:
//!
//! - backend calls to make ([`App::drain_requests`]), each tagged with a
//!   [`RequestId`] the host echoes back in its reply;
//! - a [`ViewSnapshot`] for the DOM, versioned by [`App::revision`];
//! - flat frame buffers (instances, snow, lights) plus a header.
//!
//! Nothing here performs I/O or reads the clock; `now` is always passed in.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::api::config::SceneConfig;
use crate::api::types::{Gift, GiftId, GiftKind, Memory, MemoryDraft, MemoryId, RequestId};
use crate::api::view::{GiftView, MemoryView, Modal, ViewSnapshot, LOCKED_TITLE, UPLOAD_FAILED_ALERT};
use crate::bridge::backend::{
    photo_path, BackendReply, BackendRequest, GiftRow, ReplyOutcome,
};
use crate::bridge::blessing::{resolve_blessing, BlessingPrompt};
use crate::bridge::protocol::{FrameHeader, ProtocolLayout, HEADER_FLOATS};
use crate::core::scene::{Scene, DEFAULT_GIFT_COLOR};
use crate::core::time::{FixedTimestep, SceneClock};
use crate::core::unlock::{Countdown, UnlockGate};
use crate::error::{BlessingError, Failure, StoreError};
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::instance::FrameBuffer;
use crate::systems::animation::tree_yaw;
use crate::systems::lighting::LightState;
use crate::systems::render::{build_frame, build_lights};
use crate::systems::rng::Rng;
use crate::systems::snow::Snowfall;

/// Message used when the form leaves it blank.
pub const DEFAULT_GIFT_MESSAGE: &str = "¡Feliz Navidad!";
/// Sender recorded for memories added without a name.
pub const DEFAULT_MEMORY_SENDER: &str = "User";

const GIFT_ID_LEN: usize = 9;
const PHOTO_STEM_LEN: usize = 11;

/// What an outstanding request was for, with whatever its reply needs.
#[derive(Debug, Clone)]
enum Pending {
    ListGifts,
    ListMemories,
    CreateGift(Gift),
    Blessing(GiftId),
    MarkOpened {
        gift_id: GiftId,
        was_opened: bool,
        previous_blessing: Option<String>,
    },
    ClearGifts,
    UploadPhoto {
        path: String,
        message: Option<String>,
        sender_name: String,
    },
    InsertMemory {
        path: String,
    },
    RemovePhoto {
        path: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum ModalState {
    CreateGift,
    AddMemory,
    Locked,
    GiftDetail(GiftId),
    Photo {
        photo_url: String,
        message: Option<String>,
    },
}

pub struct App {
    config: SceneConfig,
    gate: UnlockGate,
    rng: Rng,

    scene: Scene,
    snow: Snowfall,
    frame: FrameBuffer,
    lights: LightState,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    frame_count: u32,

    input: InputQueue,
    timestep: FixedTimestep,
    countdown_timer: FixedTimestep,
    clock: SceneClock,

    now: DateTime<Utc>,
    countdown: Countdown,
    gifts: Vec<Gift>,
    memories: Vec<Memory>,
    modal: Option<ModalState>,
    uploading: bool,
    alert: Option<String>,

    pending: BTreeMap<RequestId, Pending>,
    outbox: Vec<BackendRequest>,
    next_request: u32,
    revision: u64,
}

impl App {
    pub fn new(config: SceneConfig, gate: UnlockGate, seed: u64) -> Self {
        let mut rng = Rng::new(seed);
        let scene = Scene::new(config.tree.clone(), config.memory_band);
        let snow = Snowfall::new(config.snow, &mut rng);
        let mut lights = LightState::with_capacity(config.max_lights);
        lights.set_ambient(config.ambient);

        Self {
            frame: FrameBuffer::with_capacity(config.max_instances),
            layout: ProtocolLayout::from_config(&config),
            timestep: FixedTimestep::new(config.fixed_dt),
            countdown_timer: FixedTimestep::new(1.0).with_max_steps(1),
            countdown: Countdown::Unlocked,
            now: gate.unlock_at(),
            config,
            gate,
            rng,
            scene,
            snow,
            lights,
            header: [0.0; HEADER_FLOATS],
            frame_count: 0,
            input: InputQueue::new(),
            clock: SceneClock::new(),
            gifts: Vec::new(),
            memories: Vec::new(),
            modal: None,
            uploading: false,
            alert: None,
            pending: BTreeMap::new(),
            outbox: Vec::new(),
            next_request: 0,
            revision: 0,
        }
    }

    /// Start the session: scatter decorations, show the countdown and ask
    /// for both lists.
    pub fn init(&mut self, now: DateTime<Utc>) {
        log::info!(
            "gift tree session started, gifts unlock at {}",
            self.gate.unlock_at()
        );
        self.scene.decorate(&mut self.rng);
        self.fit_frame();
        self.now = now;
        self.countdown = self.gate.countdown(now);
        self.request_gifts();
        self.request_memories();
        self.touch();
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one animation frame.
    pub fn tick(&mut self, dt: f32, now: DateTime<Utc>) {
        self.now = now;

        for event in self.input.drain() {
            self.handle(event);
        }

        if self.countdown_timer.accumulate(dt) > 0 {
            self.refresh_countdown();
        }

        self.clock.advance(dt);
        let elapsed = self.clock.elapsed();
        for _ in 0..self.timestep.accumulate(dt) {
            self.scene.step(elapsed);
            self.snow.step(elapsed);
        }

        build_frame(&self.scene, elapsed, &mut self.frame);
        if self.frame.dropped() > 0 {
            log::warn!("frame buffer full, dropped {} instances", self.frame.dropped());
        }
        build_lights(&self.scene, elapsed, self.config.tree_offset_y, &mut self.lights);

        self.frame_count = self.frame_count.wrapping_add(1);
        FrameHeader {
            frame: self.frame_count,
            instance_count: self.frame.instance_count(),
            snow_count: self.snow.count() as u32,
            light_count: self.lights.count() as u32,
            ambient: self.lights.ambient(),
            tree_yaw: tree_yaw(elapsed) as f32,
            tree_offset_y: self.config.tree_offset_y,
            elapsed: elapsed as f32,
            unlocked: self.countdown.is_unlocked(),
            view_revision: self.revision,
            pending_requests: self.pending.len() as u32,
        }
        .write(&self.layout, &mut self.header);
    }

    // ---- Input handling ----

    fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::OpenCreateGift => self.set_modal(Some(ModalState::CreateGift)),
            InputEvent::OpenAddMemory => self.set_modal(Some(ModalState::AddMemory)),
            InputEvent::CloseModal => self.set_modal(None),
            InputEvent::DismissAlert => {
                if self.alert.take().is_some() {
                    self.touch();
                }
            }
            InputEvent::SubmitGift {
                sender_name,
                recipient_name,
                sender_photo,
                message,
            } => self.submit_gift(&sender_name, &recipient_name, sender_photo, &message),
            InputEvent::GiftClicked { id } => self.click_gift(&id),
            InputEvent::GiftHover { id, hovered } => {
                self.scene.set_gift_hovered(&id, hovered);
            }
            InputEvent::MemoryClicked { id } => self.click_memory(&id),
            InputEvent::MemoryHover { id, hovered } => {
                self.scene.set_memory_hovered(&id, hovered);
            }
            InputEvent::SubmitMemory {
                file_name,
                message,
                sender_name,
            } => self.submit_memory(&file_name, &message, sender_name),
            InputEvent::ClearGifts => {
                let table = self.config.backend.gifts_table.clone();
                self.send(Pending::ClearGifts, |request_id| BackendRequest::ClearGifts {
                    request_id,
                    table,
                });
            }
            InputEvent::Reply(reply) => self.apply_reply(reply),
        }
    }

    fn submit_gift(
        &mut self,
        sender_name: &str,
        recipient_name: &str,
        sender_photo: Option<String>,
        message: &str,
    ) {
        let sender_name = sender_name.trim();
        let recipient_name = recipient_name.trim();
        if sender_name.is_empty() || recipient_name.is_empty() {
            log::debug!("gift form submitted without both names, ignoring");
            return;
        }
        let message = message.trim();
        let color = self
            .rng
            .pick(&self.config.gift_palette)
            .cloned()
            .unwrap_or_else(|| DEFAULT_GIFT_COLOR.to_string());

        let gift = Gift {
            id: GiftId(self.rng.base36(GIFT_ID_LEN)),
            sender_name: sender_name.to_string(),
            recipient_name: recipient_name.to_string(),
            sender_photo: sender_photo.filter(|p| !p.trim().is_empty()),
            message: if message.is_empty() {
                DEFAULT_GIFT_MESSAGE.to_string()
            } else {
                message.to_string()
            },
            kind: GiftKind::Letter,
            color,
            created_at: self.now.timestamp_millis(),
            ai_blessing: None,
            is_opened: false,
        };

        let table = self.config.backend.gifts_table.clone();
        let row = GiftRow::from(&gift);
        self.send(Pending::CreateGift(gift), |request_id| BackendRequest::CreateGift {
            request_id,
            table,
            row,
        });
    }

    fn click_gift(&mut self, id: &GiftId) {
        let Some(gift) = self.gifts.iter().find(|g| &g.id == id).cloned() else {
            log::warn!("click on unknown gift {}", id.0);
            return;
        };

        if !self.gate.is_unlocked(self.now) {
            self.countdown = self.gate.countdown(self.now);
            self.set_modal(Some(ModalState::Locked));
            return;
        }

        self.set_modal(Some(ModalState::GiftDetail(id.clone())));

        if !gift.needs_blessing() {
            if !gift.is_opened {
                let blessing = gift.ai_blessing.clone().unwrap_or_default();
                self.open_gift(id, blessing);
            }
            return;
        }

        if self.blessing_in_flight(id) {
            return;
        }

        let prompt = BlessingPrompt::new(gift.blessing_name(), Some(gift.message.as_str()));
        let model = self.config.backend.blessing_model.clone();
        self.send(Pending::Blessing(id.clone()), |request_id| {
            BackendRequest::GenerateBlessing {
                request_id,
                model,
                prompt: prompt.into_string(),
            }
        });
    }

    fn click_memory(&mut self, id: &MemoryId) {
        let Some(memory) = self.memories.iter().find(|m| &m.id == id) else {
            log::warn!("click on unknown memory {}", id.0);
            return;
        };
        let modal = ModalState::Photo {
            photo_url: memory.photo_url.clone(),
            message: memory.message.clone(),
        };
        self.set_modal(Some(modal));
    }

    fn submit_memory(&mut self, file_name: &str, message: &str, sender_name: Option<String>) {
        if file_name.is_empty() {
            log::debug!("memory form submitted without a photo, ignoring");
            return;
        }
        if self.uploading {
            log::debug!("memory upload already running, ignoring submit");
            return;
        }
        self.uploading = true;
        self.touch();

        let path = photo_path(&self.rng.base36(PHOTO_STEM_LEN), file_name);
        let bucket = self.config.backend.photo_bucket.clone();
        let pending = Pending::UploadPhoto {
            path: path.clone(),
            message: Some(message.trim().to_string()).filter(|m| !m.is_empty()),
            sender_name: sender_name
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MEMORY_SENDER.to_string()),
        };
        self.send(pending, |request_id| BackendRequest::UploadPhoto {
            request_id,
            bucket,
            path,
        });
    }

    // ---- Backend replies ----

    fn apply_reply(&mut self, reply: BackendReply) {
        let Some(pending) = self.pending.remove(&reply.request_id) else {
            log::warn!("reply for unknown request {:?}, ignoring", reply.request_id);
            return;
        };

        match (pending, reply.outcome) {
            (Pending::ListGifts, ReplyOutcome::Gifts { rows }) => {
                self.set_gifts(rows.into_iter().map(Gift::from).collect());
            }
            (Pending::ListGifts, ReplyOutcome::Failed { error }) => {
                log::warn!("loading gifts failed: {}", StoreError::from(error));
                self.set_gifts(Vec::new());
            }

            (Pending::ListMemories, ReplyOutcome::Memories { rows }) => {
                self.set_memories(rows.into_iter().map(Memory::from).collect());
            }
            (Pending::ListMemories, ReplyOutcome::Failed { error }) => {
                log::warn!("loading memories failed: {}", StoreError::from(error));
                self.set_memories(Vec::new());
            }

            (Pending::CreateGift(gift), ReplyOutcome::GiftCreated) => {
                log::info!("gift {} saved", gift.id.0);
                let mut gifts = std::mem::take(&mut self.gifts);
                gifts.push(gift);
                self.set_gifts(gifts);
                if self.modal == Some(ModalState::CreateGift) {
                    self.set_modal(None);
                }
            }
            (Pending::CreateGift(gift), ReplyOutcome::Failed { error }) => {
                log::error!("saving gift {} failed: {}", gift.id.0, StoreError::from(error));
            }

            (Pending::Blessing(gift_id), ReplyOutcome::Blessing { text }) => {
                self.open_gift(&gift_id, resolve_blessing(Ok(text)));
            }
            (Pending::Blessing(gift_id), ReplyOutcome::Failed { error }) => {
                let blessing = resolve_blessing(Err(BlessingError::from(error)));
                self.open_gift(&gift_id, blessing);
            }

            (Pending::MarkOpened { gift_id, .. }, ReplyOutcome::GiftMarked) => {
                log::debug!("gift {} marked opened", gift_id.0);
            }
            (
                Pending::MarkOpened {
                    gift_id,
                    was_opened,
                    previous_blessing,
                },
                ReplyOutcome::Failed { error },
            ) => {
                log::warn!(
                    "marking gift {} opened failed, rolling back: {}",
                    gift_id.0,
                    StoreError::from(error)
                );
                if let Some(gift) = self.gifts.iter_mut().find(|g| g.id == gift_id) {
                    gift.is_opened = was_opened;
                    gift.ai_blessing = previous_blessing;
                    self.scene.set_gifts(&self.gifts);
                    self.touch();
                }
            }

            (Pending::ClearGifts, ReplyOutcome::GiftsCleared) => {
                log::info!("all gifts cleared");
                self.set_gifts(Vec::new());
                if matches!(self.modal, Some(ModalState::GiftDetail(_))) {
                    self.set_modal(None);
                }
            }
            (Pending::ClearGifts, ReplyOutcome::Failed { error }) => {
                log::error!("clearing gifts failed: {}", StoreError::from(error));
            }

            (
                Pending::UploadPhoto {
                    path,
                    message,
                    sender_name,
                },
                ReplyOutcome::PhotoUploaded { public_url },
            ) => {
                let table = self.config.backend.memories_table.clone();
                let row = MemoryDraft {
                    photo_url: public_url,
                    message,
                    sender_name,
                };
                self.send(Pending::InsertMemory { path }, |request_id| {
                    BackendRequest::InsertMemory {
                        request_id,
                        table,
                        row,
                    }
                });
            }
            (Pending::UploadPhoto { .. }, ReplyOutcome::Failed { error }) => {
                self.upload_failed(error, None);
            }

            (Pending::InsertMemory { .. }, ReplyOutcome::MemoryInserted) => {
                self.uploading = false;
                if self.modal == Some(ModalState::AddMemory) {
                    self.set_modal(None);
                }
                self.touch();
                self.request_memories();
            }
            (Pending::InsertMemory { path }, ReplyOutcome::Failed { error }) => {
                self.upload_failed(error, Some(path));
            }

            (Pending::RemovePhoto { path }, ReplyOutcome::PhotoRemoved) => {
                log::debug!("removed orphaned photo {path}");
            }
            (Pending::RemovePhoto { path }, ReplyOutcome::Failed { error }) => {
                log::warn!("photo {path} left orphaned: {}", StoreError::from(error));
            }

            (pending, outcome) => {
                log::warn!(
                    "reply {:?} does not match request {:?}, ignoring: {:?}",
                    reply.request_id,
                    pending,
                    outcome
                );
            }
        }
    }

    /// Mark a gift opened locally with `blessing` and persist it. The store
    /// call is optimistic: a failed reply restores the previous values.
    fn open_gift(&mut self, id: &GiftId, blessing: String) {
        let Some(gift) = self.gifts.iter_mut().find(|g| &g.id == id) else {
            log::warn!("gift {} vanished before it could be opened", id.0);
            return;
        };
        let pending = Pending::MarkOpened {
            gift_id: id.clone(),
            was_opened: gift.is_opened,
            previous_blessing: gift.ai_blessing.clone(),
        };
        gift.is_opened = true;
        gift.ai_blessing = Some(blessing.clone());
        self.scene.set_gifts(&self.gifts);
        self.touch();

        let table = self.config.backend.gifts_table.clone();
        let gift_id = id.clone();
        self.send(pending, |request_id| BackendRequest::MarkOpened {
            request_id,
            table,
            gift_id,
            ai_blessing: Some(blessing).filter(|b| !b.is_empty()),
        });
    }

    fn upload_failed(&mut self, error: Failure, uploaded_path: Option<String>) {
        log::error!("saving memory failed: {}", StoreError::from(error));
        self.uploading = false;
        self.alert = Some(UPLOAD_FAILED_ALERT.to_string());
        self.touch();

        if let Some(path) = uploaded_path {
            let bucket = self.config.backend.photo_bucket.clone();
            let remove_path = path.clone();
            self.send(Pending::RemovePhoto { path }, |request_id| {
                BackendRequest::RemovePhoto {
                    request_id,
                    bucket,
                    path: remove_path,
                }
            });
        }
    }

    // ---- State helpers ----

    fn send(&mut self, pending: Pending, build: impl FnOnce(RequestId) -> BackendRequest) {
        self.next_request = self.next_request.wrapping_add(1);
        let id = RequestId(self.next_request);
        self.outbox.push(build(id));
        self.pending.insert(id, pending);
    }

    fn request_gifts(&mut self) {
        let table = self.config.backend.gifts_table.clone();
        self.send(Pending::ListGifts, |request_id| BackendRequest::ListGifts {
            request_id,
            table,
        });
    }

    fn request_memories(&mut self) {
        let table = self.config.backend.memories_table.clone();
        self.send(Pending::ListMemories, |request_id| BackendRequest::ListMemories {
            request_id,
            table,
        });
    }

    fn blessing_in_flight(&self, id: &GiftId) -> bool {
        self.pending
            .values()
            .any(|p| matches!(p, Pending::Blessing(gift_id) if gift_id == id))
    }

    fn set_gifts(&mut self, gifts: Vec<Gift>) {
        self.gifts = gifts;
        self.scene.set_gifts(&self.gifts);
        self.fit_frame();
        self.touch();
    }

    fn set_memories(&mut self, memories: Vec<Memory>) {
        self.memories = memories;
        self.scene.set_memories(&self.memories);
        self.fit_frame();
        self.touch();
    }

    /// Grow the instance section so every scene object fits. The header
    /// carries the new capacity from the next frame on.
    fn fit_frame(&mut self) {
        let needed = self.scene.instance_count();
        if needed <= self.layout.max_instances {
            return;
        }
        let max_instances = needed.next_power_of_two();
        log::info!(
            "growing instance buffer from {} to {max_instances}",
            self.layout.max_instances
        );
        self.frame.grow(max_instances);
        self.layout = ProtocolLayout::new(max_instances, self.layout.max_snow, self.layout.max_lights);
    }

    fn set_modal(&mut self, modal: Option<ModalState>) {
        if self.modal != modal {
            self.modal = modal;
            self.touch();
        }
    }

    fn refresh_countdown(&mut self) {
        let countdown = self.gate.countdown(self.now);
        if countdown != self.countdown {
            if countdown.is_unlocked() && !self.countdown.is_unlocked() {
                log::info!("gifts unlocked");
            }
            self.countdown = countdown;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    // ---- Outputs ----

    /// Take every backend call queued since the last drain.
    pub fn drain_requests(&mut self) -> Vec<BackendRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let modal = self.modal.as_ref().map(|modal| match modal {
            ModalState::CreateGift => Modal::CreateGift,
            ModalState::AddMemory => Modal::AddMemory {
                uploading: self.uploading,
            },
            ModalState::Locked => Modal::Locked {
                title: LOCKED_TITLE.to_string(),
                countdown: self.countdown.to_string(),
            },
            ModalState::GiftDetail(id) => Modal::GiftDetail {
                gift_id: id.clone(),
                generating: self.blessing_in_flight(id),
            },
            ModalState::Photo { photo_url, message } => Modal::Photo {
                photo_url: photo_url.clone(),
                message: message.clone(),
            },
        });

        ViewSnapshot {
            revision: self.revision,
            unlocked: self.countdown.is_unlocked(),
            countdown: self.countdown.to_string(),
            gifts: self.gifts.iter().map(GiftView::from_gift).collect(),
            memories: self.scene.memory_ornaments().map(MemoryView::from).collect(),
            modal,
            alert: self.alert.clone(),
        }
    }

    pub fn gifts(&self) -> &[Gift] {
        &self.gifts
    }

    pub fn memories(&self) -> &[Memory] {
        &self.memories
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    pub fn header(&self) -> &[f32; HEADER_FLOATS] {
        &self.header
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn snow(&self) -> &Snowfall {
        &self.snow
    }

    pub fn lights(&self) -> &LightState {
        &self.lights
    }
}
