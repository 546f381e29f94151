pub mod api;
pub mod bridge;
pub mod core;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::app::App;
pub use api::config::SceneConfig;
pub use api::types::{Gift, GiftId, GiftKind, Memory, MemoryDraft, MemoryId, RequestId};
pub use api::view::{GiftView, MemoryView, Modal, ViewSnapshot};
pub use bridge::backend::{BackendConfig, BackendReply, BackendRequest, ReplyOutcome};
pub use bridge::blessing::{resolve_blessing, BlessingPrompt};
pub use bridge::protocol::{FrameHeader, ProtocolLayout};
pub use core::placement::{place_memory_ornaments, scatter_decorations, MemoryBand, MemoryOrnament};
pub use core::scene::Scene;
pub use core::time::FixedTimestep;
pub use core::tree::{TreeLayer, TreeShape};
pub use core::unlock::{Countdown, UnlockGate};
pub use error::{BlessingError, ConfigError, Failure, FailureKind, StoreError};
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::instance::{FrameBuffer, InstanceKind, SceneInstance};
pub use systems::lighting::{LightState, PointLight};
pub use systems::rng::Rng;
