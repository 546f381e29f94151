use crate::api::types::{GiftId, MemoryId};
use crate::bridge::backend::BackendReply;

/// Everything the host can tell the session: user actions from the DOM and
/// the canvas, plus replies to backend requests.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    OpenCreateGift,
    OpenAddMemory,
    CloseModal,
    /// The create-gift form was submitted. Fields are raw form values.
    SubmitGift {
        sender_name: String,
        recipient_name: String,
        sender_photo: Option<String>,
        message: String,
    },
    GiftClicked { id: GiftId },
    GiftHover { id: GiftId, hovered: bool },
    MemoryClicked { id: MemoryId },
    MemoryHover { id: MemoryId, hovered: bool },
    /// The add-memory form was submitted. The host keeps the picked file and
    /// uploads it when asked.
    SubmitMemory {
        file_name: String,
        message: String,
        sender_name: Option<String>,
    },
    ClearGifts,
    DismissAlert,
    Reply(BackendReply),
}

/// A queue of input events.
/// JS writes events into the queue; Rust drains it once per frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RequestId;
    use crate::bridge::backend::ReplyOutcome;

    #[test]
    fn push_and_drain_in_order() {
        let mut q = InputQueue::new();
        q.push(InputEvent::OpenCreateGift);
        q.push(InputEvent::GiftClicked {
            id: GiftId("g".into()),
        });
        q.push(InputEvent::Reply(BackendReply::new(RequestId(1), ReplyOutcome::GiftCreated)));
        assert_eq!(q.len(), 3);

        let events = q.drain();
        assert!(q.is_empty());
        assert_eq!(events[0], InputEvent::OpenCreateGift);
        assert!(matches!(events[2], InputEvent::Reply(_)));
    }
}
