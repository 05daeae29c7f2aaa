//! Schedule and talk-info message builders.

use meetup_models::{PostbackCommand, TalkWithSpeaker};

use crate::message::{Button, Element, OutgoingMessage, MAX_GENERIC_ELEMENTS};

/// Text sent when there is nothing on the schedule.
pub const EMPTY_SCHEDULE_TEXT: &str = "The schedule is empty for now. Check back later!";

/// One row of the schedule as seen by a particular user.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleEntry<'a> {
    /// 1-based position in the schedule.
    pub position: usize,
    pub talk: &'a TalkWithSpeaker,
    /// Total likes for the talk.
    pub likes: u64,
    /// Whether the recipient has liked it.
    pub liked: bool,
}

impl ScheduleEntry<'_> {
    fn element(&self) -> Element {
        let rate_label = if self.liked { "Unlike" } else { "Like" };
        let position = self.position as i64;

        Element::new(format!("{}. {}", self.position, self.talk.title()))
            .with_subtitle(format!("{} · ❤ {}", self.talk.speaker_name, self.likes))
            .with_button(Button::postback(
                "More",
                PostbackCommand::TalkInfo(self.talk.id()).to_payload(),
            ))
            .with_button(Button::postback(
                rate_label,
                PostbackCommand::TalkRate(position).to_payload(),
            ))
            .with_button(Button::postback(
                "Ask",
                PostbackCommand::TalkAsk(self.talk.id()).to_payload(),
            ))
    }
}

/// Builds the schedule carousel(s) for one recipient.
///
/// The Send API caps a generic template at ten elements, so longer
/// schedules are split over several messages in order.
pub fn schedule_messages(entries: &[ScheduleEntry<'_>]) -> Vec<OutgoingMessage> {
    if entries.is_empty() {
        return vec![OutgoingMessage::text(EMPTY_SCHEDULE_TEXT)];
    }

    entries
        .chunks(MAX_GENERIC_ELEMENTS)
        .map(|chunk| OutgoingMessage::generic(chunk.iter().map(|entry| entry.element()).collect()))
        .collect()
}

/// Builds the detailed description of a talk.
pub fn talk_info_message(talk: &TalkWithSpeaker, likes: u64) -> OutgoingMessage {
    let mut text = format!("{}\n\nSpeaker: {}\nLikes: {}", talk.title(), talk.speaker_name, likes);
    if let Some(description) = talk.talk.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str("\n\n");
        text.push_str(description);
    }
    OutgoingMessage::text(text)
}
