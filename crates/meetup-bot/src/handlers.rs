//! Command handlers for messaging events.
//!
//! Lookups that find nothing (unknown talk id, schedule position out of
//! range) end the handler quietly: the user simply gets no reply.

use meetup_messenger::{schedule_messages, talk_info_message, MessagingEvent, ScheduleEntry};
use meetup_models::{command::trailing_number, is_talk_rate_command, PostbackCommand, TalkWithSpeaker};
use tracing::{debug, info};

use crate::error::{BotError, Result};
use crate::state::BotState;

fn sender_id(event: &MessagingEvent) -> Result<&str> {
    event
        .sender_id()
        .ok_or(BotError::MalformedEvent("missing sender id"))
}

fn postback_payload(event: &MessagingEvent) -> Result<&str> {
    event
        .postback_payload()
        .ok_or(BotError::MalformedEvent("missing postback payload"))
}

/// Routes one messaging event to its handler.
pub async fn dispatch(state: &BotState, event: &MessagingEvent) -> Result<()> {
    if let Some(payload) = event.postback_payload() {
        let command = PostbackCommand::parse(payload)?;
        debug!(?command, "postback received");
        return match command {
            PostbackCommand::TalkInfo(_) => handle_talk_info_command(state, event).await,
            PostbackCommand::TalkRate(_) => handle_talk_rate_command(state, event).await,
            PostbackCommand::LikeConfirm(_) => handle_like_confirmation_command(state, event).await,
            PostbackCommand::TalkAsk(_) => handle_talk_ask_command(state, event).await,
            PostbackCommand::Other(_) => handle_message_with_sender_id(state, event).await,
        };
    }

    if event.text_message().is_some() {
        return handle_message_with_sender_id(state, event).await;
    }

    debug!("ignoring event without postback or text");
    Ok(())
}

/// `talk_info <id>`: sends the details of one talk.
pub async fn handle_talk_info_command(state: &BotState, event: &MessagingEvent) -> Result<()> {
    let sender_id = sender_id(event)?;
    let talk_id = trailing_number(postback_payload(event)?)?;

    let Some(talk) = state.db.get_talk(talk_id)? else {
        debug!(talk_id, "talk not found");
        return Ok(());
    };
    let likes = state.db.count_likes(talk.id())?;

    state.sender.send(sender_id, &talk_info_message(&talk, likes)).await?;
    Ok(())
}

/// `talk_rate <position>`: toggles the sender's like, then re-sends the schedule.
pub async fn handle_talk_rate_command(state: &BotState, event: &MessagingEvent) -> Result<()> {
    let sender_id = sender_id(event)?;
    let talks = state.db.list_talks()?;
    let position = trailing_number(postback_payload(event)?)?;

    let Some(talk) = talk_at_position(&talks, position) else {
        debug!(position, total = talks.len(), "schedule position out of range");
        return Ok(());
    };

    let liked = state.db.revert_like(talk.id(), sender_id)?;
    info!(talk_id = talk.id(), user = sender_id, liked, "like toggled");

    send_schedule(state, sender_id, &talks).await
}

/// `like_confirm <id>`: not implemented.
pub async fn handle_like_confirmation_command(
    _state: &BotState,
    _event: &MessagingEvent,
) -> Result<()> {
    Err(BotError::NotImplemented("like confirmation"))
}

/// `talk_ask <id>`: answers like any other message for now.
pub async fn handle_talk_ask_command(state: &BotState, event: &MessagingEvent) -> Result<()> {
    handle_message_with_sender_id(state, event).await
}

/// Sends the schedule unless the event is a talk-rate command.
pub async fn handle_message_with_sender_id(state: &BotState, event: &MessagingEvent) -> Result<()> {
    let sender_id = sender_id(event)?;
    let talks = state.db.list_talks()?;

    if event.postback_payload().is_some_and(is_talk_rate_command) {
        return Ok(());
    }
    send_schedule(state, sender_id, &talks).await
}

/// 1-based schedule lookup. Positions outside `1..=len` find nothing.
pub fn talk_at_position(talks: &[TalkWithSpeaker], position: i64) -> Option<&TalkWithSpeaker> {
    let index = usize::try_from(position).ok()?.checked_sub(1)?;
    talks.get(index)
}

/// Sends the schedule as seen by `recipient`.
pub async fn send_schedule(
    state: &BotState,
    recipient: &str,
    talks: &[TalkWithSpeaker],
) -> Result<()> {
    let liked = state.db.liked_talk_ids(recipient)?;
    let counts = state.db.like_counts()?;

    let entries: Vec<ScheduleEntry<'_>> = talks
        .iter()
        .enumerate()
        .map(|(index, talk)| ScheduleEntry {
            position: index + 1,
            talk,
            likes: counts.get(&talk.id()).copied().unwrap_or(0),
            liked: liked.contains(&talk.id()),
        })
        .collect();

    for message in schedule_messages(&entries) {
        state.sender.send(recipient, &message).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use meetup_messenger::RecordingSender;
    use meetup_models::Talk;
    use meetup_store::Database;

    use crate::config::BotConfig;

    fn make_state() -> (BotState, Arc<RecordingSender>) {
        let db = Database::in_memory().unwrap();
        db.seed_example_data().unwrap();
        let sender = Arc::new(RecordingSender::new());
        let state = BotState::new(BotConfig::new("verify"), db, sender.clone());
        (state, sender)
    }

    #[test]
    fn test_talk_at_position() {
        let talks: Vec<TalkWithSpeaker> = (1..=3)
            .map(|id| TalkWithSpeaker {
                talk: Talk::new(id, "t", "s"),
                speaker_name: "n".into(),
            })
            .collect();

        assert_eq!(talk_at_position(&talks, 1).map(|t| t.id()), Some(1));
        assert_eq!(talk_at_position(&talks, 3).map(|t| t.id()), Some(3));
        assert!(talk_at_position(&talks, 4).is_none());
        assert!(talk_at_position(&talks, 0).is_none());
        assert!(talk_at_position(&talks, -1).is_none());
    }

    #[tokio::test]
    async fn test_talk_info_sends_details() {
        let (state, sender) = make_state();
        let event = MessagingEvent::postback("user-1", "talk_info 2");

        handle_talk_info_command(&state, &event).await.unwrap();

        let sent = sender.sent_to("user-1");
        assert_eq!(sent.len(), 1);
        assert!(sent[0].as_text().unwrap().starts_with("Writing a chatbot"));
    }

    #[tokio::test]
    async fn test_talk_info_missing_talk_is_silent() {
        let (state, sender) = make_state();
        let event = MessagingEvent::postback("user-1", "talk_info 999");

        handle_talk_info_command(&state, &event).await.unwrap();
        assert!(sender.is_empty());
    }

    #[tokio::test]
    async fn test_talk_info_bad_number_is_error() {
        let (state, sender) = make_state();
        let event = MessagingEvent::postback("user-1", "talk_info two");

        let err = handle_talk_info_command(&state, &event).await.unwrap_err();
        assert!(matches!(err, BotError::InvalidPayload(_)));
        assert!(sender.is_empty());
    }

    #[tokio::test]
    async fn test_talk_rate_toggles_and_resends_schedule() {
        let (state, sender) = make_state();
        let event = MessagingEvent::postback("user-1", "talk_rate 1");

        handle_talk_rate_command(&state, &event).await.unwrap();
        assert!(state.db.is_liked_by(1, "user-1").unwrap());

        let sent = sender.sent_to("user-1");
        assert_eq!(sent.len(), 1);
        let first = &sent[0].elements().unwrap()[0];
        assert_eq!(first.buttons[1].title(), "Unlike");

        handle_talk_rate_command(&state, &event).await.unwrap();
        assert!(!state.db.is_liked_by(1, "user-1").unwrap());
    }

    #[tokio::test]
    async fn test_out_of_range_numbers_are_silent() {
        let (state, sender) = make_state();

        for payload in [
            "talk_rate 0",
            "talk_rate 99",
            "talk_rate -1",
            "talk_rate 99999999999999999999",
            "talk_info 99999999999999999999",
        ] {
            let event = MessagingEvent::postback("user-1", payload);
            dispatch(&state, &event).await.unwrap();
        }

        assert!(sender.is_empty());
        assert!(state.db.liked_talk_ids("user-1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_like_confirmation_not_implemented() {
        let (state, _) = make_state();
        let event = MessagingEvent::postback("user-1", "like_confirm 1");

        let err = handle_like_confirmation_command(&state, &event).await.unwrap_err();
        assert!(matches!(err, BotError::NotImplemented(_)));
    }

    #[tokio::test]
    async fn test_talk_ask_sends_schedule() {
        let (state, sender) = make_state();
        let event = MessagingEvent::postback("user-1", "talk_ask 1");

        handle_talk_ask_command(&state, &event).await.unwrap();
        assert!(sender.sent_to("user-1")[0].elements().is_some());
    }

    #[tokio::test]
    async fn test_plain_message_skips_rate_command() {
        let (state, sender) = make_state();

        let event = MessagingEvent::postback("user-1", "talk_rate 1");
        handle_message_with_sender_id(&state, &event).await.unwrap();
        assert!(sender.is_empty());

        let event = MessagingEvent::text("user-1", "hello");
        handle_message_with_sender_id(&state, &event).await.unwrap();
        assert_eq!(sender.sent_to("user-1").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_sender_is_malformed() {
        let (state, _) = make_state();
        let mut event = MessagingEvent::text("user-1", "hi");
        event.sender = None;

        let err = dispatch(&state, &event).await.unwrap_err();
        assert!(matches!(err, BotError::MalformedEvent(_)));
    }

    #[tokio::test]
    async fn test_dispatch_routes_postbacks() {
        let (state, sender) = make_state();

        dispatch(&state, &MessagingEvent::postback("u", "talk_info 1")).await.unwrap();
        dispatch(&state, &MessagingEvent::postback("u", "get_started")).await.unwrap();
        dispatch(&state, &MessagingEvent::postback("u", "talk_rate 2")).await.unwrap();

        let sent = sender.sent_to("u");
        assert_eq!(sent.len(), 3);
        assert!(sent[0].as_text().is_some());
        assert!(sent[1].elements().is_some());
        assert!(state.db.is_liked_by(2, "u").unwrap());
    }

    #[tokio::test]
    async fn test_dispatch_ignores_non_text_message() {
        let (state, sender) = make_state();
        let event = MessagingEvent {
            sender: MessagingEvent::text("u", "").sender,
            ..MessagingEvent::default()
        };

        dispatch(&state, &event).await.unwrap();
        assert!(sender.is_empty());
    }
}
