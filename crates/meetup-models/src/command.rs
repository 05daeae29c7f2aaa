//! Postback command parsing.
//!
//! Messenger buttons carry a payload string such as `"talk_rate 2"`. The
//! numeric argument is always the last space-separated token.

use std::fmt;
use std::num::IntErrorKind;

use crate::error::{ModelError, Result};

const TALK_INFO: &str = "talk_info";
const TALK_RATE: &str = "talk_rate";
const TALK_ASK: &str = "talk_ask";
const LIKE_CONFIRM: &str = "like_confirm";

/// A parsed postback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostbackCommand {
    /// Show details of the talk with this id.
    TalkInfo(i64),
    /// Toggle the like on the talk at this 1-based schedule position.
    TalkRate(i64),
    /// Ask the speaker of this talk a question.
    TalkAsk(i64),
    /// Confirm a like on this talk.
    LikeConfirm(i64),
    /// Any payload we do not route specifically (e.g. Get Started).
    Other(String),
}

impl PostbackCommand {
    /// Parses a payload string.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidNumber`] when the prefix is recognized
    /// but the trailing token does not parse as an integer.
    pub fn parse(payload: &str) -> Result<Self> {
        let Some(prefix) = payload.split(' ').next() else {
            return Ok(Self::Other(payload.to_string()));
        };

        let build: fn(i64) -> Self = match prefix {
            TALK_INFO => Self::TalkInfo,
            TALK_RATE => Self::TalkRate,
            TALK_ASK => Self::TalkAsk,
            LIKE_CONFIRM => Self::LikeConfirm,
            _ => return Ok(Self::Other(payload.to_string())),
        };

        Ok(build(trailing_number(payload)?))
    }

    /// Renders the payload string this command was parsed from.
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PostbackCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TalkInfo(n) => write!(f, "{} {}", TALK_INFO, n),
            Self::TalkRate(n) => write!(f, "{} {}", TALK_RATE, n),
            Self::TalkAsk(n) => write!(f, "{} {}", TALK_ASK, n),
            Self::LikeConfirm(n) => write!(f, "{} {}", LIKE_CONFIRM, n),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Extracts the integer in the last space-separated token of a payload.
///
/// Numerals too large for `i64` saturate, so they still name a talk or
/// position that does not exist.
pub fn trailing_number(payload: &str) -> Result<i64> {
    let token = payload.split(' ').last().unwrap_or_default();
    match token.parse::<i64>() {
        Ok(n) => Ok(n),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(ModelError::InvalidNumber {
                payload: payload.to_string(),
            }),
        },
    }
}

/// Returns true if the payload is a talk-rate command.
pub fn is_talk_rate_command(payload: &str) -> bool {
    matches!(PostbackCommand::parse(payload), Ok(PostbackCommand::TalkRate(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_commands() {
        assert_eq!(PostbackCommand::parse("talk_info 7").unwrap(), PostbackCommand::TalkInfo(7));
        assert_eq!(PostbackCommand::parse("talk_rate 2").unwrap(), PostbackCommand::TalkRate(2));
        assert_eq!(PostbackCommand::parse("talk_ask 4").unwrap(), PostbackCommand::TalkAsk(4));
        assert_eq!(
            PostbackCommand::parse("like_confirm 1").unwrap(),
            PostbackCommand::LikeConfirm(1)
        );
    }

    #[test]
    fn test_parse_uses_last_token() {
        assert_eq!(
            PostbackCommand::parse("talk_info extra 12").unwrap(),
            PostbackCommand::TalkInfo(12)
        );
    }

    #[test]
    fn test_parse_unknown_is_other() {
        assert_eq!(
            PostbackCommand::parse("get_started").unwrap(),
            PostbackCommand::Other("get_started".to_string())
        );
        assert_eq!(PostbackCommand::parse("").unwrap(), PostbackCommand::Other(String::new()));
    }

    #[test]
    fn test_parse_non_numeric_is_error() {
        let err = PostbackCommand::parse("talk_info abc").unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidNumber {
                payload: "talk_info abc".to_string()
            }
        );
        assert!(PostbackCommand::parse("talk_rate").is_err());
    }

    #[test]
    fn test_oversized_number_saturates() {
        assert_eq!(
            PostbackCommand::parse("talk_rate 99999999999999999999").unwrap(),
            PostbackCommand::TalkRate(i64::MAX)
        );
        assert_eq!(trailing_number("talk_rate -99999999999999999999").unwrap(), i64::MIN);
        assert!(trailing_number("talk_rate 9x9").is_err());
    }

    #[test]
    fn test_payload_round_trip() {
        let cmd = PostbackCommand::TalkRate(3);
        assert_eq!(cmd.to_payload(), "talk_rate 3");
        assert_eq!(PostbackCommand::parse(&cmd.to_payload()).unwrap(), cmd);
    }

    #[test]
    fn test_is_talk_rate_command() {
        assert!(is_talk_rate_command("talk_rate 1"));
        assert!(!is_talk_rate_command("talk_info 1"));
        assert!(!is_talk_rate_command("talk_rate x"));
        assert!(!is_talk_rate_command("hello"));
    }
}
