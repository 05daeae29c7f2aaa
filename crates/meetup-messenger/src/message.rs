//! Outgoing message types, serialized in the Send API shape.

use serde::{Deserialize, Serialize};

/// Maximum elements in one generic template.
pub const MAX_GENERIC_ELEMENTS: usize = 10;

/// Maximum characters in an element title or subtitle.
pub const MAX_ELEMENT_TEXT: usize = 80;

/// Maximum characters in a text message.
pub const MAX_TEXT: usize = 640;

/// Maximum characters in a button title.
pub const MAX_BUTTON_TITLE: usize = 20;

/// The `message` object of a Send API request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutgoingMessage {
    /// Plain text.
    Text { text: String },
    /// Structured attachment.
    Attachment { attachment: Attachment },
}

impl OutgoingMessage {
    /// A text message, truncated to the platform limit.
    pub fn text(text: impl AsRef<str>) -> Self {
        Self::Text {
            text: truncate(text.as_ref(), MAX_TEXT),
        }
    }

    /// A generic-template carousel.
    pub fn generic(elements: Vec<Element>) -> Self {
        Self::Attachment {
            attachment: Attachment::Template(Template::Generic { elements }),
        }
    }

    /// Text content, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::Attachment { .. } => None,
        }
    }

    /// Template elements, if this is a generic template.
    pub fn elements(&self) -> Option<&[Element]> {
        match self {
            Self::Attachment {
                attachment: Attachment::Template(Template::Generic { elements }),
            } => Some(elements),
            Self::Text { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Attachment {
    Template(Template),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub enum Template {
    Generic { elements: Vec<Element> },
}

/// One card of a generic template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl Element {
    /// Creates an element, truncating the title.
    pub fn new(title: impl AsRef<str>) -> Self {
        Self {
            title: truncate(title.as_ref(), MAX_ELEMENT_TEXT),
            subtitle: None,
            buttons: Vec::new(),
        }
    }

    /// Sets the subtitle, truncated.
    pub fn with_subtitle(mut self, subtitle: impl AsRef<str>) -> Self {
        self.subtitle = Some(truncate(subtitle.as_ref(), MAX_ELEMENT_TEXT));
        self
    }

    /// Appends a button.
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Button {
    /// Sends `payload` back to the webhook when pressed.
    Postback { title: String, payload: String },
}

impl Button {
    /// A postback button.
    pub fn postback(title: impl AsRef<str>, payload: impl Into<String>) -> Self {
        Self::Postback {
            title: truncate(title.as_ref(), MAX_BUTTON_TITLE),
            payload: payload.into(),
        }
    }

    /// The payload carried by the button.
    pub fn payload(&self) -> &str {
        match self {
            Self::Postback { payload, .. } => payload,
        }
    }

    /// The visible label.
    pub fn title(&self) -> &str {
        match self {
            Self::Postback { title, .. } => title,
        }
    }
}

/// Truncates to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
