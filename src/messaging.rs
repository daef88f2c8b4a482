//! Outbound messaging abstraction.
//!
//! The join flow talks to applicants and operators through [`Messenger`] so
//! it has zero teloxide dependency; the Telegram layer provides the real
//! implementation and tests use a recording one.

use async_trait::async_trait;

use crate::core::error::AppResult;

/// Reply keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Keyboard {
    /// Leave whatever keyboard the client currently shows.
    #[default]
    Unchanged,
    /// Hide the reply keyboard.
    Remove,
    /// Persistent quick replies, one inner `Vec` per row.
    Options(Vec<Vec<String>>),
}

impl Keyboard {
    pub fn options<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Keyboard::Options(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn yes_no() -> Self {
        Keyboard::options([["Yes", "No"]])
    }
}

/// A text message ready to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    pub text: String,
    pub keyboard: Keyboard,
    /// Text contains HTML markup and must be sent with the HTML parse mode.
    pub html: bool,
}

impl OutgoingText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Keyboard::Unchanged,
            html: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}

/// Delivers messages to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> AppResult<()>;

    /// Sends the image at `photo_url` with `caption` underneath.
    async fn send_photo(&self, chat_id: i64, photo_url: &str, caption: OutgoingText) -> AppResult<()>;

    /// Sends `content` as a file attachment named `file_name`.
    async fn send_document(&self, chat_id: i64, file_name: &str, content: Vec<u8>) -> AppResult<()>;
}
