//! Messenger that records everything instead of talking to Telegram

#![allow(dead_code)]

use std::sync::Mutex;

use acbot::messaging::{Keyboard, Messenger, OutgoingText};
use acbot::AppResult;
use async_trait::async_trait;

/// One outbound call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text {
        chat_id: i64,
        message: OutgoingText,
    },
    Photo {
        chat_id: i64,
        photo_url: String,
        caption: OutgoingText,
    },
    Document {
        chat_id: i64,
        file_name: String,
        content: Vec<u8>,
    },
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to `chat_id`, oldest first
    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Text { chat_id: to, message } if to == chat_id => Some(message.text),
                _ => None,
            })
            .collect()
    }

    pub fn last_text_to(&self, chat_id: i64) -> Option<String> {
        self.texts_to(chat_id).pop()
    }

    /// Keyboard of the last text sent to `chat_id`
    pub fn last_keyboard_to(&self, chat_id: i64) -> Option<Keyboard> {
        self.sent().into_iter().rev().find_map(|sent| match sent {
            Sent::Text { chat_id: to, message } if to == chat_id => Some(message.keyboard),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Text { chat_id, message });
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, photo_url: &str, caption: OutgoingText) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Photo {
            chat_id,
            photo_url: photo_url.to_string(),
            caption,
        });
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, file_name: &str, content: Vec<u8>) -> AppResult<()> {
        self.sent.lock().unwrap().push(Sent::Document {
            chat_id,
            file_name: file_name.to_string(),
            content,
        });
        Ok(())
    }
}
