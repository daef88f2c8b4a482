//! [`Messenger`] backed by the Telegram Bot API.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode, ReplyMarkup};

use crate::core::error::{AppError, AppResult};
use crate::messaging::{Keyboard, Messenger, OutgoingText};

/// Maps a keyboard to Telegram reply markup. `None` leaves the current one.
pub fn reply_markup(keyboard: &Keyboard) -> Option<ReplyMarkup> {
    match keyboard {
        Keyboard::Unchanged => None,
        Keyboard::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        Keyboard::Options(rows) => {
            let buttons = rows
                .iter()
                .map(|row| row.iter().map(|label| KeyboardButton::new(label.as_str())).collect::<Vec<_>>());
            Some(ReplyMarkup::Keyboard(
                KeyboardMarkup::new(buttons).persistent().resize_keyboard(),
            ))
        }
    }
}

pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(&self, chat_id: i64, message: OutgoingText) -> AppResult<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), message.text);
        if message.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = reply_markup(&message.keyboard) {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, photo_url: &str, caption: OutgoingText) -> AppResult<()> {
        let url = url::Url::parse(photo_url)
            .map_err(|e| AppError::Validation(format!("invalid photo URL {:?}: {}", photo_url, e)))?;
        let mut request = self
            .bot
            .send_photo(ChatId(chat_id), InputFile::url(url))
            .caption(caption.text);
        if caption.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = reply_markup(&caption.keyboard) {
            request = request.reply_markup(markup);
        }
        request.await?;
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, file_name: &str, content: Vec<u8>) -> AppResult<()> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::memory(content).file_name(file_name.to_string()))
            .await?;
        Ok(())
    }
}
