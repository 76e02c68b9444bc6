use log::{info, warn};
use telegram_bot::*;

use crate::catalog::Catalog;
use crate::commands::{self, Command};
use crate::events::GameEvent;
use crate::progress::{format_time, ProgressStore};
use crate::storage::KvStore;

/// Command routing and mini-app payload relay. Gameplay itself runs inside
/// the mini app; the bot only launches it and reacts to what it sends back.
pub struct CrosswordBot<S: KvStore> {
    api: Api,
    store: S,
    catalog: Catalog,
    mini_app_url: String,
}

impl<S: KvStore> CrosswordBot<S> {
    pub fn new(api: Api, store: S, catalog: Catalog, mini_app_url: String) -> Self {
        Self {
            api,
            store,
            catalog,
            mini_app_url,
        }
    }

    pub fn mini_app_url(&self) -> &str {
        &self.mini_app_url
    }

    fn launch_keyboard(&self, label: &str) -> InlineKeyboardMarkup {
        let mut keyboard = InlineKeyboardMarkup::new();
        keyboard.add_row(vec![InlineKeyboardButton::url(
            label.to_owned(),
            self.mini_app_url.clone(),
        )]);
        keyboard
    }

    pub async fn handle_update(&self, update: Update) -> Result<(), Error> {
        match update.kind {
            UpdateKind::Message(message) => {
                if let MessageKind::Text { ref data, .. } = message.kind {
                    if let Some(command) = Command::parse(data) {
                        self.handle_command(command, &message).await?;
                    }
                }
            }
            UpdateKind::CallbackQuery(query) => {
                self.api.send(query.acknowledge()).await?;
                if let (Some(data), Some(MessageOrChannelPost::Message(message))) =
                    (query.data, query.message)
                {
                    self.handle_callback(&data, message.chat.id()).await?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_command(&self, command: Command, message: &Message) -> Result<(), Error> {
        match command {
            Command::Start => {
                let text = commands::welcome_text(&message.from.first_name);
                self.api
                    .send(
                        message
                            .text_reply(text)
                            .reply_markup(self.launch_keyboard("🎮 Start Game")),
                    )
                    .await?;
            }
            Command::Play => {
                self.api
                    .send(
                        message
                            .text_reply(commands::play_text())
                            .reply_markup(self.launch_keyboard("Start Game")),
                    )
                    .await?;
            }
            Command::Help => {
                self.api.send(message.text_reply(commands::help_text())).await?;
            }
            Command::Stats => {
                let user: i64 = message.from.id.into();
                let progress = ProgressStore::scoped(&self.store, user);
                let record = progress.load().await;
                let achievements = progress.load_achievements().await;
                self.api
                    .send(
                        message
                            .text_reply(commands::stats_text(&record, &achievements))
                            .reply_markup(self.launch_keyboard("🎮 Mulai Bermain")),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn handle_callback(&self, data: &str, chat: ChatId) -> Result<(), Error> {
        if let Some(rest) = data.strip_prefix("share_") {
            let mut parts = rest.splitn(2, '_');
            let level = parts.next().and_then(|s| s.parse::<u32>().ok());
            let score = parts.next().and_then(|s| s.parse::<i32>().ok());
            if let (Some(level), Some(score)) = (level, score) {
                self.api
                    .send(
                        SendMessage::new(chat, commands::share_text(level, score, "-"))
                            .reply_markup(self.launch_keyboard("🎮 Mainkan KBBI Crossword")),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Generic relay for payloads the mini app sends back over the platform
    /// channel. Unparseable payloads are logged and dropped, never fatal.
    pub async fn handle_game_data(&self, chat: ChatId, user: i64, data: &str) -> Result<(), Error> {
        let event = match GameEvent::parse(data) {
            Ok(event) => event,
            Err(err) => {
                warn!("dropping malformed game payload from {}: {}", user, err);
                return Ok(());
            }
        };
        match event {
            GameEvent::LevelCompleted { level, score, time, hints_used, timestamp }
            | GameEvent::GameCompleted { level, score, time, hints_used, timestamp } => {
                self.handle_completion(chat, user, level, score, time, hints_used, timestamp)
                    .await?;
            }
            GameEvent::GameStarted { level, .. } => {
                info!("user {} started level {}", user, level);
            }
            GameEvent::HelpRequested { level, current_progress, .. } => {
                self.api
                    .send(
                        SendMessage::new(chat, commands::help_reply_text(level, &current_progress))
                            .reply_markup(self.launch_keyboard("🎮 Kembali ke Game")),
                    )
                    .await?;
            }
            GameEvent::AchievementUnlocked { achievement, description, .. } => {
                self.api
                    .send(SendMessage::new(
                        chat,
                        commands::achievement_text(&achievement, &description),
                    ))
                    .await?;
            }
            GameEvent::ShareScore { level, score, time, .. } => {
                self.api
                    .send(
                        SendMessage::new(chat, commands::share_text(level, score, &format_time(time)))
                            .reply_markup(self.launch_keyboard("🎮 Mainkan KBBI Crossword")),
                    )
                    .await?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_completion(
        &self,
        chat: ChatId,
        user: i64,
        level: u32,
        score: i32,
        time: u32,
        hints_used: u32,
        timestamp: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), Error> {
        let progress = ProgressStore::scoped(&self.store, user);
        let mut record = progress.load().await;
        record.record_completion(level, score, time, timestamp);
        if let Err(err) = progress.save(&record).await {
            warn!("saving progress for {} failed: {}", user, err);
        }
        if let Err(err) = progress.clear_session().await {
            warn!("clearing session snapshot for {} failed: {}", user, err);
        }

        let mut achievements = progress.load_achievements().await;
        let unlocked = achievements.record_completion(score, time, hints_used);
        if let Err(err) = progress.save_achievements(&achievements).await {
            warn!("saving achievements for {} failed: {}", user, err);
        }

        let text = if level >= self.catalog.max_level() {
            commands::game_completed_text(score, time)
        } else {
            commands::completion_text(level, score, time, hints_used)
        };
        let mut keyboard = self.launch_keyboard("🎮 Lanjut Bermain");
        keyboard.add_row(vec![InlineKeyboardButton::callback(
            "📤 Share Skor".to_owned(),
            format!("share_{}_{}", level, score),
        )]);
        self.api
            .send(SendMessage::new(chat, text).reply_markup(keyboard))
            .await?;

        for achievement in unlocked {
            self.api
                .send(SendMessage::new(
                    chat,
                    commands::achievement_text(achievement.title, achievement.description),
                ))
                .await?;
        }
        Ok(())
    }
}
