use std::cmp;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::achievements::Achievements;
use crate::session::SessionSnapshot;
use crate::storage::{KvStore, StorageResult};

pub const KEY_SESSION: &str = "gameProgress";
pub const KEY_PROGRESS: &str = "crosswordProgress";
pub const KEY_CURRENT_LEVEL: &str = "currentLevel";
pub const KEY_ACHIEVEMENTS: &str = "achievements";
pub const KEY_LAST_DAILY: &str = "lastDailyChallenge";
pub const KEY_DAILY_ACTIVE: &str = "isDailyChallenge";
pub const KEY_DAILY_LEVEL: &str = "dailyChallengeLevel";

// An explicit reset clears every key the game owns.
const ALL_KEYS: [&str; 7] = [
    KEY_SESSION,
    KEY_PROGRESS,
    KEY_CURRENT_LEVEL,
    KEY_ACHIEVEMENTS,
    KEY_LAST_DAILY,
    KEY_DAILY_ACTIVE,
    KEY_DAILY_LEVEL,
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LevelResult {
    pub completed: bool,
    pub best_score: i32,
    pub best_time: u32,
}

impl Default for LevelResult {
    fn default() -> Self {
        Self {
            completed: false,
            best_score: 0,
            best_time: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEntry {
    pub level: u32,
    pub score: i32,
    pub time: u32,
    pub date: DateTime<Utc>,
}

/// Durable per-user progress. `completions` is an append-only log; nothing
/// here shrinks except through an explicit reset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressRecord {
    pub unlocked_level: u32,
    pub current_level: u32,
    pub levels: BTreeMap<u32, LevelResult>,
    pub completions: Vec<CompletionEntry>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            unlocked_level: 1,
            current_level: 1,
            levels: BTreeMap::new(),
            completions: Vec::new(),
        }
    }
}

impl ProgressRecord {
    pub fn record_completion(&mut self, level: u32, score: i32, time: u32, date: DateTime<Utc>) {
        self.completions.push(CompletionEntry { level, score, time, date });
        let entry = self.levels.entry(level).or_default();
        if entry.completed {
            entry.best_score = cmp::max(entry.best_score, score);
            entry.best_time = cmp::min(entry.best_time, time);
        } else {
            entry.completed = true;
            entry.best_score = score;
            entry.best_time = time;
        }
        self.unlocked_level = cmp::max(self.unlocked_level, level + 1);
        self.current_level = level + 1;
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        (1..=self.unlocked_level).contains(&level)
    }

    pub fn completed_levels(&self) -> usize {
        self.levels.values().filter(|result| result.completed).count()
    }

    pub fn total_score(&self) -> i64 {
        self.levels
            .values()
            .filter(|result| result.completed)
            .map(|result| i64::from(result.best_score))
            .sum()
    }

    pub fn best_time(&self) -> Option<u32> {
        self.levels
            .values()
            .filter(|result| result.completed)
            .map(|result| result.best_time)
            .min()
    }
}

/// `m:ss` rendering used by the timer display and the stats message.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Typed layer over a key-value backend. On the bot side every user gets an
/// isolated scope; inside the mini app the backend itself is per-user and no
/// scope is needed.
pub struct ProgressStore<'a> {
    store: &'a dyn KvStore,
    scope: Option<String>,
}

impl<'a> ProgressStore<'a> {
    pub fn new(store: &'a dyn KvStore) -> Self {
        Self { store, scope: None }
    }

    pub fn scoped(store: &'a dyn KvStore, user: i64) -> Self {
        Self {
            store,
            scope: Some(user.to_string()),
        }
    }

    fn key(&self, base: &str) -> String {
        match &self.scope {
            Some(scope) => format!("{}:{}", scope, base),
            None => base.to_owned(),
        }
    }

    async fn get_raw(&self, base: &str) -> Option<String> {
        match self.store.get(&self.key(base)).await {
            Ok(value) => value.filter(|raw| !raw.is_empty()),
            Err(err) => {
                warn!("reading {} failed: {}", base, err);
                None
            }
        }
    }

    /// Storage trouble or a corrupt record degrade to the default; the
    /// player never sees a persistence error.
    pub async fn load(&self) -> ProgressRecord {
        match self.get_raw(KEY_PROGRESS).await {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("corrupt progress record, starting fresh: {}", err);
                ProgressRecord::default()
            }),
            None => ProgressRecord::default(),
        }
    }

    pub async fn save(&self, record: &ProgressRecord) -> StorageResult<()> {
        let json = serde_json::to_string(record)?;
        self.store.set(&self.key(KEY_PROGRESS), &json).await
    }

    pub async fn load_achievements(&self) -> Achievements {
        match self.get_raw(KEY_ACHIEVEMENTS).await {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            None => Achievements::default(),
        }
    }

    pub async fn save_achievements(&self, achievements: &Achievements) -> StorageResult<()> {
        let json = serde_json::to_string(achievements)?;
        self.store.set(&self.key(KEY_ACHIEVEMENTS), &json).await
    }

    pub async fn load_session(&self) -> Option<SessionSnapshot> {
        let raw = self.get_raw(KEY_SESSION).await?;
        serde_json::from_str(&raw).ok()
    }

    pub async fn save_session(&self, snapshot: &SessionSnapshot) -> StorageResult<()> {
        let json = serde_json::to_string(snapshot)?;
        self.store.set(&self.key(KEY_SESSION), &json).await
    }

    pub async fn clear_session(&self) -> StorageResult<()> {
        self.store.set(&self.key(KEY_SESSION), "").await
    }

    pub async fn current_level(&self) -> u32 {
        self.get_raw(KEY_CURRENT_LEVEL)
            .await
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(1)
    }

    pub async fn set_current_level(&self, level: u32) -> StorageResult<()> {
        self.store
            .set(&self.key(KEY_CURRENT_LEVEL), &level.to_string())
            .await
    }

    pub async fn reset(&self) -> StorageResult<()> {
        for base in &ALL_KEYS {
            self.store.set(&self.key(base), "").await?;
        }
        Ok(())
    }

    /// One challenge per calendar day: picks a random unlocked level (capped
    /// at 20) and marks today as used. `None` when today's is already done.
    pub async fn start_daily_challenge(
        &self,
        record: &ProgressRecord,
        today: NaiveDate,
    ) -> Option<u32> {
        if self.get_raw(KEY_LAST_DAILY).await == Some(today.to_string()) {
            return None;
        }
        let ceiling = cmp::max(1, cmp::min(record.unlocked_level, 20));
        let level = rand::thread_rng().gen_range(1..=ceiling);
        if let Err(err) = self.store.set(&self.key(KEY_LAST_DAILY), &today.to_string()).await {
            warn!("recording daily challenge date failed: {}", err);
        }
        let _ = self.store.set(&self.key(KEY_DAILY_ACTIVE), "true").await;
        let _ = self
            .store
            .set(&self.key(KEY_DAILY_LEVEL), &level.to_string())
            .await;
        Some(level)
    }
}
