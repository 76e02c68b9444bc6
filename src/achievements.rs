use serde::{Deserialize, Serialize};

/// Lifetime achievement record, persisted under the `achievements` key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Achievements {
    pub first_game: bool,
    pub speed_runner: bool,
    pub perfectionist: bool,
    pub daily_streak: u32,
    pub total_levels: u32,
    pub total_score: i64,
}

pub struct Unlocked {
    pub title: &'static str,
    pub description: &'static str,
}

impl Achievements {
    /// Fold a level completion into the record and return any freshly
    /// unlocked achievements, for the bot to announce.
    pub fn record_completion(&mut self, score: i32, time: u32, hints_used: u32) -> Vec<Unlocked> {
        let mut unlocked = Vec::new();
        if !self.first_game {
            self.first_game = true;
            unlocked.push(Unlocked {
                title: "Pemula",
                description: "Selamat! Anda telah menyelesaikan level pertama!",
            });
        }
        if time < 60 && !self.speed_runner {
            self.speed_runner = true;
            unlocked.push(Unlocked {
                title: "Speed Runner",
                description: "Menyelesaikan level dalam waktu kurang dari 1 menit!",
            });
        }
        if hints_used == 0 && !self.perfectionist {
            self.perfectionist = true;
            unlocked.push(Unlocked {
                title: "Perfectionist",
                description: "Menyelesaikan level tanpa bantuan!",
            });
        }
        self.total_levels += 1;
        self.total_score += i64::from(score);
        unlocked
    }
}

pub struct Badge {
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Completion-count badge ladder shown alongside player stats.
pub fn badges(completed_levels: usize) -> Vec<Badge> {
    const LADDER: [(&str, &str, usize); 5] = [
        ("Pemula", "Selesaikan level pertama", 1),
        ("Penjelajah", "Selesaikan 10 level", 10),
        ("Ahli", "Selesaikan 25 level", 25),
        ("Master", "Selesaikan 50 level", 50),
        ("Legenda", "Selesaikan semua 100 level", 100),
    ];
    LADDER
        .iter()
        .map(|&(title, description, needed)| Badge {
            title,
            description,
            unlocked: completed_levels >= needed,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_completion_unlocks_once() {
        let mut achievements = Achievements::default();
        let unlocked = achievements.record_completion(420, 120, 2);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].title, "Pemula");
        assert_eq!(achievements.total_levels, 1);
        assert_eq!(achievements.total_score, 420);

        let unlocked = achievements.record_completion(300, 120, 1);
        assert!(unlocked.is_empty());
        assert_eq!(achievements.total_levels, 2);
        assert_eq!(achievements.total_score, 720);
    }

    #[test]
    fn fast_and_hintless_runs_unlock_their_badges() {
        let mut achievements = Achievements::default();
        let unlocked = achievements.record_completion(500, 45, 0);
        let titles: Vec<_> = unlocked.iter().map(|u| u.title).collect();
        assert_eq!(titles, vec!["Pemula", "Speed Runner", "Perfectionist"]);
        assert!(achievements.speed_runner);
        assert!(achievements.perfectionist);
    }

    #[test]
    fn badge_ladder_tracks_completed_levels() {
        let ladder = badges(10);
        assert!(ladder[0].unlocked);
        assert!(ladder[1].unlocked);
        assert!(!ladder[2].unlocked);
        assert_eq!(badges(0).iter().filter(|b| b.unlocked).count(), 0);
        assert_eq!(badges(100).iter().filter(|b| b.unlocked).count(), 5);
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let mut achievements = Achievements::default();
        achievements.record_completion(100, 40, 0);
        let json = serde_json::to_string(&achievements).unwrap();
        assert!(json.contains("\"firstGame\":true"));
        assert!(json.contains("\"speedRunner\":true"));
        assert!(json.contains("\"totalScore\":100"));
        let parsed: Achievements = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, achievements);
    }
}
