use itertools::Itertools;

use crate::achievements::{self, Achievements};
use crate::events::ProgressSummary;
use crate::progress::{format_time, ProgressRecord};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Start,
    Play,
    Help,
    Stats,
}

impl Command {
    /// Parse the leading bot command of a message, tolerating the
    /// `@BotName` suffix used in group chats.
    pub fn parse(text: &str) -> Option<Self> {
        let token = text.split_whitespace().next()?;
        let token = token.split('@').next().unwrap_or(token);
        match token {
            "/start" => Some(Command::Start),
            "/play" => Some(Command::Play),
            "/help" => Some(Command::Help),
            "/stats" => Some(Command::Stats),
            _ => None,
        }
    }
}

pub fn welcome_text(first_name: &str) -> String {
    format!(
        "Halo {}! 👋\n\nSelamat datang di KBBI Crossword Game! 🧩\n\n\
         Game teka-teki silang berbahasa Indonesia yang menantang dengan \
         berbagai tingkat kesulitan. Uji kemampuan kosakata Anda!\n\n\
         🎮 Fitur Game:\n\
         • Level dengan tingkat kesulitan berbeda\n\
         • Sistem achievement dan progress tracking\n\
         • Haptic feedback untuk pengalaman bermain yang lebih baik\n\
         • Sinkronisasi progress otomatis\n\n\
         Klik tombol di bawah untuk mulai bermain!",
        first_name
    )
}

pub fn play_text() -> &'static str {
    "Mainkan game!"
}

pub fn help_text() -> &'static str {
    "📖 Bantuan KBBI Crossword Game\n\n\
     🎯 Cara Bermain:\n\
     • Pilih level sesuai kemampuan Anda\n\
     • Isi kotak-kotak kosong dengan huruf yang tepat\n\
     • Gunakan petunjuk (clues) untuk membantu\n\
     • Selesaikan semua kata untuk menyelesaikan level\n\n\
     ⌨️ Commands:\n\
     /start - Mulai game\n\
     /play - Buka game\n\
     /help - Tampilkan bantuan ini\n\
     /stats - Lihat statistik Anda\n\n\
     Selamat bermain! 🎮"
}

pub fn stats_text(record: &ProgressRecord, achievements: &Achievements) -> String {
    if record.completed_levels() == 0 {
        return "📊 Statistik Anda\n\nBelum ada level yang diselesaikan.\n\
                Mulai bermain untuk melihat statistik Anda!"
            .to_owned();
    }
    let best_time = record
        .best_time()
        .map(format_time)
        .unwrap_or_else(|| "--:--".to_owned());
    let badges = achievements::badges(record.completed_levels());
    let earned = badges
        .iter()
        .filter(|badge| badge.unlocked)
        .map(|badge| badge.title)
        .join(", ");
    format!(
        "📊 Statistik Anda\n\n\
         🎮 Total Game Dimainkan: {}\n\
         🏆 Level Diselesaikan: {}\n\
         ⭐ Total Poin: {}\n\
         ⏱️ Waktu Terbaik: {}\n\
         🥇 Pencapaian: {}\n\
         🔥 Streak Harian: {}",
        achievements.total_levels,
        record.completed_levels(),
        record.total_score(),
        best_time,
        if earned.is_empty() { "-".to_owned() } else { earned },
        achievements.daily_streak,
    )
}

pub fn completion_text(level: u32, score: i32, time: u32, hints_used: u32) -> String {
    format!(
        "🎉 Selamat! Level {} selesai!\n\n\
         📊 Hasil Anda:\n\
         ⭐ Skor: {}\n\
         ⏱️ Waktu: {}\n\
         💡 Bantuan: {}\n\n\
         Lanjutkan ke level berikutnya?",
        level,
        score,
        format_time(time),
        hints_used
    )
}

pub fn game_completed_text(score: i32, time: u32) -> String {
    format!(
        "🏆 Luar biasa! Semua level selesai!\n\n\
         ⭐ Skor terakhir: {}\n\
         ⏱️ Waktu: {}\n\n\
         Terima kasih sudah bermain!",
        score,
        format_time(time)
    )
}

pub fn achievement_text(title: &str, description: &str) -> String {
    format!(
        "🏆 Achievement Terbuka!\n\n{}\n{}\n\n\
         Terus bermain untuk membuka achievement lainnya!",
        title, description
    )
}

pub fn help_reply_text(level: u32, progress: &ProgressSummary) -> String {
    format!(
        "💡 Bantuan untuk Level {}\n\n\
         Progress Anda: {}% ({}/{} kata)\n\n\
         Tips:\n\
         • Mulai dari kata-kata pendek\n\
         • Perhatikan huruf yang bersilangan\n\
         • Gunakan petunjuk dengan bijak\n\n\
         Semangat! 💪",
        level, progress.progress_percentage, progress.completed_words, progress.total_words
    )
}

pub fn share_text(level: u32, score: i32, time: &str) -> String {
    format!(
        "🎮 KBBI Crossword Game\n\n\
         🏆 Saya baru saja menyelesaikan Level {}!\n\
         ⭐ Skor: {}\n\
         ⏱️ Waktu: {}\n\n\
         Ikut bermain juga yuk! 👇",
        level, score, time
    )
}
