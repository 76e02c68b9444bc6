use std::cmp;
use std::collections::HashMap;

use log::warn;
use thiserror::Error;

use crate::grid::Coord;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }
}

/// One clued word pinned to the grid at authoring time.
#[derive(Clone, Debug, PartialEq)]
pub struct WordPlacement {
    pub text: String,
    pub clue: String,
    pub row: usize,
    pub column: usize,
    pub direction: Direction,
}

impl WordPlacement {
    pub fn new(text: &str, clue: &str, row: usize, column: usize, direction: Direction) -> Self {
        Self {
            text: text.to_uppercase(),
            clue: clue.to_owned(),
            row,
            column,
            direction,
        }
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Coordinate of the letter at `offset` along the word's direction.
    pub fn cell(&self, offset: usize) -> Coord {
        match self.direction {
            Direction::Across => (self.row, self.column + offset),
            Direction::Down => (self.row + offset, self.column),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len()).map(move |i| self.cell(i))
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.cells().any(|c| c == coord)
    }

    /// Exclusive (row, column) extents occupied by the word.
    pub fn extent(&self) -> (usize, usize) {
        match self.direction {
            Direction::Across => (self.row + 1, self.column + self.len()),
            Direction::Down => (self.row + self.len(), self.column + 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub id: u32,
    pub words: Vec<WordPlacement>,
    pub time_limit: u32,
    pub min_score: i32,
}

impl Level {
    pub fn new(id: u32, words: Vec<WordPlacement>) -> Result<Self, CatalogError> {
        if words.is_empty() || words.iter().any(WordPlacement::is_empty) {
            return Err(CatalogError::EmptyLevel { level: id });
        }
        warn_on_conflicts(id, &words);
        Ok(Self {
            id,
            words,
            // longer puzzles get more time, capped at 15 minutes
            time_limit: cmp::min(300 + 30 * id, 900),
            min_score: (id * 100) as i32,
        })
    }
}

// Crossing letters that disagree are an authoring slip; the grid builder keeps
// last-write-wins, so flag them at load time instead of rejecting the level.
fn warn_on_conflicts(id: u32, words: &[WordPlacement]) {
    let mut letters: HashMap<Coord, char> = HashMap::new();
    for word in words {
        for (i, letter) in word.text.chars().enumerate() {
            let coord = word.cell(i);
            if let Some(previous) = letters.insert(coord, letter) {
                if previous != letter {
                    warn!(
                        "level {}: crossing letters disagree at ({}, {}): '{}' vs '{}' from {}",
                        id, coord.0, coord.1, previous, letter, word.text
                    );
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("level {level} has no playable words")]
    EmptyLevel { level: u32 },
    #[error("catalog contains no levels")]
    Empty,
}

/// The authored level set. Out-of-range lookups degrade to the first level
/// rather than erroring.
pub struct Catalog {
    levels: Vec<Level>,
}

impl Catalog {
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { levels })
    }

    /// The shipped KBBI word sets.
    pub fn standard() -> Result<Self, CatalogError> {
        use Direction::{Across, Down};
        Self::new(vec![
            Level::new(
                1,
                vec![
                    WordPlacement::new("TROPIS", "Iklim di Indonesia", 0, 0, Down),
                    WordPlacement::new("PIKET", "Kerja sama disekolah", 0, 4, Down),
                    WordPlacement::new("PENYEBUT", "Sebutan untuk 5 pada pecahan 2/5", 3, 0, Across),
                    WordPlacement::new("TIGA", "Persatuan indonesia silah ke...", 3, 7, Down),
                    WordPlacement::new("CUACA", "Hujan, Pansan, Badai", 5, 6, Across),
                ],
            )?,
            Level::new(
                2,
                vec![
                    WordPlacement::new("BALON", "Selalu ada di ulang tahun", 0, 2, Down),
                    WordPlacement::new("API", "Panas", 4, 4, Down),
                    WordPlacement::new("MOBIL", "Transportasi roda 4", 0, 0, Across),
                    WordPlacement::new("BOLA", "Benda bulat", 4, 1, Across),
                    WordPlacement::new("PINTO", "Alat keluar masuk", 5, 4, Across),
                ],
            )?,
            Level::new(
                3,
                vec![
                    WordPlacement::new("MASINIS", "Orang yang menjalankan kereta api", 0, 5, Down),
                    WordPlacement::new("SURAMADU", "Jembatan yang menghubungkan Pulau Jawa dan Madura", 3, 3, Down),
                    WordPlacement::new("SOEKARNO", "Presiden pertama Negara Indonesia", 4, 7, Down),
                    WordPlacement::new("JAKARTA", "Ibu kota Negara Indonesia", 4, 10, Down),
                    WordPlacement::new("HERBIVORA", "Hewan pemakan tumbuhan", 5, 1, Across),
                    WordPlacement::new("SURABAYA", "Ibu kota provinsi Jawa Timur", 8, 0, Across),
                    WordPlacement::new("RANTAI", "Lambang Pancasila sila kedua", 8, 9, Across),
                    WordPlacement::new("INSANG", "Alat pernapasan pada ikan", 10, 6, Across),
                ],
            )?,
        ])
    }

    pub fn level(&self, id: u32) -> &Level {
        self.levels
            .iter()
            .find(|level| level.id == id)
            .unwrap_or(&self.levels[0])
    }

    pub fn max_level(&self) -> u32 {
        self.levels.iter().map(|level| level.id).max().unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
