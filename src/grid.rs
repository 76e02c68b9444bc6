use std::cmp;

use crate::catalog::WordPlacement;

pub type Coord = (usize, usize);

/// One playable square. Blocked positions are represented as `None` slots in
/// the grid, so every `Cell` that exists belongs to at least one word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    expected: char,
    number: Option<u32>,
    input: Option<char>,
}

impl Cell {
    fn new(expected: char) -> Self {
        Self {
            expected,
            number: None,
            input: None,
        }
    }

    pub fn expected(&self) -> char {
        self.expected
    }

    pub fn number(&self) -> Option<u32> {
        self.number
    }

    pub fn input(&self) -> Option<char> {
        self.input
    }

    pub fn is_solved(&self) -> bool {
        self.input == Some(self.expected)
    }
}

/// Fill statistics across the whole grid, reported to the bot on help requests.
pub struct FillStats {
    pub completed_words: usize,
    pub total_words: usize,
    pub filled_cells: usize,
    pub total_cells: usize,
}

impl FillStats {
    pub fn percentage(&self) -> u32 {
        if self.total_words == 0 {
            return 0;
        }
        ((self.completed_words as f64 / self.total_words as f64) * 100.0).round() as u32
    }
}

/// Square matrix of blocked/active cells derived from a level's word list.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Cell>>,
}

impl Grid {
    /// Build the minimal square grid containing every word. Clue numbers are
    /// assigned sequentially in word-list order; two words starting on the
    /// same cell share one number. When crossing words disagree on a letter
    /// the later word wins.
    pub fn build(words: &[WordPlacement]) -> Self {
        let size = words
            .iter()
            .map(|word| {
                let (rows, columns) = word.extent();
                cmp::max(rows, columns)
            })
            .max()
            .unwrap_or(0);
        let mut cells: Vec<Option<Cell>> = vec![None; size * size];
        let mut next_number = 1;
        for word in words {
            let start = word.cell(0);
            let start_index = start.0 * size + start.1;
            for (i, letter) in word.text.chars().enumerate() {
                let (row, column) = word.cell(i);
                let slot = &mut cells[row * size + column];
                match slot {
                    Some(cell) => cell.expected = letter,
                    None => *slot = Some(Cell::new(letter)),
                }
            }
            if let Some(cell) = &mut cells[start_index] {
                if cell.number.is_none() {
                    cell.number = Some(next_number);
                    next_number += 1;
                }
            }
        }
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.0 < self.size && coord.1 < self.size
    }

    fn index(&self, coord: Coord) -> usize {
        coord.0 * self.size + coord.1
    }

    /// `None` for blocked or out-of-range positions.
    pub fn get(&self, coord: Coord) -> Option<&Cell> {
        if !self.contains(coord) {
            return None;
        }
        self.cells[self.index(coord)].as_ref()
    }

    pub fn is_active(&self, coord: Coord) -> bool {
        self.get(coord).is_some()
    }

    /// Store a letter, normalized to uppercase. Returns false for blocked or
    /// out-of-range cells.
    pub fn set_input(&mut self, coord: Coord, value: char) -> bool {
        if !self.contains(coord) {
            return false;
        }
        let index = self.index(coord);
        match &mut self.cells[index] {
            Some(cell) => {
                cell.input = Some(value.to_ascii_uppercase());
                true
            }
            None => false,
        }
    }

    pub fn clear_input(&mut self, coord: Coord) -> bool {
        if !self.contains(coord) {
            return false;
        }
        let index = self.index(coord);
        match &mut self.cells[index] {
            Some(cell) => {
                cell.input = None;
                true
            }
            None => false,
        }
    }

    /// The entered letters along a word, in direction order. Empty cells
    /// contribute nothing, so a partially filled word never matches its text.
    pub fn candidate(&self, word: &WordPlacement) -> String {
        word.cells()
            .filter_map(|coord| self.get(coord).and_then(Cell::input))
            .collect()
    }

    pub fn is_word_solved(&self, word: &WordPlacement) -> bool {
        self.candidate(word) == word.text
    }

    pub fn is_complete(&self, words: &[WordPlacement]) -> bool {
        words.iter().all(|word| self.is_word_solved(word))
    }

    pub fn fill_stats(&self, words: &[WordPlacement]) -> FillStats {
        FillStats {
            completed_words: words.iter().filter(|word| self.is_word_solved(word)).count(),
            total_words: words.len(),
            filled_cells: self
                .cells
                .iter()
                .filter(|slot| matches!(slot, Some(cell) if cell.input.is_some()))
                .count(),
            total_cells: self.cells.iter().filter(|slot| slot.is_some()).count(),
        }
    }

    /// Per-slot inputs in row-major order, for session snapshots.
    pub fn inputs(&self) -> Vec<Option<char>> {
        self.cells
            .iter()
            .map(|slot| slot.as_ref().and_then(Cell::input))
            .collect()
    }

    pub fn apply_inputs(&mut self, inputs: &[Option<char>]) {
        for (slot, input) in self.cells.iter_mut().zip(inputs) {
            if let (Some(cell), Some(value)) = (slot.as_mut(), input) {
                cell.input = Some(value.to_ascii_uppercase());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Direction, WordPlacement};

    fn word(text: &str, row: usize, column: usize, direction: Direction) -> WordPlacement {
        WordPlacement::new(text, "clue", row, column, direction)
    }

    #[test]
    fn grid_size_is_minimal_square() {
        let catalog = Catalog::standard().unwrap();
        let grid = Grid::build(&catalog.level(1).words);
        // CUACA ends at column 10, the widest extent of level 1
        assert_eq!(grid.size(), 11);
        for placement in &catalog.level(1).words {
            for coord in placement.cells() {
                assert!(grid.is_active(coord), "cell {:?} should be active", coord);
            }
        }
    }

    #[test]
    fn blocked_cells_are_inactive() {
        let grid = Grid::build(&[word("AB", 0, 0, Direction::Across)]);
        assert_eq!(grid.size(), 2);
        assert!(grid.is_active((0, 0)));
        assert!(!grid.is_active((1, 0)));
        assert!(!grid.is_active((9, 9)));
    }

    #[test]
    fn numbering_follows_word_list_order() {
        // DOG starts geometrically above ARC but is listed after it, so it
        // gets the higher number.
        let words = vec![
            word("ARC", 2, 0, Direction::Across),
            word("DOG", 0, 0, Direction::Down),
        ];
        let grid = Grid::build(&words);
        assert_eq!(grid.get((2, 0)).unwrap().number(), Some(1));
        assert_eq!(grid.get((0, 0)).unwrap().number(), Some(2));
    }

    #[test]
    fn words_sharing_a_start_share_one_number() {
        let words = vec![
            word("AT", 0, 0, Direction::Across),
            word("AN", 0, 0, Direction::Down),
            word("TO", 0, 1, Direction::Down),
        ];
        let grid = Grid::build(&words);
        assert_eq!(grid.get((0, 0)).unwrap().number(), Some(1));
        assert_eq!(grid.get((0, 1)).unwrap().number(), Some(2));
    }

    #[test]
    fn conflicting_crossing_takes_last_writer() {
        let words = vec![
            word("AXE", 0, 0, Direction::Across),
            word("OBOE", 0, 1, Direction::Down),
        ];
        let grid = Grid::build(&words);
        // (0, 1) is X from AXE, then O from OBOE; the later word wins
        assert_eq!(grid.get((0, 1)).unwrap().expected(), 'O');
    }

    #[test]
    fn candidate_assembles_inputs_in_direction_order() {
        let catalog = Catalog::standard().unwrap();
        let level = catalog.level(1);
        let cuaca = &level.words[4];
        assert_eq!(cuaca.text, "CUACA");
        let mut grid = Grid::build(&level.words);
        for (offset, letter) in "cuaca".chars().enumerate() {
            grid.set_input(cuaca.cell(offset), letter);
        }
        assert_eq!(grid.candidate(cuaca), "CUACA");
        assert!(grid.is_word_solved(cuaca));

        grid.set_input(cuaca.cell(4), 'B');
        assert_eq!(grid.candidate(cuaca), "CUACB");
        assert!(!grid.is_word_solved(cuaca));
        assert!(!grid.is_complete(&level.words));
    }

    #[test]
    fn partial_fill_is_not_a_match() {
        let words = vec![word("CAT", 0, 0, Direction::Across)];
        let mut grid = Grid::build(&words);
        grid.set_input((0, 0), 'C');
        grid.set_input((0, 2), 'T');
        assert_eq!(grid.candidate(&words[0]), "CT");
        assert!(!grid.is_complete(&words));
    }

    #[test]
    fn input_is_rejected_on_blocked_and_out_of_range_cells() {
        let mut grid = Grid::build(&[word("AB", 0, 0, Direction::Across)]);
        assert!(!grid.set_input((1, 1), 'A'));
        assert!(!grid.set_input((5, 5), 'A'));
        assert!(grid.set_input((0, 1), 'b'));
        assert_eq!(grid.get((0, 1)).unwrap().input(), Some('B'));
    }

    #[test]
    fn fill_stats_report_progress() {
        let words = vec![
            word("AB", 0, 0, Direction::Across),
            word("AC", 0, 0, Direction::Down),
        ];
        let mut grid = Grid::build(&words);
        grid.set_input((0, 0), 'A');
        grid.set_input((0, 1), 'B');
        let stats = grid.fill_stats(&words);
        assert_eq!(stats.completed_words, 1);
        assert_eq!(stats.total_words, 2);
        assert_eq!(stats.filled_cells, 2);
        assert_eq!(stats.total_cells, 3);
        assert_eq!(stats.percentage(), 50);
    }

    #[test]
    fn out_of_range_level_builds_the_same_grid_as_level_one() {
        let catalog = Catalog::standard().unwrap();
        let fallback = Grid::build(&catalog.level(55).words);
        let first = Grid::build(&catalog.level(1).words);
        assert_eq!(fallback, first);
    }

    #[test]
    fn snapshot_inputs_round_trip() {
        let words = vec![word("CAT", 0, 0, Direction::Across)];
        let mut grid = Grid::build(&words);
        grid.set_input((0, 0), 'C');
        grid.set_input((0, 1), 'A');
        let inputs = grid.inputs();
        let mut restored = Grid::build(&words);
        restored.apply_inputs(&inputs);
        assert_eq!(restored, grid);
    }
}
