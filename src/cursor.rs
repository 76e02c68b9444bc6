use crate::catalog::{Direction, WordPlacement};
use crate::grid::{Coord, Grid};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Arrow {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Selection {
    pub coord: Coord,
    pub direction: Direction,
}

/// Focus/navigation state machine over a grid. Selection only ever rests on
/// active cells; movement at the grid boundary is a no-op.
#[derive(Default)]
pub struct Cursor {
    selection: Option<Selection>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Select an active cell, taking the direction of its first owning word.
    /// Re-selecting an intersection cell toggles between across and down.
    pub fn select(&mut self, grid: &Grid, words: &[WordPlacement], coord: Coord) -> bool {
        if !grid.is_active(coord) {
            return false;
        }
        let across = words
            .iter()
            .any(|word| word.direction == Direction::Across && word.contains(coord));
        let down = words
            .iter()
            .any(|word| word.direction == Direction::Down && word.contains(coord));
        let direction = match self.selection {
            Some(selection) if selection.coord == coord && across && down => {
                selection.direction.toggled()
            }
            _ => words
                .iter()
                .find(|word| word.contains(coord))
                .map(|word| word.direction)
                .unwrap_or(Direction::Across),
        };
        self.selection = Some(Selection { coord, direction });
        true
    }

    /// Enter a letter at the selection and advance along the current
    /// direction when the next cell exists and is active.
    pub fn type_char(&mut self, grid: &mut Grid, value: char) -> bool {
        let selection = match self.selection {
            Some(selection) => selection,
            None => return false,
        };
        if !grid.set_input(selection.coord, value) {
            return false;
        }
        let next = step_forward(selection.coord, selection.direction);
        if grid.is_active(next) {
            self.selection = Some(Selection { coord: next, ..selection });
        }
        true
    }

    /// Clear a filled cell; on an already-empty cell, step back along the
    /// current direction instead.
    pub fn backspace(&mut self, grid: &mut Grid) -> bool {
        let selection = match self.selection {
            Some(selection) => selection,
            None => return false,
        };
        if grid.get(selection.coord).and_then(|cell| cell.input()).is_some() {
            return grid.clear_input(selection.coord);
        }
        if let Some(previous) = step_back(selection.coord, selection.direction) {
            if grid.is_active(previous) {
                self.selection = Some(Selection { coord: previous, ..selection });
                return true;
            }
        }
        false
    }

    /// Move to the nearest active cell in a geometric direction, skipping
    /// blocked cells. Does not change any input.
    pub fn arrow(&mut self, grid: &Grid, arrow: Arrow) -> bool {
        let selection = match self.selection {
            Some(selection) => selection,
            None => return false,
        };
        let mut coord = selection.coord;
        loop {
            coord = match advance(coord, arrow, grid.size()) {
                Some(next) => next,
                None => return false,
            };
            if grid.is_active(coord) {
                self.selection = Some(Selection { coord, ..selection });
                return true;
            }
        }
    }
}

fn step_forward(coord: Coord, direction: Direction) -> Coord {
    match direction {
        Direction::Across => (coord.0, coord.1 + 1),
        Direction::Down => (coord.0 + 1, coord.1),
    }
}

fn step_back(coord: Coord, direction: Direction) -> Option<Coord> {
    match direction {
        Direction::Across => Some((coord.0, coord.1.checked_sub(1)?)),
        Direction::Down => Some((coord.0.checked_sub(1)?, coord.1)),
    }
}

fn advance(coord: Coord, arrow: Arrow, size: usize) -> Option<Coord> {
    match arrow {
        Arrow::Up => Some((coord.0.checked_sub(1)?, coord.1)),
        Arrow::Left => Some((coord.0, coord.1.checked_sub(1)?)),
        Arrow::Down => {
            if coord.0 + 1 < size {
                Some((coord.0 + 1, coord.1))
            } else {
                None
            }
        }
        Arrow::Right => {
            if coord.1 + 1 < size {
                Some((coord.0, coord.1 + 1))
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Direction::{Across, Down};
    use crate::catalog::WordPlacement;
    use crate::grid::Grid;

    // CAT across the top row, COW down the first column
    fn fixture() -> (Vec<WordPlacement>, Grid) {
        let words = vec![
            WordPlacement::new("CAT", "clue", 0, 0, Across),
            WordPlacement::new("COW", "clue", 0, 0, Down),
        ];
        let grid = Grid::build(&words);
        (words, grid)
    }

    #[test]
    fn selecting_a_blocked_cell_is_rejected() {
        let (words, grid) = fixture();
        let mut cursor = Cursor::new();
        assert!(!cursor.select(&grid, &words, (1, 1)));
        assert!(cursor.selection().is_none());
    }

    #[test]
    fn selection_takes_owning_word_direction() {
        let (words, grid) = fixture();
        let mut cursor = Cursor::new();
        assert!(cursor.select(&grid, &words, (0, 1)));
        assert_eq!(cursor.selection().unwrap().direction, Across);
        assert!(cursor.select(&grid, &words, (1, 0)));
        assert_eq!(cursor.selection().unwrap().direction, Down);
    }

    #[test]
    fn reselecting_an_intersection_toggles_direction() {
        let (words, grid) = fixture();
        let mut cursor = Cursor::new();
        cursor.select(&grid, &words, (0, 0));
        assert_eq!(cursor.selection().unwrap().direction, Across);
        cursor.select(&grid, &words, (0, 0));
        assert_eq!(cursor.selection().unwrap().direction, Down);
        cursor.select(&grid, &words, (0, 0));
        assert_eq!(cursor.selection().unwrap().direction, Across);
        // not an intersection: re-selecting keeps the owning direction
        cursor.select(&grid, &words, (0, 1));
        cursor.select(&grid, &words, (0, 1));
        assert_eq!(cursor.selection().unwrap().direction, Across);
    }

    #[test]
    fn typing_advances_until_the_word_ends() {
        let (words, mut grid) = fixture();
        let mut cursor = Cursor::new();
        cursor.select(&grid, &words, (0, 0));
        assert!(cursor.type_char(&mut grid, 'c'));
        assert_eq!(cursor.selection().unwrap().coord, (0, 1));
        cursor.type_char(&mut grid, 'a');
        cursor.type_char(&mut grid, 't');
        // no active cell after the last letter: selection stays put
        assert_eq!(cursor.selection().unwrap().coord, (0, 2));
        assert_eq!(grid.get((0, 0)).unwrap().input(), Some('C'));
        assert_eq!(grid.get((0, 2)).unwrap().input(), Some('T'));
    }

    #[test]
    fn backspace_clears_then_moves_back() {
        let (words, mut grid) = fixture();
        let mut cursor = Cursor::new();
        cursor.select(&grid, &words, (0, 1));
        grid.set_input((0, 1), 'A');
        assert!(cursor.backspace(&mut grid));
        assert_eq!(grid.get((0, 1)).unwrap().input(), None);
        assert_eq!(cursor.selection().unwrap().coord, (0, 1));
        assert!(cursor.backspace(&mut grid));
        assert_eq!(cursor.selection().unwrap().coord, (0, 0));
    }

    #[test]
    fn arrows_stop_at_the_boundary_without_wrapping() {
        let (words, grid) = fixture();
        let mut cursor = Cursor::new();
        cursor.select(&grid, &words, (0, 0));
        assert!(!cursor.arrow(&grid, Arrow::Up));
        assert!(!cursor.arrow(&grid, Arrow::Left));
        assert_eq!(cursor.selection().unwrap().coord, (0, 0));
        assert!(cursor.arrow(&grid, Arrow::Right));
        assert_eq!(cursor.selection().unwrap().coord, (0, 1));
    }

    #[test]
    fn arrows_skip_blocked_cells() {
        // two across words separated by a blocked row
        let words = vec![
            WordPlacement::new("ABC", "clue", 0, 0, Across),
            WordPlacement::new("DEF", "clue", 2, 0, Across),
        ];
        let grid = Grid::build(&words);
        let mut cursor = Cursor::new();
        cursor.select(&grid, &words, (0, 1));
        assert!(cursor.arrow(&grid, Arrow::Down));
        assert_eq!(cursor.selection().unwrap().coord, (2, 1));
        // sideways from the last column of a word with nothing beyond
        cursor.select(&grid, &words, (2, 2));
        assert!(!cursor.arrow(&grid, Arrow::Right));
        assert_eq!(cursor.selection().unwrap().coord, (2, 2));
    }
}
