use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use super::{
    BOARD_HEIGHT, BOARD_WIDTH,
    piece::{Piece, PieceKind},
};

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Empty cell (no piece).
    #[default]
    Empty,
    /// Locked cell of a specific piece type.
    Piece(PieceKind),
}

impl Cell {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !self.is_empty()
    }

    /// Character used by the ASCII representation: `.` or the piece letter.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Piece(kind) => kind.as_char(),
        }
    }
}

/// A single row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardRow {
    cells: [Cell; BOARD_WIDTH],
}

impl BoardRow {
    pub const EMPTY: Self = Self {
        cells: [Cell::Empty; BOARD_WIDTH],
    };

    #[must_use]
    pub fn cells(&self) -> &[Cell; BOARD_WIDTH] {
        &self.cells
    }

    /// A row is complete when every cell is occupied.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.cells.iter().all(|c| c.is_occupied())
    }

    #[must_use]
    pub fn is_cell_occupied(&self, x: usize) -> bool {
        self.cells[x].is_occupied()
    }
}

/// The playing field: a fixed `10 × 20` grid of locked cells.
///
/// Row 0 is the top of the board. The board holds only locked cells; the
/// falling piece lives in the game field until it locks.
///
/// # Example
///
/// ```
/// use smartris_engine::{Board, Piece, PieceKind};
///
/// let board = Board::EMPTY;
/// assert!(!board.is_colliding(&Piece::spawn(PieceKind::T)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BoardRow; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const WIDTH: usize = BOARD_WIDTH;
    pub const HEIGHT: usize = BOARD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; BOARD_HEIGHT],
    };

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &BoardRow> {
        self.rows.iter()
    }

    #[must_use]
    pub fn row(&self, y: usize) -> &BoardRow {
        &self.rows[y]
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y].cells[x]
    }

    #[must_use]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.rows[y].is_cell_occupied(x)
    }

    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y].cells[x] = cell;
    }

    /// Converts signed board coordinates to indices, if they lie on the board.
    #[must_use]
    pub fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok().filter(|x| *x < BOARD_WIDTH)?;
        let y = usize::try_from(y).ok().filter(|y| *y < BOARD_HEIGHT)?;
        Some((x, y))
    }

    /// Checks if the piece overlaps locked cells or leaves the board.
    ///
    /// A filled cell collides when its column is outside `[0, WIDTH)`, its row
    /// is at or below `HEIGHT`, or it lies on an occupied board cell. Cells
    /// above the top edge (`y < 0`) are only checked against the side walls,
    /// so a spawning piece may hang partly off-screen.
    #[must_use]
    pub fn is_colliding(&self, piece: &Piece) -> bool {
        piece.occupied_positions().any(|(x, y)| {
            let Ok(ux) = usize::try_from(x) else {
                return true;
            };
            if ux >= BOARD_WIDTH {
                return true;
            }
            match usize::try_from(y) {
                Ok(uy) => uy >= BOARD_HEIGHT || self.is_occupied(ux, uy),
                Err(_) => false,
            }
        })
    }

    /// Stamps the piece's kind into every on-board cell it covers.
    ///
    /// Cells outside the board (typically above the top edge) are dropped.
    pub fn fill_piece(&mut self, piece: &Piece) {
        let cell = Cell::Piece(piece.kind());
        for (x, y) in piece.occupied_positions() {
            if let Some((x, y)) = Self::index(x, y) {
                self.rows[y].cells[x] = cell;
            }
        }
    }

    /// Number of complete rows, without removing them.
    #[must_use]
    pub fn count_filled_lines(&self) -> usize {
        self.rows.iter().filter(|row| row.is_filled()).count()
    }

    /// Clears filled lines and returns the number of lines cleared.
    ///
    /// All complete rows are removed at once; the remaining rows keep their
    /// order and settle at the bottom, and empty rows refill the top.
    pub fn clear_lines(&mut self) -> usize {
        let mut count = 0;
        for y in (0..BOARD_HEIGHT).rev() {
            if self.rows[y].is_filled() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }
        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }

    /// Creates a `Board` from ASCII art for tests and fixtures.
    ///
    /// # Panics
    ///
    /// Panics if the art is not a valid board (see [`FromStr`]).
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        match art.parse() {
            Ok(board) => board,
            Err(e) => panic!("invalid board art: {e}"),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BoardParseError {
    #[display("each row must have exactly {BOARD_WIDTH} cells, got {width} at row {row}")]
    InvalidWidth { row: usize, width: usize },
    #[display("board must have at most {BOARD_HEIGHT} rows, got {rows}")]
    TooManyRows { rows: usize },
    #[display("invalid cell {ch:?} at row {row}")]
    InvalidCell { row: usize, ch: char },
}

/// Parses ASCII art: `.` is empty, `#` or a piece letter is occupied.
///
/// Blank lines and surrounding whitespace are ignored. When fewer than
/// `HEIGHT` rows are given they are aligned to the bottom of the board.
impl FromStr for Board {
    type Err = BoardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() > BOARD_HEIGHT {
            return Err(BoardParseError::TooManyRows { rows: lines.len() });
        }

        let mut board = Self::EMPTY;
        let top = BOARD_HEIGHT - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != BOARD_WIDTH {
                return Err(BoardParseError::InvalidWidth { row: i, width });
            }
            for (x, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '.' => Cell::Empty,
                    // '#' has no kind of its own; any tag marks the cell occupied
                    '#' => Cell::Piece(PieceKind::I),
                    _ => PieceKind::from_char(ch)
                        .map(Cell::Piece)
                        .ok_or(BoardParseError::InvalidCell { row: i, ch })?,
                };
                board.rows[top + i].cells[x] = cell;
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for cell in row.cells {
                f.write_char(cell.as_char())?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: one string per row, top to bottom (e.g., "..........", "IIII.TTT..")
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| row.cells.iter().map(|c| c.as_char()).collect())
            .collect();
        rows.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let rows = Vec::<String>::deserialize(deserializer)?;
        if rows.len() != BOARD_HEIGHT {
            return Err(serde::de::Error::custom(format!(
                "expected {BOARD_HEIGHT} rows, got {}",
                rows.len()
            )));
        }
        rows.join("\n").parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::Position;

    fn fill_row(board: &mut Board, y: usize) {
        for x in 0..BOARD_WIDTH {
            board.set_cell(x, y, Cell::Piece(PieceKind::I));
        }
    }

    #[test]
    fn test_empty_board() {
        let board = Board::EMPTY;
        assert_eq!(board.rows().count(), BOARD_HEIGHT);
        for row in board.rows() {
            assert_eq!(row.cells().len(), BOARD_WIDTH);
            assert!(row.cells().iter().all(|c| c.is_empty()));
        }
    }

    #[test]
    fn test_spawned_piece_never_collides_on_empty_board() {
        for kind in PieceKind::ALL {
            assert!(
                !Board::EMPTY.is_colliding(&Piece::spawn(kind)),
                "{kind} collides at spawn"
            );
        }
    }

    #[test]
    fn test_collision_with_walls_and_floor() {
        let board = Board::EMPTY;
        let o = Piece::spawn(PieceKind::O);

        assert!(!board.is_colliding(&o.with_position(Position::new(0, 0))));
        assert!(board.is_colliding(&o.with_position(Position::new(-1, 0))));
        assert!(!board.is_colliding(&o.with_position(Position::new(8, 0))));
        assert!(board.is_colliding(&o.with_position(Position::new(9, 0))));
        assert!(!board.is_colliding(&o.with_position(Position::new(4, 18))));
        assert!(board.is_colliding(&o.with_position(Position::new(4, 19))));
    }

    #[test]
    fn test_cells_above_board_are_not_checked_against_grid() {
        let mut board = Board::EMPTY;
        fill_row(&mut board, 0);
        let i = Piece::spawn(PieceKind::I).rotated_right();

        // fully above the board: only the side walls apply
        assert!(!board.is_colliding(&i.with_position(Position::new(3, -4))));
        assert!(board.is_colliding(&i.with_position(Position::new(3, -3))));
        assert!(board.is_colliding(&i.with_position(Position::new(-1, -4))));
    }

    #[test]
    fn test_collision_with_locked_cells() {
        let board = Board::from_ascii(
            r"
            ..........
            ....#.....
            ",
        );
        let t = Piece::spawn(PieceKind::T);
        assert!(board.is_colliding(&t.with_position(Position::new(3, 18))));
        assert!(!board.is_colliding(&t.with_position(Position::new(5, 18))));
        assert!(!board.is_colliding(&t.with_position(Position::new(3, 17))));
    }

    #[test]
    fn test_fill_piece_drops_cells_above_board() {
        let mut board = Board::EMPTY;
        let i = Piece::spawn(PieceKind::I)
            .rotated_right()
            .with_position(Position::new(2, -2));
        board.fill_piece(&i);

        let occupied: Vec<_> = (0..BOARD_HEIGHT)
            .filter(|&y| board.is_occupied(2, y))
            .collect();
        assert_eq!(occupied, vec![0, 1]);
        assert_eq!(board.cell(2, 0), Cell::Piece(PieceKind::I));
    }

    #[test]
    fn test_clear_lines_single_line() {
        let mut board = Board::from_ascii(
            r"
            ..#.......
            ##########
            #.........
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared, 1);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                ..#.......
                #.........
                ",
            )
        );
    }

    #[test]
    fn test_clear_lines_non_adjacent_rows() {
        let mut board = Board::from_ascii(
            r"
            .#........
            ##########
            ..#.......
            ##########
            ...#......
            ",
        );
        assert_eq!(board.clear_lines(), 2);
        assert_eq!(
            board,
            Board::from_ascii(
                r"
                .#........
                ..#.......
                ...#......
                ",
            )
        );
    }

    #[test]
    fn test_clear_lines_with_partial_lines() {
        let mut board = Board::from_ascii("#########.");
        assert_eq!(board.clear_lines(), 0);
        assert_eq!(board, Board::from_ascii("#########."));
    }

    #[test]
    fn test_clear_lines_all_filled() {
        let mut board = Board::EMPTY;
        for y in 0..BOARD_HEIGHT {
            fill_row(&mut board, y);
        }
        assert_eq!(board.clear_lines(), BOARD_HEIGHT);
        assert_eq!(board, Board::EMPTY);
    }

    #[test]
    fn test_count_filled_lines_does_not_clear() {
        let board = Board::from_ascii(
            r"
            ##########
            ##########
            #.........
            ",
        );
        assert_eq!(board.count_filled_lines(), 2);
        assert_eq!(board.rows().filter(|r| r.is_filled()).count(), 2);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "#####".parse::<Board>(),
            Err(BoardParseError::InvalidWidth { row: 0, width: 5 })
        ));
        assert!(matches!(
            "....X.....".parse::<Board>(),
            Err(BoardParseError::InvalidCell { row: 0, ch: 'X' })
        ));
        let tall = "..........\n".repeat(BOARD_HEIGHT + 1);
        assert!(matches!(
            tall.parse::<Board>(),
            Err(BoardParseError::TooManyRows { rows: 21 })
        ));
    }

    #[test]
    fn test_display_keeps_piece_letters() {
        let board = Board::from_ascii("IIIIOO.TTT");
        let text = board.to_string();
        assert_eq!(text.lines().count(), BOARD_HEIGHT);
        assert_eq!(text.lines().last(), Some("IIIIOO.TTT"));
        assert_eq!(text.parse::<Board>().unwrap(), board);
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_ascii(
            r"
            .S........
            SSZ.......
            ",
        );
        let serialized = serde_json::to_string(&board).unwrap();
        assert!(serialized.starts_with("[\"..........\""));
        assert!(serialized.ends_with("\"SSZ.......\"]"));

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);

        assert!(serde_json::from_str::<Board>("[\"..........\"]").is_err());
    }
}
