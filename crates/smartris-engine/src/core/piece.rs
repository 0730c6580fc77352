use std::fmt::{self, Write as _};

use arrayvec::ArrayVec;
use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::{BOARD_WIDTH, SPAWN_Y};

/// A falling piece: kind, current orientation and anchor position.
///
/// Pieces are immutable values - movement and rotation return new `Piece`s,
/// leaving collision checks to the caller (see [`Board::is_colliding`]).
///
/// # Coordinate System
///
/// - The anchor is the board coordinate of the shape matrix's top-left cell
/// - X increases rightward (columns), Y increases downward (rows)
/// - Y may be negative while the piece is still entering from above
///
/// # Example
///
/// ```
/// use smartris_engine::{Piece, PieceKind};
///
/// let piece = Piece::spawn(PieceKind::T);
/// let moved = piece.right();
/// let rotated = moved.rotated_right();
/// assert_eq!(rotated.position().x(), 5);
/// ```
///
/// [`Board::is_colliding`]: crate::Board::is_colliding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    shape: Shape,
    position: Position,
}

impl Piece {
    /// Creates a piece of `kind` in its base orientation at the spawn anchor.
    #[must_use]
    pub fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            shape: kind.base_shape(),
            position: Position::SPAWN,
        }
    }

    /// Creates a piece with an explicit orientation and anchor.
    #[must_use]
    pub const fn new(kind: PieceKind, shape: Shape, position: Position) -> Self {
        Self {
            kind,
            shape,
            position,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns the absolute board coordinates of every filled cell.
    ///
    /// Coordinates may lie outside the board.
    pub fn occupied_positions(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .occupied_cells()
            .map(move |(dx, dy)| (self.position.x + dx, self.position.y + dy))
    }

    #[must_use]
    pub const fn with_position(&self, position: Position) -> Self {
        Self {
            kind: self.kind,
            shape: self.shape,
            position,
        }
    }

    #[must_use]
    pub const fn with_shape(&self, shape: Shape) -> Self {
        Self {
            kind: self.kind,
            shape,
            position: self.position,
        }
    }

    #[must_use]
    pub const fn left(&self) -> Self {
        self.with_position(self.position.offset(-1, 0))
    }

    #[must_use]
    pub const fn right(&self) -> Self {
        self.with_position(self.position.offset(1, 0))
    }

    #[must_use]
    pub const fn down(&self) -> Self {
        self.with_position(self.position.offset(0, 1))
    }

    /// Rotates the shape 90° clockwise around the same anchor.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        self.with_shape(self.shape.rotated_right())
    }

    /// Returns the piece in all 4 successive orientations, starting with the current one.
    ///
    /// Symmetric kinds yield repeated shapes; nothing is deduplicated.
    #[must_use]
    pub fn rotations(&self) -> ArrayVec<Self, 4> {
        self.shape
            .rotations()
            .into_iter()
            .map(|shape| self.with_shape(shape))
            .collect()
    }
}

/// Anchor position of a piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Canonical spawn anchor: `(⌊WIDTH/2⌋ - 1, 0)`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const SPAWN: Self = Self::new(BOARD_WIDTH as i32 / 2 - 1, SPAWN_Y);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn x(self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i32 {
        self.y
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Largest extent of any shape in either direction.
pub const MAX_SHAPE_SIZE: usize = 4;

/// A piece orientation: a `rows × cols` boolean matrix of at most 4×4.
///
/// Cells outside the `rows × cols` region are always `false`, so two shapes
/// compare equal exactly when their matrices do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Builds a shape from a rectangular matrix of `0`/`1` values.
    ///
    /// # Panics
    ///
    /// Panics if `N` or `M` exceeds [`MAX_SHAPE_SIZE`] or is zero, or if no
    /// cell is filled.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_matrix<const N: usize, const M: usize>(matrix: [[u8; M]; N]) -> Self {
        assert!(N > 0 && N <= MAX_SHAPE_SIZE);
        assert!(M > 0 && M <= MAX_SHAPE_SIZE);
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut filled = false;
        let mut y = 0;
        while y < N {
            let mut x = 0;
            while x < M {
                cells[y][x] = matrix[y][x] != 0;
                filled |= cells[y][x];
                x += 1;
            }
            y += 1;
        }
        assert!(filled, "shape must have at least one filled cell");
        Self {
            rows: N as u8,
            cols: M as u8,
            cells,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows as usize
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols as usize
    }

    /// Returns whether the cell at column `x`, row `y` of the matrix is filled.
    #[must_use]
    pub const fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.cols() && y < self.rows() && self.cells[y][x]
    }

    /// Rotates 90° clockwise: transpose, then reverse each resulting row.
    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        let rows = self.rows as usize;
        let cols = self.cols as usize;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut y = 0;
        while y < cols {
            let mut x = 0;
            while x < rows {
                cells[y][x] = self.cells[rows - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }

    /// Returns the shape followed by its three successive clockwise rotations.
    #[must_use]
    pub fn rotations(&self) -> [Self; 4] {
        let r1 = self.rotated_right();
        let r2 = r1.rotated_right();
        let r3 = r2.rotated_right();
        [*self, r1, r2, r3]
    }

    /// Returns `(col, row)` offsets of every filled cell, row-major.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.rows()).flat_map(move |y| {
            (0..self.cols()).filter_map(move |x| {
                self.cells[y][x].then_some((x as i32, y as i32))
            })
        })
    }

    /// Rounded `(col, row)` average of the filled cells.
    ///
    /// Halves round up, so `1.5` maps to `2`.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn centroid(&self) -> (i32, i32) {
        let (sum_x, sum_y, count) = self
            .occupied_cells()
            .fold((0, 0, 0), |(sx, sy, n), (x, y)| (sx + x, sy + y, n + 1));
        if count == 0 {
            return (0, 0);
        }
        let round = |sum: i32| (f64::from(sum) / f64::from(count) + 0.5).floor() as i32;
        (round(sum_x), round(sum_y))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.rows() {
            if y > 0 {
                f.write_char('/')?;
            }
            for x in 0..self.cols() {
                f.write_char(if self.is_filled(x, y) { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}

impl Serialize for Shape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Format: "rows separated by '/'" (e.g., ".#./###")
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Shape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let lines: Vec<&str> = s.split('/').collect();
        if lines.is_empty() || lines.len() > MAX_SHAPE_SIZE {
            return Err(serde::de::Error::custom(format!(
                "shape must have 1 to {MAX_SHAPE_SIZE} rows, got '{s}'"
            )));
        }
        let cols = lines[0].len();
        if cols == 0 || cols > MAX_SHAPE_SIZE {
            return Err(serde::de::Error::custom(format!(
                "shape must have 1 to {MAX_SHAPE_SIZE} columns, got '{s}'"
            )));
        }

        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (y, line) in lines.iter().enumerate() {
            if line.len() != cols {
                return Err(serde::de::Error::custom(format!(
                    "shape rows must have equal length, got '{s}'"
                )));
            }
            for (x, ch) in line.chars().enumerate() {
                cells[y][x] = match ch {
                    '#' => true,
                    '.' => false,
                    _ => {
                        return Err(serde::de::Error::custom(format!(
                            "invalid shape cell '{ch}' in '{s}'"
                        )));
                    }
                };
            }
        }

        if !cells.iter().flatten().any(|&filled| filled) {
            return Err(serde::de::Error::custom(format!(
                "shape must have at least one filled cell, got '{s}'"
            )));
        }

        let rows = u8::try_from(lines.len()).map_err(serde::de::Error::custom)?;
        let cols = u8::try_from(cols).map_err(serde::de::Error::custom)?;
        Ok(Self { rows, cols, cells })
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

/// Uniform draw over the 7 kinds.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("invalid piece kind: {input:?}")]
pub struct PieceKindParseError {
    input: String,
}

impl std::str::FromStr for PieceKind {
    type Err = PieceKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Self::from_char(c.to_ascii_uppercase()).ok_or_else(|| PieceKindParseError {
                    input: s.to_owned(),
                })
            }
            _ => Err(PieceKindParseError {
                input: s.to_owned(),
            }),
        }
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the shape this kind spawns with.
    #[must_use]
    pub const fn base_shape(self) -> Shape {
        BASE_SHAPES[self as usize]
    }

    /// Display color as a `#rrggbb` string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            PieceKind::I => "#00f0f0",
            PieceKind::O => "#f0f000",
            PieceKind::T => "#a000f0",
            PieceKind::S => "#00f000",
            PieceKind::Z => "#f00000",
            PieceKind::J => "#0000f0",
            PieceKind::L => "#f0a000",
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('I'), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(self.as_char())
    }
}

const BASE_SHAPES: [Shape; PieceKind::LEN] = [
    // I-piece
    Shape::from_matrix([[1, 1, 1, 1]]),
    // O-piece
    Shape::from_matrix([[1, 1], [1, 1]]),
    // T-piece
    Shape::from_matrix([[0, 1, 0], [1, 1, 1]]),
    // S-piece
    Shape::from_matrix([[0, 1, 1], [1, 1, 0]]),
    // Z-piece
    Shape::from_matrix([[1, 1, 0], [0, 1, 1]]),
    // J-piece
    Shape::from_matrix([[1, 0, 0], [1, 1, 1]]),
    // L-piece
    Shape::from_matrix([[0, 0, 1], [1, 1, 1]]),
];
