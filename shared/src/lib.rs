use std::fmt;

pub const DEFAULT_PORT: u16 = 12345;
pub const END_MARKER: &str = "<END>";
pub const MAZE_HEIGHT: usize = 7;
pub const MAZE_WIDTH: usize = 9;

/// The maze every server starts with unless a layout file is given.
pub const REFERENCE_MAZE: [&str; MAZE_HEIGHT] = [
    "#########",
    "#P.....C#",
    "#.C###..#",
    "#..C....#",
    "#....###C",
    "#C......#",
    "#########",
];

/// A 0-indexed (row, column) cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Neighbour exploration order. Breadth-first tie breaking depends on it.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// Offsets `from` by one cell. Returns None when the step would leave the
    /// non-negative quadrant; the upper bounds are the grid's business.
    pub fn step(self, from: Position) -> Option<Position> {
        let (dr, dc) = self.delta();
        Some(Position {
            row: from.row.checked_add_signed(dr)?,
            col: from.col.checked_add_signed(dc)?,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn key(self) -> char {
        match self {
            Direction::Up => 'W',
            Direction::Down => 'S',
            Direction::Left => 'A',
            Direction::Right => 'D',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Wall,
    Floor,
    Coin,
    PlayerHere,
    Trail,
}

impl CellKind {
    pub fn symbol(self) -> char {
        match self {
            CellKind::Wall => '#',
            CellKind::Floor => '.',
            CellKind::Coin => 'C',
            CellKind::PlayerHere => 'P',
            CellKind::Trail => '*',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '#' => Some(CellKind::Wall),
            '.' => Some(CellKind::Floor),
            'C' => Some(CellKind::Coin),
            'P' => Some(CellKind::PlayerHere),
            '*' => Some(CellKind::Trail),
            _ => None,
        }
    }

    pub fn is_walkable(self) -> bool {
        self != CellKind::Wall
    }
}

/// One decoded line of client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    FindNearestCoin { with_route: bool },
    Reset,
    Shutdown,
    Invalid(String),
}

impl Command {
    /// Decodes a single line. Only the line terminator is stripped; tokens are
    /// exact and case-sensitive.
    pub fn parse(line: &str) -> Self {
        let token = line
            .strip_suffix('\n')
            .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
            .unwrap_or(line);

        match token {
            "W" => Command::Move(Direction::Up),
            "S" => Command::Move(Direction::Down),
            "A" => Command::Move(Direction::Left),
            "D" => Command::Move(Direction::Right),
            "find" => Command::FindNearestCoin { with_route: false },
            "path" => Command::FindNearestCoin { with_route: true },
            "reset" => Command::Reset,
            "kill" => Command::Shutdown,
            other => Command::Invalid(other.to_string()),
        }
    }
}
