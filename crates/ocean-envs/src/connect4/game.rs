//! Connect-4 board rules and the scripted opponent.

use rand::seq::SliceRandom;
use rand::Rng;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;

// Line directions checked for four in a row: right, down, down-right, up-right
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Piece {
    #[default]
    Empty,
    /// The learning agent
    Player,
    /// The scripted opponent
    Opponent,
}

impl Piece {
    fn other(self) -> Self {
        match self {
            Piece::Player => Piece::Opponent,
            Piece::Opponent => Piece::Player,
            Piece::Empty => Piece::Empty,
        }
    }
}

/// Standard 6x7 board; row 0 is the top
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Piece; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: usize, col: usize) -> Piece {
        self.cells[row][col]
    }

    pub fn clear(&mut self) {
        self.cells = [[Piece::Empty; COLS]; ROWS];
    }

    /// Whether a piece can be dropped into `col`
    pub fn is_legal(&self, col: usize) -> bool {
        col < COLS && self.cells[0][col] == Piece::Empty
    }

    pub fn legal_moves(&self) -> Vec<usize> {
        (0..COLS).filter(|&c| self.is_legal(c)).collect()
    }

    pub fn is_full(&self) -> bool {
        (0..COLS).all(|c| !self.is_legal(c))
    }

    /// Drop `piece` into `col`; returns the row it landed on
    pub fn drop_piece(&mut self, col: usize, piece: Piece) -> Option<usize> {
        if !self.is_legal(col) {
            return None;
        }
        let row = (0..ROWS).rev().find(|&r| self.cells[r][col] == Piece::Empty)?;
        self.cells[row][col] = piece;
        Some(row)
    }

    /// Whether the piece at `(row, col)` is part of four in a row
    pub fn wins_at(&self, row: usize, col: usize) -> bool {
        let piece = self.cells[row][col];
        if piece == Piece::Empty {
            return false;
        }
        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run(row, col, dr, dc, piece) + self.run(row, col, -dr, -dc, piece) >= 4
        })
    }

    // Consecutive `piece`s starting one step from (row, col)
    fn run(&self, row: usize, col: usize, dr: isize, dc: isize, piece: Piece) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row as isize + dr, col as isize + dc);
        while r >= 0
            && c >= 0
            && (r as usize) < ROWS
            && (c as usize) < COLS
            && self.cells[r as usize][c as usize] == piece
        {
            count += 1;
            r += dr;
            c += dc;
        }
        count
    }

    /// A column where dropping `piece` wins immediately
    pub fn winning_move(&self, piece: Piece) -> Option<usize> {
        self.legal_moves().into_iter().find(|&col| {
            let mut next = self.clone();
            next.drop_piece(col, piece)
                .map_or(false, |row| next.wins_at(row, col))
        })
    }

    /// Encode the board from the player's side: 1.0 own, 0.5 opponent, 0.0 empty
    pub fn write_observation(&self, out: &mut [f32]) {
        for (dst, cell) in out.iter_mut().zip(self.cells.iter().flatten()) {
            *dst = match cell {
                Piece::Empty => 0.0,
                Piece::Player => 1.0,
                Piece::Opponent => 0.5,
            };
        }
    }
}

/// Scripted opponent move: win if possible, else block, else a random column.
pub fn opponent_move<R: Rng>(board: &Board, rng: &mut R) -> Option<usize> {
    let me = Piece::Opponent;
    board
        .winning_move(me)
        .or_else(|| board.winning_move(me.other()))
        .or_else(|| board.legal_moves().choose(rng).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn play(board: &mut Board, moves: &[(usize, Piece)]) {
        for &(col, piece) in moves {
            board.drop_piece(col, piece).unwrap();
        }
    }

    #[test]
    fn test_drop_stacks_from_bottom() {
        let mut board = Board::new();
        assert_eq!(board.drop_piece(3, Piece::Player), Some(5));
        assert_eq!(board.drop_piece(3, Piece::Opponent), Some(4));
        assert_eq!(board.get(5, 3), Piece::Player);
        assert_eq!(board.get(4, 3), Piece::Opponent);
    }

    #[test]
    fn test_full_column_is_illegal() {
        let mut board = Board::new();
        for i in 0..ROWS {
            let piece = if i % 2 == 0 { Piece::Player } else { Piece::Opponent };
            board.drop_piece(0, piece).unwrap();
        }
        assert!(!board.is_legal(0));
        assert!(!board.is_legal(COLS));
        assert_eq!(board.drop_piece(0, Piece::Player), None);
        assert_eq!(board.legal_moves(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_horizontal_and_vertical_wins() {
        let mut board = Board::new();
        play(&mut board, &[(0, Piece::Player), (1, Piece::Player), (2, Piece::Player)]);
        assert!(!board.wins_at(5, 2));
        let row = board.drop_piece(3, Piece::Player).unwrap();
        assert!(board.wins_at(row, 3));
        assert!(board.wins_at(5, 0));

        let mut board = Board::new();
        play(&mut board, &[(6, Piece::Opponent); 4]);
        assert!(board.wins_at(2, 6));
    }

    #[test]
    fn test_diagonal_wins() {
        // Rising diagonal from (5, 0) to (2, 3)
        let mut board = Board::new();
        play(
            &mut board,
            &[
                (0, Piece::Player),
                (1, Piece::Opponent),
                (1, Piece::Player),
                (2, Piece::Opponent),
                (2, Piece::Opponent),
                (2, Piece::Player),
                (3, Piece::Opponent),
                (3, Piece::Opponent),
                (3, Piece::Opponent),
                (3, Piece::Player),
            ],
        );
        assert!(board.wins_at(2, 3));
        assert!(board.wins_at(5, 0));

        // Falling diagonal mirrored onto columns 6..3
        let mut board = Board::new();
        play(
            &mut board,
            &[
                (6, Piece::Player),
                (5, Piece::Opponent),
                (5, Piece::Player),
                (4, Piece::Opponent),
                (4, Piece::Opponent),
                (4, Piece::Player),
                (3, Piece::Opponent),
                (3, Piece::Opponent),
                (3, Piece::Opponent),
                (3, Piece::Player),
            ],
        );
        assert!(board.wins_at(2, 3));
    }

    #[test]
    fn test_full_board() {
        let mut board = Board::new();
        // Column pattern that fills the board without four in a row
        let pattern = [Piece::Player, Piece::Player, Piece::Opponent, Piece::Opponent];
        for col in 0..COLS {
            for row in 0..ROWS {
                let piece = pattern[(row + 2 * (col % 2)) % 4];
                board.drop_piece(col, piece).unwrap();
            }
        }
        assert!(board.is_full());
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn test_observation_encoding() {
        let mut board = Board::new();
        play(&mut board, &[(0, Piece::Player), (6, Piece::Opponent)]);
        let mut obs = [9.0; ROWS * COLS];
        board.write_observation(&mut obs);
        assert_eq!(obs[5 * COLS], 1.0);
        assert_eq!(obs[5 * COLS + 6], 0.5);
        assert_eq!(obs.iter().filter(|&&v| v == 0.0).count(), ROWS * COLS - 2);
    }

    #[test]
    fn test_opponent_blocks() {
        let mut board = Board::new();
        play(&mut board, &[(0, Piece::Player), (1, Piece::Player), (2, Piece::Player)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(opponent_move(&board, &mut rng), Some(3));
    }

    #[test]
    fn test_opponent_prefers_win_over_block() {
        let mut board = Board::new();
        play(
            &mut board,
            &[
                (0, Piece::Player),
                (1, Piece::Player),
                (2, Piece::Player),
                (6, Piece::Opponent),
                (6, Piece::Opponent),
                (6, Piece::Opponent),
            ],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(opponent_move(&board, &mut rng), Some(6));
    }

    #[test]
    fn test_opponent_random_is_legal() {
        let mut board = Board::new();
        for i in 0..ROWS {
            let piece = if i % 2 == 0 { Piece::Player } else { Piece::Opponent };
            board.drop_piece(4, piece).unwrap();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let col = opponent_move(&board, &mut rng).unwrap();
            assert!(board.is_legal(col));
        }
    }
}
