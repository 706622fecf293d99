use crate::oracle::{DeducedState, analyze_observations};
use crate::{Board, Cell, KnowledgeBase};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// How the player settled on a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MoveKind {
    /// The knowledge base proved the cell safe.
    Safe,
    /// Nothing was proven; the cell was picked at random.
    Random,
}

/// A single move made by the player and what it revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn {
    pub cell: Cell,
    pub kind: MoveKind,
    /// Neighbouring mine count, or `None` if the cell was itself a mine.
    pub nearby_mines: Option<usize>,
}

/// An automated player working through a board.
///
/// Each move is a known-safe cell when the knowledge base has one, and a
/// random guess otherwise. Known mines are flagged as soon as they are proven.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    pub board: Board,
    pub knowledge: KnowledgeBase,
    /// Every probed cell with the neighbour count it showed.
    revealed: BTreeMap<Cell, usize>,
    pub game_state: GameState,
    seed: u64,
}

impl Game {
    pub fn new(board: Board, seed: u64) -> Self {
        let knowledge = KnowledgeBase::new(board.height, board.width);
        Game {
            board,
            knowledge,
            revealed: BTreeMap::new(),
            game_state: GameState::Playing,
            seed,
        }
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn revealed(&self) -> &BTreeMap<Cell, usize> {
        &self.revealed
    }

    /// Makes one move.
    ///
    /// Returns `None` when no cell is left to probe. An error means either
    /// the game is already over or the knowledge base hit a contradiction.
    pub fn step(&mut self) -> anyhow::Result<Option<Turn>> {
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let (cell, kind) = if let Some(cell) = self.knowledge.safe_move() {
            (cell, MoveKind::Safe)
        } else {
            // A fresh generator per move keeps a serialized game reproducible.
            let moves = self.knowledge.moves_made().len() as u64;
            let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(moves));
            match self.knowledge.random_move(&mut rng) {
                Some(cell) => (cell, MoveKind::Random),
                None => {
                    debug!("no cells left to probe");
                    self.flag_known_mines();
                    return Ok(None);
                }
            }
        };

        if self.board.is_mine(cell) {
            info!("{:?} move at {} hit a mine", kind, cell);
            self.game_state = GameState::Lost;
            return Ok(Some(Turn {
                cell,
                kind,
                nearby_mines: None,
            }));
        }

        let count = self.board.nearby_mines(cell);
        self.revealed.insert(cell, count);
        self.knowledge.add_observation(cell, count)?;
        self.flag_known_mines();

        Ok(Some(Turn {
            cell,
            kind,
            nearby_mines: Some(count),
        }))
    }

    fn flag_known_mines(&mut self) {
        for &mine in self.knowledge.mines() {
            self.board.flag(mine);
        }
        if self.board.won() {
            info!("all {} mines flagged", self.board.mine_count());
            self.game_state = GameState::Won;
        }
    }

    /// Steps until the game ends or no move is left.
    pub fn play(&mut self) -> anyhow::Result<GameState> {
        while self.game_state == GameState::Playing {
            if self.step()?.is_none() {
                break;
            }
        }
        Ok(self.game_state)
    }

    /// Checks every claim of the knowledge base against an exhaustive SAT
    /// analysis of the cells revealed so far.
    pub fn verify(&self) -> anyhow::Result<()> {
        let deductions = analyze_observations(self.board.height, self.board.width, &self.revealed)?;

        for &mine in self.knowledge.mines() {
            if deductions.get(&mine) != Some(&DeducedState::ForcedMine) {
                anyhow::bail!("{} was marked as a mine but is not forced", mine);
            }
        }
        for &safe in self.knowledge.safes() {
            if !self.revealed.contains_key(&safe)
                && deductions.get(&safe) != Some(&DeducedState::ForcedSafe)
            {
                anyhow::bail!("{} was marked as safe but is not forced", safe);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_initialization() {
        let board = Board::with_mines(3, 3, [Cell::new(2, 2)]).unwrap();
        let game = Game::new(board, 0);
        assert_eq!(game.game_state, GameState::Playing);
        assert!(game.revealed().is_empty());
        assert_eq!(game.knowledge.height(), 3);
        assert_eq!(game.knowledge.width(), 3);
    }

    #[test]
    fn test_first_move_is_random() {
        let board = Board::with_mines(3, 3, [Cell::new(2, 2)]).unwrap();
        let mut game = Game::new(board, 3);
        let turn = game.step().unwrap().unwrap();
        assert_eq!(turn.kind, MoveKind::Random);
    }

    #[test]
    fn test_hitting_mine_loses() {
        // Every cell but one is a mine, so a random first move is almost surely fatal
        let mines: Vec<Cell> = Cell::all(3, 3).filter(|&c| c != Cell::new(1, 1)).collect();
        let board = Board::with_mines(3, 3, mines).unwrap();

        let state = (0..16)
            .map(|seed| Game::new(board.clone(), seed).play().unwrap())
            .find(|&state| state == GameState::Lost);
        assert_eq!(state, Some(GameState::Lost));
    }

    #[test]
    fn test_step_after_game_end_is_error() {
        let board = Board::with_mines(1, 2, [Cell::new(0, 1)]).unwrap();
        let mut game = Game::new(board, 0);
        let state = game.play().unwrap();
        assert_ne!(state, GameState::Playing);
        assert!(game.step().is_err());
    }

    #[test]
    fn test_known_mines_are_flagged_when_no_move_is_left() {
        // Probing (0, 0) proves (0, 1) is the mine
        let board = Board::with_mines(1, 2, [Cell::new(0, 1)]).unwrap();
        let mut game = Game::new(board, 0);
        game.knowledge.add_observation(Cell::new(0, 0), 1).unwrap();
        game.revealed.insert(Cell::new(0, 0), 1);

        assert_eq!(game.step().unwrap(), None);
        assert_eq!(game.game_state, GameState::Won);
        assert!(game.board.flagged().contains(&Cell::new(0, 1)));
        assert!(game.verify().is_ok());
    }

    #[test]
    fn test_serialization_round_trip_keeps_progress() {
        let board = Board::with_mines(4, 4, [Cell::new(3, 3)]).unwrap();
        let mut game = Game::new(board, 11);
        game.step().unwrap();

        let restored = Game::deserialize(&game.serialize().unwrap()).unwrap();
        assert_eq!(restored.revealed(), game.revealed());
        assert_eq!(restored.knowledge, game.knowledge);
        assert_eq!(restored.game_state, game.game_state);
    }
}
