//! Whole-game checks for the knowledge base.
//!
//! Plays random boards to the end and checks, after every move, that what the
//! knowledge base believes is consistent, only ever grows, matches the hidden
//! board, and is implied by the revealed numbers.

use minesweeper_ai::{Board, Cell, Game, GameState, KnowledgeBase, MoveKind};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeSet;

#[test]
fn lone_corner_mine_is_isolated() {
    let mine = Cell::new(3, 3);
    let board = Board::with_mines(4, 4, [mine]).unwrap();
    let mut kb = KnowledgeBase::new(4, 4);

    let start = Cell::new(0, 0);
    kb.add_observation(start, board.nearby_mines(start)).unwrap();
    for neighbor in [Cell::new(0, 1), Cell::new(1, 0), Cell::new(1, 1)] {
        assert!(kb.safes().contains(&neighbor));
    }

    while let Some(cell) = kb.safe_move() {
        assert_ne!(cell, mine);
        kb.add_observation(cell, board.nearby_mines(cell)).unwrap();
    }

    assert_eq!(kb.mines(), &BTreeSet::from([mine]));
    assert_eq!(kb.moves_made().len(), 15);
    assert!(kb.constraints().is_empty());
    assert_eq!(kb.random_move(&mut StdRng::seed_from_u64(0)), None);
}

#[test]
fn lone_corner_mine_game_is_won() {
    let board = Board::with_mines(4, 4, [Cell::new(3, 3)]).unwrap();

    // A first guess that reveals a zero opens up the whole board
    let won = (0..32)
        .map(|seed| Game::new(board.clone(), seed))
        .filter_map(|mut game| {
            let first = game.step().unwrap()?;
            (first.nearby_mines == Some(0)).then(|| game.play().unwrap())
        })
        .collect::<Vec<_>>();
    assert!(!won.is_empty());
    assert!(won.iter().all(|&state| state == GameState::Won));
}

fn assert_consistent(kb: &KnowledgeBase) -> Result<(), TestCaseError> {
    prop_assert!(kb.safes().is_disjoint(kb.mines()));
    prop_assert!(kb.moves_made().is_subset(kb.safes()));
    for constraint in kb.constraints() {
        prop_assert!(!constraint.is_empty());
        prop_assert!(constraint.count() <= constraint.cells().len());
        for cell in constraint.cells() {
            prop_assert!(!kb.safes().contains(cell));
            prop_assert!(!kb.mines().contains(cell));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn whole_games_stay_sound(
        seed in any::<u64>(),
        height in 2usize..7,
        width in 2usize..7,
        density in 1usize..5,
    ) {
        let mines = (height * width * density / 10).max(1);
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::random(height, width, mines, &mut rng).unwrap();
        let mut game = Game::new(board, seed);

        while game.game_state == GameState::Playing {
            let before = game.knowledge.clone();
            let Some(turn) = game.step().unwrap() else { break };
            let kb = &game.knowledge;

            if turn.kind == MoveKind::Safe {
                prop_assert!(turn.nearby_mines.is_some());
            }

            prop_assert!(before.moves_made().is_subset(kb.moves_made()));
            prop_assert!(before.safes().is_subset(kb.safes()));
            prop_assert!(before.mines().is_subset(kb.mines()));
            assert_consistent(kb)?;

            for &mine in kb.mines() {
                prop_assert!(game.board.is_mine(mine));
            }
            for &safe in kb.safes() {
                prop_assert!(!game.board.is_mine(safe));
            }
            prop_assert!(game.verify().is_ok());

            let mut again = kb.clone();
            again.infer().unwrap();
            prop_assert_eq!(&again, kb);
        }
    }

    #[test]
    fn repeated_observation_changes_nothing(
        seed in any::<u64>(),
        moves in 1usize..12,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::random(5, 5, 5, &mut rng).unwrap();
        let mut game = Game::new(board, seed);

        for _ in 0..moves {
            if game.game_state != GameState::Playing || game.step().unwrap().is_none() {
                break;
            }
        }

        if let Some((&cell, &count)) = game.revealed().iter().next() {
            let mut kb = game.knowledge.clone();
            kb.add_observation(cell, count).unwrap();
            prop_assert_eq!(&kb, &game.knowledge);
        }
    }
}
