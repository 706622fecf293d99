use minesweeper_ai as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: usize, width: usize, mines: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut rng = rand::rng();
    let board = ms::Board::random(height, width, mines, &mut rng).map_err(|e| e.to_string())?;
    let game = ms::Game::new(board, rand::random());
    game.serialize().map_err(|e| e.to_string())
}

/// Lets the bot make one move. The returned state carries a trailing byte:
/// 1 if a cell was probed, 0 if no move was available. Strip it before
/// passing the state back in.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let turn = game.step().map_err(|e| e.to_string())?;
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(if turn.is_some() { 1 } else { 0 });
    Ok(xs)
}

/// 0 while playing, 1 once won, 2 once lost.
#[wasm_bindgen]
pub fn game_status(bts: Vec<u8>) -> Result<u8, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(match game.game_state {
        ms::GameState::Playing => 0,
        ms::GameState::Won => 1,
        ms::GameState::Lost => 2,
    })
}

/// Row-major cell view: -1 hidden, -2 flagged, otherwise the revealed count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(ms::Cell::all(game.board.height, game.board.width)
        .map(|cell| {
            if let Some(&count) = game.revealed().get(&cell) {
                count as i8
            } else if game.board.flagged().contains(&cell) {
                -2
            } else {
                -1
            }
        })
        .collect())
}
