use minesweeper_agent as ms;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut rng = rand::rng();
    let game = ms::Game::new(height as usize, width as usize, mines as usize, &mut rng)
        .map_err(|e| e.to_string())?;
    game.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn validate(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(game.state == ms::GameState::Won)
}

/// Lets the agent move. The trailing byte is 0 for a deduced move, 1 for a
/// guess and 2 when no move was left.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let played = game.step(&mut rand::rng()).map_err(|e| e.to_string())?;
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(match played.map(|m| m.kind) {
        Some(ms::MoveKind::Deduced) => 0,
        Some(ms::MoveKind::Guessed) => 1,
        None => 2,
    });
    Ok(xs)
}

/// Reveals a cell chosen by the player. The trailing byte is 1 if it was a
/// mine.
#[wasm_bindgen]
pub fn reveal(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    let res = game
        .reveal(ms::Cell::new(row, col))
        .map_err(|e| e.to_string())?;
    let mut xs = game.serialize().map_err(|e| e.to_string())?;
    xs.push(if res { 0 } else { 1 });
    Ok(xs)
}

/// Row-major view of the board: -1 hidden, -2 flagged, otherwise the count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(cells(&game)
        .map(|cell| match game.view(&cell) {
            ms::CellView::Hidden => -1,
            ms::CellView::Flagged => -2,
            ms::CellView::Revealed(n) => n as i8,
        })
        .collect())
}

/// Row-major view of the agent's knowledge: 0 unknown, 1 safe, 2 mine.
#[wasm_bindgen]
pub fn get_knowledge(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let game = ms::Game::deserialize(&bts).map_err(|e| e.to_string())?;
    Ok(cells(&game)
        .map(|cell| match game.agent.fact(&cell) {
            None => 0,
            Some(ms::Fact::Safe) => 1,
            Some(ms::Fact::Mine) => 2,
        })
        .collect())
}

fn cells(game: &ms::Game) -> impl Iterator<Item = ms::Cell> {
    let (height, width) = (game.board.height, game.board.width);
    (0..height).flat_map(move |row| (0..width).map(move |col| ms::Cell::new(row, col)))
}
