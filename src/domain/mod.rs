/// The board engine. No terminal, timing or input code lives here.

pub mod board;
pub mod direction;
pub mod line;
pub mod rules;
pub mod tile;
