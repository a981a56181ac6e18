pub mod game;
pub mod menu;
