pub mod ai;
pub mod entity;
pub mod geometry;
pub mod grid;
pub mod movement;
pub mod path;
pub mod tile;
