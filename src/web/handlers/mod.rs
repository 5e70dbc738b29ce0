pub mod graph;
pub mod health;
pub mod predict;
