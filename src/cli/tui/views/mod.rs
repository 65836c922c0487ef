//! Screens of the interactive board

pub mod board;
