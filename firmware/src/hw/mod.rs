pub mod board;
pub mod observer;
