pub mod grammar;
pub mod workout;
