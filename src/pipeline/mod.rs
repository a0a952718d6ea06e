pub mod hazards;
pub mod tox;
