pub mod blueprint;
pub mod competition;
pub mod invitation;
pub mod ranking;
pub mod score;
