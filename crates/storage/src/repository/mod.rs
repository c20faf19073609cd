//! One repository per relation. Repositories borrow a connection rather than
//! the pool so services can run several of them inside one transaction.

pub mod competition;
pub mod invitation;
pub mod judge_assignment;
pub mod participant;
pub mod ranking;
pub mod score;
pub mod user;
