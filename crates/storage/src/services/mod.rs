pub mod competitions;
pub mod invitations;
pub mod notify;
pub mod ranking;
pub mod retry;
pub mod scoring;
