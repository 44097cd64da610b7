pub mod attendance;
pub mod meeting;
pub mod participant;
pub mod selector;
pub mod user;
