pub mod attendance;
pub mod config;
pub mod log;
pub mod matching;
pub mod meeting;
pub mod report;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
