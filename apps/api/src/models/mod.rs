pub mod application;
pub mod audit;
pub mod candidate;
pub mod employer;
pub mod job;
pub mod level;
pub mod matching;
