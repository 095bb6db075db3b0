pub mod jobs;
pub mod recipes;
