pub mod config;
pub mod db;
pub mod error;
pub mod report;
pub mod seeder;

pub use error::{Error, Result};
pub use seeder::{seed, Seeder};
