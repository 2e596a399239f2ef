pub mod featured;
pub mod listings;
