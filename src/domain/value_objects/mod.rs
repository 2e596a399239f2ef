pub mod enums;
pub mod featured;
pub mod featured_plans;
