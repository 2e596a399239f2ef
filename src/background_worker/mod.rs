pub mod featured_expiry_worker;
