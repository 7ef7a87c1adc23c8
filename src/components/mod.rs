pub mod bracket;
pub mod knockout_path;
pub mod theme;
