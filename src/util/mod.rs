pub mod figment;
pub mod id;
pub mod time;
pub mod validation;

mod sensitive;
pub use sensitive::Sensitive;
