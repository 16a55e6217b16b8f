pub mod email;
pub mod mock;
