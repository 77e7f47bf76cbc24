pub mod provider;
pub mod replicate;
