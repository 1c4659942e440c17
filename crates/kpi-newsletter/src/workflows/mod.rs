pub mod drive;
pub mod newsletter;
pub mod sheets;
