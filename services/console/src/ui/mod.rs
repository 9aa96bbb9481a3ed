pub mod notify;
pub mod panels;
pub mod transcript;
