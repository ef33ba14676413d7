pub mod document;
pub mod lead;
pub mod progression;
pub mod session;
pub mod tool;
pub mod user;
