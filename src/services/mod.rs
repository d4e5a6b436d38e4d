pub mod fs;
pub mod history;
