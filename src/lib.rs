pub mod config;
pub mod load;
pub mod pipeline;
pub mod process;
pub mod table;
pub mod write;
