pub mod animate;
pub mod generate;
pub mod locate;
pub mod process;
pub mod prompt;
pub mod render;
pub mod script;
