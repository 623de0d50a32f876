pub mod analyze;
pub mod bootstrap;
pub mod presets;
pub mod render;
pub mod shell;
pub mod try_on;
