pub mod app;
pub mod client;
pub mod deadline;
pub mod item;
pub mod server;
pub mod todo;
pub mod tui;
