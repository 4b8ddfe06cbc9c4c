// DeskForge Commands
// Operations the HTTP layer exposes to the wizard frontend

mod wizard;

pub use wizard::*;
