// DeskForge Backend Server
// Configuration wizard for customized RustDesk client deployments

pub mod commands;
pub mod models;
pub mod services;
