pub mod command_parser;
pub mod config_loader;
pub mod contest_engine;
pub mod contest_processor;
pub mod freeze_controller;
pub mod present_flow;
pub mod render;
pub mod scoreboard;
pub mod session;
