pub mod bot_command_handlers;
pub mod bot_command_helpers;
pub mod config;
pub mod constants;
pub mod data_backend;
pub mod data_types;
pub mod errors;
pub mod formatting;
pub mod guest_directory;
pub mod meal_history;
pub mod meal_recording;
pub mod recipe_catalog;
pub mod shared_main;
