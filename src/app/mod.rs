pub mod controllers;
pub mod render;
