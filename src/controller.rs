pub mod core;
pub mod main;
pub mod present;
pub mod render;
pub mod run_effect;

#[cfg(test)]
mod tests;
