pub mod catch;
pub mod engine;
pub mod progression;
pub mod scheduler;
pub mod state;

#[cfg(test)]
mod tests;
