pub mod data;
pub mod io;
pub mod orchestrator;

#[cfg(test)]
pub mod tests;
