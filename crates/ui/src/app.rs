mod command;
mod run;
mod selection;
mod state;
#[cfg(test)]
mod tests;
mod types;

pub use state::App;
pub use types::Lesson;
