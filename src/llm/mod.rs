pub mod assistant;
#[cfg(feature = "gemini")]
pub mod client;
pub mod prompts;
pub mod session;
#[cfg(feature = "gemini")]
pub mod types;

pub use assistant::*;
#[cfg(feature = "gemini")]
pub use client::*;
pub use session::*;
