pub mod auth;
pub mod extract;
pub mod likes;
pub mod recommendations;
pub mod songs;

pub use auth::*;
pub use likes::*;
pub use recommendations::*;
pub use songs::*;
