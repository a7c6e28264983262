pub mod auth;
pub mod contributions;
pub mod donations;
pub mod error;
pub mod extract;
pub mod functions;
pub mod gifts;
pub mod middleware;
pub mod payment;
pub mod reservations;
pub mod router;
pub mod state;
pub mod validation;

pub use router::router;
pub use state::{AppState, AppStateInner};

#[cfg(test)]
mod tests;
