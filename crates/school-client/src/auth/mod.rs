//! Session lifecycle: bootstrap from storage, login, logout and profile refresh.

mod controller;
mod state;

pub use controller::AuthController;
pub use state::{reduce, AuthEvent, AuthState};
