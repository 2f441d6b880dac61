mod routes;
mod server;
pub mod session;
pub mod state;

pub use server::{make_app, run_server};
