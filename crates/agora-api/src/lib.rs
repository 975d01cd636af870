pub mod auth;
pub mod categories;
pub mod comments;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod notifications;
pub mod posts;
pub mod reactions;
pub mod response;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod users;
pub mod views;

pub use routes::router;
pub use state::{AppState, AppStateInner};
