pub mod app;
pub mod config;
pub mod counter;
pub mod date_key;
pub mod errors;
pub mod handlers;
pub mod lookup;
pub mod models;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;
pub mod view;

pub use app::router;
pub use config::Config;
pub use session::ViewSession;
pub use state::AppState;
pub use storage::JsonStore;
