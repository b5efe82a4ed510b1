pub mod activitypub;
pub mod errors;
pub mod http;
pub mod server;
pub mod state;
pub mod workers;
