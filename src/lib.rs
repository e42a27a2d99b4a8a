pub mod api;
pub mod beds;
pub mod config;
pub mod error;
pub mod hospital;
pub mod routing;
pub mod state;
