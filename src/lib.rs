pub mod auth;
pub mod config;
pub mod database;
pub mod email;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod requestlog;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod validator;
