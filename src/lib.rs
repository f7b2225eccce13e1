pub mod app;
pub mod cmd;
pub mod config;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod kube;
pub mod legacy;
pub mod logging;
pub mod resource;
pub mod router;
pub mod runner;
pub mod serialize;
pub mod template;
pub mod validation;
