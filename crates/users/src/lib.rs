pub mod models;
pub mod password;
mod repository;
pub mod service;
pub mod handler;
