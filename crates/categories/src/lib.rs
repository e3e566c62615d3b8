pub mod models;
mod repository;
pub mod service;
pub mod handler;
