pub mod access;
pub mod config;
pub mod database;
pub mod http;
pub mod models;
pub mod movies;
pub mod repositories;
pub mod services;
pub mod views;
