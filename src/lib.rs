// src/lib.rs

pub mod error;
pub mod config;
pub mod validator;
pub mod storage;
pub mod remote;
pub mod index;
pub mod service;
pub mod api;
pub mod app_state;
