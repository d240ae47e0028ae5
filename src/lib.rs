#![cfg_attr(not(target_arch = "wasm32"), forbid(unsafe_code))]

pub mod app;
pub mod catalog;
pub mod config;
pub mod headless;
pub mod logging;
pub mod node;
pub mod prefs;
pub mod reader;
pub mod route;
pub mod view;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;
#[cfg(not(target_arch = "wasm32"))]
pub mod render;
#[cfg(not(target_arch = "wasm32"))]
pub mod serve;

#[cfg(target_arch = "wasm32")]
pub mod web;
