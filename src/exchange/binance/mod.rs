//! Binance module - Client implementation for the Binance spot REST API

pub mod auth;
pub mod client;
pub mod messages;

pub use client::BinanceClient;
