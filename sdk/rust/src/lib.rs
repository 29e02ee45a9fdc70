//! HTTP client for the media ratings API.

pub mod client;

pub use client::{ClientError, LoginResponse, RatingsClient, UserProfile};
