// HTTP surface: axum router and server lifecycle.

pub mod handler;
