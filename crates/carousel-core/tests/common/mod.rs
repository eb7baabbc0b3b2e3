#![allow(dead_code)]

pub mod fake_publisher;
pub mod graph_server;
