pub mod city;
pub mod commands;
pub mod config;
pub mod distance;
pub mod http;
pub mod pipeline;
pub mod runtime;
pub mod schedule;
