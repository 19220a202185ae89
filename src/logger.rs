//! Logging utilities for the clip service.
//!
//! Timestamped lines, access events to stdout and errors to stderr. The
//! service is small enough that file targets and level filtering are not
//! worth carrying.

use chrono::Local;
use std::net::SocketAddr;
use std::path::Path;

fn write_info(message: &str) {
    println!("{} {message}", timestamp());
}

fn write_error(message: &str) {
    eprintln!("{} {message}", timestamp());
}

fn timestamp() -> String {
    Local::now().format("%Y/%m/%d %H:%M:%S").to_string()
}

pub fn log_server_start(addr: &SocketAddr) {
    write_info(&format!("start clip service on: {addr}"));
}

pub fn log_served_file(path: &Path) {
    write_info(&format!("response file {}", path.display()));
}

pub fn log_shutdown() {
    write_info("shutdown signal received, stopping");
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}
