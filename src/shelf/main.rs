//! # Shelf CLI
//!
//! The binary is intentionally thin: the CLI lives in `cli/`, and this file
//! only invokes `cli::run()` and turns its outcome into an exit status.
//!
//! - `cli/setup.rs`: clap argument definitions
//! - `cli/commands.rs`: context wiring (data dir, config, logging) and dispatch
//! - `cli/render.rs`: colored terminal output
//!
//! Everything from `shelf::api` inward is UI agnostic.

mod cli;

fn main() {
    match cli::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
