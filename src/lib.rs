//! clmsh: client for a systems-management server's content lifecycle API.
//!
//! Layers, outermost first: `cli` (clap, rendering, shell), `application`
//! (services), `domain` (pure logic), `infrastructure` (remote API seam and
//! wiring). `config` holds the layered settings.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
