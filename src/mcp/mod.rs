//! MCP Server for the electrolyte research assistant
//!
//! Exposes literature search, formulation analysis and extraction as tools.

mod server;

pub use server::{run_mcp_server, ElectrolyteService};
