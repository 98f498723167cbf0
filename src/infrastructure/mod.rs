pub mod mcp;
pub mod model;
pub mod rpc;
