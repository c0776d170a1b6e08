pub mod cmd;
pub mod control_plane;
pub mod data;
pub mod error;
pub mod flags;
pub mod rpc;
pub mod trace;
