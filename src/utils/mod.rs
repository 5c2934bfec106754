pub mod args;
pub mod http;
pub mod suggest;
pub mod tool_errors;
