pub mod clock;
pub mod gateway;
pub mod logger;
pub mod token_manager;
pub mod tool_executor;
