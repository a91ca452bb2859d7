/// App context
pub mod app_context;
/// Logger
pub mod logger;
