pub const PROJECT_IDENTIFIER: &str = "imobibase";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
