//! Command implementations.

pub mod config;
pub mod probe;
pub mod prompts;
pub mod recount;
pub mod run;

pub use self::config::execute_config;
pub use self::probe::execute_probe;
pub use self::prompts::execute_prompts;
pub use self::recount::execute_recount;
pub use self::run::execute_run;
