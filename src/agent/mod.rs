pub mod builder;
pub mod executor;
pub mod memory;
pub mod parser;
pub mod prompt;

pub use builder::{AgentBuilder, ExecutorFactory, ProviderSettings, SessionConstructionError};
pub use executor::{
    AgentConfig, AgentError, AgentExecutor, AgentStep, ExecutorId, FORCED_STOP_MESSAGE,
    ReactExecutor,
};
