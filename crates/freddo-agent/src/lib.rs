pub mod model;
pub mod tool_agent;
pub mod toolbox;

pub use model::{ChatModelClient, WireMessage};
pub use tool_agent::ToolCallingAgent;
pub use toolbox::{ToolSpec, ToolboxClient};
