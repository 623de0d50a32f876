pub mod gemini_styling_gateway;
pub mod prompts;

pub use gemini_styling_gateway::GeminiStylingGateway;
