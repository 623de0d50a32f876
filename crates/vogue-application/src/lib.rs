pub mod workflow;


pub use workflow::{AnalysisOutcome, GenerateOutcome, SkipReason, StylingWorkflow};
