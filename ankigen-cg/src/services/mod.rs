//! Card generation pipeline services
//!
//! The filter chain (normalizer, duplicate detector, quality gate), the
//! session state machine, the external service clients, and the orchestrator
//! that drives them.

pub mod duplicate_detector;
pub mod normalizer;
pub mod orchestrator;
pub mod quality_gate;
pub mod session;
pub mod tts_client;
pub mod word_generator;

pub use orchestrator::CardGenerator;
pub use session::GenerationSession;
pub use tts_client::{AudioSynthesisService, GoogleTtsClient};
pub use word_generator::{OpenAiWordGenerator, WordGenerationService};
