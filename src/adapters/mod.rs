// Adapters layer: concrete clients for external systems behind the domain ports.

pub mod gemini;

pub use gemini::GeminiBackend;
