// Document lifecycle: index assurance, transitions and batch processing

pub mod batch;
pub mod registry;
pub mod service;
pub mod transition;

pub use registry::IndexRegistry;
pub use service::LifecycleService;
pub use transition::TransitionOutcome;
