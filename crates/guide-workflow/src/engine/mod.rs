pub mod adapter;
pub mod sequencer;

pub use adapter::StepActionAdapter;
pub use sequencer::StepSequencer;
