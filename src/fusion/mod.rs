pub mod flow_synthesizer;
pub mod fusion;
