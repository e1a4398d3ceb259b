pub mod classifier;
pub mod extractor;
pub mod screen_model;
