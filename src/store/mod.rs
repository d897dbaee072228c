mod labels;

pub use labels::LabelStore;
