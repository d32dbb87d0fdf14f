pub mod dataset;

pub use dataset::DatasetProvider;
