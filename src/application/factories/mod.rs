pub mod source_factory;

pub use source_factory::build_sources;
