pub mod package_builder;
