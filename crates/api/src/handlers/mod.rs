pub mod annotation;
pub mod dataset;
pub mod detection;
pub mod image;
pub mod job;
pub mod model;
pub mod object_class;
pub mod status;
pub mod training;
