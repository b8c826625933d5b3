pub mod prerequisites;

pub use prerequisites::{MissingPrerequisite, PrerequisiteGraph};
