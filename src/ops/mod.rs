pub mod adjustments;
pub mod filters;
pub mod masks;
