pub mod model;
pub mod yahoo;
