pub mod imgutils;
pub mod math;
