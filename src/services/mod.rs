pub mod aggregation;
pub mod goal;
