pub mod replay;
pub mod workload;
