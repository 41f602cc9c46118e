pub mod clean;
mod etl_error;
pub mod pipeline;

pub use etl_error::EtlError;
pub use pipeline::run_etl;
