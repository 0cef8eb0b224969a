pub mod driver;
pub mod errors;
pub mod optimizer;

pub use driver::run_pass;
pub use optimizer::optimize;
