pub mod cli;
pub mod config;
pub mod io;
pub mod loader;
pub mod logging;
pub mod reduce;

pub use config::Settings;
pub use loader::{LoadError, load_numbers, parse_numbers};
pub use reduce::{
    PartitionPlan, ReduceConfig, ReduceError, ReduceResult, Reducer, Reduction, Strategy,
    run_pipe, run_shared, sum_of_squares,
};
