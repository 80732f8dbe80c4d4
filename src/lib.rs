pub mod cpu;
pub mod instruction;
pub mod loader;
pub mod run_wrapper;
pub mod trace;

pub mod pipelined;

pub mod error;
pub mod flags;
