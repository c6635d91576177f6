pub mod ast;
pub mod builtins;
pub mod token;

// External parser and compiler seams
pub mod toolchain;
