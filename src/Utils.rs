/// Loader for tabular composition files (columns are oxide names, rows are
/// glass samples)
pub mod load_from_file;
/// simplelog-based logger initialization for binaries and examples
pub mod logger;
