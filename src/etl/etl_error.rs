use std::error::Error;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum EtlError {
    /// The source directory holds no `.csv` files (or does not exist).
    NoSourceFiles(PathBuf),
    Io { path: PathBuf, msg: String },
    Csv { path: PathBuf, msg: String },
    Db(String),
}

impl fmt::Display for EtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtlError::NoSourceFiles(dir) => {
                write!(f, "No .csv files found in directory: {}", dir.display())
            }
            EtlError::Io { path, msg } => write!(f, "I/O error on {}: {msg}", path.display()),
            EtlError::Csv { path, msg } => write!(f, "CSV error in {}: {msg}", path.display()),
            EtlError::Db(msg) => write!(f, "Load failed: {msg}"),
        }
    }
}

impl Error for EtlError {}
