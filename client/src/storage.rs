//! Durable key-value [`Storage`] of the client.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fs, io,
    path::PathBuf,
    rc::Rc,
};

use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;

/// Synchronous key-value storage of string values.
pub trait Storage {
    /// Returns the value stored under the provided `key`, if any.
    ///
    /// # Errors
    ///
    /// If the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Traced<Error>>;

    /// Stores the provided `value` under the provided `key`, replacing the
    /// previous one.
    ///
    /// # Errors
    ///
    /// If the underlying storage cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), Traced<Error>>;
}

/// [`Storage`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Storage I/O failed.
    #[display("Storage I/O failed: {_0}")]
    Io(io::Error),

    /// Stored contents are malformed.
    #[display("Storage is malformed: {_0}")]
    Malformed(serde_json::Error),
}

/// In-process [`Storage`].
///
/// Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct Memory(Rc<RefCell<HashMap<String, String>>>);

impl Storage for Memory {
    fn get(&self, key: &str) -> Result<Option<String>, Traced<Error>> {
        Ok(self.0.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), Traced<Error>> {
        _ = self.0.borrow_mut().insert(key.to_owned(), value);
        Ok(())
    }
}

/// [`Storage`] backed by a JSON object file mapping keys to values.
///
/// Missing file is an empty [`Storage`]. Malformed file is replaced on the
/// next write.
#[derive(Clone, Debug)]
pub struct File {
    /// Path to the backing file.
    path: PathBuf,
}

impl File {
    /// Creates a new [`File`] storage backed by the provided `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads all the entries of the backing file.
    fn entries(&self) -> Result<BTreeMap<String, String>, Traced<Error>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(tracerr::new!(Error::Io(e))),
        };
        serde_json::from_str(&contents)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}

impl Storage for File {
    fn get(&self, key: &str) -> Result<Option<String>, Traced<Error>> {
        Ok(self.entries().map_err(tracerr::wrap!())?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), Traced<Error>> {
        let mut entries = match self.entries() {
            Ok(entries) => entries,
            Err(e) if matches!(e.as_ref(), Error::Malformed(_)) => {
                log::warn!(
                    "overwriting malformed storage `{}`: {e}",
                    self.path.display(),
                );
                BTreeMap::new()
            }
            Err(e) => return Err(tracerr::wrap!()(e)),
        };
        _ = entries.insert(key.to_owned(), value);

        let contents = serde_json::to_string_pretty(&entries)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        fs::write(&self.path, contents)
            .map_err(tracerr::from_and_wrap!(=> Error))
    }
}
