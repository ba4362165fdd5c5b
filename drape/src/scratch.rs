//! Per-run scratch storage.
//!
//! Every resource a run creates goes through a [ScratchGuard], which
//! deletes it when the guard goes out of scope, whichever way the run
//! exits.

use crate::{DrapeError, SamplePoint};
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

/// Disambiguates names created within the same process and instant.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Returns a scratch resource name unique across runs and processes.
pub fn scratch_name(prefix: &str, now: &DateTime<Local>) -> String {
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!(
        "{prefix}_{}_{}_{seq}",
        now.format("%d%b%Y_%H%M%S_%f"),
        std::process::id()
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScratchHandle {
    id: String,
}

impl ScratchHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Named temporary storage for staged sample points.
pub trait ScratchWorkspace {
    /// Creates an empty resource. Fails if `id` already exists.
    fn create_named(&self, id: &str) -> Result<ScratchHandle, DrapeError>;

    fn write_points(&self, handle: &ScratchHandle, points: &[SamplePoint])
        -> Result<(), DrapeError>;

    /// Returns the staged points. Order is not guaranteed.
    fn read_points(&self, handle: &ScratchHandle) -> Result<Vec<SamplePoint>, DrapeError>;

    fn delete(&self, handle: &ScratchHandle) -> Result<(), DrapeError>;

    /// Names of all live resources.
    fn list(&self) -> Result<Vec<String>, DrapeError>;
}

/// Owns the scratch resources of one run and deletes them on drop.
///
/// Deletion failures are logged, never raised, so they cannot hide
/// the error that ended the run.
pub struct ScratchGuard<'a> {
    workspace: &'a dyn ScratchWorkspace,
    handles: Vec<ScratchHandle>,
}

impl<'a> ScratchGuard<'a> {
    pub fn new(workspace: &'a dyn ScratchWorkspace) -> Self {
        Self {
            workspace,
            handles: Vec::new(),
        }
    }

    /// Creates `id` in the workspace and takes ownership of it.
    pub fn create(&mut self, id: &str) -> Result<ScratchHandle, DrapeError> {
        let handle = self.workspace.create_named(id)?;
        debug!("created scratch {id}");
        self.handles.push(handle.clone());
        Ok(handle)
    }

    pub fn workspace(&self) -> &'a dyn ScratchWorkspace {
        self.workspace
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        for handle in self.handles.drain(..).rev() {
            match self.workspace.delete(&handle) {
                Ok(()) => debug!("deleted scratch {}", handle.id()),
                Err(e) => warn!("failed to delete scratch {}: {e}", handle.id()),
            }
        }
    }
}

/// Scratch resources held in memory.
#[derive(Debug, Default)]
pub struct MemWorkspace {
    resources: RefCell<BTreeMap<String, Vec<SamplePoint>>>,
}

impl MemWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    fn missing(handle: &ScratchHandle) -> DrapeError {
        DrapeError::Scratch(format!("no resource named {}", handle.id()))
    }
}

impl ScratchWorkspace for MemWorkspace {
    fn create_named(&self, id: &str) -> Result<ScratchHandle, DrapeError> {
        let mut resources = self.resources.borrow_mut();
        if resources.contains_key(id) {
            return Err(DrapeError::Scratch(format!("{id} already exists")));
        }
        resources.insert(id.to_owned(), Vec::new());
        Ok(ScratchHandle::new(id))
    }

    fn write_points(
        &self,
        handle: &ScratchHandle,
        points: &[SamplePoint],
    ) -> Result<(), DrapeError> {
        let mut resources = self.resources.borrow_mut();
        let staged = resources
            .get_mut(handle.id())
            .ok_or_else(|| Self::missing(handle))?;
        staged.clear();
        staged.extend_from_slice(points);
        Ok(())
    }

    fn read_points(&self, handle: &ScratchHandle) -> Result<Vec<SamplePoint>, DrapeError> {
        self.resources
            .borrow()
            .get(handle.id())
            .cloned()
            .ok_or_else(|| Self::missing(handle))
    }

    fn delete(&self, handle: &ScratchHandle) -> Result<(), DrapeError> {
        self.resources
            .borrow_mut()
            .remove(handle.id())
            .map(|_| ())
            .ok_or_else(|| Self::missing(handle))
    }

    fn list(&self) -> Result<Vec<String>, DrapeError> {
        Ok(self.resources.borrow().keys().cloned().collect())
    }
}

/// Scratch resources stored as subdirectories of `root`.
#[derive(Debug, Clone)]
pub struct DirWorkspace {
    root: PathBuf,
}

const POINTS_FILE: &str = "points.json";

impl DirWorkspace {
    /// Uses `root`, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, DrapeError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, handle: &ScratchHandle) -> PathBuf {
        self.root.join(handle.id())
    }
}

impl ScratchWorkspace for DirWorkspace {
    fn create_named(&self, id: &str) -> Result<ScratchHandle, DrapeError> {
        let handle = ScratchHandle::new(id);
        match fs::create_dir(self.path(&handle)) {
            Ok(()) => Ok(handle),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(DrapeError::Scratch(format!("{id} already exists")))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_points(
        &self,
        handle: &ScratchHandle,
        points: &[SamplePoint],
    ) -> Result<(), DrapeError> {
        let mut writer = BufWriter::new(File::create(self.path(handle).join(POINTS_FILE))?);
        serde_json::to_writer(&mut writer, points)?;
        writer.flush()?;
        Ok(())
    }

    fn read_points(&self, handle: &ScratchHandle) -> Result<Vec<SamplePoint>, DrapeError> {
        let reader = BufReader::new(File::open(self.path(handle).join(POINTS_FILE))?);
        Ok(serde_json::from_reader(reader)?)
    }

    fn delete(&self, handle: &ScratchHandle) -> Result<(), DrapeError> {
        Ok(fs::remove_dir_all(self.path(handle))?)
    }

    fn list(&self) -> Result<Vec<String>, DrapeError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}
