//! File-based repository implementation
//!
//! Layout of the `.robotr/` directory:
//! - format: version file (contains "1")
//! - next-build: number the next stored build gets
//! - builds/<n>.json: the build handle and its parsed result

use crate::error::{Error, Result};
use crate::history::Build;
use crate::model::TestRun;
use crate::repository::{Repository, RepositoryFactory, StoredBuild};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

const REPOSITORY_FORMAT: &str = "1";
const REPO_DIR: &str = ".robotr";
const BUILDS_DIR: &str = "builds";

pub struct FileRepositoryFactory;

impl RepositoryFactory for FileRepositoryFactory {
    fn initialise(&self, base: &Path) -> Result<Box<dyn Repository>> {
        let repo_path = base.join(REPO_DIR);

        if repo_path.exists() {
            return Err(Error::RepositoryExists(repo_path));
        }

        fs::create_dir_all(repo_path.join(BUILDS_DIR))?;
        fs::write(repo_path.join("format"), format!("{}\n", REPOSITORY_FORMAT))?;
        fs::write(repo_path.join("next-build"), "1\n")?;

        Ok(Box::new(FileRepository { path: repo_path }))
    }

    fn open(&self, base: &Path) -> Result<Box<dyn Repository>> {
        let repo_path = base.join(REPO_DIR);

        if !repo_path.exists() {
            return Err(Error::RepositoryNotFound(repo_path));
        }

        let format_path = repo_path.join("format");
        if !format_path.exists() {
            return Err(Error::InvalidFormat("Missing format file".to_string()));
        }

        let format = fs::read_to_string(&format_path)?.trim().to_string();
        if format != REPOSITORY_FORMAT {
            return Err(Error::InvalidFormat(format!(
                "Unsupported format version: {}",
                format
            )));
        }

        Ok(Box::new(FileRepository { path: repo_path }))
    }
}

pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    fn next_build_path(&self) -> PathBuf {
        self.path.join("next-build")
    }

    fn read_next_build(&self) -> Result<u32> {
        let content = fs::read_to_string(self.next_build_path())?;
        content
            .trim()
            .parse()
            .map_err(|e| Error::InvalidFormat(format!("Invalid next-build: {}", e)))
    }

    fn write_next_build(&self, value: u32) -> Result<()> {
        fs::write(self.next_build_path(), format!("{}\n", value))?;
        Ok(())
    }

    fn build_path(&self, number: u32) -> PathBuf {
        self.path.join(BUILDS_DIR).join(format!("{}.json", number))
    }

    /// Stand-in for a blob that cannot be decoded: the build keeps its
    /// number and file time, the result is empty.
    fn placeholder(&self, number: u32, path: &Path) -> StoredBuild {
        let timestamp = fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        StoredBuild {
            build: Build::new(number, timestamp),
            result: Some(TestRun::new()),
        }
    }
}

impl Repository for FileRepository {
    fn insert_build_at(
        &mut self,
        result: Option<TestRun>,
        timestamp: DateTime<Utc>,
    ) -> Result<Build> {
        let number = self.read_next_build()?;
        let build = Build::new(number, timestamp);
        let stored = StoredBuild {
            build: build.clone(),
            result,
        };
        fs::write(self.build_path(number), serde_json::to_vec_pretty(&stored)?)?;
        self.write_next_build(number + 1)?;
        debug!(build = number, "stored build");
        Ok(build)
    }

    fn get_build(&self, number: u32) -> Result<StoredBuild> {
        let path = self.build_path(number);
        if !path.exists() {
            return Err(Error::BuildNotFound(number));
        }

        let decoded = fs::read(&path)
            .map_err(Error::from)
            .and_then(|bytes| Ok(serde_json::from_slice::<StoredBuild>(&bytes)?));
        let mut stored = match decoded {
            Ok(stored) => stored,
            Err(e) => {
                warn!(build = number, error = %e, "Failed to load result, using an empty one");
                self.placeholder(number, &path)
            }
        };
        // Blobs are addressed by file name; trust it over the content.
        stored.build.number = number;

        let owner = Arc::new(stored.build.clone());
        if let Some(run) = stored.result.as_mut() {
            run.tally(Some(owner));
        }
        Ok(stored)
    }

    fn get_latest_build(&self) -> Result<StoredBuild> {
        match self.list_build_numbers()?.last() {
            Some(&number) => self.get_build(number),
            None => Err(Error::NoBuilds),
        }
    }

    fn get_next_build_number(&self) -> Result<u32> {
        self.read_next_build()
    }

    fn list_build_numbers(&self) -> Result<Vec<u32>> {
        let mut numbers = Vec::new();
        for entry in fs::read_dir(self.path.join(BUILDS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(number) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }
}
