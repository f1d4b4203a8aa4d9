use std::path::{Path, PathBuf};

use log::{debug, info};
use walkdir::WalkDir;

use crate::error::WorkerError;
use crate::worker::job::Job;

/// Finds uploads in a directory. Only the top level is scanned.
pub struct DirectoryScanner {
    input_directory: PathBuf,
}

impl DirectoryScanner {
    pub fn new<P: AsRef<Path>>(input_directory: P) -> Self {
        Self {
            input_directory: input_directory.as_ref().to_path_buf(),
        }
    }

    pub fn input_directory(&self) -> &Path {
        &self.input_directory
    }

    /// Jobs for every supported file, sorted by path.
    pub fn scan(&self) -> Result<Vec<Job>, WorkerError> {
        let mut jobs = Vec::new();

        for entry in WalkDir::new(&self.input_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| WorkerError::ScanFailed {
                path: self.input_directory.clone(),
                source: e,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_supported(path) {
                debug!("Found upload: {}", path.display());
                jobs.push(Job::new(path.to_path_buf()));
            }
        }

        info!(
            "Scanned {} uploads in {}",
            jobs.len(),
            self.input_directory.display()
        );
        Ok(jobs)
    }
}

/// Images and PDFs, the formats the OCR service accepts.
pub fn is_supported(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .map(|mime| {
            mime.type_() == mime_guess::mime::IMAGE || mime.essence_str() == "application/pdf"
        })
        .unwrap_or(false)
}
