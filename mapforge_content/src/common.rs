use std::{
    io,
    path::PathBuf,
    result,
};

use mapforge_shared::{serde_json, thiserror};

use crate::{registry::MapDescriptor, terrain::GenerationError};

/// Name of the source image in the input directory of a map.
pub const IMAGE_FILE_NAME: &str = "image.png";

/// Name of the metadata document in the input directory of a map.
pub const INFO_FILE_NAME: &str = "info.json";

/// Name of the thumbnail in the output directory of a map.
pub const THUMBNAIL_FILE_NAME: &str = "thumbnail.webp";

/// Name of the manifest in the output directory of a map. It's written last.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

pub type Result<T> = result::Result<T, Error>;

/// Errors that affect the whole build run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Map \"{0}\" is not defined")]
    UnknownMap(String),
    #[error("Failed to determine the working directory: {0}")]
    PathResolution(#[source] io::Error),
    #[error("Failed to start the build job for map {map}: {source}")]
    FailedToStartJob {
        map: MapDescriptor,
        #[source]
        source: io::Error,
    },
    #[error("{failure}{}", others_suffix(.others))]
    JobFailed {
        #[source]
        failure: JobFailure,
        /// Number of failed jobs apart from the reported one.
        others: usize,
    },
}

fn others_suffix(others: &usize) -> String {
    match *others {
        0 => String::new(),
        1 => " (1 other map failed as well)".to_owned(),
        n => format!(" ({n} other maps failed as well)"),
    }
}

/// Errors that abort the build of a single map.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Failed to read input file {path:?}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse the metadata document {path:?}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to generate the terrain: {0}")]
    Generation(#[from] GenerationError),
    #[error("Failed to create the output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write {artifact} to {path:?}: {source}")]
    OutputWrite {
        artifact: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize the manifest: {0}")]
    ManifestSerialize(#[source] serde_json::Error),
    #[error("Failed to write the manifest to {path:?}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("The build job panicked: {0}")]
    Panicked(String),
}

/// A failed build job together with the map it was building.
#[derive(Debug, thiserror::Error)]
#[error("Failed to build map {map}: {error}")]
pub struct JobFailure {
    pub map: MapDescriptor,
    #[source]
    pub error: JobError,
}

/// Result of a single build job.
#[derive(Debug)]
pub enum BuildOutcome {
    Succeeded(MapDescriptor),
    Failed(JobFailure),
}

impl BuildOutcome {
    /// Returns the map the job was building.
    pub fn map(&self) -> MapDescriptor {
        match self {
            BuildOutcome::Succeeded(map) => *map,
            BuildOutcome::Failed(failure) => failure.map,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded(_))
    }
}

