//! # Overview
//!
//! Crate for [building](BuildOrchestrator) the maps of the game from their source assets.
//!
//! Every map in the [`MapRegistry`] has a directory in the source tree that contains the image
//! the terrain is derived from and a metadata document. The build writes a directory with the same
//! name into the output tree. It contains the terrain in three resolutions, a thumbnail and the
//! metadata document extended by a summary of each resolution.
//!
//! ## Example:
//!
//! **Source Directory:**
//!
//! ```text
//! assets/
//! ├─ maps/
//! │  ├─ world/
//! │  │  ├─ image.png
//! │  │  ├─ info.json
//! ├─ test_maps/
//! │  ├─ plains/
//! │  │  ├─ image.png
//! │  │  ├─ info.json
//! ```
//!
//! **Target Directories:**
//!
//! ```text
//! resources/
//! ├─ maps/
//! │  ├─ world/
//! │  │  ├─ map.bin
//! │  │  ├─ map4x.bin
//! │  │  ├─ map16x.bin
//! │  │  ├─ thumbnail.webp
//! │  │  ├─ manifest.json
//! tests/
//! ├─ testdata/
//! │  ├─ maps/
//! │  │  ├─ plains/
//! │  │  │  ├─ ...
//! ```
//!
//! The [`AssetLocator`] decides where these trees are located. The manifest is written after all
//! other files of a map, so its presence means that the map was built completely.
//!
//! # Components
//!
//! The [`BuildOrchestrator`] starts one job per selected map and collects the outcomes. A job reads
//! the sources, calls the [`TerrainGenerator`] and writes the artifacts. [`ImageTerrainGenerator`]
//! is the generator used by the command line tool.

mod common;
mod image_generator;
mod job;
mod locator;
mod orchestrator;
mod registry;

pub mod manifest;
pub mod terrain;

pub use common::{
    BuildOutcome, Error, JobError, JobFailure, Result, IMAGE_FILE_NAME, INFO_FILE_NAME, MANIFEST_FILE_NAME, THUMBNAIL_FILE_NAME,
};
pub use image_generator::ImageTerrainGenerator;
pub use locator::AssetLocator;
pub use orchestrator::{BuildOrchestrator, BuildSummary};
pub use registry::{BuildRequest, MapDescriptor, MapRegistry, Selection, BUILTIN_MAPS};
pub use terrain::{GenerationError, GenerationResult, GeneratorArgs, TerrainGenerator, TerrainVariant};
