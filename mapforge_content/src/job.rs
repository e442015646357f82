use std::{fs, path::Path};

use mapforge_shared::{
    log::{debug, info, trace},
    serde_json::{self, Map, Value},
};

use crate::{
    common::{BuildOutcome, JobError, JobFailure, IMAGE_FILE_NAME, INFO_FILE_NAME, MANIFEST_FILE_NAME, THUMBNAIL_FILE_NAME},
    manifest::{BuildManifest, VariantKind},
    registry::MapDescriptor,
    terrain::{GeneratorArgs, TerrainGenerator},
    AssetLocator,
};

/// Builds a single map and reports the outcome. Never panics on I/O or generator errors.
pub fn run(descriptor: MapDescriptor, locator: &AssetLocator, generator: &dyn TerrainGenerator) -> BuildOutcome {
    info!("Building map {descriptor}");
    match build(descriptor, locator, generator) {
        Ok(()) => {
            info!("Successfully built map {descriptor}");
            BuildOutcome::Succeeded(descriptor)
        }
        Err(error) => BuildOutcome::Failed(JobFailure { map: descriptor, error }),
    }
}

fn build(descriptor: MapDescriptor, locator: &AssetLocator, generator: &dyn TerrainGenerator) -> Result<(), JobError> {
    let MapDescriptor { name, is_test } = descriptor;
    let input_dir = locator.map_input_dir(name, is_test);
    let output_dir = locator.map_output_dir(name, is_test);

    let image_path = input_dir.join(IMAGE_FILE_NAME);
    trace!("Reading image {image_path:?}");
    let image_buffer = fs::read(&image_path).map_err(|source| JobError::InputRead { path: image_path, source })?;

    let info_path = input_dir.join(INFO_FILE_NAME);
    let document = read_document(&info_path)?;

    debug!("Generating terrain for map {descriptor}");
    let result = generator.generate(GeneratorArgs {
        image_buffer: &image_buffer,
        // Test maps deliberately contain tiny islands and lakes.
        remove_small_islands: !is_test,
        name,
    })?;

    let manifest = BuildManifest::merge(document, &result);

    fs::create_dir_all(&output_dir).map_err(|source| JobError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;
    for kind in VariantKind::ALL {
        write_artifact(&output_dir, kind.file_name(), &kind.select(&result).data)?;
    }
    write_artifact(&output_dir, THUMBNAIL_FILE_NAME, &result.thumbnail)?;

    // The manifest marks the artifacts of the map as complete and is therefore written last.
    let manifest_json = manifest.to_pretty_json().map_err(JobError::ManifestSerialize)?;
    let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
    trace!("Writing {manifest_path:?}");
    fs::write(&manifest_path, manifest_json).map_err(|source| JobError::ManifestWrite {
        path: manifest_path,
        source,
    })?;
    Ok(())
}

/// Reads the metadata document without enforcing a schema. Only the top level has to be an object.
fn read_document(path: &Path) -> Result<Map<String, Value>, JobError> {
    trace!("Reading metadata document {path:?}");
    let bytes = fs::read(path).map_err(|source| JobError::InputRead {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| JobError::ManifestParse {
        path: path.to_owned(),
        source,
    })
}

fn write_artifact(output_dir: &Path, artifact: &'static str, content: &[u8]) -> Result<(), JobError> {
    let path = output_dir.join(artifact);
    trace!("Writing {path:?}");
    fs::write(&path, content).map_err(|source| JobError::OutputWrite { artifact, path, source })
}
