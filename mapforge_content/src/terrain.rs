use image::ImageError;
use mapforge_shared::thiserror;

/// Input of a [`TerrainGenerator`].
#[derive(Debug, Clone, Copy)]
pub struct GeneratorArgs<'a> {
    /// Encoded source image.
    pub image_buffer: &'a [u8],
    /// Whether small islands and lakes are removed from the terrain.
    pub remove_small_islands: bool,
    /// Name of the map. Only used for diagnostics.
    pub name: &'a str,
}

/// One resolution of the generated terrain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainVariant {
    pub width: u32,
    pub height: u32,
    pub num_land_tiles: u32,
    /// Packed terrain, one byte per tile in row-major order.
    pub data: Vec<u8>,
}

/// Everything a [`TerrainGenerator`] produces for one map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub map: TerrainVariant,
    /// Terrain with a quarter of the tiles of `map`.
    pub map4x: TerrainVariant,
    /// Terrain with a sixteenth of the tiles of `map`.
    pub map16x: TerrainVariant,
    /// Encoded preview image.
    pub thumbnail: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to decode the image of map '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: ImageError,
    },
    #[error("The image of map '{0}' is empty")]
    EmptyImage(String),
    #[error("Failed to encode the thumbnail of map '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: ImageError,
    },
    #[error("Other: {0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Converts the source image of a map into terrain data.
///
/// Implementations are called from several threads at once, one call per map.
pub trait TerrainGenerator: Send + Sync {
    fn generate(&self, args: GeneratorArgs<'_>) -> Result<GenerationResult, GenerationError>;
}
