use std::collections::VecDeque;

use image::{codecs::webp::WebPEncoder, ColorType, ImageEncoder, RgbaImage};
use mapforge_shared::{
    log::{debug, trace},
    rayon::prelude::*,
};

use crate::terrain::{GenerationError, GenerationResult, GeneratorArgs, TerrainGenerator, TerrainVariant};

/// Pixels with this blue value are water.
const WATER_BLUE: u8 = 106;

/// Pixels with an alpha below this value are water.
const MIN_LAND_ALPHA: u8 = 20;

/// Largest magnitude that fits into the tile byte.
const MAX_MAGNITUDE: u8 = 31;

const LAND_BIT: u8 = 1 << 7;
const SHORELINE_BIT: u8 = 1 << 6;
const OCEAN_BIT: u8 = 1 << 5;
const MAGNITUDE_MASK: u8 = 0b0001_1111;

/// [`TerrainGenerator`] that derives the terrain from the colors of a PNG image.
///
/// Every pixel becomes one tile. Fully transparent pixels and pixels with a blue channel of
/// `106` are water, all others are land whose elevation is taken from the blue channel. Each tile
/// is packed into one byte:
///
/// | bit | meaning                                        |
/// |-----|------------------------------------------------|
/// | 7   | land                                           |
/// | 6   | shoreline                                      |
/// | 5   | ocean                                          |
/// | 0-4 | elevation for land, distance to land for water |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTerrainGenerator {
    /// Land bodies with fewer tiles become water.
    pub min_island_size: usize,
    /// Water bodies with fewer tiles become land.
    pub min_lake_size: usize,
}

impl Default for ImageTerrainGenerator {
    fn default() -> Self {
        Self {
            min_island_size: 30,
            min_lake_size: 200,
        }
    }
}

impl TerrainGenerator for ImageTerrainGenerator {
    fn generate(&self, args: GeneratorArgs<'_>) -> Result<GenerationResult, GenerationError> {
        let image = image::load_from_memory(args.image_buffer)
            .map_err(|source| GenerationError::Decode {
                name: args.name.to_owned(),
                source,
            })?
            .into_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(GenerationError::EmptyImage(args.name.to_owned()));
        }
        debug!("Generating terrain for map '{}' from a {}x{} image", args.name, image.width(), image.height());

        let mut grid = Grid::from_image(&image);
        if args.remove_small_islands {
            let (islands, lakes) = grid.remove_small_bodies(self.min_island_size, self.min_lake_size);
            debug!("Removed {islands} small islands and {lakes} small lakes from map '{}'", args.name);
        }

        let grid4x = grid.downsample(2);
        let grid16x = grid.downsample(4);
        let thumbnail = encode_thumbnail(&grid4x).map_err(|source| GenerationError::Encode {
            name: args.name.to_owned(),
            source,
        })?;

        Ok(GenerationResult {
            map: grid.pack(),
            map4x: grid4x.pack(),
            map16x: grid16x.pack(),
            thumbnail,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Tile {
    land: bool,
    /// Elevation of land tiles. Always 0 for water.
    elevation: u8,
}

impl Tile {
    const WATER: Tile = Tile {
        land: false,
        elevation: 0,
    };

    fn from_pixel(pixel: &[u8]) -> Self {
        let (blue, alpha) = (pixel[2], pixel[3]);
        if alpha < MIN_LAND_ALPHA || blue == WATER_BLUE {
            return Tile::WATER;
        }
        Tile {
            land: true,
            elevation: (blue.clamp(140, 200) - 140) / 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Grid {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    fn from_image(image: &RgbaImage) -> Self {
        let tiles = image.as_raw().par_chunks_exact(4).map(Tile::from_pixel).collect();
        Self {
            width: image.width(),
            height: image.height(),
            tiles,
        }
    }

    /// 4-connected neighbours of the tile.
    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> {
        let width = self.width as usize;
        let height = self.height as usize;
        let (x, y) = (index % width, index / width);
        [
            (x > 0).then(|| index - 1),
            (x + 1 < width).then(|| index + 1),
            (y > 0).then(|| index - width),
            (y + 1 < height).then(|| index + width),
        ]
        .into_iter()
        .flatten()
    }

    /// Returns the tile indices of every connected body of land (`land == true`) or water.
    fn bodies(&self, land: bool) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.tiles.len()];
        let mut bodies = Vec::new();
        for start in 0..self.tiles.len() {
            if visited[start] || self.tiles[start].land != land {
                continue;
            }
            visited[start] = true;
            let mut body = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(index) = queue.pop_front() {
                body.push(index);
                for neighbour in self.neighbours(index) {
                    if !visited[neighbour] && self.tiles[neighbour].land == land {
                        visited[neighbour] = true;
                        queue.push_back(neighbour);
                    }
                }
            }
            bodies.push(body);
        }
        bodies
    }

    /// Turns islands smaller than `min_island_size` into water and lakes smaller than `min_lake_size`
    /// into land. Returns the number of removed islands and lakes.
    fn remove_small_bodies(&mut self, min_island_size: usize, min_lake_size: usize) -> (usize, usize) {
        let mut removed_islands = 0;
        for island in self.bodies(true).into_iter().filter(|body| body.len() < min_island_size) {
            for index in island {
                self.tiles[index] = Tile::WATER;
            }
            removed_islands += 1;
        }

        let mut removed_lakes = 0;
        let mut lakes = self.bodies(false);
        // The largest body of water is the ocean and never filled.
        if let Some(ocean) = lakes.iter().enumerate().max_by_key(|(_, body)| body.len()).map(|(index, _)| index) {
            lakes.swap_remove(ocean);
        }
        for lake in lakes.into_iter().filter(|body| body.len() < min_lake_size) {
            for index in lake {
                self.tiles[index] = Tile {
                    land: true,
                    elevation: 0,
                };
            }
            removed_lakes += 1;
        }
        (removed_islands, removed_lakes)
    }

    /// Keeps every `factor`-th tile in both directions.
    fn downsample(&self, factor: u32) -> Grid {
        let width = self.width.div_ceil(factor);
        let height = self.height.div_ceil(factor);
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let index = (y * factor) as usize * self.width as usize + (x * factor) as usize;
                tiles.push(self.tiles[index]);
            }
        }
        Grid { width, height, tiles }
    }

    /// Distance of every water tile to the closest land tile. Land tiles have a distance of 0 and
    /// water tiles without any land on the map `u32::MAX`.
    fn distances_to_land(&self) -> Vec<u32> {
        let mut distances = vec![u32::MAX; self.tiles.len()];
        let mut queue = VecDeque::new();
        for (index, tile) in self.tiles.iter().enumerate() {
            if tile.land {
                distances[index] = 0;
                queue.push_back(index);
            }
        }
        while let Some(index) = queue.pop_front() {
            let next = distances[index] + 1;
            for neighbour in self.neighbours(index) {
                if distances[neighbour] > next {
                    distances[neighbour] = next;
                    queue.push_back(neighbour);
                }
            }
        }
        distances
    }

    fn pack(&self) -> TerrainVariant {
        let mut ocean = vec![false; self.tiles.len()];
        if let Some(body) = self.bodies(false).into_iter().max_by_key(Vec::len) {
            for index in body {
                ocean[index] = true;
            }
        }
        let distances = self.distances_to_land();

        let data = self
            .tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                let shoreline = self.neighbours(index).any(|neighbour| self.tiles[neighbour].land != tile.land);
                let magnitude = if tile.land {
                    tile.elevation.min(MAX_MAGNITUDE)
                } else {
                    distances[index].div_ceil(2).min(MAX_MAGNITUDE as u32) as u8
                };
                let mut byte = magnitude & MAGNITUDE_MASK;
                if tile.land {
                    byte |= LAND_BIT;
                }
                if shoreline {
                    byte |= SHORELINE_BIT;
                }
                if ocean[index] {
                    byte |= OCEAN_BIT;
                }
                byte
            })
            .collect::<Vec<_>>();

        let num_land_tiles = self.tiles.iter().filter(|tile| tile.land).count() as u32;
        trace!("Packed {}x{} tiles with {num_land_tiles} land tiles", self.width, self.height);
        TerrainVariant {
            width: self.width,
            height: self.height,
            num_land_tiles,
            data,
        }
    }
}

fn tile_color(byte: u8) -> [u8; 4] {
    let magnitude = byte & MAGNITUDE_MASK;
    if byte & LAND_BIT != 0 {
        if byte & SHORELINE_BIT != 0 {
            return [204, 203, 158, 255];
        }
        let shade = magnitude * 3;
        [190 - shade, 220 - shade, 138 - shade, 255]
    } else if byte & OCEAN_BIT != 0 {
        [70, 132 - magnitude, 180 - magnitude, 255]
    } else {
        [100, 160, 200, 255]
    }
}

/// Renders the grid into a losslessly encoded WebP image.
fn encode_thumbnail(grid: &Grid) -> image::ImageResult<Vec<u8>> {
    let packed = grid.pack();
    let pixels = packed.data.iter().flat_map(|byte| tile_color(*byte)).collect::<Vec<_>>();
    let mut bytes = Vec::new();
    WebPEncoder::new_lossless(&mut bytes).write_image(&pixels, grid.width, grid.height, ColorType::Rgba8)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use mapforge_test::{encode_png, map_image};

    use super::*;

    fn generate(image: &RgbaImage, remove_small_islands: bool) -> GenerationResult {
        ImageTerrainGenerator::default()
            .generate(GeneratorArgs {
                image_buffer: &encode_png(image),
                remove_small_islands,
                name: "test",
            })
            .unwrap()
    }

    #[test]
    fn half_land_half_ocean() {
        let image = map_image(16, 8, |x, _| x < 8);
        let result = generate(&image, true);

        assert_eq!((result.map.width, result.map.height), (16, 8));
        assert_eq!(result.map.num_land_tiles, 64);
        assert_eq!(result.map.data.len(), 16 * 8);

        assert_eq!((result.map4x.width, result.map4x.height), (8, 4));
        assert_eq!(result.map4x.num_land_tiles, 16);
        assert_eq!(result.map4x.data.len(), 8 * 4);

        assert_eq!((result.map16x.width, result.map16x.height), (4, 2));
        assert_eq!(result.map16x.num_land_tiles, 4);
        assert_eq!(result.map16x.data.len(), 4 * 2);

        let thumbnail = image::load_from_memory(&result.thumbnail).unwrap();
        assert_eq!((thumbnail.width(), thumbnail.height()), (8, 4));
    }

    #[test]
    fn tile_bits() {
        let image = map_image(16, 8, |x, _| x < 8);
        let result = generate(&image, true);
        let tile = |x: usize, y: usize| result.map.data[y * 16 + x];

        // Inland tile with an elevation of (160 - 140) / 2.
        assert_eq!(tile(0, 0), LAND_BIT | 10);
        // Coast on both sides.
        assert_eq!(tile(7, 0), LAND_BIT | SHORELINE_BIT | 10);
        assert_eq!(tile(8, 0), SHORELINE_BIT | OCEAN_BIT | 1);
        // Four tiles away from the coast.
        assert_eq!(tile(11, 0), OCEAN_BIT | 2);
    }

    #[test]
    fn small_island_is_removed_for_production_maps() {
        let image = map_image(32, 32, |x, y| (4..7).contains(&x) && (4..7).contains(&y));
        let result = generate(&image, true);
        assert_eq!(result.map.num_land_tiles, 0);
    }

    #[test]
    fn small_island_is_kept_for_test_maps() {
        let image = map_image(32, 32, |x, y| (4..7).contains(&x) && (4..7).contains(&y));
        let result = generate(&image, false);
        assert_eq!(result.map.num_land_tiles, 9);
    }

    #[test]
    fn small_lake_is_filled() {
        let image = map_image(32, 32, |x, y| !((10..12).contains(&x) && (10..12).contains(&y)) && x < 24);
        let kept = generate(&image, false);
        let removed = generate(&image, true);
        assert_eq!(kept.map.num_land_tiles, 24 * 32 - 4);
        assert_eq!(removed.map.num_land_tiles, 24 * 32);
    }

    #[test]
    fn odd_sizes_are_rounded_up() {
        let image = map_image(5, 3, |_, _| true);
        let result = generate(&image, false);
        assert_eq!((result.map4x.width, result.map4x.height), (3, 2));
        assert_eq!((result.map16x.width, result.map16x.height), (2, 1));
        assert_eq!(result.map16x.num_land_tiles, 2);
    }

    #[test]
    fn transparent_pixels_are_water() {
        let mut image = map_image(4, 4, |_, _| true);
        image.get_pixel_mut(0, 0).0[3] = 0;
        let result = generate(&image, false);
        assert_eq!(result.map.num_land_tiles, 15);
    }

    #[test]
    fn generation_is_deterministic() {
        let image = map_image(40, 24, |x, y| (x * 7 + y * 3) % 11 < 6);
        assert_eq!(generate(&image, true), generate(&image, true));
    }

    #[test]
    fn invalid_image() {
        let result = ImageTerrainGenerator::default().generate(GeneratorArgs {
            image_buffer: b"not a png",
            remove_small_islands: true,
            name: "broken",
        });
        assert!(matches!(result, Err(GenerationError::Decode { name, .. }) if name == "broken"));
    }
}
