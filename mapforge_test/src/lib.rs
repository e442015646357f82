use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
    sync::Once,
};

use image::{ImageBuffer, ImageOutputFormat, Rgba, RgbaImage};
use mapforge_shared::log::LevelFilter;
use simple_logger::SimpleLogger;

/// Blue channel value that the generator treats as water.
pub const WATER_BLUE: u8 = 106;

/// Installs a logger for the test process. Can be called from every test.
pub fn setup_logger() {
    static LOGGER: Once = Once::new();
    LOGGER.call_once(|| {
        SimpleLogger::new()
            .with_level(LevelFilter::Trace)
            .init()
            .expect("Failed to initialize the logger");
    });
}

/// Encodes the given image as PNG and returns the bytes.
pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .expect("Failed to encode the PNG image");
    bytes.into_inner()
}

/// Creates a map image of the given size. `is_land` decides for every pixel whether it shows land.
///
/// Land pixels get a blue channel of 160 which results in a non-zero elevation.
pub fn map_image(width: u32, height: u32, is_land: impl Fn(u32, u32) -> bool) -> RgbaImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        if is_land(x, y) {
            Rgba([80, 140, 160, 255])
        } else {
            Rgba([20, 60, WATER_BLUE, 255])
        }
    })
}

/// Writes the source files of a map (`image.png` and `info.json`) into `<input_root>/<name>`
/// and returns the directory.
pub fn write_source_map(input_root: &Path, name: &str, image_png: &[u8], info_json: &str) -> PathBuf {
    let map_dir = input_root.join(name);
    fs::create_dir_all(&map_dir).expect("Failed to create the source map directory");
    fs::write(map_dir.join("image.png"), image_png).expect("Failed to write image.png");
    fs::write(map_dir.join("info.json"), info_json).expect("Failed to write info.json");
    map_dir
}
