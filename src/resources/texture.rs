use std::path::Path;

use crate::{
    error::{Error, Result},
    resources::load_binary,
};

/// A decoded image living on the GPU, owned by the registry.
#[derive(Debug)]
pub struct Texture<T> {
    pub handle: T,
    pub width: u32,
    pub height: u32,
}

/// Reads and decodes an image file into RGBA8.
///
/// The container format is guessed from the file contents first and from the
/// extension second, so a mislabelled PNG still loads.
pub fn decode_image(path: &Path) -> Result<image::RgbaImage> {
    let bytes = load_binary(path)?;
    let img = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(guess_err) => {
            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(image::ImageFormat::from_extension)
                .ok_or_else(|| Error::asset_load(path, guess_err))?;
            image::load_from_memory_with_format(&bytes, format)
                .map_err(|e| Error::asset_load(path, e))?
        }
    };
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(Error::asset_load(path, "image has no pixels"));
    }
    Ok(rgba)
}
