use std::io::Cursor;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::core::Size;
use crate::foundation::error::{SegmenterError, SegmenterResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::texture::Texture;

/// Decode encoded image bytes (PNG) into a premultiplied texture.
pub fn decode_image(bytes: &[u8]) -> SegmenterResult<Texture> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Texture::from_straight_rgba(width, height, rgba.as_raw())
}

/// Decode a base64 payload (optionally a `data:` URL) into its raw bytes.
pub fn decode_base64(payload: &str) -> SegmenterResult<Vec<u8>> {
    let data = match payload.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => payload,
    };
    base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| SegmenterError::serde(format!("invalid base64 image payload: {e}")))
}

/// Decode a base64 PNG payload, keeping the original encoded bytes alongside the texture.
pub fn decode_base64_png(payload: &str) -> SegmenterResult<(Texture, Vec<u8>)> {
    let bytes = decode_base64(payload)?;
    let texture = decode_image(&bytes)?;
    Ok((texture, bytes))
}

/// Encode premultiplied RGBA8 bytes of `size` as a straight-alpha PNG.
pub fn encode_png(premul: &[u8], size: Size) -> SegmenterResult<Vec<u8>> {
    if premul.len() != size.rgba_len() {
        return Err(SegmenterError::validation(
            "encode_png expects a buffer matching width*height*4",
        ));
    }
    let mut straight = premul.to_vec();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(size.width, size.height, straight)
        .ok_or_else(|| SegmenterError::validation("png buffer size mismatch"))?;

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(out)
}

/// Encode a texture as PNG.
pub fn encode_texture_png(texture: &Texture) -> SegmenterResult<Vec<u8>> {
    encode_png(texture.premul_bytes(), texture.size())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
