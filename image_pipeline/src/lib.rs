use image::imageops::FilterType;
use image::RgbaImage;
use img_parts::{Bytes, ImageEXIF};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error("invalid image dimensions")]
    Dimensions,
    #[error("cannot cut {width}x{height} image into {cols}x{rows} pieces")]
    Slice {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
    },
}

/// One pre-cut piece keyed by its grid identity.
#[derive(Clone, Debug)]
pub struct PieceImage {
    pub id: usize,
    pub col: u32,
    pub row: u32,
    pub image: RgbaImage,
}

/// Decodes uploaded or captured bytes into upright RGBA pixels.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|err| PipelineError::Decode(err.to_string()))?;
    let rgba = decoded.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(PipelineError::Dimensions);
    }
    let orientation = extract_exif_orientation(bytes);
    if let Some(value) = orientation {
        tracing::debug!(orientation = value, "applying exif orientation");
    }
    Ok(apply_exif_orientation(rgba, orientation))
}

/// Resizes to the playfield width cap, keeping the aspect ratio. Images
/// already narrow enough are returned unchanged.
pub fn fit_to_display(image: RgbaImage, max_width: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if max_width == 0 || width <= max_width || width == 0 || height == 0 {
        return image;
    }
    let scale = max_width as f32 / width as f32;
    let next_height = ((height as f32) * scale).round().max(1.0) as u32;
    image::imageops::resize(&image, max_width, next_height, FilterType::Triangle)
}

/// Cuts the image into `cols` x `rows` tiles; piece size uses floor
/// division, so trailing pixels on the right and bottom are dropped.
pub fn slice_grid(
    image: &RgbaImage,
    cols: u32,
    rows: u32,
) -> Result<Vec<PieceImage>, PipelineError> {
    let (width, height) = image.dimensions();
    let slice_error = PipelineError::Slice {
        width,
        height,
        cols,
        rows,
    };
    if cols == 0 || rows == 0 {
        return Err(slice_error);
    }
    let piece_width = width / cols;
    let piece_height = height / rows;
    if piece_width == 0 || piece_height == 0 {
        return Err(slice_error);
    }

    let mut pieces = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let tile = image::imageops::crop_imm(
                image,
                col * piece_width,
                row * piece_height,
                piece_width,
                piece_height,
            )
            .to_image();
            pieces.push(PieceImage {
                id: (row * cols + col) as usize,
                col,
                row,
                image: tile,
            });
        }
    }
    Ok(pieces)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PipelineError> {
    let mut out = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|err| PipelineError::Encode(err.to_string()))?;
    Ok(out.into_inner())
}

/// Raw EXIF payload from a JPEG, PNG or WebP container, if it carries one.
pub fn extract_exif(bytes: &[u8]) -> Option<Vec<u8>> {
    let data = Bytes::copy_from_slice(bytes);
    let exif = match img_parts::jpeg::Jpeg::from_bytes(data.clone()) {
        Ok(jpeg) => jpeg.exif(),
        Err(_) => match img_parts::png::Png::from_bytes(data.clone()) {
            Ok(png) => png.exif(),
            Err(_) => img_parts::webp::WebP::from_bytes(data).ok()?.exif(),
        },
    };
    exif.map(|payload| payload.to_vec())
}

pub fn extract_exif_orientation(bytes: &[u8]) -> Option<u16> {
    let exif = extract_exif(bytes)?;
    parse_exif_orientation(&exif)
}

const EXIF_ORIENTATION_TAG: u16 = 0x0112;
const EXIF_TYPE_SHORT: u16 = 3;
const IFD_ENTRY_LEN: usize = 12;

#[derive(Clone, Copy)]
enum ByteOrder {
    Intel,
    Motorola,
}

impl ByteOrder {
    fn u16_at(self, data: &[u8], offset: usize) -> Option<u16> {
        let raw: [u8; 2] = data.get(offset..offset.checked_add(2)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Intel => u16::from_le_bytes(raw),
            ByteOrder::Motorola => u16::from_be_bytes(raw),
        })
    }

    fn u32_at(self, data: &[u8], offset: usize) -> Option<u32> {
        let raw: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
        Some(match self {
            ByteOrder::Intel => u32::from_le_bytes(raw),
            ByteOrder::Motorola => u32::from_be_bytes(raw),
        })
    }
}

/// Orientation (1..=8) from the first IFD of a TIFF-structured EXIF block.
fn parse_exif_orientation(exif: &[u8]) -> Option<u16> {
    let tiff = exif.strip_prefix(b"Exif\0\0").unwrap_or(exif);
    let order = match tiff.get(..2)? {
        b"II" => ByteOrder::Intel,
        b"MM" => ByteOrder::Motorola,
        _ => return None,
    };
    if order.u16_at(tiff, 2)? != 42 {
        return None;
    }
    let ifd = order.u32_at(tiff, 4)? as usize;
    let count = order.u16_at(tiff, ifd)? as usize;
    let entry = (0..count)
        .map(|index| ifd + 2 + index * IFD_ENTRY_LEN)
        .take_while(|offset| order.u16_at(tiff, *offset).is_some())
        .find(|offset| order.u16_at(tiff, *offset) == Some(EXIF_ORIENTATION_TAG))?;
    if order.u16_at(tiff, entry + 2)? != EXIF_TYPE_SHORT || order.u32_at(tiff, entry + 4)? == 0 {
        return None;
    }
    // a single SHORT lives inline in the value field
    let value = order.u16_at(tiff, entry + 8)?;
    (1..=8).contains(&value).then_some(value)
}

/// Turns the decoded pixels upright for the given EXIF orientation.
fn apply_exif_orientation(image: RgbaImage, orientation: Option<u16>) -> RgbaImage {
    use image::imageops::{flip_horizontal, flip_vertical, rotate180, rotate270, rotate90};

    match orientation.unwrap_or(1) {
        2 => flip_horizontal(&image),
        3 => rotate180(&image),
        4 => flip_vertical(&image),
        5 => rotate270(&flip_horizontal(&image)),
        6 => rotate90(&image),
        7 => rotate90(&flip_horizontal(&image)),
        8 => rotate270(&image),
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn exif_with_orientation(value: u16) -> Vec<u8> {
        let mut exif = Vec::new();
        exif.extend_from_slice(b"II");
        exif.extend_from_slice(&42u16.to_le_bytes());
        exif.extend_from_slice(&8u32.to_le_bytes());
        exif.extend_from_slice(&1u16.to_le_bytes());
        exif.extend_from_slice(&0x0112u16.to_le_bytes());
        exif.extend_from_slice(&3u16.to_le_bytes());
        exif.extend_from_slice(&1u32.to_le_bytes());
        exif.extend_from_slice(&value.to_le_bytes());
        exif.extend_from_slice(&[0, 0]);
        exif.extend_from_slice(&0u32.to_le_bytes());
        exif
    }

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([(x * 20) as u8, (y * 20) as u8, 0, 255]))
    }

    #[test]
    fn parses_orientation_with_and_without_prefix() {
        let raw = exif_with_orientation(6);
        assert_eq!(parse_exif_orientation(&raw), Some(6));
        let mut prefixed = b"Exif\0\0".to_vec();
        prefixed.extend_from_slice(&raw);
        assert_eq!(parse_exif_orientation(&prefixed), Some(6));
        assert_eq!(parse_exif_orientation(b"II*\0"), None);
        assert_eq!(parse_exif_orientation(&exif_with_orientation(0)), None);
    }

    #[test]
    fn jpeg_orientation_rotates_decoded_pixels() {
        let mut encoded = Vec::new();
        image::codecs::jpeg::JpegEncoder::new(&mut encoded)
            .encode_image(&image::DynamicImage::ImageRgba8(gradient(8, 4)).to_rgb8())
            .expect("encode jpeg");
        let mut jpeg = img_parts::jpeg::Jpeg::from_bytes(Bytes::from(encoded)).expect("jpeg");
        jpeg.set_exif(Some(Bytes::from(exif_with_orientation(6))));
        let mut bytes = Vec::new();
        jpeg.encoder().write_to(&mut bytes).expect("write jpeg");

        assert_eq!(extract_exif_orientation(&bytes), Some(6));
        let decoded = decode_image(&bytes).expect("decode");
        assert_eq!(decoded.dimensions(), (4, 8));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(decode_image(b"not an image"), Err(PipelineError::Decode(_))));
    }

    #[test]
    fn png_round_trip_keeps_pixels() {
        let source = gradient(5, 3);
        let bytes = encode_png(&source).expect("png");
        let decoded = decode_image(&bytes).expect("decode");
        assert_eq!(decoded, source);
    }

    #[test]
    fn fit_to_display_caps_width() {
        let fitted = fit_to_display(gradient(1200, 800), 600);
        assert_eq!(fitted.dimensions(), (600, 400));
        let small = fit_to_display(gradient(300, 100), 600);
        assert_eq!(small.dimensions(), (300, 100));
    }

    #[test]
    fn slice_grid_uses_floor_division_and_row_major_ids() {
        let source = gradient(10, 7);
        let pieces = slice_grid(&source, 3, 3).expect("slice");
        assert_eq!(pieces.len(), 9);
        let piece = &pieces[5];
        assert_eq!((piece.id, piece.col, piece.row), (5, 2, 1));
        assert_eq!(piece.image.dimensions(), (3, 2));
        assert_eq!(piece.image.get_pixel(0, 0), source.get_pixel(6, 2));
        assert!(slice_grid(&source, 0, 3).is_err());
        assert!(slice_grid(&gradient(2, 2), 3, 3).is_err());
    }
}
