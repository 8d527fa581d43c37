use pdf_writer::{Filter, Pdf, Ref};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RasterFormat {
    Jpeg,
    /// Decoded to RGB by the `image` crate before embedding.
    Decoded(image::ImageFormat),
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct RasterInfo {
    pub(crate) format: RasterFormat,
    pub(crate) pixel_width: u32,
    pub(crate) pixel_height: u32,
    /// Colour components of a JPEG (1 gray, 3 RGB, 4 CMYK); other formats are decoded to RGB.
    pub(crate) components: u8,
}

/// Read dimensions from the JPEG SOF marker, or from the header of a PNG, GIF,
/// BMP or WebP image.
pub(crate) fn raster_info(data: &[u8]) -> Option<RasterInfo> {
    // JPEG: starts with FF D8
    if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
        let mut i = 2;
        while i + 4 < data.len() {
            if data[i] != 0xFF {
                return None;
            }
            let marker = data[i + 1];
            if marker == 0xD9 {
                break;
            }
            let len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            if matches!(marker, 0xC0 | 0xC1 | 0xC2) && i + 9 < data.len() {
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
                return Some(RasterInfo {
                    format: RasterFormat::Jpeg,
                    pixel_width: width,
                    pixel_height: height,
                    components: data[i + 9],
                });
            }
            i += 2 + len;
        }
        return None;
    }

    let format = image::guess_format(data).ok()?;
    if !matches!(
        format,
        image::ImageFormat::Png
            | image::ImageFormat::Gif
            | image::ImageFormat::Bmp
            | image::ImageFormat::WebP
    ) {
        return None;
    }
    let reader = image::ImageReader::with_format(std::io::Cursor::new(data), format);
    let (width, height) = reader.into_dimensions().ok()?;
    Some(RasterInfo {
        format: RasterFormat::Decoded(format),
        pixel_width: width,
        pixel_height: height,
        components: 3,
    })
}

/// Write `data` as an image XObject at `xobj_ref`. Alpha in decoded formats
/// becomes a soft mask.
/// Returns false when the bytes cannot be decoded; nothing is written then.
pub(crate) fn write_image_xobject(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    data: &[u8],
    info: RasterInfo,
    alloc: &mut impl FnMut() -> Ref,
) -> bool {
    match info.format {
        RasterFormat::Jpeg => {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(info.pixel_width as i32);
            xobj.height(info.pixel_height as i32);
            match info.components {
                1 => xobj.color_space().device_gray(),
                4 => xobj.color_space().device_cmyk(),
                _ => xobj.color_space().device_rgb(),
            };
            xobj.bits_per_component(8);
            true
        }
        RasterFormat::Decoded(format) => {
            let reader = image::ImageReader::with_format(std::io::Cursor::new(data), format);
            let decoded = match reader.decode() {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::warn!("Cannot decode {format:?} image: {e}");
                    return false;
                }
            };
            let rgba: image::RgbaImage = decoded.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
            true
        }
    }
}
