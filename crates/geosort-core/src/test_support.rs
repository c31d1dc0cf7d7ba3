//! In-memory test images with hand-built EXIF blocks.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// A DMS triple as EXIF rationals: (numerator, denominator) per component.
pub type DmsRationals = [(u32, u32); 3];

/// 48°51'24"N, 2°21'8"E
pub const PARIS_LAT: DmsRationals = [(48, 1), (51, 1), (24, 1)];
pub const PARIS_LON: DmsRationals = [(2, 1), (21, 1), (8, 1)];

fn encode(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(8, 8, Rgb([120, 80, 40]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, format)
        .expect("encode test image");
    buf.into_inner()
}

/// A JPEG with no EXIF segment at all.
pub fn plain_jpeg() -> Vec<u8> {
    encode(ImageFormat::Jpeg)
}

/// A PNG with no EXIF chunk.
pub fn plain_png() -> Vec<u8> {
    encode(ImageFormat::Png)
}

fn ifd_entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}

const ASCII: u16 = 2;
const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

/// Little-endian TIFF holding IFD0 -> GPS IFD with lat/lon and references.
fn gps_tiff(lat: DmsRationals, lat_ref: u8, lon: DmsRationals, lon_ref: u8) -> Vec<u8> {
    let mut t = Vec::new();
    t.extend_from_slice(b"II");
    t.extend_from_slice(&42u16.to_le_bytes());
    t.extend_from_slice(&8u32.to_le_bytes());

    // IFD0 at 8: one entry pointing at the GPS IFD (8 + 2 + 12 + 4 = 26)
    t.extend_from_slice(&1u16.to_le_bytes());
    ifd_entry(&mut t, 0x8825, LONG, 1, 26);
    t.extend_from_slice(&0u32.to_le_bytes());

    // GPS IFD at 26; rational data starts at 26 + 2 + 4 * 12 + 4 = 80
    t.extend_from_slice(&4u16.to_le_bytes());
    ifd_entry(&mut t, 0x0001, ASCII, 2, u32::from_le_bytes([lat_ref, 0, 0, 0]));
    ifd_entry(&mut t, 0x0002, RATIONAL, 3, 80);
    ifd_entry(&mut t, 0x0003, ASCII, 2, u32::from_le_bytes([lon_ref, 0, 0, 0]));
    ifd_entry(&mut t, 0x0004, RATIONAL, 3, 104);
    t.extend_from_slice(&0u32.to_le_bytes());

    for (num, den) in lat.iter().chain(lon.iter()) {
        t.extend_from_slice(&num.to_le_bytes());
        t.extend_from_slice(&den.to_le_bytes());
    }
    t
}

/// Little-endian TIFF with only an Orientation tag in IFD0.
fn orientation_only_tiff() -> Vec<u8> {
    let mut t = Vec::new();
    t.extend_from_slice(b"II");
    t.extend_from_slice(&42u16.to_le_bytes());
    t.extend_from_slice(&8u32.to_le_bytes());
    t.extend_from_slice(&1u16.to_le_bytes());
    ifd_entry(&mut t, 0x0112, SHORT, 1, 1);
    t.extend_from_slice(&0u32.to_le_bytes());
    t
}

/// Insert an APP1 Exif segment right after the JPEG SOI marker.
fn splice_exif(jpeg: &[u8], tiff: &[u8]) -> Vec<u8> {
    let segment_len = (2 + 6 + tiff.len()) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A JPEG carrying GPS coordinates in its EXIF block.
pub fn jpeg_with_gps(lat: DmsRationals, lat_ref: u8, lon: DmsRationals, lon_ref: u8) -> Vec<u8> {
    splice_exif(&plain_jpeg(), &gps_tiff(lat, lat_ref, lon, lon_ref))
}

/// A JPEG located in central Paris.
pub fn paris_jpeg() -> Vec<u8> {
    jpeg_with_gps(PARIS_LAT, b'N', PARIS_LON, b'E')
}

/// A JPEG with EXIF metadata but no GPS block.
pub fn jpeg_without_gps() -> Vec<u8> {
    splice_exif(&plain_jpeg(), &orientation_only_tiff())
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write test file");
    path
}
