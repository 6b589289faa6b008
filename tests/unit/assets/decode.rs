use super::*;

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let img = RgbaImage::from_pixel(2, 1, image::Rgba([200, 100, 50, 128]));
    let decoded = decode_image(&png_bytes(&img)).unwrap();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.get_pixel(1, 0).0, [200, 100, 50, 128]);
}

#[test]
fn garbage_bytes_are_decode_errors() {
    let err = decode_image(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CardError::Decode(_)), "{err}");
}

#[test]
fn missing_file_is_asset_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_image_file(&dir.path().join("nope.png"), None).unwrap_err();
    assert!(matches!(err, CardError::AssetMissing(_)), "{err}");
}

#[test]
fn svg_files_are_rasterized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.svg");
    std::fs::write(
        &path,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="20">
             <rect width="10" height="20" fill="#00ff00"/>
           </svg>"##,
    )
    .unwrap();

    let native = load_image_file(&path, None).unwrap();
    assert_eq!(native.dimensions(), (10, 20));
    assert_eq!(native.get_pixel(5, 10).0, [0, 255, 0, 255]);

    let scaled = load_image_file(&path, Some((40, 40))).unwrap();
    assert_eq!(scaled.dimensions(), (40, 80));
}

#[test]
fn corrupt_raster_file_is_not_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nbroken").unwrap();
    let err = load_image_file(&path, None).unwrap_err();
    assert!(matches!(err, CardError::Decode(_)), "{err}");
}
