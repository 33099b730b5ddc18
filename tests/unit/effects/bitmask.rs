use super::*;

fn source(w: u32, h: u32) -> RawFrame {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 7) as u8, (y * 11) as u8, 99, 200]);
        }
    }
    RawFrame::new(w, h, data).unwrap()
}

fn mask_from(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> MaskBitmap {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba(f(x, y)));
    MaskBitmap::new(img).unwrap()
}

#[test]
fn threshold_is_strict() {
    assert!(!is_white(&[240, 240, 240, 255], 240));
    assert!(is_white(&[241, 241, 241, 255], 240));
    assert!(!is_white(&[255, 255, 240, 255], 240));
}

#[test]
fn boundary_pixels_in_a_frame() {
    let src = source(2, 1);
    let mask = mask_from(2, 1, |x, _| {
        if x == 0 {
            [240, 240, 240, 255]
        } else {
            [241, 241, 241, 255]
        }
    });
    let out = apply_bitmask(&src, &mask, 240).unwrap();
    assert_eq!(out.pixel(0, 0).unwrap()[3], 200);
    assert_eq!(out.pixel(1, 0).unwrap()[3], 0);
}

#[test]
fn only_alpha_changes_and_only_to_zero() {
    let src = source(16, 9);
    let mask = mask_from(16, 9, |x, y| {
        if (x + y) % 3 == 0 {
            [255, 255, 255, 255]
        } else {
            [30, 30, 30, 255]
        }
    });
    let out = apply_bitmask(&src, &mask, 240).unwrap();
    assert_eq!(out.size(), src.size());
    let src_px = src.as_bytes().chunks_exact(4);
    for (o, s) in out.as_bytes().chunks_exact(4).zip(src_px) {
        assert_eq!(&o[..3], &s[..3]);
        assert!(o[3] == s[3] || o[3] == 0);
    }
}

#[test]
fn apply_is_idempotent() {
    let src = source(10, 10);
    let mask = mask_from(10, 10, |x, _| if x < 5 { [255; 4] } else { [0; 4] });
    let a = apply_bitmask(&src, &mask, 240).unwrap();
    let b = apply_bitmask(&src, &mask, 240).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());

    let again = apply_bitmask(&a, &mask, 240).unwrap();
    assert_eq!(again, a);
}

#[test]
fn mask_alpha_is_ignored() {
    let src = source(1, 1);
    let mask = mask_from(1, 1, |_, _| [255, 255, 255, 0]);
    let out = apply_bitmask(&src, &mask, 240).unwrap();
    assert_eq!(out.pixel(0, 0).unwrap()[3], 0);
}

#[test]
fn smaller_mask_is_stretched_to_the_source() {
    let src = source(40, 20);
    // Left half white, right half black at quarter resolution.
    let left_white = |x: u32, _: u32| if x < 5 { [255; 4] } else { [0, 0, 0, 255] };
    let mask = mask_from(10, 5, left_white);
    let out = apply_bitmask(&src, &mask, 240).unwrap();
    assert_eq!(out.size(), (40, 20));
    assert_eq!(out.pixel(2, 10).unwrap()[3], 0);
    assert_eq!(out.pixel(37, 10).unwrap()[3], 200);
}
