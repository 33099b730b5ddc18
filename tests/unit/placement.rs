use rand::{SeedableRng, rngs::StdRng};

use super::*;

fn screen(w: f64, h: f64) -> ScreenSize {
    ScreenSize::new(w, h).unwrap()
}

#[test]
fn default_and_space_span_the_middle_sixty_percent() {
    for theme in [Theme::Default, Theme::Space] {
        let lo = place_with(theme, screen(1000.0, 500.0), (10, 10), 0.0, 0.0);
        assert_eq!((lo.x, lo.y), (200.0, 100.0));
        let hi = place_with(theme, screen(1000.0, 500.0), (10, 10), 0.5, 0.5);
        assert_eq!((hi.x, hi.y), (500.0, 250.0));
    }
}

#[test]
fn fishtank_uses_half_span_vertically() {
    let p = place_with(Theme::Fishtank, screen(1000.0, 1000.0), (10, 10), 1.0, 1.0);
    assert!((p.x - 800.0).abs() < 1e-9);
    assert!((p.y - 700.0).abs() < 1e-9);
}

#[test]
fn rocket_is_fixed_on_the_launch_pad() {
    let a = place_with(Theme::Rocket, screen(800.0, 600.0), (10, 10), 0.1, 0.9);
    let b = place_with(Theme::Rocket, screen(800.0, 600.0), (10, 10), 0.7, 0.2);
    assert!((a.x - 400.0).abs() < 1e-9);
    assert!((a.y - 420.0).abs() < 1e-9);
    assert_eq!(a, b);
}

#[test]
fn petri_stays_inside_the_dish() {
    let s = screen(1200.0, 800.0);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let p = place(Theme::Petri, s, (50, 50), &mut rng);
        let d = p.position().distance(s.center());
        assert!(d <= 0.3 * 800.0 + 1e-9);
    }
    let quarter = place_with(Theme::Petri, s, (50, 50), 0.25, 1.0);
    assert!((quarter.x - 600.0).abs() < 1e-9);
    assert!((quarter.y - 640.0).abs() < 1e-9);
}

#[test]
fn scale_never_upscales() {
    let p = place_with(Theme::Default, screen(1920.0, 1080.0), (20, 10), 0.3, 0.3);
    assert_eq!(p.scale, 1.0);
}

#[test]
fn scale_fits_theme_footprint() {
    let s = screen(1920.0, 1080.0);
    let mut rng = StdRng::seed_from_u64(42);
    for theme in Theme::ALL {
        for size in [(1, 1), (100, 4000), (4000, 3000), (324, 324), (5000, 1)] {
            let p = place(theme, s, size, &mut rng);
            let limit = s.min_side() * theme.footprint_fraction();
            let longest = f64::from(size.0.max(size.1));
            assert!(p.scale <= 1.0);
            assert!(longest * p.scale <= limit + 1e-9);
        }
    }
}

#[test]
fn petri_footprint_is_half_of_the_others() {
    let s = screen(1000.0, 1000.0);
    let petri = fit_scale(Theme::Petri, s, (1500, 100));
    let space = fit_scale(Theme::Space, s, (1500, 100));
    assert!((petri - 0.1).abs() < 1e-12);
    assert!((space - 0.2).abs() < 1e-12);
}

#[test]
fn empty_artifact_keeps_unit_scale() {
    assert_eq!(fit_scale(Theme::Default, screen(10.0, 10.0), (0, 0)), 1.0);
}

#[test]
fn theme_parse_and_display_round_trip() {
    for theme in Theme::ALL {
        assert_eq!(theme.to_string().parse::<Theme>().unwrap(), theme);
    }
    assert_eq!(" Petri ".parse::<Theme>().unwrap(), Theme::Petri);
    assert!("ocean".parse::<Theme>().is_err());
}
