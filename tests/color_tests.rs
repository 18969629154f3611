use approx::assert_relative_eq;
use rampforge::color::{
    Color, Oklch, circular_hue_distance, max_displayable_chroma, normalize_hue,
    perceptual_distance, to_hex, to_oklch,
};
use rampforge::error::RampError;

#[test]
fn test_parse_hex_normalizes_case() {
    let color = Color::parse("#FFD24D").unwrap();
    assert_eq!(color.hex, "#ffd24d");
    assert_relative_eq!(color.lightness(), 0.88, epsilon = 0.005);
    assert_relative_eq!(color.chroma(), 0.1535, epsilon = 0.002);
    assert_relative_eq!(color.hue(), 89.8, epsilon = 0.5);
}

#[test]
fn test_parse_css_formats() {
    let hsl = to_oklch("hsl(0, 0%, 100%)").unwrap();
    assert_eq!(hsl.hex, "#ffffff");
    assert_relative_eq!(hsl.lightness(), 1.0, epsilon = 1e-3);
    assert!(hsl.chroma() < 1e-3);

    let rgb = to_oklch("rgb(59, 130, 246)").unwrap();
    assert_eq!(rgb.hex, "#3b82f6");
}

#[test]
fn test_parse_invalid_color() {
    let err = Color::parse("not-a-color").unwrap_err();
    assert!(matches!(err, RampError::InvalidColor { ref input, .. } if input == "not-a-color"));
}

#[test]
fn test_black_and_white_extremes() {
    let black = Color::parse("#000000").unwrap();
    assert_relative_eq!(black.lightness(), 0.0, epsilon = 1e-6);
    assert_eq!(black.hue(), 0.0);

    let white = Color::parse("#ffffff").unwrap();
    assert_relative_eq!(perceptual_distance(&black, &white), 100.0, epsilon = 0.1);
}

#[test]
fn test_hex_round_trip() {
    for hex in ["#3b82f6", "#ffd24d", "#172554", "#888888", "#ef4444"] {
        let color = Color::parse(hex).unwrap();
        assert_eq!(to_hex(color.oklch), hex, "round trip of {hex}");
    }
}

#[test]
fn test_hex_round_trip_grid() {
    let channels: Vec<u8> = (0..=255).step_by(17).collect();
    for &r in &channels {
        for &g in &channels {
            for &b in &channels {
                let color = Color::from_rgb8(r, g, b);
                let back = Color::parse(&to_hex(color.oklch)).unwrap();
                let distance = perceptual_distance(&color, &back);
                assert!(distance < 0.5, "{} came back as {} ({distance})", color.hex, back.hex);
            }
        }
    }
}

#[test]
fn test_from_oklch_reduces_out_of_gamut_chroma() {
    // Amber chroma at mid lightness is outside sRGB
    let target = Oklch::new(0.4577, 0.1535, 89.78);
    let max = max_displayable_chroma(target);
    assert!(max < target.c);

    let color = Color::from_oklch(target);
    assert!(color.chroma() <= target.c);
    assert_relative_eq!(color.lightness(), target.l, epsilon = 0.01);
    assert!(circular_hue_distance(color.hue(), target.h) < 5.0);
}

#[test]
fn test_max_displayable_chroma_keeps_in_gamut_values() {
    let blue = Color::parse("#3b82f6").unwrap();
    let requested = Oklch::new(blue.lightness(), blue.chroma() * 0.5, blue.hue());
    assert_eq!(max_displayable_chroma(requested), requested.c);
}

#[test]
fn test_to_hex_never_fails() {
    for (l, c, h) in [(0.0, 0.4, 0.0), (1.0, 0.4, 120.0), (0.5, 2.0, 300.0)] {
        let hex = to_hex(Oklch::new(l, c, h));
        assert_eq!(hex.len(), 7);
        assert!(hex.starts_with('#'));
    }
}

#[test]
fn test_perceptual_distance_properties() {
    let a = Color::parse("#3b82f6").unwrap();
    let b = Color::parse("#2563eb").unwrap();
    assert_eq!(perceptual_distance(&a, &a), 0.0);
    assert_relative_eq!(perceptual_distance(&a, &b), perceptual_distance(&b, &a));
    assert!(perceptual_distance(&a, &b) > 2.0);
}

#[test]
fn test_circular_hue_distance_wraps() {
    assert_relative_eq!(circular_hue_distance(350.0, 10.0), 20.0);
    assert_relative_eq!(circular_hue_distance(10.0, 190.0), 180.0);
    assert_relative_eq!(circular_hue_distance(-30.0, 30.0), 60.0);
    assert_relative_eq!(normalize_hue(370.0), 10.0);
}
