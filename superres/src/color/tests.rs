//! Tests for the color model.

use std::str::FromStr;

use super::*;

fn gray(v: u8) -> Color {
    Color::from_rgba8([v, v, v, 255])
}

fn assert_lab_close(actual: Color, expected: [f32; 3], tol: f32) {
    let lab = actual.lab();
    for i in 0..3 {
        assert!(
            (lab[i] - expected[i]).abs() < tol,
            "component {i}: {:?} vs {:?}",
            lab,
            expected
        );
    }
}

#[test]
fn test_black_and_white_lightness() {
    let black = Color::from_rgba8([0, 0, 0, 255]);
    let white = Color::from_rgba8([255, 255, 255, 255]);

    assert!(black.lightness().abs() < 1e-4, "L = {}", black.lightness());
    assert!(
        (white.lightness() - 1.0).abs() < 1e-3,
        "L = {}",
        white.lightness()
    );
    assert!(white.a().abs() < 1e-3 && white.b().abs() < 1e-3);
}

#[test]
fn test_alpha_is_ignored() {
    let opaque = Color::from_rgba8([10, 200, 30, 255]);
    let transparent = Color::from_rgba8([10, 200, 30, 0]);
    assert_eq!(opaque, transparent);
}

#[test]
fn test_lightness_never_negative() {
    for v in [0u8, 1, 2, 5] {
        assert!(gray(v).lightness() >= 0.0);
    }
}

#[test]
fn test_rgba8_round_trip_close() {
    let rgba = [200, 40, 90, 255];
    let back = Color::from_rgba8(rgba).to_rgba8();
    for i in 0..3 {
        assert!(
            (back[i] as i32 - rgba[i] as i32).abs() <= 1,
            "{:?} vs {:?}",
            back,
            rgba
        );
    }
    assert_eq!(back[3], 255);
}

#[test]
fn test_try_from_rgb_clamps_overshoot() {
    let over = Color::try_from_rgb(1.2, 0.5, -0.1).unwrap();
    let clamped = Color::try_from_rgb(1.0, 0.5, 0.0).unwrap();
    assert_eq!(over, clamped);
}

#[test]
fn test_try_from_rgb_rejects_nan() {
    let err = Color::try_from_rgb(f32::NAN, 0.0, 0.0).unwrap_err();
    assert!(matches!(err, ColorError::InvalidColor(_)));
}

#[test]
fn test_from_lab_nan_recovers_to_black() {
    assert_eq!(Color::from_lab(f32::NAN, 0.0, 0.0), Color::BLACK);
    assert!(Color::try_from_lab(0.5, f32::INFINITY, 0.0).is_err());
}

#[test]
fn test_from_lab_out_of_gamut_is_clamped() {
    let c = Color::from_lab(0.5, 2.0, -2.0);
    let rgb = lab_to_srgb_unclamped(c.lightness(), c.a(), c.b());
    for v in rgb {
        assert!(
            (-1e-3..=1.0 + 1e-3).contains(&v),
            "component {v} outside gamut"
        );
    }
}

#[test]
fn test_from_lab_in_gamut_kept_exactly() {
    let c = gray(128);
    let rebuilt = Color::from_lab(c.lightness(), c.a(), c.b());
    assert_eq!(rebuilt, c);
}

#[test]
fn test_distance_identity() {
    for rgba in [[0, 0, 0, 255], [255, 255, 255, 255], [12, 140, 230, 255]] {
        let c = Color::from_rgba8(rgba);
        assert_eq!(distance(c, c), 0.0);
    }
}

#[test]
fn test_distance_symmetric_and_bounded() {
    let c1 = Color::from_rgba8([250, 10, 10, 255]);
    let c2 = Color::from_rgba8([10, 10, 250, 255]);
    let d = distance(c1, c2);
    assert_eq!(d, distance(c2, c1));
    assert!((-1.0..=1.0).contains(&d), "d = {d}");
    assert!(d > 0.0);
}

#[test]
fn test_distance_black_white_clamped_to_one() {
    let d = distance(gray(0), gray(255));
    assert!(d <= 1.0 && d > 0.99, "d = {d}");
}

#[test]
fn test_distance_orders_similarity() {
    let base = gray(100);
    assert!(distance(base, gray(110)) < distance(base, gray(180)));
}

#[test]
fn test_undefined_distance_treated_as_max() {
    let broken = Color {
        l: f32::NAN,
        a: 0.0,
        b: 0.0,
    };
    let err = try_distance(broken, gray(10)).unwrap_err();
    assert!(matches!(err, ColorError::UndefinedDistance(_, _)));
    assert_eq!(distance(broken, gray(10)), 1.0);
}

#[test]
fn test_merge_average_singleton_identity() {
    let c = Color::from_rgba8([33, 180, 77, 255]);
    assert_eq!(merge_average(&[c]), c);
}

#[test]
fn test_merge_average_of_grays() {
    let a = gray(60);
    let b = gray(160);
    let merged = merge_average(&[a, b]);
    let expected = [
        (a.lightness() + b.lightness()) / 2.0,
        (a.a() + b.a()) / 2.0,
        (a.b() + b.b()) / 2.0,
    ];
    assert_lab_close(merged, expected, 1e-4);
}

#[test]
fn test_merge_average_order_independent() {
    let colors = [
        Color::from_rgba8([200, 10, 10, 255]),
        Color::from_rgba8([10, 200, 10, 255]),
        Color::from_rgba8([10, 10, 200, 255]),
    ];
    let reversed: Vec<Color> = colors.iter().rev().copied().collect();
    assert_eq!(merge_average(&colors), merge_average(&reversed));
}

#[test]
#[should_panic(expected = "Cannot merge an empty color list")]
fn test_merge_average_empty_panics() {
    merge_average(&[]);
}

#[test]
fn test_merge_median_singleton() {
    let c = Color::from_rgba8([5, 6, 7, 255]);
    assert_eq!(merge_median(&mut [c]), c);
}

#[test]
fn test_merge_median_odd_returns_middle_unchanged() {
    let dark = Color::from_rgba8([20, 30, 40, 255]);
    let mid = Color::from_rgba8([120, 90, 60, 255]);
    let bright = Color::from_rgba8([240, 230, 250, 255]);

    let mut colors = [bright, dark, mid];
    assert_eq!(merge_median(&mut colors), mid);
}

#[test]
fn test_merge_median_even_averages_central_pair() {
    let values = [gray(200), gray(40), gray(160), gray(80)];
    let sorted_mid_lo = gray(80);
    let sorted_mid_hi = gray(160);

    let mut colors = values;
    let merged = merge_median(&mut colors);

    let expected = [
        (sorted_mid_lo.lightness() + sorted_mid_hi.lightness()) / 2.0,
        (sorted_mid_lo.a() + sorted_mid_hi.a()) / 2.0,
        (sorted_mid_lo.b() + sorted_mid_hi.b()) / 2.0,
    ];
    assert_lab_close(merged, expected, 1e-4);
}

#[test]
fn test_merge_median_rejects_outlier() {
    let mut colors = [gray(100), gray(101), gray(255), gray(99), gray(100)];
    let merged = merge_median(&mut colors);
    assert_eq!(merged, gray(100));
}

#[test]
fn test_merge_median_ties_keep_input_order() {
    let dark = Color {
        l: 0.2,
        a: 0.0,
        b: 0.0,
    };
    let warm = Color {
        l: 0.5,
        a: 0.1,
        b: 0.02,
    };
    let cool = Color {
        l: 0.5,
        a: -0.1,
        b: -0.02,
    };
    let warmer = Color {
        l: 0.5,
        a: 0.05,
        b: 0.04,
    };

    // Odd count: the middle of three equal lightnesses is the second input.
    let mut odd = [warm, cool, warmer];
    assert_eq!(merge_median(&mut odd), cool);

    // Even count: the central pair is the first two tied inputs.
    let mut even = [warm, dark, cool, warmer];
    assert_eq!(merge_median(&mut even), Color::from_lab(0.5, 0.0, 0.0));
}

#[test]
#[should_panic(expected = "Cannot merge an empty color list")]
fn test_merge_median_empty_panics() {
    merge_median(&mut []);
}

#[test]
fn test_merge_method_default_and_names() {
    assert_eq!(MergeMethod::default(), MergeMethod::Median);
    assert_eq!(MergeMethod::Average.to_string(), "average");
    assert_eq!(MergeMethod::from_str("median").unwrap(), MergeMethod::Median);
    assert_eq!(MergeMethod::from_str("AVERAGE").unwrap(), MergeMethod::Average);
    assert!(MergeMethod::from_str("mode").is_err());
}

#[test]
fn test_merge_method_dispatch() {
    let mut colors = [gray(10), gray(20), gray(250)];
    assert_eq!(MergeMethod::Median.merge(&mut colors), gray(20));
}
