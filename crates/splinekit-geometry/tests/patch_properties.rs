use approx::assert_relative_eq;
use nalgebra::Vector3;
use splinekit_core::SplineError;
use splinekit_geometry::sampling::sample_patch;
use splinekit_geometry::{
    BSplinePatch, BezierPatch, Curve, NurbsPatch, Patch, RationalBezierPatch,
};

fn v3(x: f64, y: f64, z: f64) -> Vector3<f64> {
    Vector3::new(x, y, z)
}

/// Height field over a `count_u x count_v` grid on the unit square.
fn grid(count_u: usize, count_v: usize) -> Vec<Vector3<f64>> {
    let mut points = Vec::with_capacity(count_u * count_v);
    for i in 0..count_u {
        for j in 0..count_v {
            let x = i as f64 / (count_u - 1) as f64;
            let y = j as f64 / (count_v - 1) as f64;
            let z = ((i * 7 + j * 3) % 5) as f64 * 0.25 - 0.5;
            points.push(v3(x, y, z));
        }
    }
    points
}

fn bumpy_bspline_patch() -> BSplinePatch<Vector3<f64>> {
    BSplinePatch::new(
        3,
        2,
        vec![0.0, 0.0, 0.0, 0.0, 0.4, 1.0, 1.0, 1.0, 1.0],
        vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0],
        grid(5, 4),
    )
    .unwrap()
}

fn bumpy_nurbs_patch() -> NurbsPatch<Vector3<f64>> {
    let weights = (0..20).map(|k| 0.5 + (k % 3) as f64 * 0.5).collect();
    let mut patch = NurbsPatch::new(
        3,
        2,
        vec![0.0, 0.0, 0.0, 0.0, 0.4, 1.0, 1.0, 1.0, 1.0],
        vec![0.0, 0.0, 0.0, 0.5, 1.0, 1.0, 1.0],
        grid(5, 4),
        weights,
    )
    .unwrap();
    patch.initialize().unwrap();
    patch
}

fn samples(count: usize) -> impl Iterator<Item = f64> {
    (0..count).map(move |i| i as f64 / (count - 1) as f64)
}

#[test]
fn test_corners_interpolate_grid() {
    let bezier = BezierPatch::new(2, 3, grid(3, 4)).unwrap();
    let bspline = bumpy_bspline_patch();
    let corners = [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)];

    let bezier_grid = grid(3, 4);
    let expected = [bezier_grid[0], bezier_grid[3], bezier_grid[8], bezier_grid[11]];
    for (&(u, v), &p) in corners.iter().zip(&expected) {
        assert_relative_eq!(bezier.evaluate(u, v).unwrap(), p, epsilon = 1e-12);
    }

    let spline_grid = grid(5, 4);
    let expected = [spline_grid[0], spline_grid[3], spline_grid[16], spline_grid[19]];
    for (&(u, v), &p) in corners.iter().zip(&expected) {
        assert_relative_eq!(bspline.evaluate(u, v).unwrap(), p, epsilon = 1e-12);
    }
}

#[test]
fn test_iso_curve_consistency() {
    let nurbs = bumpy_nurbs_patch();
    let bspline = bumpy_bspline_patch();
    for v0 in [0.0, 0.3, 0.5, 0.85, 1.0] {
        let nurbs_iso = nurbs.compute_iso_curve_u(v0).unwrap();
        let spline_iso = bspline.compute_iso_curve_u(v0).unwrap();
        for u in samples(11) {
            assert_relative_eq!(nurbs_iso.evaluate(u).unwrap(), nurbs.evaluate(u, v0).unwrap(), epsilon = 1e-10);
            assert_relative_eq!(spline_iso.evaluate(u).unwrap(), bspline.evaluate(u, v0).unwrap(), epsilon = 1e-10);
        }
    }
    for u0 in [0.0, 0.2, 0.4, 0.7, 1.0] {
        let nurbs_iso = nurbs.compute_iso_curve_v(u0).unwrap();
        for v in samples(11) {
            assert_relative_eq!(nurbs_iso.evaluate(v).unwrap(), nurbs.evaluate(u0, v).unwrap(), epsilon = 1e-10);
            assert_relative_eq!(
                nurbs_iso.evaluate_derivative(v).unwrap(),
                nurbs.evaluate_derivative_v(u0, v).unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

#[test]
fn test_uninitialized_nurbs_patch() {
    let patch = NurbsPatch::new(
        1,
        1,
        vec![0.0, 0.0, 1.0, 1.0],
        vec![0.0, 0.0, 1.0, 1.0],
        grid(2, 2),
        vec![1.0; 4],
    )
    .unwrap();
    assert!(matches!(patch.evaluate(0.5, 0.5), Err(SplineError::NotInitialized(_))));
    assert!(matches!(
        patch.evaluate_derivative_u(0.5, 0.5),
        Err(SplineError::NotInitialized(_))
    ));
    assert!(matches!(
        patch.compute_iso_curve_v(0.5),
        Err(SplineError::NotInitialized(_))
    ));

    // Changing any input after initialization requires a new initialize.
    let mut patch = bumpy_nurbs_patch();
    assert!(patch.evaluate(0.5, 0.5).is_ok());
    patch.set_knots_u(vec![0.0, 0.0, 0.0, 0.0, 0.6, 1.0, 1.0, 1.0, 1.0]);
    assert!(matches!(patch.evaluate(0.5, 0.5), Err(SplineError::NotInitialized(_))));
    patch.initialize().unwrap();
    assert!(patch.evaluate(0.5, 0.5).is_ok());
}

#[test]
fn test_rational_patch_reduction() {
    let bezier = BezierPatch::new(2, 3, grid(3, 4)).unwrap();
    let mut rational = RationalBezierPatch::new(2, 3, grid(3, 4), vec![1.0; 12]).unwrap();
    rational.initialize().unwrap();

    let bspline = bumpy_bspline_patch();
    let mut nurbs = NurbsPatch::new(
        3,
        2,
        bspline.knots_u().to_vec(),
        bspline.knots_v().to_vec(),
        grid(5, 4),
        vec![1.0; 20],
    )
    .unwrap();
    nurbs.initialize().unwrap();

    for u in samples(7) {
        for v in samples(7) {
            assert_relative_eq!(rational.evaluate(u, v).unwrap(), bezier.evaluate(u, v).unwrap(), epsilon = 1e-12);
            assert_relative_eq!(
                rational.evaluate_derivative_u(u, v).unwrap(),
                bezier.evaluate_derivative_u(u, v).unwrap(),
                epsilon = 1e-12
            );
            assert_relative_eq!(nurbs.evaluate(u, v).unwrap(), bspline.evaluate(u, v).unwrap(), epsilon = 1e-12);
            assert_relative_eq!(
                nurbs.evaluate_derivative_v(u, v).unwrap(),
                bspline.evaluate_derivative_v(u, v).unwrap(),
                epsilon = 1e-12
            );
        }
    }
}

#[test]
fn test_partial_derivatives_match_finite_differences() {
    let patch = bumpy_nurbs_patch();
    let h = 1e-6;
    for u in [0.15, 0.33, 0.62, 0.9] {
        for v in [0.1, 0.45, 0.7] {
            let du = (patch.evaluate(u + h, v).unwrap() - patch.evaluate(u - h, v).unwrap()) / (2.0 * h);
            let dv = (patch.evaluate(u, v + h).unwrap() - patch.evaluate(u, v - h).unwrap()) / (2.0 * h);
            assert_relative_eq!(du, patch.evaluate_derivative_u(u, v).unwrap(), epsilon = 1e-5);
            assert_relative_eq!(dv, patch.evaluate_derivative_v(u, v).unwrap(), epsilon = 1e-5);
        }
    }
}

#[test]
fn test_invalid_grids() {
    assert!(matches!(
        BezierPatch::new(2, 2, grid(3, 2)),
        Err(SplineError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        BSplinePatch::new(
            1,
            1,
            vec![0.0, 0.0, 1.0, 1.0],
            vec![0.0, 0.0, 1.0, 1.0],
            grid(3, 2),
        ),
        Err(SplineError::InvalidConfiguration(_))
    ));
    let mut patch = RationalBezierPatch::new(1, 1, grid(2, 2), vec![1.0, 1.0, -1.0, 1.0]).unwrap();
    assert!(matches!(
        patch.initialize(),
        Err(SplineError::PreconditionViolation(_))
    ));
}

#[test]
fn test_sampling_matches_evaluation() {
    let patch = bumpy_nurbs_patch();
    let points = sample_patch(&patch, 4, 3).unwrap();
    assert_eq!(points.len(), 12);
    assert_relative_eq!(points[5], patch.evaluate(1.0 / 3.0, 1.0).unwrap(), epsilon = 1e-12);
    assert_eq!(patch.degree_u(), 3);
    assert_eq!(patch.degree_v(), 2);
}
