//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Matrix3, Vector3};
use num_traits::Float;

/// Apply polynomial coefficients to a value.
///
/// Coefficients are ordered from the highest power down to the constant term.
pub fn poly_val<T>(value: T, coeffs: &[T]) -> T
where
    T: Float,
{
    // Horner's scheme
    coeffs.iter().fold(T::zero(), |acc, &c| acc * value + c)
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    value.max(min).min(max)
}

/// Arithmetic mean of the values, or `None` if there are none.
pub fn mean<T>(values: &[T]) -> Option<T>
where
    T: Float,
{
    if values.is_empty() {
        return None;
    }

    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);

    T::from(values.len()).map(|n| sum / n)
}

/// Least-squares fit of a second degree polynomial `y = a*x^2 + b*x + c`.
///
/// Returns `[a, b, c]`, or `None` if there are fewer than three points or the
/// points do not determine a unique quadratic (for example if all `x` values
/// are identical).
pub fn polyfit2(xs: &[f64], ys: &[f64]) -> Option<[f64; 3]> {
    if xs.len() != ys.len() || xs.len() < 3 {
        return None;
    }

    // Centre and scale x to keep the normal equations well conditioned
    let x_mean = mean(xs)?;
    let x_scale = xs
        .iter()
        .map(|x| (x - x_mean).abs())
        .fold(0f64, f64::max);
    if x_scale <= std::f64::EPSILON {
        return None;
    }

    // Accumulate the normal equations in the scaled variable u
    let mut s = [0f64; 5];
    let mut t = [0f64; 3];
    for (x, y) in xs.iter().zip(ys.iter()) {
        let u = (x - x_mean) / x_scale;
        let mut p = 1f64;
        for k in 0..5 {
            s[k] += p;
            if k < 3 {
                t[k] += p * y;
            }
            p *= u;
        }
    }

    let ata = Matrix3::new(
        s[4], s[3], s[2],
        s[3], s[2], s[1],
        s[2], s[1], s[0],
    );
    let aty = Vector3::new(t[2], t[1], t[0]);

    let coeffs = ata.lu().solve(&aty)?;
    if coeffs.iter().any(|c| !c.is_finite()) {
        return None;
    }

    // Expand y = au*u^2 + bu*u + cu back into powers of x
    let (au, bu, cu) = (coeffs[0], coeffs[1], coeffs[2]);
    let k = 1.0 / x_scale;
    let a = au * k * k;
    let b = bu * k - 2.0 * au * k * k * x_mean;
    let c = au * k * k * x_mean * x_mean - bu * k * x_mean + cu;

    Some([a, b, c])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5f64, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-5f32, 0.0, 255.0), 0.0);
        assert_eq!(clamp(0.25f64, 0.0, 1.0), 0.25);
    }

    #[test]
    fn test_poly_val() {
        assert_eq!(poly_val(2f64, &[1.0, -3.0, 4.0]), 2.0);
        assert_eq!(poly_val(5f64, &[]), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean::<f64>(&[]), None);
        assert_eq!(mean(&[1f64, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_polyfit2_exact() {
        // x = 0.001 y^2 - 0.5 y + 400, sampled over an image height
        let ys: Vec<f64> = (0..480).step_by(7).map(|y| y as f64).collect();
        let xs: Vec<f64> = ys.iter().map(|y| 0.001 * y * y - 0.5 * y + 400.0).collect();

        let [a, b, c] = polyfit2(&ys, &xs).unwrap();

        assert!((a - 0.001).abs() < 1e-9);
        assert!((b + 0.5).abs() < 1e-7);
        assert!((c - 400.0).abs() < 1e-5);
    }

    #[test]
    fn test_polyfit2_degenerate() {
        // Too few points
        assert_eq!(polyfit2(&[1.0, 2.0], &[1.0, 2.0]), None);

        // All samples on one row cannot determine a curve
        assert_eq!(polyfit2(&[10.0, 10.0, 10.0, 10.0], &[1.0, 2.0, 3.0, 4.0]), None);
    }
}
