//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Limit a value to the given interval.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Return the euclidian norm of a point.
pub fn norm<T>(point: &[T]) -> T
where
    T: Float + std::ops::AddAssign
{
    let mut sum = T::from(0).unwrap();

    for p in point {
        sum += p.powi(2);
    }

    sum.sqrt()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        // Axis value to pedal percentage, as used by the drive controller
        assert_eq!(lin_map((-100f64, 100f64), (0f64, 100f64), -100f64), 0f64);
        assert_eq!(lin_map((-100f64, 100f64), (0f64, 100f64), 100f64), 100f64);
        assert_eq!(lin_map((-100f64, 100f64), (0f64, 100f64), 0f64), 50f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-1.5f64, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25f64, -1.0, 1.0), 0.25);
    }

    #[test]
    fn test_norm() {
        assert_eq!(norm(&[3f64, 4f64]), 5f64);
        assert_eq!(norm(&[0f64, 0f64]), 0f64);
    }
}
