//! Small numeric helpers shared by the aggregation pipeline.

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Average of a sum over a count, rounded to one decimal. Zero counts give
/// exactly 0.0, never NaN.
pub fn avg1(sum: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        round1(sum / count as f64)
    }
}

/// Average of a sum over a count, rounded to the nearest integer. Zero
/// counts give exactly 0.
pub fn avg_int(sum: f64, count: u32) -> i64 {
    if count == 0 {
        0
    } else {
        (sum / count as f64).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(15.04), 15.0);
        assert_eq!(round1(15.05), 15.1);
        assert_eq!(round1(60.0), 60.0);
    }

    #[test]
    fn test_avg1_two_values() {
        // Values [10, 20] in one bucket average to 15.0.
        assert_eq!(avg1(30.0, 2), 15.0);
    }

    #[test]
    fn test_avg_int_rounds_to_nearest() {
        // Counts [3, 5] average to 4.
        assert_eq!(avg_int(8.0, 2), 4);
        assert_eq!(avg_int(7.0, 2), 4);
        assert_eq!(avg_int(5.0, 2), 3);
    }

    #[test]
    fn test_zero_count_is_zero_not_nan() {
        assert_eq!(avg1(0.0, 0), 0.0);
        assert_eq!(avg_int(0.0, 0), 0);
        assert_eq!(avg1(123.4, 0), 0.0);
    }
}
