//! Decibel / linear volume conversion for mixer parameters

/// Silence floor written to the mixer
pub const MIN_DB: f32 = -80.0;
/// Unity gain
pub const MAX_DB: f32 = 0.0;

/// Linear volume (0.0 - 1.0) to decibels, clamped to `MIN_DB..=MAX_DB`
pub fn volume_to_db(linear: f32) -> f32 {
    if linear > 0.0 {
        (20.0 * linear.log10()).clamp(MIN_DB, MAX_DB)
    } else {
        MIN_DB
    }
}

/// Decibels to linear volume; anything at or below `MIN_DB` is silence
pub fn db_to_volume(db: f32) -> f32 {
    if db > MIN_DB {
        10.0_f32.powf(db * 0.05).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_and_silence() {
        assert_eq!(volume_to_db(1.0), 0.0);
        assert_eq!(volume_to_db(0.0), MIN_DB);
        assert_eq!(volume_to_db(-1.0), MIN_DB);
        assert_eq!(db_to_volume(MIN_DB), 0.0);
        assert_eq!(db_to_volume(-120.0), 0.0);
        assert!((db_to_volume(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_half_volume() {
        assert!((volume_to_db(0.5) - (-6.0206)).abs() < 0.001);
        assert!((db_to_volume(-6.0206) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_clamped_above_unity() {
        assert_eq!(volume_to_db(4.0), MAX_DB);
        assert_eq!(db_to_volume(12.0), 1.0);
    }

    #[test]
    fn test_tiny_volume_hits_floor() {
        assert_eq!(volume_to_db(1e-6), MIN_DB);
    }
}
