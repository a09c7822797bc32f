use glam::{Mat4, Vec3};

/// A point in screen space, in pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for ScreenPoint {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Translation column of a world transform.
pub fn translation(transform: &Mat4) -> Vec3 {
    transform.w_axis.truncate()
}

/// `transform` with its vertical translation replaced by `y`.
pub fn with_translation_y(mut transform: Mat4, y: f32) -> Mat4 {
    transform.w_axis.y = y;
    transform
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_reads_the_fourth_column() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(translation(&m), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn with_translation_y_only_touches_y() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let snapped = with_translation_y(m, -0.5);
        assert_eq!(translation(&snapped), Vec3::new(1.0, -0.5, 3.0));
        assert_eq!(snapped.x_axis, m.x_axis);
        assert_eq!(snapped.y_axis, m.y_axis);
        assert_eq!(snapped.z_axis, m.z_axis);
    }
}
