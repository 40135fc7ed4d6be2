use nalgebra as na;

/// Scalar type used for every coordinate, speed and mass property
pub type Real = f64;

/// A 2D vector of reals
pub type Vec2 = na::Vector2<Real>;

/// A 3D vector of reals
pub type Vec3 = na::Vector3<Real>;

/// A rigid transform (rotation followed by translation)
pub type Transform = na::Isometry3<Real>;

/// A unit quaternion rotation
pub type Rotation = na::UnitQuaternion<Real>;

/// A 3x3 inertia tensor
pub type Inertia = na::Matrix3<Real>;

/// Rotation by `angle` radians about the x axis
#[inline]
pub fn rotation_x(angle: Real) -> Rotation {
    Rotation::from_axis_angle(&Vec3::x_axis(), angle)
}

/// Rotation by `angle` radians about the y axis
#[inline]
pub fn rotation_y(angle: Real) -> Rotation {
    Rotation::from_axis_angle(&Vec3::y_axis(), angle)
}

/// Rotation by `angle` radians about the z axis
#[inline]
pub fn rotation_z(angle: Real) -> Rotation {
    Rotation::from_axis_angle(&Vec3::z_axis(), angle)
}

/// Body-fixed x-y-z rotation sequence: rotate about x, then the new y, then the new z
#[inline]
pub fn body_fixed_xyz(angles: &Vec3) -> Rotation {
    rotation_x(angles.x) * rotation_y(angles.y) * rotation_z(angles.z)
}

/// Rotation from a rotation vector (axis scaled by angle)
#[inline]
pub fn rotation_from_vector(v: &Vec3) -> Rotation {
    Rotation::from_scaled_axis(*v)
}

/// Transform with the given rotation and translation
#[inline]
pub fn transform(rotation: Rotation, translation: Vec3) -> Transform {
    Transform::from_parts(na::Translation3::from(translation), rotation)
}
