use crate::core::FrameSample;
use glam::Quat;

/// Blend `a` towards `b` by `t` and write the result into `out`.
///
/// Positions, wheel angles and time are blended linearly. Orientations take
/// the shortest arc. Wheel angles are independent scalars, so no wraparound
/// is applied to them.
///
/// `t <= 0` copies `a` verbatim and `t >= 1` copies `b`.
pub fn interpolate(a: &FrameSample, b: &FrameSample, t: f64, out: &mut FrameSample) {
    if t <= 0.0 {
        *out = *a;
        return;
    }
    if t >= 1.0 {
        *out = *b;
        return;
    }

    let tf = t as f32;

    out.time = a.time + (b.time - a.time) * t;
    out.primary_position = a.primary_position.lerp(b.primary_position, tf);
    out.secondary_position = a.secondary_position.lerp(b.secondary_position, tf);
    out.primary_orientation = slerp_shortest(a.primary_orientation, b.primary_orientation, tf);
    out.secondary_orientation =
        slerp_shortest(a.secondary_orientation, b.secondary_orientation, tf);

    for ((dst, from), to) in out
        .articulated_angles
        .iter_mut()
        .zip(a.articulated_angles.iter())
        .zip(b.articulated_angles.iter())
    {
        *dst = from + (to - from) * tf;
    }
}

/// Spherical interpolation along the shorter of the two arcs, renormalized.
pub fn slerp_shortest(from: Quat, to: Quat, t: f32) -> Quat {
    // q and -q are the same rotation; pick the one on from's side
    let to = if from.dot(to) < 0.0 { -to } else { to };
    from.slerp(to, t).normalize()
}
