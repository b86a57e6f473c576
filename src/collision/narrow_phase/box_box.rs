use glam::Vec3;

use crate::collision::Contact;
use crate::dynamics::RigidBody;
use crate::geometry::BoxShape;

/// Cross-product axes shorter than this are near-parallel edge pairs and
/// are skipped.
const AXIS_LENGTH_EPSILON: f32 = 1e-7;

/// Half-length of the projection of a box onto `axis`.
fn transform_to_axis(body: &RigidBody, b: &BoxShape, axis: Vec3) -> f32 {
    b.half_extents.x * axis.dot(body.axis(0)).abs()
        + b.half_extents.y * axis.dot(body.axis(1)).abs()
        + b.half_extents.z * axis.dot(body.axis(2)).abs()
}

/// Overlap of the two boxes projected onto `axis`; negative when the axis
/// separates them.
fn penetration_on_axis(
    one: (&RigidBody, &BoxShape),
    two: (&RigidBody, &BoxShape),
    axis: Vec3,
    to_center: Vec3,
) -> f32 {
    let one_project = transform_to_axis(one.0, one.1, axis);
    let two_project = transform_to_axis(two.0, two.1, axis);
    let distance = to_center.dot(axis).abs();
    one_project + two_project - distance
}

/// Tests one candidate axis, tracking the smallest penetration seen.
/// Returns false when the axis separates the boxes.
fn try_axis(
    one: (&RigidBody, &BoxShape),
    two: (&RigidBody, &BoxShape),
    axis: Vec3,
    to_center: Vec3,
    index: u32,
    smallest_penetration: &mut f32,
    smallest_case: &mut u32,
) -> bool {
    if axis.length_squared() < AXIS_LENGTH_EPSILON {
        return true;
    }
    let axis = axis.normalize();

    let penetration = penetration_on_axis(one, two, axis, to_center);
    if penetration < 0.0 {
        return false;
    }
    if penetration < *smallest_penetration {
        *smallest_penetration = penetration;
        *smallest_case = index;
    }
    true
}

/// Builds the contact for a vertex of box `two` touching a face of box
/// `one` on face axis `best`.
fn fill_point_face_box_box(
    one: (&RigidBody, &BoxShape),
    two: (&RigidBody, &BoxShape),
    to_center: Vec3,
    best: usize,
    penetration: f32,
) -> Contact {
    // Pick the face on the axis that faces box two.
    let mut normal = one.0.axis(best);
    if normal.dot(to_center) > 0.0 {
        normal = -normal;
    }

    // Find which vertex of box two we are colliding with.
    let mut vertex = two.1.half_extents;
    if two.0.axis(0).dot(normal) < 0.0 {
        vertex.x = -vertex.x;
    }
    if two.0.axis(1).dot(normal) < 0.0 {
        vertex.y = -vertex.y;
    }
    if two.0.axis(2).dot(normal) < 0.0 {
        vertex.z = -vertex.z;
    }

    Contact {
        bodies: [Some(one.0.handle), Some(two.0.handle)],
        point: two.0.point_in_world(vertex),
        normal,
        penetration,
        friction: (one.0.friction + two.0.friction) / 2.0,
        restitution: (one.0.restitution + two.0.restitution) / 2.0,
    }
}

/// Closest point between two edges, one per box. `use_one` picks which
/// edge midpoint to fall back to when the edges do not cross.
#[allow(clippy::too_many_arguments)]
fn contact_point(
    p_one: Vec3,
    d_one: Vec3,
    one_size: f32,
    p_two: Vec3,
    d_two: Vec3,
    two_size: f32,
    use_one: bool,
) -> Vec3 {
    let sm_one = d_one.length_squared();
    let sm_two = d_two.length_squared();
    let dp_one_two = d_two.dot(d_one);

    let to_st = p_one - p_two;
    let dp_sta_one = d_one.dot(to_st);
    let dp_sta_two = d_two.dot(to_st);

    let denom = sm_one * sm_two - dp_one_two * dp_one_two;

    // Parallel edges.
    if denom.abs() < 1e-4 {
        return if use_one { p_one } else { p_two };
    }

    let mua = (dp_one_two * dp_sta_two - sm_two * dp_sta_one) / denom;
    let mub = (sm_one * dp_sta_two - dp_one_two * dp_sta_one) / denom;

    // Nearest point out of bounds on either edge means an edge-face
    // contact; the reference edge is picked by use_one.
    if mua > one_size || mua < -one_size || mub > two_size || mub < -two_size {
        return if use_one { p_one } else { p_two };
    }

    let c_one = p_one + d_one * mua;
    let c_two = p_two + d_two * mub;
    c_one * 0.5 + c_two * 0.5
}

/// Generates the contact between two boxes with a separating-axis test
/// over the 15 candidate axes, writing at most one entry.
pub fn box_and_box(
    body1: &RigidBody,
    b1: &BoxShape,
    body2: &RigidBody,
    b2: &BoxShape,
    contacts: &mut [Contact],
) -> usize {
    if contacts.is_empty() {
        return 0;
    }

    let one = (body1, b1);
    let two = (body2, b2);
    let mut to_center = body2.position - body1.position;

    let mut pen = f32::MAX;
    let mut best = u32::MAX;

    // Face axes of both boxes, then all nine edge-edge cross products.
    // Any separating axis ends the test.
    for i in 0..3 {
        if !try_axis(one, two, body1.axis(i), to_center, i as u32, &mut pen, &mut best) {
            return 0;
        }
    }
    for i in 0..3 {
        if !try_axis(one, two, body2.axis(i), to_center, 3 + i as u32, &mut pen, &mut best) {
            return 0;
        }
    }

    // Keep the best face axis in case we run into almost parallel edge
    // collisions later.
    let best_single_axis = best;

    for i in 0..3 {
        for j in 0..3 {
            let axis = body1.axis(i).cross(body2.axis(j));
            let index = 6 + (i * 3 + j) as u32;
            if !try_axis(one, two, axis, to_center, index, &mut pen, &mut best) {
                return 0;
            }
        }
    }

    if best < 3 {
        // Vertex of box two on a face of box one.
        contacts[0] = fill_point_face_box_box(one, two, to_center, best as usize, pen);
        1
    } else if best < 6 {
        // Vertex of box one on a face of box two: same algorithm with the
        // boxes (and the center line) swapped.
        to_center = -to_center;
        contacts[0] = fill_point_face_box_box(two, one, to_center, (best - 3) as usize, pen);
        1
    } else {
        // Edge-edge contact between one axis of each box.
        let best = best - 6;
        let one_axis_index = (best / 3) as usize;
        let two_axis_index = (best % 3) as usize;

        let one_axis = body1.axis(one_axis_index);
        let two_axis = body2.axis(two_axis_index);
        let mut axis = one_axis.cross(two_axis).normalize();

        // The axis should point from box one to box two.
        if axis.dot(to_center) > 0.0 {
            axis = -axis;
        }

        // Each box has four edges parallel to the axis; find the one
        // closest to the contact by picking the extreme midpoint on the
        // other two axes.
        let mut pt_on_one_edge = b1.half_extents;
        let mut pt_on_two_edge = b2.half_extents;
        for i in 0..3 {
            if i == one_axis_index {
                pt_on_one_edge[i] = 0.0;
            } else if body1.axis(i).dot(axis) > 0.0 {
                pt_on_one_edge[i] = -pt_on_one_edge[i];
            }

            if i == two_axis_index {
                pt_on_two_edge[i] = 0.0;
            } else if body2.axis(i).dot(axis) < 0.0 {
                pt_on_two_edge[i] = -pt_on_two_edge[i];
            }
        }

        let pt_on_one_edge = body1.point_in_world(pt_on_one_edge);
        let pt_on_two_edge = body2.point_in_world(pt_on_two_edge);

        let vertex = contact_point(
            pt_on_one_edge,
            one_axis,
            b1.half_extents[one_axis_index],
            pt_on_two_edge,
            two_axis,
            b2.half_extents[two_axis_index],
            best_single_axis > 2,
        );

        contacts[0] = Contact {
            bodies: [Some(body1.handle), Some(body2.handle)],
            point: vertex,
            normal: axis,
            penetration: pen,
            friction: (body1.friction + body2.friction) / 2.0,
            restitution: (body1.restitution + body2.restitution) / 2.0,
        };
        1
    }
}
