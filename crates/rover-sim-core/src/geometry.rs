//! Segment-segment intersection kernel used by ray casting.

/// A point in screen coordinates (the y axis grows downward).
pub type Point = [f64; 2];

/// Parametric segment-segment intersection test.
///
/// For segments A = (p1, p2) and B = (p3, p4), both line parameters share
/// the denominator `(y4-y3)(x2-x1) - (x4-x3)(y2-y1)`. A zero denominator
/// leaves both parameters at the sentinel -1, outside `[0, 1]`, so parallel
/// and collinear segments report no intersection. That policy is load-bearing
/// for the perception engine; keep it.
pub fn segments_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> bool {
    let [x1, y1] = p1;
    let [x2, y2] = p2;
    let [x3, y3] = p3;
    let [x4, y4] = p4;

    let denom = (y4 - y3) * (x2 - x1) - (x4 - x3) * (y2 - y1);

    let mut u_a = -1.0;
    let mut u_b = -1.0;
    if denom != 0.0 {
        u_a = ((x4 - x3) * (y1 - y3) - (y4 - y3) * (x1 - x3)) / denom;
        u_b = ((x2 - x1) * (y1 - y3) - (y2 - y1) * (x1 - x3)) / denom;
    }

    (0.0..=1.0).contains(&u_a) && (0.0..=1.0).contains(&u_b)
}
