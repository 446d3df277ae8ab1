/// Interpolates XY-coordinates using a cubic Hermite curve.
///
/// The interpolator borrows the sampled coordinates of one stroke; valid
/// data lives in the half-open index interval `[min_pos, max_pos)`. The
/// neighbor indices handed to `set_interval` may point outside that
/// interval, which is how the boundary tangent rules get selected.
pub struct HermiteInterpolator<'a> {
    x_coordinates: &'a [i32],
    y_coordinates: &'a [i32],
    min_pos: i32,
    max_pos: i32,

    /// The coordinates of the start point of the interval.
    pub p1x: i32,
    pub p1y: i32,
    /// The coordinates of the end point of the interval.
    pub p2x: i32,
    pub p2y: i32,
    /// The slope of the tangent at the start point.
    pub slope1x: f32,
    pub slope1y: f32,
    /// The slope of the tangent at the end point.
    pub slope2x: f32,
    pub slope2y: f32,
}

impl<'a> HermiteInterpolator<'a> {
    pub fn new(
        x_coordinates: &'a [i32],
        y_coordinates: &'a [i32],
        min_pos: i32,
        max_pos: i32,
    ) -> HermiteInterpolator<'a> {
        HermiteInterpolator {
            x_coordinates,
            y_coordinates,
            min_pos,
            max_pos,
            p1x: 0,
            p1y: 0,
            p2x: 0,
            p2y: 0,
            slope1x: 0.0,
            slope1y: 0.0,
            slope2x: 0.0,
            slope2y: 0.0,
        }
    }

    /// Set the interpolation interval `[p1, p2]` with its neighbor indices
    /// `p0` and `p3`.
    ///
    /// The tangent at an interior point is half the vector from the point
    /// before it to the point after it. At a boundary point with no such
    /// neighbor, the other endpoint's tangent gets mirrored across the
    /// segment's own direction vector; only when neither neighbor exists is
    /// the raw segment vector used.
    pub fn set_interval(&mut self, p0: i32, p1: i32, p2: i32, p3: i32) {
        self.p1x = self.x_coordinates[p1 as usize];
        self.p1y = self.y_coordinates[p1 as usize];
        self.p2x = self.x_coordinates[p2 as usize];
        self.p2y = self.y_coordinates[p2 as usize];
        // A(ax, ay) is the vector p1->p2.
        let ax = self.p2x - self.p1x;
        let ay = self.p2y - self.p1y;

        // The slope of the tangent at p1.
        if p0 >= self.min_pos {
            // p1 has the previous valid point p0.
            self.slope1x = (self.p2x - self.x_coordinates[p0 as usize]) as f32 / 2.0;
            self.slope1y = (self.p2y - self.y_coordinates[p0 as usize]) as f32 / 2.0;
        } else if p3 < self.max_pos {
            // p1 has no previous valid point, but p2 has the next valid
            // point p3. B(bx, by) is the slope vector of the tangent at p2.
            let bx = (self.x_coordinates[p3 as usize] - self.p1x) as f32 / 2.0;
            let by = (self.y_coordinates[p3 as usize] - self.p1y) as f32 / 2.0;
            let cross_prod_ab = ax as f32 * by - ay as f32 * bx;
            let dot_prod_ab = ax as f32 * bx + ay as f32 * by;
            let norm_a_square = (ax * ax + ay * ay) as f32;
            let inv_half_norm_a_square = 1.0 / norm_a_square / 2.0;
            // The slope of the tangent is the mirror image of vector B to
            // vector A.
            self.slope1x = inv_half_norm_a_square * (dot_prod_ab * ax as f32 + cross_prod_ab * ay as f32);
            self.slope1y = inv_half_norm_a_square * (dot_prod_ab * ay as f32 - cross_prod_ab * ax as f32);
        } else {
            // The interval has only the points p1 and p2.
            self.slope1x = ax as f32;
            self.slope1y = ay as f32;
        }

        // The slope of the tangent at p2.
        if p3 < self.max_pos {
            // p2 has the next valid point p3.
            self.slope2x = (self.x_coordinates[p3 as usize] - self.p1x) as f32 / 2.0;
            self.slope2y = (self.y_coordinates[p3 as usize] - self.p1y) as f32 / 2.0;
        } else if p0 >= self.min_pos {
            // p2 has no next valid point, but p1 has the previous valid
            // point p0. B(bx, by) is the slope vector of the tangent at p1.
            let bx = (self.p2x - self.x_coordinates[p0 as usize]) as f32 / 2.0;
            let by = (self.p2y - self.y_coordinates[p0 as usize]) as f32 / 2.0;
            let cross_prod_ab = ax as f32 * by - ay as f32 * bx;
            let dot_prod_ab = ax as f32 * bx + ay as f32 * by;
            let norm_a_square = (ax * ax + ay * ay) as f32;
            let inv_half_norm_a_square = 1.0 / norm_a_square / 2.0;
            self.slope2x = inv_half_norm_a_square * (dot_prod_ab * ax as f32 + cross_prod_ab * ay as f32);
            self.slope2y = inv_half_norm_a_square * (dot_prod_ab * ay as f32 - cross_prod_ab * ax as f32);
        } else {
            self.slope2x = ax as f32;
            self.slope2y = ay as f32;
        }
    }

    /// Evaluate the cubic Hermite polynomial at `t` in the unit interval
    /// `[0, 1]`:
    ///
    /// ```text
    /// p(t) = (1+2t)(1-t)(1-t)*p1 + t(1-t)(1-t)*m1 + (3-2t)t^2*p2 + (t-1)t^2*m2
    /// ```
    ///
    /// Returns the interpolated XY-coordinates.
    pub fn interpolate(&self, t: f32) -> (f32, f32) {
        let omt = 1.0 - t;
        let tm2 = 2.0 * t;
        let k1 = 1.0 + tm2;
        let k2 = 3.0 - tm2;
        let omt2 = omt * omt;
        let t2 = t * t;
        let x = (k1 * self.p1x as f32 + t * self.slope1x) * omt2
            + (k2 * self.p2x as f32 - omt * self.slope2x) * t2;
        let y = (k1 * self.p1y as f32 + t * self.slope1y) * omt2
            + (k2 * self.p2y as f32 - omt * self.slope2y) * t2;
        (x, y)
    }
}
