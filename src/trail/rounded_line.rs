/// One drawing primitive of a rounded line path. Arcs are circular, around
/// a center point, with the start angle and sweep in degrees to match what
/// the renderer side of a path API expects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    ArcTo { cx: f32, cy: f32, radius: f32, start_angle: f32, sweep_angle: f32 },
    Close,
}

/// Axis-aligned integer bounding box, rounded outwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

const RADIAN_TO_DEGREE: f64 = 180.0 / std::f64::consts::PI;
const RIGHT_ANGLE: f64 = std::f64::consts::PI / 2.0;

/// Builds the outline of a line segment whose two endpoints carry circular
/// caps of different radii: two arcs joined by two trapezoids. Reused
/// between calls so the command buffer does not get reallocated for every
/// trail segment.
#[derive(Default)]
pub struct RoundedLine {
    path: Vec<PathOp>,
    bounds: Bounds,
}

impl RoundedLine {
    pub fn new() -> RoundedLine {
        RoundedLine::default()
    }

    /// Make a rounded line path from (p1x, p1y) with cap radius r1 to
    /// (p2x, p2y) with cap radius r2. Returns an empty path if the points
    /// coincide.
    pub fn make_path(
        &mut self,
        p1x: f32,
        p1y: f32,
        r1: f32,
        p2x: f32,
        p2y: f32,
        r2: f32,
    ) -> &[PathOp] {
        self.path.clear();
        let dx = f64::from(p2x - p1x);
        let dy = f64::from(p2y - p1y);
        // Distance of the points.
        let l = dx.hypot(dy);
        if l == 0.0 {
            self.bounds = Bounds::default();
            return &self.path;
        }
        // Angle of the line p1-p2.
        let a = dy.atan2(dx);
        // Difference of the trail cap radii.
        let dr = f64::from(r2 - r1);
        // Variation of the angle at the trail caps.
        let ar = (dr / l).asin();
        // The start angle of the trail cap arc at P1.
        let aa = a - (RIGHT_ANGLE + ar);
        // The end angle of the trail cap arc at P2.
        let ab = a + (RIGHT_ANGLE + ar);
        let cosa = aa.cos() as f32;
        let sina = aa.sin() as f32;
        let cosb = ab.cos() as f32;
        let sinb = ab.sin() as f32;
        // Closing point of the arc at P1.
        let p1ax = p1x + r1 * cosa;
        let p1ay = p1y + r1 * sina;
        // Opening point of the arc at P1.
        let p1bx = p1x + r1 * cosb;
        let p1by = p1y + r1 * sinb;
        // Opening point of the arc at P2.
        let p2ax = p2x + r2 * cosa;
        let p2ay = p2y + r2 * sina;
        // Closing point of the arc at P2.
        let p2bx = p2x + r2 * cosb;
        let p2by = p2y + r2 * sinb;
        // Start angle of the trail arcs.
        let angle = (aa * RADIAN_TO_DEGREE) as f32;
        let ar2degree = (ar * 2.0 * RADIAN_TO_DEGREE) as f32;
        // Sweep angle of the trail arc at P1.
        let a1 = -180.0 + ar2degree;
        // Sweep angle of the trail arc at P2.
        let a2 = 180.0 + ar2degree;

        // Trail cap at P1.
        self.path.push(PathOp::MoveTo { x: p1x, y: p1y });
        self.path.push(PathOp::ArcTo {
            cx: p1x,
            cy: p1y,
            radius: r1,
            start_angle: angle,
            sweep_angle: a1,
        });
        // Trail cap at P2.
        self.path.push(PathOp::MoveTo { x: p2x, y: p2y });
        self.path.push(PathOp::ArcTo {
            cx: p2x,
            cy: p2y,
            radius: r2,
            start_angle: angle,
            sweep_angle: a2,
        });
        // Two trapezoids connecting P1 and P2.
        self.path.push(PathOp::MoveTo { x: p1ax, y: p1ay });
        self.path.push(PathOp::LineTo { x: p1x, y: p1y });
        self.path.push(PathOp::LineTo { x: p1bx, y: p1by });
        self.path.push(PathOp::LineTo { x: p2bx, y: p2by });
        self.path.push(PathOp::LineTo { x: p2x, y: p2y });
        self.path.push(PathOp::LineTo { x: p2ax, y: p2ay });
        self.path.push(PathOp::Close);

        // The whole outline is contained in the union of the two cap discs.
        self.bounds = Bounds {
            left: (p1x - r1).min(p2x - r2).floor() as i32,
            top: (p1y - r1).min(p2y - r2).floor() as i32,
            right: (p1x + r1).max(p2x + r2).ceil() as i32,
            bottom: (p1y + r1).max(p2y + r2).ceil() as i32,
        };
        &self.path
    }

    /// Bounding box of the path produced by the latest `make_path` call.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
