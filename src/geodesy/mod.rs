//! Ellipsoidal distance between two coordinates.
//!
//! Solves the inverse geodesic problem on the WGS84 ellipsoid with Vincenty's
//! iteration, the same method platform location services use for their
//! standard `distanceBetween` routine. Results are returned in single
//! precision to match what marker records persist.

use std::cmp::Ordering;
use std::f64::consts::PI;

use crate::geometry::LatLng;

const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const SEMI_MINOR_AXIS: f64 = 6_356_752.3142;
const MAX_ITERATIONS: usize = 20;
const CONVERGENCE_THRESHOLD: f64 = 1.0e-12;

/// Distance and bearings between two coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicSolution {
    /// Geodesic length in meters.
    pub distance_meters: f32,
    /// Heading at the start point, degrees clockwise from north.
    pub initial_bearing: f32,
    /// Heading on arrival at the end point, degrees clockwise from north.
    pub final_bearing: f32,
}

/// Geodesic distance in meters between `a` and `b`.
///
/// Endpoints are put in a canonical order before solving so the result does
/// not depend on argument order.
pub fn geodesic_distance(a: LatLng, b: LatLng) -> f32 {
    let (first, second) = match compare_coordinates(a, b) {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    distance_and_bearing(first, second).distance_meters
}

pub fn distance_and_bearing(start: LatLng, end: LatLng) -> GeodesicSolution {
    let lat1 = start.latitude.to_radians();
    let lat2 = end.latitude.to_radians();
    let lon1 = start.longitude.to_radians();
    let lon2 = end.longitude.to_radians();

    let a = SEMI_MAJOR_AXIS;
    let b = SEMI_MINOR_AXIS;
    let f = (a - b) / a;
    let a_sq_minus_b_sq_over_b_sq = (a * a - b * b) / (b * b);

    let l = lon2 - lon1;
    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();

    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();
    let cos_u1_cos_u2 = cos_u1 * cos_u2;
    let sin_u1_sin_u2 = sin_u1 * sin_u2;

    let mut big_a = 0.0;
    let mut sigma = 0.0;
    let mut delta_sigma = 0.0;
    let mut sin_lambda = 0.0;
    let mut cos_lambda = 0.0;

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let lambda_orig = lambda;
        (sin_lambda, cos_lambda) = lambda.sin_cos();

        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        let cos_sigma = sin_u1_sin_u2 + cos_u1_cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = if sin_sigma == 0.0 {
            0.0
        } else {
            cos_u1_cos_u2 * sin_lambda / sin_sigma
        };
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sm = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1_sin_u2 / cos_sq_alpha
        };

        let u_squared = cos_sq_alpha * a_sq_minus_b_sq_over_b_sq;
        big_a = 1.0
            + (u_squared / 16384.0)
                * (4096.0 + u_squared * (-768.0 + u_squared * (320.0 - 175.0 * u_squared)));
        let big_b = (u_squared / 1024.0)
            * (256.0 + u_squared * (-128.0 + u_squared * (74.0 - 47.0 * u_squared)));
        let c = (f / 16.0) * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let cos_2sm_sq = cos_2sm * cos_2sm;

        delta_sigma = big_b
            * sin_sigma
            * (cos_2sm
                + (big_b / 4.0)
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sm_sq)
                        - (big_b / 6.0)
                            * cos_2sm
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sm_sq)));

        lambda = l
            + (1.0 - c)
                * f
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

        // Coincident meridians give lambda == 0 and a NaN ratio; the loop
        // then simply runs out its iterations on a fixed point.
        let delta = (lambda - lambda_orig) / lambda;
        if delta.abs() < CONVERGENCE_THRESHOLD {
            break;
        }
    }

    let distance = b * big_a * (sigma - delta_sigma);
    let initial_bearing = (cos_u2 * sin_lambda)
        .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda)
        * (180.0 / PI);
    let final_bearing = (cos_u1 * sin_lambda)
        .atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda)
        * (180.0 / PI);

    GeodesicSolution {
        distance_meters: distance as f32,
        initial_bearing: initial_bearing as f32,
        final_bearing: final_bearing as f32,
    }
}

fn compare_coordinates(a: LatLng, b: LatLng) -> Ordering {
    a.latitude
        .partial_cmp(&b.latitude)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.longitude
                .partial_cmp(&b.longitude)
                .unwrap_or(Ordering::Equal)
        })
}
