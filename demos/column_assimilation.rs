//! Operation of the ensemble estimator in a simple example.
//!
//! Tracks the temperatures of a three layer column from noisy sensors in the top and bottom
//! layers. The middle layer is never measured directly, it is estimated through its coupling
//! with the observed layers. Sensors drop out on some steps.

use na::{Dynamic, Matrix3, U3, Vector3};
use nalgebra as na;
use num_traits::Pow;
use rand::Rng;

use ensemble_kalman::estimators::enkf;
use ensemble_kalman::estimators::enkf::{CycleOutcome, EnsembleState};
use ensemble_kalman::models::{Estimator, KalmanEstimator};
use ensemble_kalman::noise::{CorrelatedNoise, CoupledNoise, UncorrelatedNoise};
use ensemble_kalman::observation::SparseObservation;

fn main() {
    // We need random numbers
    let mut rng = rand::thread_rng();
    // And a numeric type
    type N = f64;

    // Start with 200 members spread around a rough first guess of the layer temperatures
    let spread = rand_distr::Uniform::new(-2., 2.);
    let mut members: enkf::Ensemble<N, U3> = vec![];
    for _i in 0..200 {
        members.push(Vector3::new(
            15. + rng.sample(spread),
            12. + rng.sample(spread),
            10. + rng.sample(spread),
        ));
    }
    let mut estimate = EnsembleState::new(members, Box::new(rng)).unwrap();

    // Heat diffuses slowly between neighbouring layers
    let diffuse = |x: &Vector3<N>| {
        Vector3::new(
            x[0] + 0.1 * (x[1] - x[0]),
            x[1] + 0.1 * (x[0] - x[1]) + 0.1 * (x[2] - x[1]),
            x[2] + 0.1 * (x[1] - x[2]),
        )
    };
    // Unmodelled heating enters at the surface and couples downwards ever more weakly
    let process_noise = CorrelatedNoise::from_coupled(&CoupledNoise {
        q: Vector3::new(0.2.pow(2), 0.1.pow(2), 0.05.pow(2)),
        G: Matrix3::new(1., 0., 0., 0.3, 1., 0., 0.1, 0.3, 1.),
    });

    // Sensors in the top and bottom layers, both with a standard deviation of 0.5
    let zv = UncorrelatedNoise::repeat(Dynamic::new(2), 0.5.pow(2));

    // Sensor readings per step, the bottom sensor fails on step 2 and both on step 3
    let readings = [
        [Some(16.4), Some(9.2)],
        [Some(16.9), Some(9.0)],
        [Some(17.3), None],
        [None, None],
        [Some(17.8), Some(8.7)],
    ];
    for (step, reading) in readings.iter().enumerate() {
        let obs = SparseObservation::new(reading.to_vec(), vec![0, 2]).unwrap();
        let outcome = estimate
            .assimilate(diffuse, &process_noise, &obs, &zv)
            .unwrap();
        let mean = estimate.state().unwrap();
        match outcome {
            CycleOutcome::Analysis(_) => println!("step {} estimate {:.2}", step, mean.transpose()),
            CycleOutcome::Forecast => {
                println!("step {} no sensor data, forecast {:.2}", step, mean.transpose())
            }
        }
    }

    // The spread of the unmeasured middle layer comes from the layer couplings
    let (_rcond, state) = estimate.kalman_state().unwrap();
    println!("final covariance {:.3}", state.X);
}
