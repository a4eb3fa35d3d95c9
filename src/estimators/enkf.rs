#![allow(non_snake_case)]

//! Ensemble Kalman state estimation.
//!
//! A discrete Bayesian estimator that represents the system by an ensemble of sampled state
//! realisations [`EnsembleState`]. The ensemble mean and the unbiased sample covariance take the
//! place of the x,X pair of the Kalman state representation. Nothing is linearised: the
//! prediction model is applied to every member and the forecast statistics are estimated from
//! the predicted ensemble.
//!
//! Observation updates use the stochastic 'perturbed observation' form. Every member
//! assimilates its own independently perturbed copy of the observation, which keeps the
//! ensemble spread statistically consistent with the Kalman posterior covariance. Updating all
//! members with a common observation copy would collapse the ensemble.
//!
//! The numerical operations of the cycle are also available as pure functions over member sets,
//! so the forecast statistics, gain and update can be composed directly.
//!
//! [`EnsembleState`]: struct.EnsembleState.html

use na::storage::Storage;
use na::{allocator::Allocator, DefaultAllocator, Dim, Dynamic, MatrixMN, MatrixN, RealField, VectorN, U1};
use nalgebra as na;

use rand_core::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::linalg::rcond;
use crate::matrix;
use crate::matrix::{check_non_negativ, check_positive};
use crate::models::{Estimator, KalmanEstimator, KalmanState};
use crate::noise::{CorrelatedNoise, CoupledNoise, UncorrelatedNoise};
use crate::observation::SparseObservation;

/// Ensemble of state realisations.
pub type Ensemble<N, D> = Vec<VectorN<N, D>>;

/// Ensemble state representation.
///
/// The estimate is the set of equally weighted ensemble members together with the random draw
/// source for the stochastic parts of the filter cycle. All draws of a filter are taken
/// sequentially from the single owned rng, so a run is reproducible from the rng seed.
pub struct EnsembleState<N: RealField, D: Dim>
where
    DefaultAllocator: Allocator<N, D>,
{
    /// Ensemble members, each an equally weighted state realisation
    pub members: Ensemble<N, D>,
    /// Draw source for process noise and observation perturbations
    pub rng: Box<dyn RngCore>,
}

/// Outcome of an assimilation cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome<N: RealField> {
    /// No valid observation this cycle, the forecast ensemble stands
    Forecast,
    /// Observation assimilated, with the reciprocal condition number of the innovation covariance
    Analysis(N),
}

impl<N: RealField, D: Dim> EnsembleState<N, D>
where
    DefaultAllocator: Allocator<N, D>,
{
    /// Creates an EnsembleState from its members.
    ///
    /// Requires at least two members, all of the same dimension.
    pub fn new(members: Ensemble<N, D>, rng: Box<dyn RngCore>) -> Result<Self, &'static str> {
        if members.len() < 2 {
            return Err("ensemble needs at least two members");
        }
        let d = members[0].nrows();
        if members.iter().any(|m| m.nrows() != d) {
            return Err("ensemble members differ in dimension");
        }

        Ok(EnsembleState { members, rng })
    }

    /// Forecast the ensemble with a sampled state transition.
    ///
    /// The transition `f` draws any process noise it requires from the rng it is given.
    pub fn predict_sampled(&mut self, f: impl Fn(&VectorN<N, D>, &mut dyn RngCore) -> VectorN<N, D>) {
        for m in self.members.iter_mut() {
            *m = f(m, &mut *self.rng);
        }
    }

    /// Forecast the ensemble through a state transition with additive noise.
    ///
    /// Every member is advanced by `f` and an independent zero mean draw with the noise
    /// covariance is added.
    pub fn predict(
        &mut self,
        f: impl Fn(&VectorN<N, D>) -> VectorN<N, D>,
        noise: &CorrelatedNoise<N, D>,
    ) -> Result<(), &'static str>
    where
        DefaultAllocator: Allocator<N, D, D>,
        StandardNormal: Distribution<N>,
    {
        if self.members.iter().any(|m| m.nrows() != noise.Q.nrows()) {
            return Err("state and noise dimensions differ");
        }

        let sampler = normal_noise_sampler(noise)?;
        self.predict_sampled(move |x: &VectorN<N, D>, rng: &mut dyn RngCore| f(x) + sampler(rng));

        Ok(())
    }

    /// Update every member with its own copy of the observation.
    ///
    /// Member m is moved by W*(zs[m] - Hx*m) where the gain W is computed from the forecast
    /// ensemble covariance. The update is deterministic given the observation copies: callers
    /// wanting the stochastic update draw them with [`perturbed_observations`] or use
    /// [`observe_linear`].
    ///
    /// Returns the reciprocal condition number of the innovation covariance.
    ///
    /// [`perturbed_observations`]: fn.perturbed_observations.html
    /// [`observe_linear`]: #method.observe_linear
    pub fn observe_perturbed<ZD: Dim>(
        &mut self,
        zs: &[VectorN<N, ZD>],
        Hx: &MatrixMN<N, ZD, D>,
        noise: &CorrelatedNoise<N, ZD>,
    ) -> Result<N, &'static str>
    where
        DefaultAllocator: Allocator<N, D, D>
            + Allocator<N, ZD, D>
            + Allocator<N, D, ZD>
            + Allocator<N, ZD, ZD>
            + Allocator<N, ZD>,
    {
        if zs.len() != self.members.len() {
            return Err("observation copies and ensemble sizes differ");
        }

        let forecast = ensemble_kalman_state(&self.members)?;
        let (W, rcond) = kalman_gain(&forecast.X, Hx, noise)?;

        for (m, z) in self.members.iter_mut().zip(zs.iter()) {
            let s = z - Hx * &*m;
            *m += &W * s;
        }

        Ok(rcond)
    }

    /// Assimilate an observation through a linear observation model.
    ///
    /// The stochastic update: an independently perturbed copy of z is drawn for every member
    /// and applied with [`observe_perturbed`].
    ///
    /// [`observe_perturbed`]: #method.observe_perturbed
    pub fn observe_linear<ZD: Dim>(
        &mut self,
        z: &VectorN<N, ZD>,
        Hx: &MatrixMN<N, ZD, D>,
        noise: &CorrelatedNoise<N, ZD>,
    ) -> Result<N, &'static str>
    where
        DefaultAllocator: Allocator<N, D, D>
            + Allocator<N, ZD, D>
            + Allocator<N, D, ZD>
            + Allocator<N, ZD, ZD>
            + Allocator<N, ZD>,
        StandardNormal: Distribution<N>,
    {
        let zs = perturbed_observations(z, noise, self.members.len(), &mut *self.rng)?;
        self.observe_perturbed(&zs, Hx, noise)
    }

    /// One complete filter cycle: forecast then analysis.
    ///
    /// The ensemble is advanced by `f` with additive process noise, then the valid slots of the
    /// observation are assimilated with the per slot observation variances `zv`. When every slot
    /// is missing the analysis is skipped and the forecast ensemble stands: a cycle without data
    /// is not an error.
    pub fn assimilate(
        &mut self,
        f: impl Fn(&VectorN<N, D>) -> VectorN<N, D>,
        pred_noise: &CorrelatedNoise<N, D>,
        obs: &SparseObservation<N>,
        zv: &UncorrelatedNoise<N, Dynamic>,
    ) -> Result<CycleOutcome<N>, &'static str>
    where
        DefaultAllocator: Allocator<N, D, D>
            + Allocator<N, Dynamic, D>
            + Allocator<N, D, Dynamic>
            + Allocator<N, Dynamic, Dynamic>
            + Allocator<N, Dynamic>,
        StandardNormal: Distribution<N>,
    {
        if self.members.len() < 2 {
            return Err("ensemble needs at least two members");
        }
        if zv.q.nrows() != obs.z.len() {
            return Err("observation variances and slots differ");
        }
        check_non_negativ(rcond::rcond_vec(&zv.q), "Zv not PSD in observe")?;

        // Validate the observation before the ensemble is touched
        let d = self.members[0].data.shape().0;
        let dense = obs.dense(d)?;

        self.predict(f, pred_noise)?;

        let dense = match dense {
            Some(dense) => dense,
            None => return Ok(CycleOutcome::Forecast),
        };

        // Observation noise of the valid slots only
        let valid = UncorrelatedNoise::<N, Dynamic> {
            q: VectorN::from_iterator_generic(
                Dynamic::new(dense.slots.len()),
                U1,
                dense.slots.iter().map(|&s| zv.q[s]),
            ),
        };
        let noise = CorrelatedNoise::from_uncorrelated(&valid);
        let rcond = self.observe_linear(&dense.z, &dense.Hx, &noise)?;

        Ok(CycleOutcome::Analysis(rcond))
    }
}

impl<N: RealField, D: Dim> Estimator<N, D> for EnsembleState<N, D>
where
    DefaultAllocator: Allocator<N, D>,
{
    fn state(&self) -> Result<VectorN<N, D>, &'static str> {
        ensemble_mean(&self.members)
    }
}

impl<N: RealField, D: Dim> KalmanEstimator<N, D> for EnsembleState<N, D>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
    StandardNormal: Distribution<N>,
{
    /// Initialise the ensemble by redrawing every member from the Gaussian state.
    ///
    /// The member count is preserved.
    fn init(&mut self, state: &KalmanState<N, D>) -> Result<N, &'static str> {
        let rcond = rcond::rcond_symetric(&state.X);
        check_non_negativ(rcond, "X not PSD")?;

        let coupled = CoupledNoise::from_correlated(&CorrelatedNoise { Q: state.X.clone() })?;
        let sampler = normal_noise_sampler_coupled(coupled.G);
        for m in self.members.iter_mut() {
            *m = &state.x + sampler(&mut *self.rng);
        }

        Ok(rcond)
    }

    /// The ensemble mean and unbiased sample covariance.
    fn kalman_state(&self) -> Result<(N, KalmanState<N, D>), &'static str> {
        let state = ensemble_kalman_state(&self.members)?;
        let rcond = rcond::rcond_symetric(&state.X);

        Ok((rcond, state))
    }
}

/// Mean of an ensemble of equally weighted members.
pub fn ensemble_mean<N: RealField, D: Dim>(
    members: &[VectorN<N, D>],
) -> Result<VectorN<N, D>, &'static str>
where
    DefaultAllocator: Allocator<N, D>,
{
    if members.is_empty() {
        return Err("empty ensemble");
    }

    let d = members[0].data.shape().0;
    let mut x = VectorN::zeros_generic(d, U1);
    for m in members.iter() {
        x += m;
    }
    x /= N::from_usize(members.len()).unwrap();

    Ok(x)
}

/// Mean and unbiased sample covariance of an ensemble.
///
/// The covariance is a fold of the deviation outer products, normalised by the number of members
/// less one. An ensemble of identical members yields exactly the zero matrix.
pub fn ensemble_kalman_state<N: RealField, D: Dim>(
    members: &[VectorN<N, D>],
) -> Result<KalmanState<N, D>, &'static str>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
{
    if members.len() < 2 {
        return Err("ensemble needs at least two members");
    }

    let x = ensemble_mean(members)?;
    let d = x.data.shape().0;
    let mut X = matrix::as_zeros((d, d));
    for m in members.iter() {
        let dev = m - &x;
        X.ger(N::one(), &dev, &dev, N::one());
    }
    X /= N::from_usize(members.len() - 1).unwrap();

    Ok(KalmanState { x, X })
}

/// Kalman gain for a state covariance, linear observation model and additive observation noise.
///
/// The innovation covariance S = Hx.X.Hx' + Q is inverted by Cholesky factorisation, never by
/// determinant cofactors. Returns the gain W = X.Hx'.S^-1 and the reciprocal condition number
/// of S, so callers can apply their own conditioning threshold.
pub fn kalman_gain<N: RealField, D: Dim, ZD: Dim>(
    X: &MatrixN<N, D>,
    Hx: &MatrixMN<N, ZD, D>,
    noise: &CorrelatedNoise<N, ZD>,
) -> Result<(MatrixMN<N, D, ZD>, N), &'static str>
where
    DefaultAllocator:
        Allocator<N, D, D> + Allocator<N, ZD, D> + Allocator<N, D, ZD> + Allocator<N, ZD, ZD>,
{
    let XHt = X * Hx.transpose();
    // S = Hx.X.Hx' + Q
    let S = Hx * &XHt + &noise.Q;

    let rcond = rcond::rcond_symetric(&S);
    check_positive(rcond, "S not PD in observe")?;

    // Inverse innovation covariance
    let SI = S.clone().cholesky().ok_or("S not PD in observe")?.inverse();
    // Kalman gain, X*Hx'*SI
    let W = &XHt * SI;

    Ok((W, rcond))
}

/// Draw one perturbed copy of the observation for each ensemble member.
///
/// Each copy is z plus an independent zero mean draw with the observation noise covariance.
pub fn perturbed_observations<N: RealField, ZD: Dim>(
    z: &VectorN<N, ZD>,
    noise: &CorrelatedNoise<N, ZD>,
    count: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<VectorN<N, ZD>>, &'static str>
where
    DefaultAllocator: Allocator<N, ZD, ZD> + Allocator<N, ZD>,
    StandardNormal: Distribution<N>,
{
    let sampler = normal_noise_sampler(noise)?;

    Ok((0..count).map(|_| z + sampler(&mut *rng)).collect())
}

/// Sampling function for a zero mean multivariate normal with the covariance of `noise`.
///
/// Fails when the covariance cannot be factorised.
pub fn normal_noise_sampler<N: RealField, D: Dim>(
    noise: &CorrelatedNoise<N, D>,
) -> Result<impl Fn(&mut dyn RngCore) -> VectorN<N, D>, &'static str>
where
    DefaultAllocator: Allocator<N, D, D> + Allocator<N, D>,
    StandardNormal: Distribution<N>,
{
    let coupled = CoupledNoise::from_correlated(noise)?;

    Ok(normal_noise_sampler_coupled(coupled.G))
}

/// Sampling function for a zero mean multivariate normal with covariance G.G'.
///
/// The coupling matrix G is the 'square root' of the covariance, as produced by
/// [`CoupledNoise::from_correlated`].
///
/// [`CoupledNoise::from_correlated`]: ../../noise/struct.CoupledNoise.html#method.from_correlated
pub fn normal_noise_sampler_coupled<N: RealField, D: Dim, QD: Dim>(
    coupling: MatrixMN<N, D, QD>,
) -> impl Fn(&mut dyn RngCore) -> VectorN<N, D>
where
    DefaultAllocator: Allocator<N, D, QD> + Allocator<N, QD> + Allocator<N, D>,
    StandardNormal: Distribution<N>,
{
    move |rng: &mut dyn RngCore| {
        let rnormal =
            VectorN::from_fn_generic(coupling.data.shape().1, U1, |_, _| StandardNormal.sample(&mut *rng));
        &coupling * rnormal
    }
}
