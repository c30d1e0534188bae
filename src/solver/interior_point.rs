//! Primal-dual interior point solver for dense convex QPs
//!
//! Solves
//!
//! ```text
//! minimize    (1/2) x^T P x + q^T x
//! subject to  G x + s = h,  s >= 0
//!             A x = b
//! ```
//!
//! with Mehrotra predictor-corrector steps from an infeasible start. Each
//! iteration eliminates the slack and inequality multipliers and factorises
//! the reduced KKT system
//!
//! ```text
//! [ P + G^T W G   A^T ] [dx]
//! [ A             0   ] [dy]
//! ```
//!
//! with `W = diag(z / s)` once, then solves it for both the predictor and
//! the corrector right-hand sides.

use crate::core::SolverConfig;
use crate::dual::DualProblem;
use crate::solver::{QpSolution, QpSolver, SolverError};
use log::{debug, trace, warn};
use nalgebra::{DMatrix, DVector};

/// Iterations without halving the dual residual before a solve whose gap
/// and primal residual have converged is accepted
const STALL_ITERATIONS: usize = 5;

/// Dense primal-dual interior point QP solver
#[derive(Debug, Clone, Default)]
pub struct InteriorPointSolver {
    config: SolverConfig,
}

impl InteriorPointSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}

/// Newton direction for all four blocks of variables
struct Direction {
    dx: DVector<f64>,
    dy: DVector<f64>,
    ds: DVector<f64>,
    dz: DVector<f64>,
}

impl QpSolver for InteriorPointSolver {
    fn solve(&self, problem: &DualProblem) -> Result<QpSolution, SolverError> {
        validate(problem)?;

        let n = problem.q.len();
        let m = problem.h.len();
        let p_eq = problem.b.len();
        let cfg = &self.config;

        // Only the symmetric part of P contributes to the objective
        let p_sym = (&problem.p + problem.p.transpose()) * 0.5;
        let g = &problem.g;
        let a = &problem.a;

        let mut x = DVector::zeros(n);
        let mut y = DVector::zeros(p_eq);
        let mut s = problem.h.map(|v| v.max(1.0));
        let mut z = DVector::from_element(m, 1.0);

        let resy0 = problem.b.norm().max(1.0);
        let resz0 = problem.h.norm().max(1.0);

        let mut gap = f64::INFINITY;
        let mut pres = f64::INFINITY;
        let mut dres = f64::INFINITY;
        let mut best_dres = f64::INFINITY;
        let mut stalled = 0;

        for iteration in 0..cfg.max_iterations {
            let px = &p_sym * &x;
            let gtz = g.transpose() * &z;
            let aty = a.transpose() * &y;
            let r_d = &px + &problem.q + &gtz + &aty;
            let r_p = a * &x - &problem.b;
            let r_g = g * &x + &s - &problem.h;

            gap = s.dot(&z);
            let objective = 0.5 * x.dot(&px) + problem.q.dot(&x);
            pres = (r_p.norm() / resy0).max(r_g.norm() / resz0);
            dres = r_d.norm() / dual_residual_scale(&[&problem.q, &px, &gtz, &aty]);

            let relgap = if objective != 0.0 {
                gap / objective.abs()
            } else {
                f64::INFINITY
            };

            trace!(
                "iteration {iteration}: objective {objective:.6e}, gap {gap:.3e}, pres {pres:.3e}, dres {dres:.3e}"
            );

            if !(gap.is_finite() && pres.is_finite() && dres.is_finite()) {
                return Err(SolverError::NonFinite(iteration));
            }

            let primal_and_gap_done =
                pres <= cfg.feastol && (gap <= cfg.abstol || relgap <= cfg.reltol);

            if primal_and_gap_done && dres <= cfg.feastol {
                debug!("Interior point converged after {iteration} iterations, objective {objective:.6e}");
                return Ok(QpSolution {
                    x,
                    objective,
                    iterations: iteration,
                });
            }

            // Rounding in P x bounds how far the dual residual can fall
            if primal_and_gap_done && dres <= cfg.feastol.sqrt() {
                stalled = if dres < 0.5 * best_dres { 0 } else { stalled + 1 };
                if stalled >= STALL_ITERATIONS {
                    warn!(
                        "Interior point stopped at iteration {iteration} with dual residual {dres:.3e} above {:.1e}",
                        cfg.feastol
                    );
                    return Ok(QpSolution {
                        x,
                        objective,
                        iterations: iteration,
                    });
                }
            }
            best_dres = best_dres.min(dres);

            let mu = gap / m.max(1) as f64;
            let w = z.component_div(&s);

            let mut kkt = DMatrix::zeros(n + p_eq, n + p_eq);
            let gtwg = g.transpose() * DMatrix::from_diagonal(&w) * g;
            kkt.slice_mut((0, 0), (n, n)).copy_from(&(&p_sym + gtwg));
            kkt.slice_mut((0, n), (n, p_eq)).copy_from(&a.transpose());
            kkt.slice_mut((n, 0), (p_eq, n)).copy_from(a);
            let lu = kkt.lu();

            let solve_direction = |r_c: &DVector<f64>| -> Option<Direction> {
                let r_c_over_s = r_c.component_div(&s);
                let rhs_x = -(&r_d + g.transpose() * (w.component_mul(&r_g) + &r_c_over_s));
                let rhs_y = -&r_p;

                let mut rhs = DVector::zeros(n + p_eq);
                rhs.rows_mut(0, n).copy_from(&rhs_x);
                rhs.rows_mut(n, p_eq).copy_from(&rhs_y);
                let sol = lu.solve(&rhs)?;

                let dx = sol.rows(0, n).into_owned();
                let dy = sol.rows(n, p_eq).into_owned();
                let dz = w.component_mul(&(g * &dx + &r_g)) + r_c_over_s;
                let ds = (r_c - s.component_mul(&dz)).component_div(&z);
                Some(Direction { dx, dy, ds, dz })
            };

            // Predictor: pure Newton step towards complementarity zero
            let r_aff = -s.component_mul(&z);
            let affine = solve_direction(&r_aff).ok_or(SolverError::SingularSystem(iteration))?;
            let alpha_aff = max_step(&s, &affine.ds).min(max_step(&z, &affine.dz)).min(1.0);
            let mu_aff = (&s + &affine.ds * alpha_aff).dot(&(&z + &affine.dz * alpha_aff))
                / m.max(1) as f64;
            let sigma = if mu > 0.0 { (mu_aff / mu).powi(3) } else { 0.0 };

            // Corrector: centring plus second order term
            let r_cc = DVector::from_element(m, sigma * mu)
                - s.component_mul(&z)
                - affine.ds.component_mul(&affine.dz);
            let step = solve_direction(&r_cc).ok_or(SolverError::SingularSystem(iteration))?;

            let alpha = (cfg.step_fraction * max_step(&s, &step.ds).min(max_step(&z, &step.dz)))
                .min(1.0);

            x += &step.dx * alpha;
            y += &step.dy * alpha;
            s += &step.ds * alpha;
            z += &step.dz * alpha;
        }

        Err(SolverError::MaxIterations {
            iterations: cfg.max_iterations,
            gap,
            primal_residual: pres,
            dual_residual: dres,
        })
    }
}

/// Normaliser for the dual residual `P x + q + G^T z + A^T y`
///
/// Scaling by the largest term keeps the test relative when `P` dwarfs `q`.
fn dual_residual_scale(terms: &[&DVector<f64>]) -> f64 {
    terms.iter().map(|t| t.norm()).fold(1.0, f64::max)
}

/// Largest `t` with `v + t * dv >= 0`, infinite when `dv` never decreases `v`
fn max_step(v: &DVector<f64>, dv: &DVector<f64>) -> f64 {
    v.iter()
        .zip(dv.iter())
        .filter(|(_, &d)| d < 0.0)
        .map(|(&vi, &d)| -vi / d)
        .fold(f64::INFINITY, f64::min)
}

fn validate(problem: &DualProblem) -> Result<(), SolverError> {
    let n = problem.q.len();
    let m = problem.h.len();
    let p_eq = problem.b.len();

    if n == 0 {
        return Err(SolverError::InvalidProblem("no variables".to_string()));
    }
    if problem.p.shape() != (n, n) {
        return Err(SolverError::InvalidProblem(format!(
            "P is {:?}, expected ({n}, {n})",
            problem.p.shape()
        )));
    }
    if problem.g.shape() != (m, n) {
        return Err(SolverError::InvalidProblem(format!(
            "G is {:?}, expected ({m}, {n})",
            problem.g.shape()
        )));
    }
    if problem.a.shape() != (p_eq, n) {
        return Err(SolverError::InvalidProblem(format!(
            "A is {:?}, expected ({p_eq}, {n})",
            problem.a.shape()
        )));
    }

    let all_finite = problem.p.iter().all(|v| v.is_finite())
        && problem.q.iter().all(|v| v.is_finite())
        && problem.g.iter().all(|v| v.is_finite())
        && problem.h.iter().all(|v| v.is_finite())
        && problem.a.iter().all(|v| v.is_finite())
        && problem.b.iter().all(|v| v.is_finite());
    if !all_finite {
        return Err(SolverError::InvalidProblem(
            "coefficients must be finite".to_string(),
        ));
    }
    Ok(())
}
