use std::f64::consts::PI;
use itertools::Itertools;
use log::debug;
use num_traits::{FromPrimitive, One, Zero};
use toki::{IntOps, Integer, Ratio};
use toki::algo::{det, inv_mod, legendre, prime_power_decomp};
use toki::util::format::table;
use toki_matrix::dense::Mat;

use crate::BilinearForm;

fn int_pow<I>(p: &I, k: usize) -> I
where I: Integer, for<'x> &'x I: IntOps<I> {
    (0..k).fold(I::one(), |a, _| &a * p)
}

/// The Kawauchi–Kojima invariants of a torsion linking form
/// `μ : T × T → Q/Z`, handed over as a symmetric [`BilinearForm`] on a
/// finite group with range `Z/d`, `d` the largest invariant factor of `T`
/// (values `c mod d` standing for `c/d ∈ Q/Z`).
///
/// Everything is computed eagerly at construction; accessors are cheap and
/// deterministic.
#[derive(Clone)]
pub struct TorsionLinkingForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    orientable: bool,
    pp_list: Vec<(I, Vec<usize>)>,       // exponents with repetition, per prime
    pp_vec: Vec<(I, Vec<usize>)>,        // counts n_{p,k} for k = 1..=max
    blocks: Vec<(I, Mat<Ratio<I>>)>,     // the form restricted to each p-part
    sigma: Vec<u8>,                      // 2-torsion σ-vector, 8 = ∞
    legendre_vec: Vec<(I, Vec<i32>)>,    // odd-prime Legendre symbols
    two_tor_cond: bool,
    split: bool,
    hyperbolic: bool,
}

impl<I> TorsionLinkingForm<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(form: &BilinearForm<I>, orientable: bool) -> Self {
        let t = form.lhs();
        assert!(t == form.rhs(), "linking form requires equal sides");
        assert_eq!(t.rank(), 0, "linking form requires a finite group");
        assert!(form.is_symmetric(), "linking form requires a symmetric form");

        let range = form.range();
        assert_eq!(range.rank(), 0, "linking form range must be Z/d");
        assert!(range.num_invariant_factors() <= 1, "linking form range must be cyclic");

        let d = if range.num_invariant_factors() == 1 {
            range.invariant_factor(0).clone()
        } else {
            I::one()
        };
        if let Some(f) = t.tors().last() {
            assert_eq!(&d, f, "range must be Z/lcm of the torsion");
        }

        // phase 1: a generator for each prime power summand. For
        // f_i = p^k·g the vector ĝ·g·e_i generates the Z/p^k part,
        // where ĝ inverts g modulo p^k.
        let mut summands = vec![]; // (p, k, chain rep)
        for (i, f) in t.tors().iter().enumerate() {
            let rep = t.torsion_rep(i);
            for (p, k) in prime_power_decomp(f) {
                let pk = int_pow(&p, k);
                let g = f / &pk;
                let ginv = inv_mod(&g, &pk).unwrap();
                let c = (&g * &ginv).rem_euc(f);
                let rep_p = rep.iter().map(|a| a * &c).collect_vec();
                summands.push((p, k, rep_p));
            }
        }

        // phase 2: group by prime, exponents ascending.
        summands.sort_by(|x, y| x.0.cmp(&y.0).then(x.1.cmp(&y.1)));

        let mut groups: Vec<(I, Vec<usize>, Vec<Vec<I>>)> = vec![];
        for (p, k, rep) in summands {
            if groups.last().is_some_and(|(q, _, _)| q == &p) {
                let (_, ks, reps) = groups.last_mut().unwrap();
                ks.push(k);
                reps.push(rep);
            } else {
                groups.push((p, vec![k], vec![rep]));
            }
        }

        let pp_list = groups.iter()
            .map(|(p, ks, _)| (p.clone(), ks.clone()))
            .collect_vec();

        let pp_vec = groups.iter().map(|(p, ks, _)| {
            let max = *ks.last().unwrap();
            let counts = (1..=max).map(|k| ks.iter().filter(|&&e| e == k).count()).collect_vec();
            (p.clone(), counts)
        }).collect_vec();

        // phase 3: the rational block of the form on each p-primary part.
        let pair = |x: &[I], y: &[I]| -> Ratio<I> {
            let w = form.eval(x, y);
            if range.min_gens() == 0 {
                return Ratio::zero()
            }
            let u = range.snf_rep(&w);
            Ratio::new(u[0].clone(), d.clone())
        };

        let blocks = groups.iter().map(|(p, _, reps)| {
            let n = reps.len();
            let b = Mat::<Ratio<I>>::from_fn((n, n), |a, c| pair(&reps[a], &reps[c]));
            (p.clone(), b)
        }).collect_vec();

        debug!("linking form on {}: {}", t, pp_list.iter()
            .map(|(p, ks)| format!("{p}{ks:?}")).join(" "));

        let two = I::one() + I::one();
        let two_part = groups.iter().position(|(p, _, _)| p == &two);

        // phase 4: σ-vector of the 2-primary part.
        let sigma = if let Some(pos) = two_part {
            let (_, ks, _) = &groups[pos];
            let block = &blocks[pos].1;
            let l = *ks.last().unwrap();
            (1..=l).map(|level| Self::sigma_at(ks, block, level)).collect_vec()
        } else {
            vec![]
        };

        // phase 5: Legendre symbols of the odd-primary diagonal blocks.
        let legendre_vec = groups.iter().zip(blocks.iter())
            .filter(|((p, _, _), _)| p > &two)
            .map(|((p, ks, _), (_, block))| {
                let max = *ks.last().unwrap();
                let symbols = (1..=max).map(|j| {
                    let idxs = ks.iter().positions(|&e| e == j).collect_vec();
                    let pj = int_pow(p, j);

                    let entries = idxs.iter().flat_map(|&a| idxs.iter().map(|&b| {
                        let e = &block[(a, b)] * Ratio::from_numer(pj.clone());
                        assert!(e.is_integer(), "entry of order p^j expected");
                        e.numer().clone()
                    }).collect_vec()).collect_vec();

                    let dt = det(idxs.len(), &entries);
                    legendre(&dt, p)
                }).collect_vec();

                (p.clone(), symbols)
            }).collect_vec();

        // phase 6: interpretation.
        let even_ranks = pp_vec.iter().all(|(_, counts)| counts.iter().all(|n| n % 2 == 0));
        let sigma_ok = sigma.iter().all(|s| *s == 0 || *s == 8);

        let split = even_ranks && sigma_ok && legendre_vec.iter().all(|(p, symbols)| {
            let counts = &pp_vec.iter().find(|(q, _)| q == p).unwrap().1;
            symbols.iter().zip(counts.iter()).all(|(l, n)| {
                // the required symbol flips with the parity of n(p-1)/4.
                let par = (I::from_usize(*n).unwrap() * (p - I::one())) / (&two * &two);
                let want = if par.rem_euc(&two).is_zero() { 1 } else { -1 };
                *l == want
            })
        });

        let hyperbolic = split && sigma.iter().all(|s| *s == 0);

        let two_tor_cond = two_part.is_none_or(|pos| {
            let (_, ks, _) = &groups[pos];
            let block = &blocks[pos].1;
            ks.iter().enumerate().all(|(a, k)| {
                let r = &block[(a, a)] * Ratio::from_numer(int_pow(&two, k - 1));
                r.frac().is_zero()
            })
        });

        Self {
            orientable,
            pp_list, pp_vec, blocks,
            sigma, legendre_vec,
            two_tor_cond, split, hyperbolic
        }
    }

    // The Gauss sum Σ_x exp(2πi·2^{level-1}·μ(x, x)) over the full
    // 2-primary subgroup, classified into octants. The sum is either zero
    // or a vector of integer length, so the 1e-7 / 1e-3 thresholds are
    // safely inside the gaps.
    fn sigma_at(ks: &[usize], block: &Mat<Ratio<I>>, level: usize) -> u8 {
        let two = I::one() + I::one();
        let scale = Ratio::from_numer(int_pow(&two, level - 1));

        let moduli = ks.iter().map(|k| 1_u64 << k).collect_vec();
        let mut x = vec![0_u64; moduli.len()];

        let (mut re, mut im) = (0.0, 0.0);

        loop {
            let mut q = Ratio::zero();
            for a in 0..x.len() {
                if x[a] == 0 { continue }
                for b in 0..x.len() {
                    if x[b] == 0 { continue }
                    let c = I::from_u64(x[a] * x[b]).unwrap();
                    q += &block[(a, b)] * Ratio::from_numer(c);
                }
            }

            let ang = (&q * &scale).frac().to_f64_lossy() * 2.0 * PI;
            re += ang.cos();
            im += ang.sin();

            // odometer: increment the lowest digit, carrying upwards.
            let mut pos = 0;
            while pos < x.len() {
                x[pos] += 1;
                if x[pos] < moduli[pos] { break }
                x[pos] = 0;
                pos += 1;
            }
            if pos == x.len() { break }
        }

        if re * re + im * im < 1e-7 {
            return 8 // the zero sum: ∞
        }

        if re.abs() < 1e-3 * im.abs() {
            if im > 0.0 { 2 } else { 6 }
        } else if im.abs() < 1e-3 * re.abs() {
            if re > 0.0 { 0 } else { 4 }
        } else if re / im > 0.0 {
            if re > 0.0 { 1 } else { 5 }
        } else if re > 0.0 { 7 } else { 3 }
    }

    pub fn orientable(&self) -> bool {
        self.orientable
    }

    /// `[(p, [n_{p,1}, n_{p,2}, …])]`: how many `Z/p^k` summands appear.
    pub fn rank_vector(&self) -> &[(I, Vec<usize>)] {
        &self.pp_vec
    }

    /// `[(p, [k_1, k_2, …])]`: the exponents with repetition, ascending.
    pub fn exponent_list(&self) -> &[(I, Vec<usize>)] {
        &self.pp_list
    }

    pub fn sigma_vector(&self) -> &[u8] {
        &self.sigma
    }

    pub fn legendre_vector(&self) -> &[(I, Vec<i32>)] {
        &self.legendre_vec
    }

    /// The form restricted to the `p`-primary part, over `Q/Z` with common
    /// denominator.
    pub fn block(&self, p: &I) -> Option<&Mat<Ratio<I>>> {
        self.blocks.iter().find(|(q, _)| q == p).map(|(_, b)| b)
    }

    pub fn is_split(&self) -> bool {
        self.split
    }

    pub fn is_hyperbolic(&self) -> bool {
        self.hyperbolic
    }

    /// The Kawauchi–Kojima 2-torsion condition: `2^{k_i-1}·μ(g_i, g_i)`
    /// is integral for every 2-torsion generator.
    pub fn two_torsion_condition(&self) -> bool {
        self.two_tor_cond
    }

    pub fn rank_vector_string(&self) -> String {
        if self.pp_vec.is_empty() {
            return String::from("no torsion")
        }
        self.pp_vec.iter().map(|(p, counts)|
            format!("{p}({})", counts.iter().join(" "))
        ).join(" ")
    }

    pub fn sigma_string(&self) -> String {
        if !self.orientable {
            return String::from("sigma vector undefined (non-orientable)")
        }
        if self.sigma.is_empty() {
            return String::from("no 2-torsion")
        }
        self.sigma.iter().map(|s|
            if *s == 8 { String::from("inf") } else { s.to_string() }
        ).join(" ")
    }

    pub fn legendre_string(&self) -> String {
        if !self.orientable {
            return String::from("Legendre vector undefined (non-orientable)")
        }
        if self.legendre_vec.is_empty() {
            return String::from("no odd p-torsion")
        }
        self.legendre_vec.iter().map(|(p, symbols)|
            format!("{p}({})", symbols.iter().join(" "))
        ).join(" ")
    }

    /// A tabular dump of the `p`-primary block, for diagnostics.
    pub fn block_string(&self, p: &I) -> Option<String> {
        self.block(p).map(|b| {
            let n = b.inner().nrows();
            table(format!("p = {p}"), 0..n, 0..n, |i, j| &b[(*i, *j)])
        })
    }
}
