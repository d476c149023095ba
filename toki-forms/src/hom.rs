use std::fmt::{Debug, Display};
use std::ops::Mul;
use itertools::Itertools;
use log::debug;
use toki::{IntOps, Integer};
use toki_matrix::dense::{snf, Mat, MatTrait};

use crate::MarkedAbelianGroup;

/// A homomorphism between marked abelian groups, defined by an integer
/// matrix in the chain coordinates of both sides. The matrix must carry
/// cycles to cycles and boundaries to boundaries; both are checked at
/// construction, together with the canonical reduced matrix in SNF
/// coordinates (torsion rows canonical modulo the codomain invariant
/// factors).
#[derive(Clone)]
pub struct MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    src: MarkedAbelianGroup<I>,
    dst: MarkedAbelianGroup<I>,
    mat: Mat<I>, // dst.rank_cc × src.rank_cc
    red: Mat<I>, // dst.min_gens × src.min_gens
}

impl<I> MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    pub fn new(src: MarkedAbelianGroup<I>, dst: MarkedAbelianGroup<I>, mat: Mat<I>) -> Self {
        assert_eq!(mat.shape(), (dst.rank_cc(), src.rank_cc()));

        // cycles must map to cycles ...
        let on_cycles = dst.m() * &(&mat * src.cycle_basis());
        assert!(on_cycles.is_zero(), "matrix does not map cycles to cycles");

        // ... and boundaries to boundaries.
        let on_bnds = &mat * src.n();
        for j in 0..on_bnds.ncols() {
            assert!(
                dst.is_boundary(&on_bnds.col_vec(j)),
                "matrix does not map boundaries to boundaries"
            );
        }

        let cols = (0..src.min_gens()).map(|j|
            dst.snf_rep(&mat.mul_vec(&src.cc_rep(j)))
        ).collect_vec();

        let red = Mat::from_fn((dst.min_gens(), src.min_gens()), |i, j|
            cols[j][i].clone()
        );

        debug!("hom {} -> {}, reduced {:?}", src, dst, red.shape());

        Self { src, dst, mat, red }
    }

    pub fn identity(g: &MarkedAbelianGroup<I>) -> Self {
        Self::new(g.clone(), g.clone(), Mat::id(g.rank_cc()))
    }

    pub fn zero_hom(src: MarkedAbelianGroup<I>, dst: MarkedAbelianGroup<I>) -> Self {
        let mat = Mat::zero((dst.rank_cc(), src.rank_cc()));
        Self::new(src, dst, mat)
    }

    pub fn src(&self) -> &MarkedAbelianGroup<I> {
        &self.src
    }

    pub fn dst(&self) -> &MarkedAbelianGroup<I> {
        &self.dst
    }

    /// The defining matrix, in chain coordinates.
    pub fn mat(&self) -> &Mat<I> {
        &self.mat
    }

    /// The induced matrix in SNF coordinates of both sides.
    pub fn reduced_matrix(&self) -> &Mat<I> {
        &self.red
    }

    pub fn eval_cc(&self, v: &[I]) -> Vec<I> {
        assert_eq!(v.len(), self.src.rank_cc());
        self.mat.mul_vec(v)
    }

    /// `self ∘ rhs`.
    pub fn compose(&self, rhs: &Self) -> Self {
        assert!(rhs.dst == self.src, "composition with mismatched domain/range");
        let mat = &self.mat * &rhs.mat;
        Self::new(rhs.src.clone(), self.dst.clone(), mat)
    }

    /// The image as a subgroup of the codomain.
    pub fn image(&self) -> MarkedAbelianGroup<I> {
        let lam = self.dst.tor_relations();
        let gens = self.red.concat(&lam);
        MarkedAbelianGroup::quotient_lattice(&gens, &lam)
    }

    /// The kernel, as a group.
    pub fn kernel(&self) -> MarkedAbelianGroup<I> {
        let a = self.src.min_gens();
        let lam = self.dst.tor_relations();

        // x lies in the kernel iff red·x is a combination of the codomain
        // relations; project the solution lattice of [red | Λ] onto x.
        let c = self.red.concat(&lam);
        let s = snf(&c, [false, false, true, true]);
        let kb = s.q().unwrap().submat_cols(s.rank()..c.ncols());
        let kx = kb.submat_rows(0..a);

        MarkedAbelianGroup::quotient_lattice(&kx, &self.src.tor_relations())
    }

    /// The cokernel, as a group.
    pub fn cokernel(&self) -> MarkedAbelianGroup<I> {
        let rels = self.red.concat(&self.dst.tor_relations());
        MarkedAbelianGroup::from_presentation(rels)
    }

    pub fn is_zero(&self) -> bool {
        self.red.is_zero() // reduced entries are canonical.
    }

    pub fn is_identity(&self) -> bool {
        self.src == self.dst && self.red.is_id()
    }

    pub fn is_monic(&self) -> bool {
        self.kernel().is_trivial()
    }

    pub fn is_epic(&self) -> bool {
        self.cokernel().is_trivial()
    }

    pub fn is_iso(&self) -> bool {
        self.is_monic() && self.is_epic()
    }
}

impl<I> PartialEq for MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    // Homs agree iff their reduced matrices agree (entries are canonical
    // modulo the codomain invariant factors).
    fn eq(&self, other: &Self) -> bool {
        self.src == other.src && self.dst == other.dst && self.red == other.red
    }
}

impl<I> Eq for MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {}

impl<'a, 'b, I> Mul<&'b MagHom<I>> for &'a MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    type Output = MagHom<I>;
    fn mul(self, rhs: &'b MagHom<I>) -> Self::Output {
        self.compose(rhs)
    }
}

impl<I> Display for MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}

impl<I> Debug for MagHom<I>
where I: Integer, for<'x> &'x I: IntOps<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}: {:?}", self.src, self.dst, self.red)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type G = MarkedAbelianGroup<i64>;
    type H = MagHom<i64>;

    #[test]
    fn identity() {
        let g = G::from_presentation(Mat::from_data((2, 1), [2, 0]));
        assert_eq!(g.to_string(), "Z ⊕ (Z/2)");

        let f = H::identity(&g);
        assert!(f.is_identity());
        assert!(f.is_iso());
        assert!(!f.is_zero());
        assert!(f.image().is_isomorphic_to(&g));
        assert!(f.kernel().is_trivial());
        assert!(f.cokernel().is_trivial());
    }

    #[test]
    fn zero_hom() {
        let g = G::free(2);
        let f = H::zero_hom(g.clone(), g.clone());
        assert!(f.is_zero());
        assert!(!f.is_monic());
        assert!(!f.is_epic());
        assert!(f.image().is_trivial());
        assert_eq!(f.kernel().rank(), 2);
    }

    #[test]
    fn projection() {
        // Z² -> Z, (x, y) ↦ x.
        let f = H::new(G::free(2), G::free(1), Mat::from_data((1, 2), [1, 0]));

        assert!(f.is_epic());
        assert!(!f.is_monic());
        assert_eq!(f.image().rank(), 1);
        assert_eq!(f.kernel().rank(), 1);
    }

    #[test]
    fn mul_by_two() {
        // Z -> Z, x ↦ 2x.
        let f = H::new(G::free(1), G::free(1), Mat::from_data((1, 1), [2]));

        assert!(f.is_monic());
        assert!(!f.is_epic());
        assert!(!f.is_iso());
        assert!(f.image().is_isomorphic_to(&G::free(1)));

        let c = f.cokernel();
        assert_eq!(c.rank(), 0);
        assert_eq!(c.tors(), &[2]);
    }

    #[test]
    fn cyclic_reduction() {
        // Z/4 -> Z/2, the canonical surjection.
        let src = G::from_presentation(Mat::from_data((1, 1), [4]));
        let dst = G::from_presentation(Mat::from_data((1, 1), [2]));
        let f = H::new(src, dst, Mat::id(1));

        assert!(f.is_epic());
        assert!(!f.is_monic());

        let k = f.kernel();
        assert_eq!(k.rank(), 0);
        assert_eq!(k.tors(), &[2]);
    }

    #[test]
    fn rank_nullity_free() {
        // Z³ -> Z², rank 2 image, rank 1 kernel.
        let f = H::new(G::free(3), G::free(2), Mat::from_data((2, 3), [
            1, 0, 0,
            0, 2, 0
        ]));

        let (im, ker) = (f.image(), f.kernel());
        assert_eq!(im.rank() + ker.rank(), 3);
        assert_eq!(im.rank(), 2);
        assert!(im.is_free()); // a subgroup of a free group.
    }

    #[test]
    fn compose() {
        let f = H::new(G::free(2), G::free(2), Mat::from_data((2, 2), [1, 1, 0, 1]));
        let g = H::new(G::free(2), G::free(2), Mat::from_data((2, 2), [2, 0, 0, 1]));
        let gf = g.compose(&f);

        let v = vec![3, -1];
        assert_eq!(gf.eval_cc(&v), g.eval_cc(&f.eval_cc(&v)));
        assert_eq!(&g * &f, gf);

        assert!(f.is_iso());
        assert!(!g.is_iso());
        assert!(g.is_monic());
    }

    #[test]
    fn iso_iff_monic_and_epic() {
        let g = G::from_presentation(Mat::from_data((1, 1), [6]));

        // multiplication by 5 is an automorphism of Z/6.
        let f = H::new(g.clone(), g.clone(), Mat::from_data((1, 1), [5]));
        assert!(f.is_monic());
        assert!(f.is_epic());
        assert!(f.is_iso());

        // multiplication by 2 is neither monic nor epic on Z/6.
        let f = H::new(g.clone(), g.clone(), Mat::from_data((1, 1), [2]));
        assert!(!f.is_monic());
        assert!(!f.is_epic());
        assert!(!f.is_iso());
    }

    #[test]
    fn torsion_to_free_is_zero() {
        let src = G::from_presentation(Mat::from_data((1, 1), [3]));
        let f = H::zero_hom(src, G::free(1));
        assert!(f.is_zero());
        assert!(f.image().is_trivial());
        assert_eq!(f.kernel().tors(), &[3]);
    }

    #[test]
    #[should_panic]
    fn bad_chain_map() {
        // Z/2 -> Z with the identity matrix is not a chain map:
        // the boundary 2·e does not map to a boundary.
        let src = G::from_presentation(Mat::from_data((1, 1), [2]));
        let _ = H::new(src, G::free(1), Mat::id(1));
    }

    #[test]
    #[should_panic]
    fn bad_composition() {
        let f = H::identity(&G::free(2));
        let g = H::identity(&G::free(3));
        let _ = g.compose(&f);
    }
}
