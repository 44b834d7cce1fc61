//! Lazy sums of same-shape operators.
//!
//! An [`AddedOperator`] keeps its terms in order and never nests another sum:
//! operands that are themselves sums are unrolled into the parent's term list
//! when the sum is built.
//!
//! The in-place apply is the hot path. The first contributing term writes
//! straight into the destination; every later term is applied into a scratch
//! buffer owned by the sum and accumulated from there. The scratch is sized
//! on first use and reused afterwards, so an arbitrary number of terms costs
//! one temporary in total.
//!
//! The scratch is plain owned state with no locking. Two threads must not run
//! `apply_into` on the same instance at once; clone the operator per thread
//! instead (clones get their own scratch and share any backing arrays).

use crate::config::options::EvalOptions;
use crate::core::traits::Scalar;
use crate::error::{OpError, check_dim, check_shape};
use crate::operator::Operator;
use crate::operator::capabilities::Capabilities;
use log::trace;

/// Ordered, flattened sum of operators with an owned scratch buffer.
#[derive(Clone, Debug)]
pub struct AddedOperator<T> {
    terms: Vec<Operator<T>>,
    scratch: Option<Vec<T>>,
    scratch_allocations: usize,
    options: EvalOptions,
    caps: Capabilities,
}

impl<T: Scalar> AddedOperator<T> {
    /// Sum of `ops` with default evaluation options.
    ///
    /// Fails with `EmptySum` when `ops` is empty and with `DimensionMismatch`
    /// when the terms disagree in shape. A single term is accepted.
    pub fn new(ops: Vec<Operator<T>>) -> Result<Self, OpError> {
        Self::with_options(ops, EvalOptions::default())
    }

    /// Sum of `ops` with explicit evaluation options.
    ///
    /// # Arguments
    /// * `ops` - Terms in evaluation order; nested sums are unrolled in place
    /// * `options` - Accumulation switches, see [`EvalOptions`]
    ///
    /// # Returns
    /// * `Err(EmptySum)` if `ops` is empty
    /// * `Err(DimensionMismatch)` if any term's shape differs from the first
    pub fn with_options(ops: Vec<Operator<T>>, options: EvalOptions) -> Result<Self, OpError> {
        let mut terms = Vec::with_capacity(ops.len());
        for op in ops {
            match op {
                Operator::Added(sum) => {
                    trace!("flattening nested sum of {} terms", sum.terms.len());
                    terms.extend(sum.terms);
                }
                other => terms.push(other),
            }
        }
        let shape = terms.first().ok_or(OpError::EmptySum)?.size();
        for term in &terms[1..] {
            check_shape(shape, term.size())?;
        }
        let caps = Self::capabilities_of(&terms);
        Ok(Self { terms, scratch: None, scratch_allocations: 0, options, caps })
    }

    fn capabilities_of(terms: &[Operator<T>]) -> Capabilities {
        let all = |flag: Capabilities| terms.iter().all(|t| t.capabilities().contains(flag));
        let mut caps = terms[0].capabilities() & Capabilities::SQUARE;
        for flag in [
            Capabilities::CONSTANT,
            Capabilities::ZERO,
            Capabilities::ADJOINT,
            Capabilities::IN_PLACE_APPLY,
        ] {
            caps.set(flag, all(flag));
        }
        // A sum only inherits a solve from a lone term.
        if terms.len() == 1 {
            caps |= terms[0].capabilities() & Capabilities::INVERTIBLE;
        }
        caps
    }

    /// The flattened terms, in order.
    pub fn terms(&self) -> &[Operator<T>] {
        &self.terms
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Always false for a constructed sum.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    /// How many times the scratch buffer has been (re)allocated.
    pub fn scratch_allocations(&self) -> usize {
        self.scratch_allocations
    }

    pub fn size(&self) -> (usize, usize) {
        self.terms[0].size()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn skips(options: EvalOptions, term: &Operator<T>) -> bool {
        options.skip_zero_terms && term.is_zero()
    }

    /// Sum of `term.apply(x)` into a fresh vector, skipping zero terms when
    /// the options say so.
    pub fn apply(&self, x: &[T]) -> Result<Vec<T>, OpError> {
        let (rows, cols) = self.size();
        check_dim(cols, x.len())?;
        let mut y = vec![T::zero(); rows];
        for term in self.terms.iter().filter(|t| !Self::skips(self.options, t)) {
            let contribution = term.apply(x)?;
            for (yi, ci) in y.iter_mut().zip(contribution) {
                *yi = *yi + ci;
            }
        }
        Ok(y)
    }

    /// In-place sum into `y`.
    ///
    /// # Arguments
    /// * `x` - Input vector of length `ncols`
    /// * `y` - Output of length `nrows`; overwritten, its prior contents are ignored
    pub fn apply_into(&mut self, x: &[T], y: &mut [T]) -> Result<(), OpError> {
        let (rows, cols) = self.size();
        check_dim(cols, x.len())?;
        check_dim(rows, y.len())?;
        let Self { terms, scratch, scratch_allocations, options, .. } = self;
        let options = *options;
        let mut active = terms.iter_mut().filter(|t| !Self::skips(options, t));
        let Some(first) = active.next() else {
            y.fill(T::zero());
            return Ok(());
        };
        first.apply_into(x, y)?;
        for term in active {
            let buf = scratch_buffer(scratch, scratch_allocations, rows);
            term.apply_into(x, buf)?;
            for (yi, si) in y.iter_mut().zip(buf.iter()) {
                *yi = *yi + *si;
            }
        }
        Ok(())
    }

    pub fn solve(&self, b: &[T]) -> Result<Vec<T>, OpError> {
        match self.terms.as_slice() {
            [only] => only.solve(b),
            _ => Err(OpError::Unsupported("sum of operators has no native solve")),
        }
    }

    pub fn solve_into(&mut self, b: &[T], x: &mut [T]) -> Result<(), OpError> {
        match self.terms.as_mut_slice() {
            [only] => only.solve_into(b, x),
            _ => Err(OpError::Unsupported("sum of operators has no native solve")),
        }
    }

    /// Sum of the terms' adjoints.
    ///
    /// An existing scratch buffer is carried over, so the adjoint of a square
    /// sum that has already been applied in place does not allocate again.
    pub fn adjoint(&self) -> Result<Operator<T>, OpError> {
        let terms = self
            .terms
            .iter()
            .map(|t| t.adjoint())
            .collect::<Result<Vec<_>, _>>()?;
        let mut adjoint = Self::with_options(terms, self.options)?;
        adjoint.scratch = self.scratch.clone();
        Ok(Operator::Added(adjoint))
    }

    pub fn refresh(&mut self, u: &[T], p: &[T], t: T) {
        for term in self.terms.iter_mut() {
            term.refresh(u, p, t);
        }
        self.caps = Self::capabilities_of(&self.terms);
    }
}

/// Scratch of length `len`, allocating only when missing or mis-sized.
fn scratch_buffer<'a, T: Scalar>(
    slot: &'a mut Option<Vec<T>>,
    allocations: &mut usize,
    len: usize,
) -> &'a mut [T] {
    if !matches!(slot.as_ref(), Some(buf) if buf.len() == len) {
        trace!("allocating sum scratch of length {}", len);
        *allocations += 1;
        *slot = Some(vec![T::zero(); len]);
    }
    slot.get_or_insert_with(Vec::new).as_mut_slice()
}
