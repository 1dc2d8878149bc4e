//! # **FuncOpts Module** - *Per-call options*
//!
//! Builder-style options controlling where a dispatched operation writes its
//! result, whether shapes may broadcast, the output convention of
//! comparisons, and cooperative cancellation.
//!
//! ## Destination
//! At most one of these may be set:
//! - `reuse`: overwrite a caller-supplied array.
//! - `increment`: accumulate into a caller-supplied array with `+=`.
//! - `unsafe_in_place`: write into the left operand (the right one when the
//!   left side is a scalar).
//!
//! With none of them a fresh array is allocated.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::enums::error::KernelError;
use crate::enums::kind::NumericKind;
use crate::Array;

/// Shared cancellation flag with an optional deadline.
///
/// Checked once when a call starts; a running kernel is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that reports cancelled once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// Cancels this token and every clone of it.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// # FuncOpts
///
/// ## Example
/// ```rust
/// use minstride::{DenseArray, FuncOpts, NumericKind};
///
/// let out = DenseArray::filled(&[3], 0i32);
/// let opts = FuncOpts::new().with_reuse(out.into()).broadcast(true);
/// assert!(opts.validate().is_ok());
///
/// let bad = FuncOpts::new().unsafe_in_place().with_increment(DenseArray::filled(&[3], 0i32).into());
/// assert!(bad.validate().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FuncOpts {
    pub reuse: Option<Array>,
    pub increment: Option<Array>,
    pub unsafe_in_place: bool,
    pub broadcast: bool,
    pub as_kind: Option<NumericKind>,
    pub same_kind: bool,
    pub context: Option<CancelToken>,
}

impl FuncOpts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite `dest` with the result.
    pub fn with_reuse(mut self, dest: Array) -> Self {
        self.reuse = Some(dest);
        self
    }

    /// Add the result into `dest`.
    pub fn with_increment(mut self, dest: Array) -> Self {
        self.increment = Some(dest);
        self
    }

    /// Write into the left operand's buffer.
    pub fn unsafe_in_place(mut self) -> Self {
        self.unsafe_in_place = true;
        self
    }

    /// Allow numpy-style broadcasting between unequal shapes.
    pub fn broadcast(mut self, enabled: bool) -> Self {
        self.broadcast = enabled;
        self
    }

    /// Requested output kind.
    ///
    /// For comparisons `Bool` selects a bool array and the operand kind selects
    /// the truthy encoding. Arithmetic only accepts the operand kind.
    pub fn as_kind(mut self, kind: NumericKind) -> Self {
        self.as_kind = Some(kind);
        self
    }

    /// Comparisons write their result in the operand kind.
    pub fn same_kind(mut self) -> Self {
        self.same_kind = true;
        self
    }

    pub fn with_context(mut self, token: CancelToken) -> Self {
        self.context = Some(token);
        self
    }

    /// Rejects mutually exclusive destinations.
    pub fn validate(&self) -> Result<(), KernelError> {
        let set = [
            self.reuse.is_some(),
            self.increment.is_some(),
            self.unsafe_in_place,
        ]
        .iter()
        .filter(|&&b| b)
        .count();
        if set > 1 {
            return Err(KernelError::ConflictingOptions(format!(
                "only one destination may be chosen, got {}",
                self.destination_label()
            )));
        }
        Ok(())
    }

    /// `Cancelled` when the context token has fired or its deadline passed.
    pub fn check_cancelled(&self) -> Result<(), KernelError> {
        match &self.context {
            Some(token) if token.is_cancelled() => Err(KernelError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Short description of the chosen destination, for diagnostics.
    pub fn destination_label(&self) -> String {
        let mut parts = Vec::new();
        if self.reuse.is_some() {
            parts.push("reuse");
        }
        if self.increment.is_some() {
            parts.push("increment");
        }
        if self.unsafe_in_place {
            parts.push("unsafe");
        }
        if parts.is_empty() {
            "fresh".to_string()
        } else {
            parts.join("+")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DenseArray;

    fn dest() -> Array {
        DenseArray::filled(&[2], 0.0f64).into()
    }

    #[test]
    fn test_single_destination_ok() {
        assert!(FuncOpts::new().validate().is_ok());
        assert!(FuncOpts::new().with_reuse(dest()).validate().is_ok());
        assert!(FuncOpts::new().with_increment(dest()).validate().is_ok());
        assert!(FuncOpts::new().unsafe_in_place().validate().is_ok());
        assert_eq!(FuncOpts::new().destination_label(), "fresh");
    }

    #[test]
    fn test_conflicting_destinations() {
        let opts = FuncOpts::new().with_reuse(dest()).with_increment(dest());
        assert_eq!(opts.destination_label(), "reuse+increment");
        assert!(matches!(
            opts.validate(),
            Err(KernelError::ConflictingOptions(_))
        ));
        let opts = FuncOpts::new().with_reuse(dest()).unsafe_in_place();
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let opts = FuncOpts::new().with_context(token.clone());
        assert!(opts.check_cancelled().is_ok());
        token.cancel();
        assert_eq!(opts.check_cancelled(), Err(KernelError::Cancelled));
    }

    #[test]
    fn test_deadline() {
        let past = CancelToken::with_timeout(Duration::ZERO);
        assert!(past.is_cancelled());
        let future = CancelToken::with_timeout(Duration::from_secs(3600));
        assert!(!future.is_cancelled());
    }
}
