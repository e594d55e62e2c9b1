// handle -> dense register index resolution.
//
// frontends hand us pointer-like tokens (the same raw value can denote a
// qubit in one instruction and a result in another), so handle values are
// never usable as array indices. each kind gets its own arena of dense
// zero-based indices, assigned in order of first appearance across the
// instruction stream. the mapping is built once per module and shared
// read-only across all shots.

use crate::error::{EngineError, Result};
use crate::instructions::{Handle, HandleKind};
use std::collections::HashMap;

pub struct HandleResolver {
    qubits: Option<HashMap<Handle, usize>>,
    results: Option<HashMap<Handle, usize>>,
}

impl HandleResolver {
    /// Resolver tracking both qubit and result handles.
    pub fn new() -> Self {
        HandleResolver {
            qubits: Some(HashMap::new()),
            results: Some(HashMap::new()),
        }
    }

    /// Resolver restricted to the given kinds. Referencing an untracked
    /// kind is a fatal integrity violation, not a recoverable error.
    pub fn with_kinds(kinds: &[HandleKind]) -> Self {
        HandleResolver {
            qubits: kinds
                .contains(&HandleKind::Qubit)
                .then(HashMap::new),
            results: kinds
                .contains(&HandleKind::Result)
                .then(HashMap::new),
        }
    }

    fn table(&self, kind: HandleKind) -> Result<&HashMap<Handle, usize>> {
        let table = match kind {
            HandleKind::Qubit => self.qubits.as_ref(),
            HandleKind::Result => self.results.as_ref(),
        };
        table.ok_or(EngineError::UnknownHandleKind { kind })
    }

    fn table_mut(&mut self, kind: HandleKind) -> Result<&mut HashMap<Handle, usize>> {
        let table = match kind {
            HandleKind::Qubit => self.qubits.as_mut(),
            HandleKind::Result => self.results.as_mut(),
        };
        table.ok_or(EngineError::UnknownHandleKind { kind })
    }

    /// Allocating form, used during the module pre-scan. The first call for
    /// a (handle, kind) pair takes the next unused index for that kind;
    /// repeat calls return the index already assigned.
    pub fn assign(&mut self, handle: Handle, kind: HandleKind) -> Result<usize> {
        let table = self.table_mut(kind)?;
        let next = table.len();
        Ok(*table.entry(handle).or_insert(next))
    }

    /// Read-only form, used during shots. Every handle a well-formed module
    /// references was assigned during the pre-scan.
    pub fn resolve(&self, handle: Handle, kind: HandleKind) -> Result<usize> {
        self.table(kind)?
            .get(&handle)
            .copied()
            .ok_or(EngineError::UnresolvedHandle { handle, kind })
    }

    /// Number of distinct handles assigned for a kind (0 if untracked).
    pub fn count(&self, kind: HandleKind) -> usize {
        match kind {
            HandleKind::Qubit => self.qubits.as_ref().map_or(0, HashMap::len),
            HandleKind::Result => self.results.as_ref().map_or(0, HashMap::len),
        }
    }
}

impl Default for HandleResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn assign_is_idempotent() {
        let mut r = HandleResolver::new();
        let h = Handle::from_raw(0x7fff_0010);
        let first = r.assign(h, HandleKind::Qubit).unwrap();
        let second = r.assign(h, HandleKind::Qubit).unwrap();
        assert_eq!(first, second);
        assert_eq!(r.count(HandleKind::Qubit), 1);
    }

    #[test]
    fn kinds_are_separate_arenas() {
        let mut r = HandleResolver::new();
        let h = Handle::from_raw(42);
        assert_eq!(r.assign(h, HandleKind::Qubit).unwrap(), 0);
        assert_eq!(r.assign(h, HandleKind::Result).unwrap(), 0);
        assert_eq!(r.count(HandleKind::Qubit), 1);
        assert_eq!(r.count(HandleKind::Result), 1);
    }

    #[test]
    fn untracked_kind_is_rejected() {
        let mut r = HandleResolver::with_kinds(&[HandleKind::Qubit]);
        let err = r.assign(Handle::from_raw(1), HandleKind::Result).unwrap_err();
        assert_eq!(
            err,
            EngineError::UnknownHandleKind {
                kind: HandleKind::Result
            }
        );
    }

    #[test]
    fn unseen_handle_does_not_resolve() {
        let r = HandleResolver::new();
        assert!(r.resolve(Handle::from_raw(9), HandleKind::Qubit).is_err());
    }

    proptest! {
        // distinct handles of one kind get distinct indices densely
        // covering 0..count, whatever the raw values look like
        #[test]
        fn indices_are_dense_and_stable(raws in proptest::collection::vec(any::<u64>(), 1..200)) {
            let mut r = HandleResolver::new();
            let mut assigned = Vec::new();
            for raw in &raws {
                let idx = r.assign(Handle::from_raw(*raw), HandleKind::Qubit).unwrap();
                assigned.push((*raw, idx));
            }

            let count = r.count(HandleKind::Qubit);
            let mut seen = vec![false; count];
            for (raw, idx) in &assigned {
                // stable under re-resolution
                prop_assert_eq!(
                    r.resolve(Handle::from_raw(*raw), HandleKind::Qubit).unwrap(),
                    *idx
                );
                prop_assert!(*idx < count);
                seen[*idx] = true;
            }
            // dense: every index in 0..count was handed out
            prop_assert!(seen.iter().all(|s| *s));
        }
    }
}
