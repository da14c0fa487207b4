//! One-time attribution of hidden tokens to model nodes

/// Which side of a node claimed a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimSide {
    Left,
    Right,
    Sweep,
}

/// Tracks which hidden tokens of a single parse have been handed out
///
/// A tracker is created per parse call and owned by the builder, so parses
/// running on different threads never share claim state.
#[derive(Debug, Clone, Default)]
pub struct ClaimTracker {
    claims: Vec<Option<ClaimSide>>,
}

impl ClaimTracker {
    /// Tracker for a token stream of `len` tokens
    pub fn new(len: usize) -> Self {
        Self {
            claims: vec![None; len],
        }
    }

    /// Claim a token as leading or interior formatting of the node to its right
    pub fn claim_left(&mut self, index: usize) -> bool {
        self.claim(index, ClaimSide::Left)
    }

    /// Claim a token as trailing formatting of the node to its left
    pub fn claim_right(&mut self, index: usize) -> bool {
        self.claim(index, ClaimSide::Right)
    }

    /// Claim a leftover token for the end-of-input bucket
    pub fn claim_sweep(&mut self, index: usize) -> bool {
        self.claim(index, ClaimSide::Sweep)
    }

    pub fn is_claimed(&self, index: usize) -> bool {
        self.side(index).is_some()
    }

    pub fn side(&self, index: usize) -> Option<ClaimSide> {
        self.claims.get(index).copied().flatten()
    }

    /// Number of tokens claimed so far
    pub fn claimed_count(&self) -> usize {
        self.claims.iter().filter(|claim| claim.is_some()).count()
    }

    fn claim(&mut self, index: usize, side: ClaimSide) -> bool {
        match self.claims.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(side);
                true
            }
            _ => false,
        }
    }
}
