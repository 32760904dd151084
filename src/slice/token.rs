//! Tokens, fragments and rings.
//!
//! A cross-section boundary is tracked combinatorially as a chain of
//! [`Token`]s alternating between mesh edges (where the boundary crosses an
//! edge) and faces (the triangle it runs across in between). An open chain is
//! a [`Fragment`]; a fragment whose first and last tokens are the same edge is
//! a ring, one closed loop of the cross-section.

use std::collections::HashMap;
use std::fmt;

use crate::mesh::{EdgeId, FaceId};

/// One element of a boundary chain.
///
/// Tokens compare by the identity of the element they reference. Edge tokens
/// order before face tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
    /// The boundary crosses this edge.
    Edge(EdgeId),
    /// The boundary runs across this triangle.
    Face(FaceId),
}

impl Token {
    /// The referenced edge, if this is an edge token.
    #[inline]
    pub fn edge(self) -> Option<EdgeId> {
        match self {
            Token::Edge(e) => Some(e),
            Token::Face(_) => None,
        }
    }

    /// Whether this is an edge token.
    #[inline]
    pub fn is_edge(self) -> bool {
        matches!(self, Token::Edge(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Edge(e) => write!(f, "e{}", e.index()),
            Token::Face(t) => write!(f, "f{}", t.index()),
        }
    }
}

/// A directed chain of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Fragment {
    tokens: Vec<Token>,
}

impl Fragment {
    /// Create a fragment from its tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The tokens in chain order.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Consume the fragment, returning its tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Number of tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the fragment has no tokens.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The first token, where the chain starts.
    #[inline]
    pub fn first(&self) -> Option<Token> {
        self.tokens.first().copied()
    }

    /// The last token, where the chain ends.
    #[inline]
    pub fn last(&self) -> Option<Token> {
        self.tokens.last().copied()
    }

    /// Whether the chain returns to its first token.
    pub fn is_closed(&self) -> bool {
        self.tokens.len() > 1 && self.tokens.first() == self.tokens.last()
    }

    /// Whether this is a ring: closed, and starting and ending on an edge.
    pub fn is_ring(&self) -> bool {
        self.is_closed() && self.tokens[0].is_edge()
    }

    /// Edges referenced by the fragment, in chain order.
    ///
    /// For a ring the closing edge is reported twice.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.tokens.iter().filter_map(|t| t.edge())
    }

    /// The cyclic token sequence of a closed chain, without the repeated
    /// closing token.
    pub fn cycle(&self) -> &[Token] {
        if self.is_closed() {
            &self.tokens[..self.tokens.len() - 1]
        } else {
            &self.tokens
        }
    }

    /// Rotate a closed chain so that it starts and ends on its first edge.
    ///
    /// Joining can close a loop on a face token; rings are kept edge-closed.
    /// Returns `None` if the chain is not closed or contains no edge.
    pub fn to_ring(&self) -> Option<Fragment> {
        if !self.is_closed() {
            return None;
        }
        let cycle = self.cycle();
        let start = cycle.iter().position(|t| t.is_edge())?;

        let mut tokens = Vec::with_capacity(cycle.len() + 1);
        tokens.extend_from_slice(&cycle[start..]);
        tokens.extend_from_slice(&cycle[..start]);
        tokens.push(cycle[start]);
        Some(Fragment { tokens })
    }

    /// Split the chain at every edge token selected by `retire`.
    ///
    /// Retired edge tokens are dropped. For a closed chain the run after the
    /// last split point is stitched onto the run before the first one, since
    /// they are contiguous around the cycle. Fragments shorter than two
    /// tokens (a lone face reached at its apex) are discarded. A chain that
    /// contains no retired edge is returned unchanged.
    pub fn split_where<F>(&self, mut retire: F) -> Vec<Fragment>
    where
        F: FnMut(EdgeId) -> bool,
    {
        let mut pieces: Vec<Vec<Token>> = Vec::new();
        let mut current: Vec<Token> = Vec::new();

        for &token in &self.tokens {
            match token {
                Token::Edge(e) if retire(e) => pieces.push(std::mem::take(&mut current)),
                _ => current.push(token),
            }
        }

        if pieces.is_empty() {
            return vec![self.clone()];
        }

        if self.is_closed() {
            // `pieces[0]` starts with the closing token, which is also the
            // last token of `current`.
            if pieces[0].is_empty() {
                pieces[0] = current;
            } else {
                let head = std::mem::take(&mut pieces[0]);
                current.extend_from_slice(&head[1..]);
                pieces[0] = current;
            }
        } else {
            pieces.push(current);
        }

        pieces
            .into_iter()
            .filter(|p| p.len() > 1)
            .map(Fragment::new)
            .collect()
    }
}

impl From<Vec<Token>> for Fragment {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, t) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", t)?;
        }
        write!(f, "]")
    }
}

/// Break a ring at every occurrence of `edge`.
///
/// # Example
/// ```
/// use sliver::mesh::{EdgeId, FaceId};
/// use sliver::slice::{split_on_edge, Fragment, Token};
///
/// let e = |i| Token::Edge(EdgeId::new(i));
/// let f = |i| Token::Face(FaceId::new(i));
///
/// let ring = Fragment::new(vec![e(1), f(1), e(2), f(2), e(1)]);
/// let pieces = split_on_edge(&ring, EdgeId::new(2));
/// assert_eq!(pieces, vec![Fragment::new(vec![f(2), e(1), f(1)])]);
/// ```
pub fn split_on_edge(ring: &Fragment, edge: EdgeId) -> Vec<Fragment> {
    ring.split_where(|e| e == edge)
}

/// Merge fragments end to start until no more merges are possible.
///
/// Two fragments merge when the last token of one equals the first token of
/// the other; the shared token appears once in the result. A fragment that
/// comes back to its own first token is closed and takes no further part.
/// Fragments are indexed by their first token, so merging is near-linear.
/// The result is deterministic for a given input.
///
/// # Example
/// ```
/// use sliver::mesh::{EdgeId, FaceId};
/// use sliver::slice::{join_fragments, Fragment, Token};
///
/// let e = |i| Token::Edge(EdgeId::new(i));
/// let f = |i| Token::Face(FaceId::new(i));
///
/// let joined = join_fragments(vec![
///     Fragment::new(vec![e(1), f(1)]),
///     Fragment::new(vec![f(1), e(2)]),
/// ]);
/// assert_eq!(joined, vec![Fragment::new(vec![e(1), f(1), e(2)])]);
/// ```
pub fn join_fragments(mut fragments: Vec<Fragment>) -> Vec<Fragment> {
    fragments.retain(|f| !f.is_empty());
    fragments.sort_by_key(|f| f.tokens[0]);

    let mut heads: HashMap<Token, Vec<usize>> = HashMap::with_capacity(fragments.len());
    for (i, f) in fragments.iter().enumerate() {
        heads.entry(f.tokens[0]).or_default().push(i);
    }

    let mut slots: Vec<Option<Fragment>> = fragments.into_iter().map(Some).collect();

    for i in (0..slots.len()).rev() {
        loop {
            let tail = match &slots[i] {
                Some(frag) if !frag.is_closed() => frag.tokens[frag.tokens.len() - 1],
                _ => break,
            };

            let partner = heads.get(&tail).and_then(|candidates| {
                candidates.iter().copied().find(|&j| {
                    j != i && slots[j].as_ref().is_some_and(|other| !other.is_closed())
                })
            });
            let Some(j) = partner else {
                break;
            };

            if let Some(other) = slots[j].take() {
                if let Some(frag) = slots[i].as_mut() {
                    frag.tokens.extend_from_slice(&other.tokens[1..]);
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}
