// ── Synchronizer-owned state ──
//
// The projection of confirmed device power and the in-flight toggle
// markers. Both are written only by the synchronizer.

mod pending;
mod projection;

pub(crate) use pending::{PendingGuard, PendingMarkers};
pub(crate) use projection::Projection;
