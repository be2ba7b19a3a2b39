/// The client's record that it believes a submission is in flight.
///
/// At most one marker exists per session. It survives restarts, which is the
/// whole point: it is a crash/reload recovery aid, not a permanent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobMarker {
    pub started_at_ms: u64,
}

/// A job the registry knows about, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    pub meeting_id: String,
    pub created_at_ms: u64,
}

/// Markers older than this are treated as abandoned and cleared unilaterally,
/// so a crashed session cannot lock the user out forever.
pub const STALE_MARKER_MS: u64 = 10 * 60 * 1000;

/// First guard step: what does the marker alone tell us?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerCheck {
    /// No marker; submission is allowed immediately.
    NoMarker,
    /// Marker exceeded the stale-lock timeout; clear it and allow submission.
    Stale,
    /// Marker is fresh; the registry must be consulted before deciding.
    MaybeInFlight { started_at_ms: u64 },
}

pub fn check_marker(marker: Option<JobMarker>, now_ms: u64) -> MarkerCheck {
    match marker {
        None => MarkerCheck::NoMarker,
        Some(marker) => {
            let elapsed = now_ms.saturating_sub(marker.started_at_ms);
            if elapsed > STALE_MARKER_MS {
                MarkerCheck::Stale
            } else {
                MarkerCheck::MaybeInFlight {
                    started_at_ms: marker.started_at_ms,
                }
            }
        }
    }
}

/// Second guard step: reconcile a fresh marker against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A job created at or after the marker exists server-side: the client
    /// missed the completion signal. Clear the marker and go to the result.
    JobFinished { meeting_id: String },
    /// Nothing newer server-side; the job is genuinely still in flight.
    StillInFlight,
}

pub fn reconcile(started_at_ms: u64, latest: Option<&RegistryEntry>) -> ReconcileOutcome {
    match latest {
        Some(entry) if entry.created_at_ms >= started_at_ms => ReconcileOutcome::JobFinished {
            meeting_id: entry.meeting_id.clone(),
        },
        _ => ReconcileOutcome::StillInFlight,
    }
}
