//! Admission of newly selected files and the progress simulation contract.

use std::time::Duration;

use crate::constraints::Constraints;
use crate::session::UploadSession;
use crate::types::{FileHandle, FileId, UploadedFile};

/// Period of the simulated upload timer.
pub const PROGRESS_TICK: Duration = Duration::from_millis(100);

/// Percentage added on every tick.
pub const PROGRESS_STEP: u8 = 5;

/// Outcome of admitting one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Session with the admitted files appended.
    pub session: UploadSession,
    /// Ids of the admitted files, in selection order.
    pub admitted: Vec<FileId>,
    /// How many files of the batch were dropped for lack of capacity.
    pub dropped: usize,
}

/// Admit `batch` into `session`, one file at a time in selection order.
///
/// Stops once the file list reaches `constraints.max_files`; the rest of
/// the batch is dropped, not queued. A disabled widget admits nothing.
/// Ids are drawn from `next_id`, which is advanced past every id used.
///
/// Type and size filtering are the picker's job and are not repeated
/// here.
#[must_use]
pub fn admit(
    session: &UploadSession,
    constraints: &Constraints,
    batch: Vec<FileHandle>,
    next_id: &mut u64,
) -> Admission {
    let room = if constraints.disabled {
        0
    } else {
        constraints.max_files.saturating_sub(session.files.len())
    };
    let offered = batch.len();

    let mut files = session.files.clone();
    let mut admitted = Vec::with_capacity(room.min(offered));
    for file in batch.into_iter().take(room) {
        let id = FileId(*next_id);
        *next_id += 1;
        files.push(UploadedFile::admitted(id, file));
        admitted.push(id);
    }

    Admission {
        session: session.with_files(files),
        dropped: offered - admitted.len(),
        admitted,
    }
}

/// Number of ticks a file needs to go from 0 to 100.
#[must_use]
pub const fn ticks_to_complete() -> u32 {
    (100_u32).div_ceil(PROGRESS_STEP as u32)
}
