//! Domain change events mapped from raw notify events.

use std::path::PathBuf;

use notify::EventKind;

/// What happened to a watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    /// Map a notify event kind onto the domain kinds.
    ///
    /// Access and other bookkeeping kinds carry no artifact change and
    /// return `None`.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Modify(_) => Some(Self::Updated),
            EventKind::Remove(_) => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// One file change delivered by the watch subsystem.
///
/// Consumed exactly once by the event loop; never stored.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};

    #[test]
    fn maps_create_modify_remove() {
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Created)
        );
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Modify(ModifyKind::Any)),
            Some(ChangeKind::Updated)
        );
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Remove(RemoveKind::File)),
            Some(ChangeKind::Deleted)
        );
    }

    #[test]
    fn drops_access_events() {
        assert_eq!(
            ChangeKind::from_notify(&EventKind::Access(AccessKind::Any)),
            None
        );
        assert_eq!(ChangeKind::from_notify(&EventKind::Any), None);
    }
}
