use core::fmt;

/// Fatal initialization errors.
///
/// Runtime collaborator faults (settings reads, flash writes) are logged and
/// defaulted at the point of failure instead of flowing through this type.
#[derive(Debug)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// A background device task could not be spawned.
    #[cfg(target_os = "none")]
    TaskSpawn(embassy_executor::SpawnError),
    /// A sound set was constructed with no clips.
    EmptyClipSet,
    /// The accelerometer did not respond during bring-up.
    AccelInit,
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(target_os = "none")]
            Self::TaskSpawn(_) => write!(f, "failed to spawn device task"),
            Self::EmptyClipSet => write!(f, "sound set contains no clips"),
            Self::AccelInit => write!(f, "accelerometer initialization failed"),
        }
    }
}

#[cfg(target_os = "none")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(error: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(error)
    }
}
