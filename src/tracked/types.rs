/// Where a tracked file is in its update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Nothing has been learned from the remote yet
    Unchanged,
    /// Remote reports the version already on the device
    FetchedSame,
    /// A different version was downloaded and is being checked
    FetchedNew,
    /// The download passed validation and is ready to promote
    StagedValid,
    /// The download failed validation and was quarantined
    StagedInvalid,
    /// The staged download replaced the live file
    Promoted,
}
