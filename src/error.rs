use thiserror::Error;

/// Errors reported by the physics pipeline.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// A contact references two bodies that both have zero inverse mass.
    ///
    /// Such a contact cannot move anything and indicates a setup error:
    /// two immovable bodies overlap, or a constraint anchors an immovable
    /// body. The step that produced it is aborted.
    #[error("contact references two infinite-mass bodies")]
    ImmovableContactPair,
}
