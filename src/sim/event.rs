/// Events emitted during a simulation step.
/// The caller (game loop / presentation layer) decides what to do with
/// them; the step function only classifies.

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum GameEvent {
    JumpStarted,
    /// The hero touched a deadly region. Terminal for the hero.
    HazardTouched,
    /// The hero is standing on a checkpoint it had not reached before.
    CheckpointReached,
    CrateCollected,
    /// Grounded state flipped this tick (landing or walking off an edge).
    GroundedChanged { grounded: bool },
}
