/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound and HUD flashes.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    BarrelJumped { id: u32 },
    BarrelSmashed { id: u32 },
    MonkeyDestroyed,
    BulletFired,
    BananaThrown,
    HammerCollected,
    BlasterCollected,
    BossHit { health: u32 },
    BossDefeated,
    PlayerKilled,
    LevelCleared,
    GameWon,
    TimeUp,
}
