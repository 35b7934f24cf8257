/// Score keeping for one level.
///
/// `base` is what the player carries in from earlier levels plus what they
/// earn here. The time bonus is kept apart so it can only ever be added
/// once, on the frame the level is cleared.

#[derive(Clone, Debug)]
pub struct ScoreManager {
    base: u32,
    bonus: u32,
    bonus_applied: bool,
    per_second: u32,
}

impl ScoreManager {
    pub fn new(per_second: u32) -> Self {
        Self::with_base(0, per_second)
    }

    pub fn with_base(base: u32, per_second: u32) -> Self {
        ScoreManager { base, bonus: 0, bonus_applied: false, per_second }
    }

    pub fn add(&mut self, points: u32) {
        self.base = self.base.saturating_add(points);
    }

    /// Score without the time bonus.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn score(&self) -> u32 {
        self.base.saturating_add(self.bonus)
    }

    #[cfg(test)]
    pub fn bonus_applied(&self) -> bool {
        self.bonus_applied
    }

    /// Credit `remaining_secs × per_second`. Only the first call counts.
    pub fn add_time_bonus(&mut self, remaining_secs: u32) -> bool {
        if self.bonus_applied {
            return false;
        }
        self.bonus = remaining_secs.saturating_mul(self.per_second);
        self.bonus_applied = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_applies_once() {
        let mut s = ScoreManager::with_base(200, 3);
        s.add(30);
        assert!(s.add_time_bonus(100));
        assert_eq!(s.score(), 530);
        assert!(!s.add_time_bonus(100));
        assert_eq!(s.score(), 530);
        assert_eq!(s.base(), 230);
    }

    #[test]
    fn zero_remaining_time_gives_no_bonus() {
        let mut s = ScoreManager::new(3);
        s.add(100);
        s.add_time_bonus(0);
        assert_eq!(s.score(), 100);
        assert!(s.bonus_applied());
    }
}
